//! 答卷详情组装器 - 编排层
//!
//! 提交后的同步响应和单独查询共用这一条组装路径，相同的存储状态产出相同的结构

use crate::models::{
    AnswerDetail, Attempt, AttemptDetail, AttemptSummary, QuestionLookup, QuestionView, Test,
};
use crate::services::ScaleConverter;

/// 答卷详情组装器
#[derive(Debug, Clone, Copy, Default)]
pub struct AttemptDetailAssembler {
    converter: ScaleConverter,
}

impl AttemptDetailAssembler {
    pub fn new(converter: ScaleConverter) -> Self {
        Self { converter }
    }

    /// 组装答卷详情
    ///
    /// 作答按题目的 order_in_test 稳定排序；题目已不在索引中的作答排在最后
    pub fn assemble(&self, attempt: &Attempt, test: &Test, lookup: &QuestionLookup) -> AttemptDetail {
        let mut answers: Vec<AnswerDetail> = attempt
            .answers
            .iter()
            .map(|answer| AnswerDetail {
                id: answer.id,
                question_id: answer.question_id,
                question: lookup.get(&answer.question_id).map(QuestionView::from),
                user_answer: answer.user_answer.clone(),
                ai_feedback: answer.ai_feedback.clone(),
                ai_score: answer.ai_score,
            })
            .collect();

        answers.sort_by_key(|a| {
            a.question
                .as_ref()
                .map(|q| q.order_in_test)
                .unwrap_or(u32::MAX)
        });

        AttemptDetail {
            id: attempt.id,
            test_id: attempt.test_id,
            test_title: test.title.clone(),
            user_id: attempt.user_id,
            submitted_at: attempt.submitted_at,
            total_score: attempt.total_score,
            scaled_score: self.converter.convert_optional(attempt.total_score),
            status: attempt.status,
            dropped_question_ids: attempt.dropped_question_ids.clone(),
            answers,
        }
    }

    /// 组装列表摘要
    pub fn summarize(&self, attempt: &Attempt) -> AttemptSummary {
        AttemptSummary {
            id: attempt.id,
            test_id: attempt.test_id,
            user_id: attempt.user_id,
            submitted_at: attempt.submitted_at,
            total_score: attempt.total_score,
            scaled_score: self.converter.convert_optional(attempt.total_score),
            status: attempt.status,
        }
    }
}
