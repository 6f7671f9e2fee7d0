//! 答卷读模型
//!
//! 提交后的同步响应和之后的单独查询都使用同一套结构

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::attempt::{AnswerId, AttemptId, AttemptStatus, UserId};
use crate::models::question::{Question, QuestionId, QuestionType};
use crate::models::test::TestId;

/// 渲染一道题所需的题目信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionView {
    pub id: QuestionId,
    pub test_id: TestId,
    pub title: String,
    pub prompt: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub order_in_test: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_word1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given_word2: Option<String>,
    pub max_score: f64,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            id: q.id,
            test_id: q.test_id,
            title: q.title.clone(),
            prompt: q.prompt.clone(),
            question_type: q.question_type,
            order_in_test: q.order_in_test,
            image_url: q.image_url.clone(),
            given_word1: q.given_word1.clone(),
            given_word2: q.given_word2.clone(),
            max_score: q.effective_max_score().unwrap_or(q.max_score),
        }
    }
}

/// 单题作答详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerDetail {
    pub id: AnswerId,
    pub question_id: QuestionId,
    /// 题目已从试卷中删除时为 None
    pub question: Option<QuestionView>,
    pub user_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_score: Option<f64>,
}

/// 答卷详情
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptDetail {
    pub id: AttemptId,
    pub test_id: TestId,
    pub test_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled_score: Option<f64>,
    pub status: AttemptStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_question_ids: Vec<QuestionId>,
    /// 按题目的 order_in_test 排序
    pub answers: Vec<AnswerDetail>,
}

/// 答卷摘要（列表用）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub id: AttemptId,
    pub test_id: TestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub submitted_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaled_score: Option<f64>,
    pub status: AttemptStatus,
}

/// 提交结果：答卷详情 + 处理过程中累积的错误
///
/// 累积错误只在提交时可见，不写入答卷
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReport {
    pub detail: AttemptDetail,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub processing_errors: Vec<String>,
}
