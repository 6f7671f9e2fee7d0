//! 作答处理上下文
//!
//! 封装"我正在处理哪张答卷的第几份作答"这一信息

use std::fmt::Display;

use crate::models::{AttemptId, QuestionId};

/// 作答处理上下文
///
/// 包含处理单份作答所需的所有上下文信息
#[derive(Debug, Clone)]
pub struct AnswerCtx {
    /// 答卷ID
    pub attempt_id: AttemptId,

    /// 作答在本次提交中的位置（从0开始，汇总时按它写回）
    pub answer_index: usize,

    /// 题目ID
    pub question_id: QuestionId,
}

impl AnswerCtx {
    /// 创建新的作答上下文
    pub fn new(attempt_id: AttemptId, answer_index: usize, question_id: QuestionId) -> Self {
        Self {
            attempt_id,
            answer_index,
            question_id,
        }
    }
}

impl Display for AnswerCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[答卷 {} 作答#{} 题目ID#{}]",
            self.attempt_id,
            self.answer_index + 1,
            self.question_id
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_one_based() {
        let ctx = AnswerCtx::new(12, 0, 301);
        assert_eq!(ctx.to_string(), "[答卷 12 作答#1 题目ID#301]");
    }
}
