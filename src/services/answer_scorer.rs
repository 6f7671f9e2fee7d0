//! 评分能力接口 - 业务能力层
//!
//! 只描述"给一道题和一份作答，返回反馈和分数"，不关心答卷、顺序和存储

use futures::future::BoxFuture;

use crate::error::ScoringError;
use crate::models::Question;

/// 单题评分结果
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreOutcome {
    pub feedback: String,
    /// 期望在 [0, 满分] 之间，调用方仍会再做一次限制
    pub score: f64,
}

/// 单题评分能力
pub trait AnswerScorer: Send + Sync {
    fn score<'a>(
        &'a self,
        question: &'a Question,
        user_answer: &'a str,
    ) -> BoxFuture<'a, Result<ScoreOutcome, ScoringError>>;
}
