use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::QuestionId;
use crate::models::test::TestId;

pub type AttemptId = u64;
pub type AnswerId = u64;
pub type UserId = u64;

/// 答卷状态
///
/// 状态机：pending → scoring → (completed | completed_with_errors)，终态不可离开
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptStatus {
    Pending,
    Scoring,
    Completed,
    CompletedWithErrors,
}

impl AttemptStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttemptStatus::Pending => "pending",
            AttemptStatus::Scoring => "scoring",
            AttemptStatus::Completed => "completed",
            AttemptStatus::CompletedWithErrors => "completed_with_errors",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            AttemptStatus::Completed | AttemptStatus::CompletedWithErrors
        )
    }

    /// 是否允许变更到 `next`（同状态重写视为允许）
    pub fn can_transition_to(self, next: AttemptStatus) -> bool {
        use AttemptStatus::*;
        match (self, next) {
            (a, b) if a == b => true,
            (Pending, Scoring) => true,
            (Pending | Scoring, Completed | CompletedWithErrors) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单题作答
///
/// 创建后只会被它自己的评分任务修改一次
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub id: AnswerId,
    pub attempt_id: AttemptId,
    pub question_id: QuestionId,
    pub user_answer: String,
    pub ai_feedback: Option<String>,
    /// None 表示尚未评分或评分失败
    pub ai_score: Option<f64>,
}

impl Answer {
    /// 创建尚未持久化的作答（ID 由存储层分配）
    pub fn new(question_id: QuestionId, user_answer: impl Into<String>) -> Self {
        Self {
            id: 0,
            attempt_id: 0,
            question_id,
            user_answer: user_answer.into(),
            ai_feedback: None,
            ai_score: None,
        }
    }
}

/// 一次整卷提交
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: AttemptId,
    pub test_id: TestId,
    pub user_id: Option<UserId>,
    pub submitted_at: DateTime<Utc>,
    pub status: AttemptStatus,
    /// 所有已评分作答的原始分之和，评分完成前为 None
    pub total_score: Option<f64>,
    /// 提交中不属于该试卷而被丢弃的题目
    #[serde(default)]
    pub dropped_question_ids: Vec<QuestionId>,
    /// 按创建顺序排列
    pub answers: Vec<Answer>,
}

impl Attempt {
    /// 新建待持久化的答卷（状态为 pending）
    pub fn new(test_id: TestId, user_id: Option<UserId>, answers: Vec<Answer>) -> Self {
        Self {
            id: 0,
            test_id,
            user_id,
            submitted_at: Utc::now(),
            status: AttemptStatus::Pending,
            total_score: None,
            dropped_question_ids: Vec::new(),
            answers,
        }
    }
}
