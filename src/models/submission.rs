use serde::{Deserialize, Serialize};

use crate::models::attempt::UserId;
use crate::models::question::QuestionId;
use crate::models::test::TestId;

/// 单题提交内容
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question_id: QuestionId,
    pub user_answer: String,
}

/// 整卷提交请求
///
/// 没有鉴权，user_id 可以为空（匿名提交）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSubmission {
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
}

/// 从文件加载的提交（附带目标试卷）
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionFile {
    pub test_id: TestId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub answers: Vec<SubmittedAnswer>,
    #[serde(skip)]
    pub file_path: Option<String>,
}

impl SubmissionFile {
    pub fn submission(&self) -> TestSubmission {
        TestSubmission {
            user_id: self.user_id,
            answers: self.answers.clone(),
        }
    }
}
