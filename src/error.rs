use thiserror::Error;

use crate::models::{AttemptId, AttemptStatus, QuestionId, TestId};

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 资源不存在
    #[error("资源不存在: {0}")]
    NotFound(#[from] NotFoundError),
    /// 请求或输入不合法
    #[error("输入不合法: {0}")]
    Invalid(#[from] InvalidError),
    /// AI 评分错误
    #[error("AI评分错误: {0}")]
    Scoring(#[from] ScoringError),
    /// 存储错误
    #[error("存储错误: {0}")]
    Storage(#[from] StorageError),
}

/// 错误大类，供调用方（HTTP / CLI）决定如何呈现
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Invalid,
    ExternalServiceFailure,
    PersistenceFailure,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Invalid(_) => ErrorKind::Invalid,
            AppError::Scoring(_) => ErrorKind::ExternalServiceFailure,
            AppError::Storage(_) => ErrorKind::PersistenceFailure,
        }
    }
}

/// 资源不存在错误
#[derive(Debug, Error)]
pub enum NotFoundError {
    #[error("试卷不存在 (ID: {0})")]
    Test(TestId),
    #[error("答卷不存在 (ID: {0})")]
    Attempt(AttemptId),
}

/// 输入不合法错误
#[derive(Debug, Error)]
pub enum InvalidError {
    /// 试卷没有任何题目
    #[error("试卷 {test_id} 没有题目，无法提交")]
    TestHasNoQuestions { test_id: TestId },
    /// 提交中没有任何属于该试卷的答案
    #[error("没有属于试卷 {test_id} 的有效答案 (被丢弃的题目: {dropped:?})")]
    NoValidAnswers {
        test_id: TestId,
        dropped: Vec<QuestionId>,
    },
    /// 原始分超出换算表范围
    #[error("原始分 {raw} 超出有效范围 [0, {max}]")]
    RawScoreOutOfRange { raw: f64, max: f64 },
    /// 试卷定义不合法
    #[error("试卷定义不合法 ({test_title}): {reason}")]
    MalformedTest { test_title: String, reason: String },
    /// 题目定义不合法
    #[error("题目 {question_id} 定义不合法: {reason}")]
    MalformedQuestion {
        question_id: QuestionId,
        reason: String,
    },
}

/// AI 评分错误
#[derive(Debug, Error)]
pub enum ScoringError {
    /// LLM API 调用失败（已重试）
    #[error("LLM API调用失败 (模型: {model}, 已尝试 {attempts} 次): {message}")]
    ApiCallFailed {
        model: String,
        attempts: usize,
        message: String,
    },
    /// LLM 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
    /// 无法从 LLM 响应中解析分数
    #[error("无法解析LLM返回的分数: {reason} (响应: {response})")]
    Unparseable { reason: String, response: String },
    /// 题目没有可用的满分
    #[error("题目 {question_id} 无法确定满分 (order_in_test: {order_in_test})")]
    UnknownMaxScore {
        question_id: QuestionId,
        order_in_test: u32,
    },
    /// 构建请求失败
    #[error("构建LLM请求失败: {0}")]
    RequestBuild(String),
    /// 评分超时
    #[error("评分超时 ({secs} 秒)")]
    Timeout { secs: u64 },
    /// 评分任务异常终止
    #[error("评分任务异常终止: {0}")]
    TaskAborted(String),
}

/// 存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    /// 写入失败
    #[error("写入失败 ({entity}): {message}")]
    WriteFailed { entity: String, message: String },
    /// 读取失败
    #[error("读取失败 ({entity}): {message}")]
    ReadFailed { entity: String, message: String },
    /// 状态不允许回退
    #[error("答卷 {attempt_id} 状态不允许从 {from} 变更为 {to}")]
    IllegalTransition {
        attempt_id: AttemptId,
        from: AttemptStatus,
        to: AttemptStatus,
    },
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建存储写入错误
    pub fn write_failed(entity: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Storage(StorageError::WriteFailed {
            entity: entity.into(),
            message: message.into(),
        })
    }

    /// 创建存储读取错误
    pub fn read_failed(entity: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Storage(StorageError::ReadFailed {
            entity: entity.into(),
            message: message.into(),
        })
    }
}

impl ScoringError {
    /// 创建LLM API调用错误
    pub fn api_failed(model: impl Into<String>, attempts: usize, source: impl std::fmt::Display) -> Self {
        ScoringError::ApiCallFailed {
            model: model.into(),
            attempts,
            message: source.to_string(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
