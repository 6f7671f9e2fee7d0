//! 存储能力接口 - 基础设施层
//!
//! 编排层只通过这两个 trait 访问持久化数据，不关心底层存储技术。
//! 方法返回 `BoxFuture`（Send），评分任务可以把存储句柄带进 `tokio::spawn`。

use futures::future::BoxFuture;

use crate::error::AppResult;
use crate::models::{Answer, Attempt, AttemptId, Test, TestId, UserId};

/// 带完整关联的答卷（试卷 + 全部题目 + 全部作答）
#[derive(Debug, Clone)]
pub struct LoadedAttempt {
    pub attempt: Attempt,
    pub test: Test,
}

/// 试卷目录（只读）
pub trait TestCatalog: Send + Sync {
    /// 读取试卷及其题目（题目按 order_in_test 排序）
    fn find_test_with_questions(&self, test_id: TestId) -> BoxFuture<'_, AppResult<Test>>;
}

/// 答卷存储
pub trait AttemptStore: Send + Sync {
    /// 原子地创建答卷及其全部作答，返回分配好 ID 的答卷
    fn create_attempt(&self, attempt: Attempt) -> BoxFuture<'_, AppResult<Attempt>>;

    /// 更新答卷（状态、总分、作答快照）
    fn update_attempt(&self, attempt: Attempt) -> BoxFuture<'_, AppResult<()>>;

    /// 更新单条作答
    fn update_answer(&self, answer: Answer) -> BoxFuture<'_, AppResult<()>>;

    /// 读取答卷及完整关联
    fn find_attempt_with_details(
        &self,
        attempt_id: AttemptId,
    ) -> BoxFuture<'_, AppResult<LoadedAttempt>>;

    /// 按试卷（和用户）列出答卷，最新的在前；user_id 为 None 时不过滤用户
    fn find_attempts_by_test_and_user(
        &self,
        test_id: TestId,
        user_id: Option<UserId>,
    ) -> BoxFuture<'_, AppResult<Vec<Attempt>>>;
}
