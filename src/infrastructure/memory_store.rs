//! 内存存储 - 基础设施层
//!
//! 同时实现 `TestCatalog` 和 `AttemptStore`，供命令行批处理和测试使用。
//! 所有写操作在同一把写锁内完成，创建答卷天然是原子的。

use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{AppError, AppResult, NotFoundError, StorageError};
use crate::infrastructure::store::{AttemptStore, LoadedAttempt, TestCatalog};
use crate::models::{Answer, Attempt, AttemptId, Test, TestId, UserId};

#[derive(Debug, Default)]
struct MemoryState {
    tests: HashMap<TestId, Test>,
    attempts: HashMap<AttemptId, Attempt>,
    next_attempt_id: AttemptId,
    next_answer_id: u64,
}

/// 内存存储
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用试卷列表初始化
    pub fn with_tests(tests: impl IntoIterator<Item = Test>) -> Self {
        let state = MemoryState {
            tests: tests.into_iter().map(|t| (t.id, t)).collect(),
            ..Default::default()
        };
        Self {
            state: RwLock::new(state),
        }
    }

    /// 写入（或覆盖）一张试卷
    pub async fn insert_test(&self, mut test: Test) {
        test.sort_questions();
        self.state.write().await.tests.insert(test.id, test);
    }

    /// 试卷数量
    pub async fn test_count(&self) -> usize {
        self.state.read().await.tests.len()
    }

    /// 已存储的答卷数量
    pub async fn attempt_count(&self) -> usize {
        self.state.read().await.attempts.len()
    }
}

impl TestCatalog for MemoryStore {
    fn find_test_with_questions(&self, test_id: TestId) -> BoxFuture<'_, AppResult<Test>> {
        async move {
            let state = self.state.read().await;
            let mut test = state
                .tests
                .get(&test_id)
                .cloned()
                .ok_or(NotFoundError::Test(test_id))?;
            test.sort_questions();
            Ok(test)
        }
        .boxed()
    }
}

impl AttemptStore for MemoryStore {
    fn create_attempt(&self, mut attempt: Attempt) -> BoxFuture<'_, AppResult<Attempt>> {
        async move {
            let mut state = self.state.write().await;

            if !state.tests.contains_key(&attempt.test_id) {
                return Err(AppError::write_failed(
                    "attempt",
                    format!("引用的试卷 {} 不存在", attempt.test_id),
                ));
            }

            state.next_attempt_id += 1;
            attempt.id = state.next_attempt_id;
            for answer in attempt.answers.iter_mut() {
                state.next_answer_id += 1;
                answer.id = state.next_answer_id;
                answer.attempt_id = attempt.id;
            }

            debug!(
                "创建答卷 {} (试卷 {}, {} 条作答)",
                attempt.id,
                attempt.test_id,
                attempt.answers.len()
            );
            state.attempts.insert(attempt.id, attempt.clone());
            Ok(attempt)
        }
        .boxed()
    }

    fn update_attempt(&self, attempt: Attempt) -> BoxFuture<'_, AppResult<()>> {
        async move {
            let mut state = self.state.write().await;
            let stored = state
                .attempts
                .get_mut(&attempt.id)
                .ok_or(NotFoundError::Attempt(attempt.id))?;

            if !stored.status.can_transition_to(attempt.status) {
                return Err(StorageError::IllegalTransition {
                    attempt_id: attempt.id,
                    from: stored.status,
                    to: attempt.status,
                }
                .into());
            }

            *stored = attempt;
            Ok(())
        }
        .boxed()
    }

    fn update_answer(&self, answer: Answer) -> BoxFuture<'_, AppResult<()>> {
        async move {
            let mut state = self.state.write().await;
            let attempt = state
                .attempts
                .get_mut(&answer.attempt_id)
                .ok_or(NotFoundError::Attempt(answer.attempt_id))?;

            let slot = attempt
                .answers
                .iter_mut()
                .find(|a| a.id == answer.id)
                .ok_or_else(|| {
                    AppError::write_failed("answer", format!("作答 {} 不存在", answer.id))
                })?;

            *slot = answer;
            Ok(())
        }
        .boxed()
    }

    fn find_attempt_with_details(
        &self,
        attempt_id: AttemptId,
    ) -> BoxFuture<'_, AppResult<LoadedAttempt>> {
        async move {
            let state = self.state.read().await;
            let mut attempt = state
                .attempts
                .get(&attempt_id)
                .cloned()
                .ok_or(NotFoundError::Attempt(attempt_id))?;
            attempt.answers.sort_by_key(|a| a.id);

            let mut test = state.tests.get(&attempt.test_id).cloned().ok_or_else(|| {
                AppError::read_failed(
                    "attempt",
                    format!("答卷 {} 引用的试卷 {} 不存在", attempt_id, attempt.test_id),
                )
            })?;
            test.sort_questions();

            Ok(LoadedAttempt { attempt, test })
        }
        .boxed()
    }

    fn find_attempts_by_test_and_user(
        &self,
        test_id: TestId,
        user_id: Option<UserId>,
    ) -> BoxFuture<'_, AppResult<Vec<Attempt>>> {
        async move {
            let state = self.state.read().await;
            let mut attempts: Vec<Attempt> = state
                .attempts
                .values()
                .filter(|a| a.test_id == test_id)
                .filter(|a| user_id.is_none() || a.user_id == user_id)
                .cloned()
                .collect();

            attempts.sort_by(|a, b| {
                b.submitted_at
                    .cmp(&a.submitted_at)
                    .then_with(|| b.id.cmp(&a.id))
            });
            Ok(attempts)
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::models::{AttemptStatus, Question, QuestionType};

    fn sample_test() -> Test {
        Test {
            id: 1,
            title: "Mock".to_string(),
            description: String::new(),
            questions: vec![Question {
                id: 10,
                test_id: 1,
                title: "Essay".to_string(),
                prompt: "Agree or disagree?".to_string(),
                question_type: QuestionType::OpinionEssay,
                order_in_test: 8,
                max_score: 5.0,
                image_url: None,
                given_word1: None,
                given_word2: None,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_assigns_ids_atomically() {
        let store = MemoryStore::with_tests([sample_test()]);
        let attempt = Attempt::new(1, Some(5), vec![Answer::new(10, "a"), Answer::new(10, "b")]);

        let created = store.create_attempt(attempt).await.unwrap();
        assert_eq!(created.id, 1);
        assert_eq!(created.answers[0].id, 1);
        assert_eq!(created.answers[1].id, 2);
        assert!(created.answers.iter().all(|a| a.attempt_id == 1));

        let orphan = Attempt::new(99, None, vec![Answer::new(10, "x")]);
        assert!(store.create_attempt(orphan).await.is_err());
        assert_eq!(store.attempt_count().await, 1);
    }

    #[tokio::test]
    async fn test_insert_test_and_lookup() {
        let store = MemoryStore::new();
        assert_eq!(store.test_count().await, 0);

        store.insert_test(sample_test()).await;
        let test = store.find_test_with_questions(1).await.unwrap();
        assert_eq!(test.questions.len(), 1);
        assert_eq!(store.test_count().await, 1);

        let err = store.find_test_with_questions(2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_attempt_rejects_regression() {
        let store = MemoryStore::with_tests([sample_test()]);
        let mut attempt = store
            .create_attempt(Attempt::new(1, None, vec![Answer::new(10, "a")]))
            .await
            .unwrap();

        attempt.status = AttemptStatus::Completed;
        store.update_attempt(attempt.clone()).await.unwrap();

        attempt.status = AttemptStatus::Scoring;
        let err = store.update_attempt(attempt).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PersistenceFailure);
    }

    #[tokio::test]
    async fn test_update_answer_and_reload() {
        let store = MemoryStore::with_tests([sample_test()]);
        let attempt = store
            .create_attempt(Attempt::new(1, None, vec![Answer::new(10, "a")]))
            .await
            .unwrap();

        let mut answer = attempt.answers[0].clone();
        answer.ai_score = Some(4.0);
        answer.ai_feedback = Some("Good".to_string());
        store.update_answer(answer).await.unwrap();

        let loaded = store.find_attempt_with_details(attempt.id).await.unwrap();
        assert_eq!(loaded.attempt.answers[0].ai_score, Some(4.0));
        assert_eq!(loaded.test.title, "Mock");

        let missing = store.find_attempt_with_details(404).await.unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_find_attempts_filters_and_orders() {
        let store = MemoryStore::with_tests([sample_test()]);
        for user in [Some(1), Some(2), Some(1), None] {
            store
                .create_attempt(Attempt::new(1, user, vec![Answer::new(10, "a")]))
                .await
                .unwrap();
        }

        let mine = store.find_attempts_by_test_and_user(1, Some(1)).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine[0].id > mine[1].id || mine[0].submitted_at > mine[1].submitted_at);

        let all = store.find_attempts_by_test_and_user(1, None).await.unwrap();
        assert_eq!(all.len(), 4);

        let other = store.find_attempts_by_test_and_user(2, None).await.unwrap();
        assert!(other.is_empty());
    }
}
