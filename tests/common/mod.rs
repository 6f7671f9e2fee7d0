//! 集成测试共用的试卷、评分器和存储替身
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};
use writing_exam_scorer::error::{AppError, AppResult, ScoringError};
use writing_exam_scorer::infrastructure::LoadedAttempt;
use writing_exam_scorer::models::{
    Answer, Attempt, AttemptId, AttemptStatus, Question, QuestionId, QuestionType, SubmittedAnswer, Test, TestId,
    TestSubmission, UserId,
};
use writing_exam_scorer::{
    AnswerScorer, AttemptStore, MemoryStore, ScaleConverter, ScoreOutcome, SubmissionOptions,
    SubmissionOrchestrator, TestCatalog,
};

pub const TEST_ID: TestId = 1;

/// 标准 8 题试卷，题目 ID 为 101-108
///
/// 第 8 题未配置满分，走按题号回退
pub fn standard_test() -> Test {
    let questions = (1..=8u32)
        .map(|order| {
            let id = 100 + order as u64;
            match order {
                1..=5 => Question {
                    id,
                    test_id: TEST_ID,
                    title: format!("Question {}", order),
                    prompt: "Write one sentence based on the picture.".to_string(),
                    question_type: QuestionType::SentencePicture,
                    order_in_test: order,
                    max_score: 3.0,
                    image_url: Some(format!("https://img.example.com/{}.png", order)),
                    given_word1: Some("woman".to_string()),
                    given_word2: Some("because".to_string()),
                },
                6 | 7 => Question {
                    id,
                    test_id: TEST_ID,
                    title: format!("Question {}", order),
                    prompt: "Reply to the email.".to_string(),
                    question_type: QuestionType::EmailResponse,
                    order_in_test: order,
                    max_score: 4.0,
                    image_url: None,
                    given_word1: None,
                    given_word2: None,
                },
                _ => Question {
                    id,
                    test_id: TEST_ID,
                    title: format!("Question {}", order),
                    prompt: "Do you agree that remote work is more productive?".to_string(),
                    question_type: QuestionType::OpinionEssay,
                    order_in_test: order,
                    max_score: 0.0,
                    image_url: None,
                    given_word1: None,
                    given_word2: None,
                },
            }
        })
        .collect();

    Test {
        id: TEST_ID,
        title: "TOEIC Writing Practice Test 1".to_string(),
        description: String::new(),
        questions,
    }
}

/// 对试卷全部 8 题作答的提交（按题号顺序）
pub fn full_submission(user_id: Option<UserId>) -> TestSubmission {
    TestSubmission {
        user_id,
        answers: (101..=108)
            .map(|question_id| SubmittedAnswer {
                question_id,
                user_answer: format!("answer for {}", question_id),
            })
            .collect(),
    }
}

// ========== 评分器替身 ==========

/// 每道题都返回同一个分数；可以指定某些题目失败或延迟
#[derive(Default)]
pub struct FakeScorer {
    pub score: f64,
    pub failing: HashSet<QuestionId>,
    pub panicking: HashSet<QuestionId>,
    /// 题号越小延迟越长，让完成顺序与提交顺序相反
    pub reverse_delays: bool,
}

impl FakeScorer {
    pub fn fixed(score: f64) -> Self {
        Self {
            score,
            ..Default::default()
        }
    }

    pub fn failing_on(score: f64, question_ids: &[QuestionId]) -> Self {
        Self {
            score,
            failing: question_ids.iter().copied().collect(),
            ..Default::default()
        }
    }
}

impl AnswerScorer for FakeScorer {
    fn score<'a>(
        &'a self,
        question: &'a Question,
        user_answer: &'a str,
    ) -> BoxFuture<'a, Result<ScoreOutcome, ScoringError>> {
        async move {
            if self.reverse_delays {
                let delay = 10 * (9 - question.order_in_test as u64);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            if self.panicking.contains(&question.id) {
                panic!("scorer crashed on question {}", question.id);
            }
            if self.failing.contains(&question.id) {
                return Err(ScoringError::Unparseable {
                    reason: "缺少 'Score:' 行".to_string(),
                    response: "I cannot grade this.".to_string(),
                });
            }
            Ok(ScoreOutcome {
                feedback: format!("feedback for '{}'", user_answer),
                score: self.score,
            })
        }
        .boxed()
    }
}

// ========== 存储替身 ==========

/// 包装 MemoryStore，可以让指定的存储操作失败
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    /// 写 scoring 状态时失败
    pub fail_scoring_update: AtomicBool,
    /// 写终态（completed / completed_with_errors）时失败
    pub fail_final_update: AtomicBool,
    /// 写单条作答时失败
    pub fail_answer_update: AtomicBool,
    /// 读取答卷详情时失败
    pub fail_reload: AtomicBool,
}

impl FlakyStore {
    pub fn with_tests(tests: impl IntoIterator<Item = Test>) -> Self {
        Self {
            inner: MemoryStore::with_tests(tests),
            ..Default::default()
        }
    }

    pub fn set_fail_scoring_update(&self, value: bool) {
        self.fail_scoring_update.store(value, Ordering::SeqCst);
    }

    pub fn set_fail_answer_update(&self, value: bool) {
        self.fail_answer_update.store(value, Ordering::SeqCst);
    }

    pub fn set_fail_final_update(&self, value: bool) {
        self.fail_final_update.store(value, Ordering::SeqCst);
    }

    pub fn set_fail_reload(&self, value: bool) {
        self.fail_reload.store(value, Ordering::SeqCst);
    }
}

impl TestCatalog for FlakyStore {
    fn find_test_with_questions(&self, test_id: TestId) -> BoxFuture<'_, AppResult<Test>> {
        self.inner.find_test_with_questions(test_id)
    }
}

impl AttemptStore for FlakyStore {
    fn create_attempt(&self, attempt: Attempt) -> BoxFuture<'_, AppResult<Attempt>> {
        self.inner.create_attempt(attempt)
    }

    fn update_attempt(&self, attempt: Attempt) -> BoxFuture<'_, AppResult<()>> {
        if attempt.status == AttemptStatus::Scoring
            && self.fail_scoring_update.load(Ordering::SeqCst)
        {
            return async { Err(AppError::write_failed("attempt", "lock timeout")) }.boxed();
        }
        if attempt.status.is_terminal() && self.fail_final_update.load(Ordering::SeqCst) {
            return async { Err(AppError::write_failed("attempt", "connection reset")) }.boxed();
        }
        self.inner.update_attempt(attempt)
    }

    fn update_answer(&self, answer: Answer) -> BoxFuture<'_, AppResult<()>> {
        if self.fail_answer_update.load(Ordering::SeqCst) {
            return async { Err(AppError::write_failed("answer", "disk full")) }.boxed();
        }
        self.inner.update_answer(answer)
    }

    fn find_attempt_with_details(
        &self,
        attempt_id: AttemptId,
    ) -> BoxFuture<'_, AppResult<LoadedAttempt>> {
        if self.fail_reload.load(Ordering::SeqCst) {
            return async { Err(AppError::read_failed("attempt", "connection reset")) }.boxed();
        }
        self.inner.find_attempt_with_details(attempt_id)
    }

    fn find_attempts_by_test_and_user(
        &self,
        test_id: TestId,
        user_id: Option<UserId>,
    ) -> BoxFuture<'_, AppResult<Vec<Attempt>>> {
        self.inner.find_attempts_by_test_and_user(test_id, user_id)
    }
}

/// 用内存存储和给定评分器组装编排器
pub fn orchestrator_with(scorer: FakeScorer) -> (SubmissionOrchestrator, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::with_tests(vec![standard_test()]));
    let orchestrator = SubmissionOrchestrator::new(
        store.clone(),
        store.clone(),
        Arc::new(scorer),
        ScaleConverter::new(),
        SubmissionOptions::default(),
    );
    (orchestrator, store)
}

/// 用可失败的存储组装编排器
pub fn flaky_orchestrator(scorer: FakeScorer) -> (SubmissionOrchestrator, Arc<FlakyStore>) {
    let store = Arc::new(FlakyStore::with_tests(vec![standard_test()]));
    let orchestrator = SubmissionOrchestrator::new(
        store.clone(),
        store.clone(),
        Arc::new(scorer),
        ScaleConverter::new(),
        SubmissionOptions::default(),
    );
    (orchestrator, store)
}
