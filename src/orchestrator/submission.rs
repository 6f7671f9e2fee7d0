//! 整卷提交编排器 - 编排层
//!
//! ## 职责
//!
//! 1. 校验提交（过滤不属于该试卷的作答）
//! 2. 原子地创建答卷，推进状态到 scoring
//! 3. 每份作答一个 tokio 任务并发评分（扇出），按提交顺序收集结果（扇入）
//! 4. 汇总原始分、确定最终状态并写回
//! 5. 重新读取答卷，通过 `AttemptDetailAssembler` 组装响应
//!
//! 单个作答的失败只会降级该作答和答卷状态，不会中断其他作答。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, InvalidError, ScoringError};
use crate::infrastructure::{AttemptStore, TestCatalog};
use crate::models::{
    Answer, Attempt, AttemptDetail, AttemptId, AttemptStatus, AttemptSummary, QuestionId,
    QuestionLookup, SubmissionReport, TestId, TestSubmission, UserId,
};
use crate::orchestrator::assembler::AttemptDetailAssembler;
use crate::services::{AnswerScorer, ScaleConverter};
use crate::workflow::{AnswerCtx, AnswerFlow, AnswerOutcome};

/// 编排器选项
#[derive(Debug, Clone)]
pub struct SubmissionOptions {
    /// 单题评分超时
    pub scoring_timeout: Duration,
    /// 是否输出作答预览
    pub verbose_logging: bool,
}

impl Default for SubmissionOptions {
    fn default() -> Self {
        Self {
            scoring_timeout: Duration::from_secs(120),
            verbose_logging: false,
        }
    }
}

impl SubmissionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scoring_timeout: config.scoring_timeout(),
            verbose_logging: config.verbose_logging,
        }
    }
}

/// 整卷提交编排器
///
/// 所有依赖通过构造函数注入，不使用全局状态
pub struct SubmissionOrchestrator {
    catalog: Arc<dyn TestCatalog>,
    store: Arc<dyn AttemptStore>,
    flow: AnswerFlow,
    assembler: AttemptDetailAssembler,
}

impl SubmissionOrchestrator {
    pub fn new(
        catalog: Arc<dyn TestCatalog>,
        store: Arc<dyn AttemptStore>,
        scorer: Arc<dyn AnswerScorer>,
        converter: ScaleConverter,
        options: SubmissionOptions,
    ) -> Self {
        let flow = AnswerFlow::new(
            scorer,
            Arc::clone(&store),
            options.scoring_timeout,
            options.verbose_logging,
        );

        Self {
            catalog,
            store,
            flow,
            assembler: AttemptDetailAssembler::new(converter),
        }
    }

    /// 提交整卷并返回答卷详情
    pub async fn submit_test(
        &self,
        test_id: TestId,
        submission: TestSubmission,
    ) -> AppResult<AttemptDetail> {
        Ok(self.submit_test_with_report(test_id, submission).await?.detail)
    }

    /// 提交整卷，额外返回处理过程中累积的错误
    pub async fn submit_test_with_report(
        &self,
        test_id: TestId,
        submission: TestSubmission,
    ) -> AppResult<SubmissionReport> {
        // ========== 1. 读取试卷 ==========
        let test = self.catalog.find_test_with_questions(test_id).await?;
        if test.questions.is_empty() {
            return Err(InvalidError::TestHasNoQuestions { test_id }.into());
        }
        let lookup = test.question_lookup();

        // ========== 2. 过滤作答 ==========
        let (answers, dropped) = filter_answers(&submission, &lookup);
        if !dropped.is_empty() {
            warn!(
                "[试卷 {}] ⚠️ 丢弃 {} 份不属于本试卷或重复的作答: {:?}",
                test_id,
                dropped.len(),
                dropped
            );
        }
        if answers.is_empty() {
            return Err(InvalidError::NoValidAnswers { test_id, dropped }.into());
        }

        // ========== 3. 原子创建答卷 ==========
        let mut attempt = Attempt::new(test_id, submission.user_id, answers);
        attempt.dropped_question_ids = dropped;
        let mut attempt = self.store.create_attempt(attempt).await?;

        info!(
            "[答卷 {}] 📄 已创建 (试卷 {} '{}', {} 份作答)",
            attempt.id,
            test_id,
            test.title,
            attempt.answers.len()
        );

        // ========== 4. 进入评分状态 ==========
        attempt.status = AttemptStatus::Scoring;
        if let Err(e) = self.store.update_attempt(attempt.clone()).await {
            warn!("[答卷 {}] ⚠️ 更新为 scoring 状态失败，继续评分: {}", attempt.id, e);
        }

        // ========== 5-6. 扇出 / 扇入 ==========
        let outcomes = self.score_answers(&attempt, &lookup).await;

        let mut processing_errors = Vec::new();
        let mut scored_answers = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            if let Some(e) = &outcome.error {
                processing_errors.push(format!(
                    "作答 {} (题目 {}): {}",
                    outcome.answer.id, outcome.answer.question_id, e
                ));
            }
            scored_answers.push(outcome.answer);
        }

        // ========== 7. 汇总并写回 ==========
        let total: f64 = scored_answers.iter().filter_map(|a| a.ai_score).sum();
        attempt.total_score = Some(total);
        attempt.status = if processing_errors.is_empty() {
            AttemptStatus::Completed
        } else {
            AttemptStatus::CompletedWithErrors
        };
        attempt.answers = scored_answers;

        info!(
            "[答卷 {}] 📊 原始分 {} / {}，状态 {}",
            attempt.id,
            total,
            test.max_raw_score(),
            attempt.status
        );

        if let Err(e) = self.store.update_attempt(attempt.clone()).await {
            error!("[答卷 {}] ❌ 保存最终状态失败: {}", attempt.id, e);
            processing_errors.push(format!("保存答卷最终状态失败: {}", e));
        }

        // ========== 8-9. 重新读取并组装 ==========
        let detail = match self.store.find_attempt_with_details(attempt.id).await {
            Ok(loaded) => {
                let stored_lookup = loaded.test.question_lookup();
                self.assembler
                    .assemble(&loaded.attempt, &loaded.test, &stored_lookup)
            }
            Err(e) => {
                warn!(
                    "[答卷 {}] ⚠️ 重新读取失败，使用内存中的数据组装: {}",
                    attempt.id, e
                );
                self.assembler.assemble(&attempt, &test, &lookup)
            }
        };

        if !processing_errors.is_empty() {
            warn!(
                "[答卷 {}] ⚠️ 处理过程中出现 {} 个错误",
                attempt.id,
                processing_errors.len()
            );
        }

        Ok(SubmissionReport {
            detail,
            processing_errors,
        })
    }

    /// 读取答卷详情
    pub async fn get_attempt_details(&self, attempt_id: AttemptId) -> AppResult<AttemptDetail> {
        let loaded = self.store.find_attempt_with_details(attempt_id).await?;
        let lookup = loaded.test.question_lookup();
        Ok(self.assembler.assemble(&loaded.attempt, &loaded.test, &lookup))
    }

    /// 列出某试卷下（某用户）的答卷，最新的在前
    pub async fn get_user_attempts_for_test(
        &self,
        test_id: TestId,
        user_id: Option<UserId>,
    ) -> AppResult<Vec<AttemptSummary>> {
        // 试卷不存在时返回 NotFound，而不是空列表
        self.catalog.find_test_with_questions(test_id).await?;

        let attempts = self
            .store
            .find_attempts_by_test_and_user(test_id, user_id)
            .await?;

        debug!(
            "[试卷 {}] 找到 {} 份答卷 (用户: {:?})",
            test_id,
            attempts.len(),
            user_id
        );

        Ok(attempts
            .iter()
            .map(|attempt| self.assembler.summarize(attempt))
            .collect())
    }

    /// 每份作答一个任务，按提交顺序收集结果
    async fn score_answers(&self, attempt: &Attempt, lookup: &QuestionLookup) -> Vec<AnswerOutcome> {
        let total = attempt.answers.len();
        info!("[答卷 {}] 🚀 开始并发评分 {} 份作答", attempt.id, total);

        let mut handles = Vec::with_capacity(total);
        for (index, answer) in attempt.answers.iter().enumerate() {
            let ctx = AnswerCtx::new(attempt.id, index, answer.question_id);
            let flow = self.flow.clone();
            let lookup = Arc::clone(lookup);
            let owned = answer.clone();

            let handle = tokio::spawn(async move { flow.run(&ctx, owned, &lookup).await });
            handles.push((index, answer.clone(), handle));
        }

        let mut slots: Vec<Option<AnswerOutcome>> = (0..total).map(|_| None).collect();
        for (index, answer, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(
                        "[答卷 {} 作答#{}] ❌ 评分任务异常终止: {}",
                        attempt.id,
                        index + 1,
                        e
                    );
                    aborted_outcome(index, answer, e.to_string())
                }
            };
            debug_assert_eq!(outcome.index, index);
            slots[index] = Some(outcome);
        }

        let outcomes: Vec<AnswerOutcome> = slots.into_iter().flatten().collect();
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(
            "[答卷 {}] ✓ 评分结束: 成功 {}/{}",
            attempt.id, succeeded, total
        );

        outcomes
    }
}

/// 任务异常终止时，作答保持未评分状态
fn aborted_outcome(index: usize, mut answer: Answer, message: String) -> AnswerOutcome {
    let err = ScoringError::TaskAborted(message);
    answer.ai_feedback = Some(format!("AI 评分失败: {}", err));
    answer.ai_score = None;
    AnswerOutcome {
        index,
        answer,
        error: Some(err.into()),
    }
}

/// 拆分为 (保留的作答, 被丢弃的题目ID)
///
/// 不属于本试卷的作答被丢弃；同一题目的重复作答只保留第一份，
/// 这样每份作答对应唯一的 order_in_test，详情排序不会出现并列
fn filter_answers(
    submission: &TestSubmission,
    lookup: &QuestionLookup,
) -> (Vec<Answer>, Vec<QuestionId>) {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    let mut dropped = Vec::new();

    for submitted in &submission.answers {
        if lookup.contains_key(&submitted.question_id) && seen.insert(submitted.question_id) {
            kept.push(Answer::new(submitted.question_id, submitted.user_answer.clone()));
        } else {
            dropped.push(submitted.question_id);
        }
    }

    (kept, dropped)
}
