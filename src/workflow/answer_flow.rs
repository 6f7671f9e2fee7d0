//! 作答评分流程 - 流程层
//!
//! 核心职责：定义"一份作答"的完整处理流程
//!
//! 流程顺序：
//! 1. 查找题目快照
//! 2. 调用评分能力（带超时）→ 限制分数
//! 3. 写回作答（反馈 + 分数）
//! 4. 向编排层报告结果

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::error::{AppError, InvalidError, ScoringError};
use crate::infrastructure::AttemptStore;
use crate::models::{Answer, QuestionLookup};
use crate::services::AnswerScorer;
use crate::utils::logging::truncate_text;
use crate::workflow::answer_ctx::AnswerCtx;

/// 单份作答的处理结果
#[derive(Debug)]
pub struct AnswerOutcome {
    /// 作答在本次提交中的位置
    pub index: usize,
    /// 处理后的作答（失败时分数为空、反馈为错误说明）
    pub answer: Answer,
    pub error: Option<AppError>,
}

impl AnswerOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// 作答评分流程
///
/// - 只拥有自己那一份 Answer
/// - 共享只读的题目快照
/// - 自己负责写回存储
/// - 不接触 Attempt
#[derive(Clone)]
pub struct AnswerFlow {
    scorer: Arc<dyn AnswerScorer>,
    store: Arc<dyn AttemptStore>,
    scoring_timeout: Duration,
    verbose_logging: bool,
}

impl AnswerFlow {
    /// 创建新的作答评分流程
    pub fn new(
        scorer: Arc<dyn AnswerScorer>,
        store: Arc<dyn AttemptStore>,
        scoring_timeout: Duration,
        verbose_logging: bool,
    ) -> Self {
        Self {
            scorer,
            store,
            scoring_timeout,
            verbose_logging,
        }
    }

    pub async fn run(&self, ctx: &AnswerCtx, answer: Answer, lookup: &QuestionLookup) -> AnswerOutcome {
        let mut answer = answer;

        if self.verbose_logging {
            info!(
                "{} 📝 作答预览: {}",
                ctx,
                truncate_text(&answer.user_answer, 60)
            );
        }

        // ========== 评分 ==========
        let mut error = match self.score(ctx, &answer, lookup).await {
            Ok((feedback, score)) => {
                info!("{} ✓ 评分完成: {}", ctx, score);
                answer.ai_feedback = Some(feedback);
                answer.ai_score = Some(score);
                None
            }
            Err(e) => {
                warn!("{} ⚠️ 评分失败: {}", ctx, e);
                answer.ai_feedback = Some(format!("AI 评分失败: {}", e));
                answer.ai_score = None;
                Some(e)
            }
        };

        // ========== 写回作答 ==========
        if let Err(e) = self.store.update_answer(answer.clone()).await {
            error!("{} ❌ 保存作答失败: {}", ctx, e);
            // 评分错误优先保留，存储错误只在评分成功时上报
            if error.is_none() {
                error = Some(e);
            }
        } else {
            debug!("{} 作答已保存", ctx);
        }

        AnswerOutcome {
            index: ctx.answer_index,
            answer,
            error,
        }
    }

    /// 调用评分能力，返回 (反馈, 限制后的分数)
    async fn score(
        &self,
        ctx: &AnswerCtx,
        answer: &Answer,
        lookup: &QuestionLookup,
    ) -> Result<(String, f64), AppError> {
        let question = lookup
            .get(&answer.question_id)
            .ok_or_else(|| InvalidError::MalformedQuestion {
                question_id: answer.question_id,
                reason: "题目不属于本试卷".to_string(),
            })?;

        debug!("{} 🤖 调用评分服务 ({})", ctx, question.question_type);

        let outcome = timeout(
            self.scoring_timeout,
            self.scorer.score(question, &answer.user_answer),
        )
        .await
        .map_err(|_| ScoringError::Timeout {
            secs: self.scoring_timeout.as_secs(),
        })??;

        let score = question.clamp_score(outcome.score)?;
        Ok((outcome.feedback, score))
    }
}
