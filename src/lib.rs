//! # Writing Exam Scorer
//!
//! TOEIC 写作整卷提交、AI 并发评分与分数换算
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有持久化数据，只暴露能力
//! - `TestCatalog` / `AttemptStore` - 存储接口
//! - `MemoryStore` - 内存实现，创建答卷是原子的
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单份作答或单个分数
//! - `AnswerScorer` - 评分能力接口
//! - `LlmService` - 基于 LLM 的评分实现
//! - `ScaleConverter` - 原始分 → 标准分
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一份作答"的完整处理流程
//! - `AnswerCtx` - 上下文封装（attempt_id + answer_index）
//! - `AnswerFlow` - 流程编排（评分 → 限制分数 → 写回 → 报告）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/submission` - 整卷提交编排器，扇出/扇入和答卷状态
//! - `orchestrator/assembler` - 答卷详情组装器
//! - `orchestrator/batch_processor` - 批量提交处理器，管理并发和输出
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, ErrorKind};
pub use infrastructure::{AttemptStore, MemoryStore, TestCatalog};
pub use models::{AttemptDetail, AttemptSummary, Question, Test, TestSubmission};
pub use orchestrator::{App, AttemptDetailAssembler, SubmissionOptions, SubmissionOrchestrator};
pub use services::{AnswerScorer, LlmService, ScaleConverter, ScoreOutcome};
pub use workflow::{AnswerCtx, AnswerFlow, AnswerOutcome};
