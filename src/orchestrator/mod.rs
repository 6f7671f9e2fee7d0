//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责整卷提交的流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `submission` - 整卷提交编排器
//! - 校验提交、原子创建答卷
//! - 每份作答一个任务并发评分，按提交顺序收集结果
//! - 汇总原始分、推进答卷状态
//! - 提供答卷详情和答卷列表查询
//!
//! ### `assembler` - 答卷详情组装器
//! - 提交响应和单独查询共用的唯一组装路径
//! - 按 order_in_test 排序作答，附加题目信息和标准分
//!
//! ### `batch_processor` - 批量提交处理器
//! - 命令行程序的生命周期（初始化、运行、统计）
//! - 控制并发提交数量（Semaphore）
//! - 写出每份答卷的 JSON 结果
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SubmissionFile>)
//!     ↓
//! submission (处理一次 TestSubmission)
//!     ↓
//! workflow::AnswerFlow (处理单份 Answer)
//!     ↓
//! services (能力层：scorer / scale)
//!     ↓
//! infrastructure (基础设施：TestCatalog / AttemptStore)
//! ```

pub mod assembler;
pub mod batch_processor;
pub mod submission;

// 重新导出主要类型
pub use assembler::AttemptDetailAssembler;
pub use batch_processor::{App, ProcessingStats};
pub use submission::{SubmissionOptions, SubmissionOrchestrator};
