//! 批量提交处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是命令行程序的入口，负责批量提交的处理和资源管理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：加载试卷目录、创建存储和评分服务
//! 2. **批量加载**：扫描并加载所有待评分的提交（`Vec<SubmissionFile>`）
//! 3. **并发控制**：使用 Semaphore 限制同时评分的提交数量
//! 4. **结果输出**：每份答卷写成一个 JSON 文件
//! 5. **全局统计**：汇总所有提交的处理结果
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单份作答的细节
//! - **向下委托**：委托 `SubmissionOrchestrator` 处理单次提交

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::infrastructure::MemoryStore;
use crate::models::{load_all_submission_files, load_test_catalog, AttemptStatus, SubmissionFile, SubmissionReport};
use crate::orchestrator::submission::{SubmissionOptions, SubmissionOrchestrator};
use crate::services::{AnswerScorer, LlmService, ScaleConverter};
use crate::utils::logging::{log_startup, log_submission_result, log_submissions_loaded, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    store: Arc<MemoryStore>,
    orchestrator: Arc<SubmissionOrchestrator>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(config.max_concurrent_submissions, &config.llm_model_name);

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 LLM_API_KEY，评分请求可能会被拒绝");
        }

        let tests = load_test_catalog(Path::new(&config.test_catalog_file)).await?;
        let store = Arc::new(MemoryStore::with_tests(tests));
        let scorer: Arc<dyn AnswerScorer> = Arc::new(LlmService::new(&config));

        Ok(Self::with_components(config, store, scorer))
    }

    /// 使用现成的存储和评分服务组装应用
    pub fn with_components(
        config: Config,
        store: Arc<MemoryStore>,
        scorer: Arc<dyn AnswerScorer>,
    ) -> Self {
        let orchestrator = SubmissionOrchestrator::new(
            store.clone(),
            store.clone(),
            scorer,
            ScaleConverter::new(),
            SubmissionOptions::from_config(&config),
        );

        Self {
            config,
            store,
            orchestrator: Arc::new(orchestrator),
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        // 加载所有待处理的提交
        info!("\n📁 正在扫描待评分的提交...");
        let submissions = load_all_submission_files(&self.config.submissions_folder).await?;

        if submissions.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML文件，程序结束");
            return Ok(ProcessingStats::default());
        }

        log_submissions_loaded(submissions.len(), self.store.test_count().await);

        fs::create_dir_all(&self.config.output_folder)
            .await
            .with_context(|| format!("无法创建输出目录: {}", self.config.output_folder))?;

        // 处理所有提交
        let stats = self.process_all(submissions).await?;

        // 输出最终统计
        print_final_stats(
            stats.success,
            stats.partial,
            stats.failed,
            &self.config.output_folder,
        );

        Ok(stats)
    }

    /// 处理所有提交
    async fn process_all(&self, submissions: Vec<SubmissionFile>) -> Result<ProcessingStats> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_submissions.max(1)));
        let mut handles = Vec::with_capacity(submissions.len());

        for (idx, file) in submissions.into_iter().enumerate() {
            let index = idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let orchestrator = Arc::clone(&self.orchestrator);
            let output_folder = PathBuf::from(&self.config.output_folder);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                process_submission(&orchestrator, file, index, &output_folder).await
            });
            handles.push((index, handle));
        }

        let mut stats = ProcessingStats::default();
        for (index, handle) in handles {
            match handle.await {
                Ok(Ok(AttemptStatus::Completed)) => stats.success += 1,
                Ok(Ok(_)) => stats.partial += 1,
                Ok(Err(e)) => {
                    error!("[提交 {}] ❌ 处理过程中发生错误: {:#}", index, e);
                    stats.failed += 1;
                }
                Err(e) => {
                    error!("[提交 {}] 任务执行失败: {}", index, e);
                    stats.failed += 1;
                }
            }
        }

        Ok(stats)
    }
}

/// 处理单份提交并写出结果文件，返回答卷最终状态
async fn process_submission(
    orchestrator: &SubmissionOrchestrator,
    file: SubmissionFile,
    index: usize,
    output_folder: &Path,
) -> Result<AttemptStatus> {
    let source = file.file_path.clone().unwrap_or_default();
    info!("[提交 {}] 📄 开始处理: {} (试卷 {})", index, source, file.test_id);

    let report = orchestrator
        .submit_test_with_report(file.test_id, file.submission())
        .await
        .with_context(|| format!("提交失败: {}", source))?;

    for message in &report.processing_errors {
        warn!("[提交 {}] ⚠️ {}", index, message);
    }

    let output_path = write_report(&report, output_folder).await?;
    log_submission_result(
        index,
        report.detail.id,
        report.detail.total_score,
        report.detail.scaled_score,
        report.detail.status.as_str(),
    );
    info!("[提交 {}] 💾 结果已写入: {}", index, output_path.display());

    Ok(report.detail.status)
}

/// 把提交结果写成格式化的 JSON
async fn write_report(report: &SubmissionReport, output_folder: &Path) -> Result<PathBuf> {
    let path = output_folder.join(format!("attempt_{}.json", report.detail.id));
    let json = serde_json::to_string_pretty(report)?;
    fs::write(&path, json)
        .await
        .with_context(|| format!("无法写入结果文件: {}", path.display()))?;
    Ok(path)
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    /// 全部作答评分成功
    pub success: usize,
    /// 答卷已完成但部分作答评分失败
    pub partial: usize,
    /// 提交整体失败（试卷不存在、没有有效作答等）
    pub failed: usize,
}

impl ProcessingStats {
    pub fn total(&self) -> usize {
        self.success + self.partial + self.failed
    }
}
