/// 日志工具模块
///
/// 提供日志格式化和输出的辅助函数
use tracing::info;

/// 记录程序启动信息
///
/// # 参数
/// - `max_concurrent`: 最大并发提交数
/// - `model_name`: 评分使用的模型
pub fn log_startup(max_concurrent: usize, model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 写作答卷批量评分模式");
    info!("📊 最大并发提交数: {}", max_concurrent);
    info!("🤖 评分模型: {}", model_name);
    info!("{}", "=".repeat(60));
}

/// 记录提交加载信息
pub fn log_submissions_loaded(total: usize, tests: usize) {
    info!("✓ 已加载 {} 张试卷", tests);
    info!("✓ 找到 {} 份待评分的提交\n", total);
}

/// 记录单份提交的结果
///
/// # 参数
/// - `index`: 提交编号（从1开始）
/// - `attempt_id`: 答卷ID
/// - `total_score`: 原始分
/// - `scaled_score`: 标准分
/// - `status`: 最终状态
pub fn log_submission_result(
    index: usize,
    attempt_id: u64,
    total_score: Option<f64>,
    scaled_score: Option<f64>,
    status: &str,
) {
    info!("\n{}", "─".repeat(60));
    info!(
        "[提交 {}] ✓ 答卷 {} 评分完成: 原始分 {} / 标准分 {} ({})",
        index,
        attempt_id,
        format_score(total_score),
        format_score(scaled_score),
        status
    );
    info!("{}", "─".repeat(60));
}

/// 打印最终统计信息
///
/// # 参数
/// - `success`: 全部作答评分成功的提交数
/// - `partial`: 部分作答评分失败的提交数
/// - `failed`: 整体失败的提交数
/// - `output_folder`: 结果输出目录
pub fn print_final_stats(success: usize, partial: usize, failed: usize, output_folder: &str) {
    let total = success + partial + failed;
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", success, total);
    info!("⚠️ 部分失败: {}", partial);
    info!("❌ 失败: {}", failed);
    info!("{}", "=".repeat(60));
    info!("\n结果已保存至: {}", output_folder);
}

fn format_score(score: Option<f64>) -> String {
    score.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string())
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
