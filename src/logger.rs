//! 日志初始化
//!
//! - `RUST_LOG` 控制过滤规则（例如 `info,writing_exam_scorer=debug`），默认 `info`
//! - 只安装一次，重复调用不会报错

use tracing_subscriber::EnvFilter;

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
