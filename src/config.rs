use std::time::Duration;

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    /// 同时处理的提交数量
    pub max_concurrent_submissions: usize,
    /// 试卷目录文件
    pub test_catalog_file: String,
    /// 待处理提交的 TOML 文件夹
    pub submissions_folder: String,
    /// 评分结果输出文件夹
    pub output_folder: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 单题评分超时（秒）
    pub scoring_timeout_secs: u64,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// LLM 调用失败时的最大尝试次数
    pub llm_max_retries: usize,
    /// 两次尝试之间的等待（毫秒）
    pub llm_retry_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrent_submissions: 4,
            test_catalog_file: "data/tests.toml".to_string(),
            submissions_folder: "data/submissions".to_string(),
            output_folder: "results".to_string(),
            verbose_logging: false,
            scoring_timeout_secs: 120,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o-mini".to_string(),
            llm_max_retries: 3,
            llm_retry_delay_ms: 1000,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_concurrent_submissions: std::env::var("MAX_CONCURRENT_SUBMISSIONS").ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0).unwrap_or(default.max_concurrent_submissions),
            test_catalog_file: std::env::var("TEST_CATALOG_FILE").unwrap_or(default.test_catalog_file),
            submissions_folder: std::env::var("SUBMISSIONS_FOLDER").unwrap_or(default.submissions_folder),
            output_folder: std::env::var("OUTPUT_FOLDER").unwrap_or(default.output_folder),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            scoring_timeout_secs: std::env::var("SCORING_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0).unwrap_or(default.scoring_timeout_secs),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            llm_max_retries: std::env::var("LLM_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).filter(|v| *v > 0).unwrap_or(default.llm_max_retries),
            llm_retry_delay_ms: std::env::var("LLM_RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.llm_retry_delay_ms),
        }
    }

    pub fn scoring_timeout(&self) -> Duration {
        Duration::from_secs(self.scoring_timeout_secs)
    }
}
