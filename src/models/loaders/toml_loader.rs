use crate::models::submission::SubmissionFile;
use crate::models::test::Test;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;

/// 试卷目录文件结构
#[derive(Debug, Deserialize)]
struct TestCatalogFile {
    #[serde(default)]
    tests: Vec<Test>,
}

/// 从 TOML 文件加载试卷目录
///
/// 题目的 test_id 以所属试卷为准，题目按 order_in_test 排序，每张试卷都会被校验
pub async fn load_test_catalog(toml_file_path: &Path) -> Result<Vec<Test>> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取试卷目录文件: {}", toml_file_path.display()))?;

    parse_test_catalog(&content)
        .with_context(|| format!("无法解析试卷目录文件: {}", toml_file_path.display()))
}

/// 解析试卷目录内容
pub fn parse_test_catalog(content: &str) -> Result<Vec<Test>> {
    let catalog: TestCatalogFile = toml::from_str(content)?;

    let mut tests = catalog.tests;
    for test in tests.iter_mut() {
        for question in test.questions.iter_mut() {
            question.test_id = test.id;
        }
        test.sort_questions();
        test.validate()?;
    }

    Ok(tests)
}

/// 从 TOML 文件加载单份提交
pub async fn load_submission_file(toml_file_path: &Path) -> Result<SubmissionFile> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let mut submission: SubmissionFile = toml::from_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    // 设置文件路径
    submission.file_path = Some(toml_file_path.to_string_lossy().to_string());

    Ok(submission)
}

/// 从文件夹中加载所有提交文件（按文件名排序）
pub async fn load_all_submission_files(folder_path: &str) -> Result<Vec<SubmissionFile>> {
    let folder = PathBuf::from(folder_path);

    if !folder.exists() {
        anyhow::bail!("文件夹不存在: {}", folder_path);
    }

    let mut toml_files = Vec::new();
    let mut entries = fs::read_dir(&folder)
        .await
        .with_context(|| format!("无法读取文件夹: {}", folder_path))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml_files.push(path);
        }
    }
    toml_files.sort();

    let mut submissions = Vec::new();
    for path in toml_files {
        tracing::info!(
            "正在加载: {}",
            path.file_name().unwrap_or_default().to_string_lossy()
        );

        match load_submission_file(&path).await {
            Ok(submission) => {
                tracing::info!("成功加载 {} 个作答", submission.answers.len());
                submissions.push(submission);
            }
            Err(e) => {
                tracing::warn!("加载文件失败 {}: {:#}", path.display(), e);
            }
        }
    }

    Ok(submissions)
}
