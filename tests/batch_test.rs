mod common;

use common::FakeScorer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_test::assert_ok;
use writing_exam_scorer::models::load_test_catalog;
use writing_exam_scorer::{logger, App, Config, MemoryStore};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "writing_exam_scorer_{}_{}",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("创建临时目录失败");
    dir
}

fn sample_catalog() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data/tests.toml")
}

#[tokio::test]
async fn test_sample_catalog_is_valid() {
    let tests = assert_ok!(load_test_catalog(&sample_catalog()).await);
    assert_eq!(tests.len(), 1);
    assert_eq!(tests[0].questions.len(), 8);
    assert_eq!(tests[0].max_raw_score(), 28.0);
}

#[tokio::test]
async fn test_batch_run_writes_reports() {
    logger::init();

    let root = scratch_dir("batch");
    let submissions = root.join("submissions");
    let output = root.join("results");
    std::fs::create_dir_all(&submissions).unwrap();

    std::fs::copy(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data/submissions/sample_001.toml"),
        submissions.join("a_full.toml"),
    )
    .unwrap();
    std::fs::write(
        submissions.join("b_unknown_test.toml"),
        "test_id = 77\n\n[[answers]]\nquestion_id = 101\nuser_answer = \"hello\"\n",
    )
    .unwrap();
    std::fs::write(submissions.join("notes.txt"), "ignored").unwrap();

    let config = Config {
        max_concurrent_submissions: 2,
        submissions_folder: submissions.to_string_lossy().to_string(),
        output_folder: output.to_string_lossy().to_string(),
        ..Config::default()
    };

    let tests = assert_ok!(load_test_catalog(&sample_catalog()).await);
    let store = Arc::new(MemoryStore::with_tests(tests));
    let app = App::with_components(config, store.clone(), Arc::new(FakeScorer::fixed(2.0)));

    let stats = assert_ok!(app.run().await);
    assert_eq!(stats.success, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.total(), 2);
    assert_eq!(store.attempt_count().await, 1);

    let report = std::fs::read_to_string(output.join("attempt_1.json")).expect("结果文件");
    let json: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(json["detail"]["status"], "completed");
    assert_eq!(json["detail"]["total_score"], 16.0);
    assert_eq!(json["detail"]["scaled_score"], 120.0);
    assert_eq!(json["detail"]["answers"].as_array().map(|a| a.len()), Some(8));

    let _ = std::fs::remove_dir_all(&root);
}

#[tokio::test]
async fn test_batch_run_with_empty_folder() {
    let root = scratch_dir("empty");

    let config = Config {
        submissions_folder: root.to_string_lossy().to_string(),
        output_folder: root.join("results").to_string_lossy().to_string(),
        ..Config::default()
    };
    let app = App::with_components(
        config,
        Arc::new(MemoryStore::new()),
        Arc::new(FakeScorer::fixed(1.0)),
    );

    let stats = assert_ok!(app.run().await);
    assert_eq!(stats.total(), 0);

    let _ = std::fs::remove_dir_all(&root);
}
