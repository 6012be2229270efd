//! Default-threshold configuration tests
//!
//! Loads override files from disk and checks that judgments pick up the
//! resolved defaults, and that broken overrides fall back to built-ins.

use judgment::{
    Action, ConfigError, JudgeAgent, JudgeConfig, TaskType, ThresholdConfigError, ThresholdSource,
    ThresholdTable,
};
use serde_json::json;
use std::io::Write;

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create threshold file");
    file.write_all(content.as_bytes()).expect("write threshold file");
    path
}

#[test]
fn test_toml_file_overrides_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "thresholds.toml",
        r#"
[classification]
min_accuracy = 0.95

[regression]
max_rmse = 5
"#,
    );

    let table = ThresholdTable::load_file(&path).unwrap();
    assert_eq!(table.get(TaskType::Classification, "min_accuracy"), Some(0.95));
    assert_eq!(table.get(TaskType::Regression, "max_rmse"), Some(5.0));
    assert_eq!(table.get(TaskType::Regression, "max_mae"), Some(5.0));
}

#[test]
fn test_json_file_drives_judgment() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(
        &dir,
        "thresholds.json",
        r#"{"regression": {"max_rmse": 5.0}}"#,
    );

    let config = JudgeConfig {
        thresholds_path: Some(path),
        ..Default::default()
    };
    let agent = JudgeAgent::from_config(&config).unwrap();

    // rmse 8.5 passes the built-in 10.0 but not the configured 5.0
    let response = agent.handle(json!({
        "training_id": "train-cfg",
        "task_type": "regression",
        "evaluation_results": {"rmse": 8.5, "mae": 4.2, "r2_score": 0.88}
    }));
    let result = response.judgment().unwrap();
    assert!(!result.judgment.is_acceptable);
    assert_eq!(result.judgment.failed_criteria, vec!["rmse <= 5.0 (actual: 8.5000)"]);
    assert_eq!(result.next_action.action, Action::Retry);

    // A request override still wins over the configured default
    let response = agent.handle(json!({
        "training_id": "train-cfg-2",
        "task_type": "regression",
        "evaluation_results": {"rmse": 8.5},
        "acceptance_criteria": {"max_rmse": 9.0}
    }));
    assert!(response.judgment().unwrap().judgment.is_acceptable);
}

#[test]
fn test_broken_file_falls_back_to_builtin() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write_file(&dir, "thresholds.json", "{ this is not json");

    assert!(matches!(
        ThresholdTable::load_file(&path),
        Err(ThresholdConfigError::Json(_))
    ));
    assert_eq!(
        ThresholdTable::resolve(Some(&ThresholdSource::File(path))),
        ThresholdTable::builtin()
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = ThresholdTable::load_file(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ThresholdConfigError::Io { .. }), "{err}");
}

#[test]
fn test_inline_blob_from_config() {
    let config = JudgeConfig {
        thresholds_json: Some(r#"{"clustering": {"min_silhouette_score": 0.7}}"#.to_string()),
        ..Default::default()
    };
    let agent = JudgeAgent::from_config(&config).unwrap();
    assert_eq!(
        agent
            .thresholds()
            .get(TaskType::Clustering, "min_silhouette_score"),
        Some(0.7)
    );

    let response = agent.handle(json!({
        "training_id": "train-inline",
        "task_type": "clustering",
        "evaluation_results": {"silhouette_score": 0.65}
    }));
    assert_eq!(
        response.judgment().unwrap().next_action.action,
        Action::Retry
    );
}

#[test]
fn test_malformed_inline_blob_keeps_builtin() {
    let config = JudgeConfig {
        thresholds_json: Some("not json".to_string()),
        ..Default::default()
    };
    let agent = JudgeAgent::from_config(&config).unwrap();
    assert_eq!(agent.thresholds(), &ThresholdTable::builtin());
}

#[test]
fn test_configured_issue_host_and_channels() {
    let config = JudgeConfig {
        issue_tracker_host: "git.example.org".to_string(),
        default_channels: vec!["email".to_string()],
        ..Default::default()
    };
    let agent = JudgeAgent::from_config(&config).unwrap();

    let ok = agent.handle(json!({
        "training_id": "train-host",
        "task_type": "clustering",
        "evaluation_results": {"silhouette_score": 0.1},
        "issue_tracker_url": "https://git.example.org/ml/models/issues/3"
    }));
    let notification = ok
        .judgment()
        .unwrap()
        .operator_notification
        .clone()
        .unwrap();
    assert_eq!(notification.channels, vec!["email"]);

    let rejected = agent.handle(json!({
        "training_id": "train-host",
        "task_type": "clustering",
        "evaluation_results": {"silhouette_score": 0.1},
        "issue_tracker_url": "https://github.com/ml/models/issues/3"
    }));
    assert_eq!(rejected.status_code, 500);
}

#[test]
fn test_unusable_issue_host_fails_agent_construction() {
    let config = JudgeConfig {
        issue_tracker_host: "github.com/acme".to_string(),
        ..Default::default()
    };
    let err = JudgeAgent::from_config(&config).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidIssueHost { .. }), "{err}");
    assert!(err.to_string().contains("github.com/acme"));
}
