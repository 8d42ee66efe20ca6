use ops_primer::AgentConfig;
use std::io::Write;
use tempfile::NamedTempFile;

const FULL_CONFIG: &str = r#"
[agent]
name = "prod-primer"
description = "study rig on the staging box"

[exporter]
endpoint = "http://localhost:9100/metrics"
interval_seconds = 15
metric_prefix = "node"

[watchdog]
unit = "nginx.service"
threshold_percent = 85.0
interval_seconds = 30
max_cycles = 100
"#;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_config() {
    let file = write_config(FULL_CONFIG);
    let config = AgentConfig::from_file(file.path()).unwrap();

    assert_eq!(config.agent_name(), "prod-primer");

    let exporter = config.resolve_exporter(None, None, None).unwrap();
    assert_eq!(exporter.endpoint, "http://localhost:9100/metrics");
    assert_eq!(exporter.interval_seconds, 15);
    assert_eq!(exporter.metric_prefix, "node");

    let watchdog = config.resolve_watchdog(None, None, None, None).unwrap();
    assert_eq!(watchdog.unit, "nginx.service");
    assert_eq!(watchdog.threshold_percent, 85.0);
    assert_eq!(watchdog.max_cycles, Some(100));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_config("[exporter\nendpoint=");
    let err = AgentConfig::from_file(file.path()).unwrap_err();
    assert!(matches!(err, ops_primer::PrimerError::TomlError(_)));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let config = AgentConfig::load_or_default("/no/such/primer.toml").unwrap();
    assert_eq!(config.agent_name(), "ops-primer");

    // With no file, CLI flags must carry the required fields.
    assert!(config.resolve_exporter(None, None, None).is_err());
    let settings = config
        .resolve_exporter(Some("http://localhost:9100/metrics".to_string()), None, None)
        .unwrap();
    assert_eq!(settings.interval_seconds, 10);
    assert_eq!(settings.metric_prefix, "primer");
}

#[test]
fn test_bad_threshold_in_file_rejected() {
    let file = write_config(
        r#"
[watchdog]
unit = "nginx.service"
threshold_percent = 250.0
"#,
    );
    let config = AgentConfig::from_file(file.path()).unwrap();
    let err = config.resolve_watchdog(None, None, None, None).unwrap_err();
    assert!(matches!(
        err,
        ops_primer::PrimerError::InvalidConfigValueError { .. }
    ));
}
