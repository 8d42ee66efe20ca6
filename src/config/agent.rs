use crate::domain::ports::{ExporterConfig, WatchdogConfig};
use crate::utils::error::{PrimerError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

const DEFAULT_INTERVAL_SECONDS: u64 = 10;
const DEFAULT_METRIC_PREFIX: &str = "primer";
const DEFAULT_THRESHOLD_PERCENT: f32 = 80.0;

/// Top-level TOML file. Both loop sections are optional; a command fails
/// only when the fields it actually needs cannot be resolved.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    pub agent: Option<AgentMeta>,
    pub exporter: Option<ExporterSection>,
    pub watchdog: Option<WatchdogSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMeta {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterSection {
    pub endpoint: Option<String>,
    pub interval_seconds: Option<u64>,
    pub metric_prefix: Option<String>,
    pub max_cycles: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchdogSection {
    pub unit: Option<String>,
    pub threshold_percent: Option<f32>,
    pub interval_seconds: Option<u64>,
    pub max_cycles: Option<u64>,
}

impl AgentConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AgentConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from an empty config so
    /// CLI flags alone can drive a run.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn agent_name(&self) -> &str {
        self.agent
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("ops-primer")
    }

    /// Merge CLI overrides on top of the `[exporter]` table.
    pub fn resolve_exporter(
        &self,
        endpoint: Option<String>,
        interval: Option<u64>,
        cycles: Option<u64>,
    ) -> Result<ExporterSettings> {
        let section = self.exporter.clone().unwrap_or(ExporterSection {
            endpoint: None,
            interval_seconds: None,
            metric_prefix: None,
            max_cycles: None,
        });

        let endpoint = endpoint.or(section.endpoint).ok_or_else(|| {
            PrimerError::MissingConfigError {
                field: "exporter.endpoint".to_string(),
            }
        })?;

        let settings = ExporterSettings {
            endpoint,
            interval_seconds: interval
                .or(section.interval_seconds)
                .unwrap_or(DEFAULT_INTERVAL_SECONDS),
            metric_prefix: section
                .metric_prefix
                .unwrap_or_else(|| DEFAULT_METRIC_PREFIX.to_string()),
            max_cycles: cycles.or(section.max_cycles),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// Merge CLI overrides on top of the `[watchdog]` table.
    pub fn resolve_watchdog(
        &self,
        unit: Option<String>,
        threshold: Option<f32>,
        interval: Option<u64>,
        cycles: Option<u64>,
    ) -> Result<WatchdogSettings> {
        let section = self.watchdog.clone().unwrap_or(WatchdogSection {
            unit: None,
            threshold_percent: None,
            interval_seconds: None,
            max_cycles: None,
        });

        let unit = unit
            .or(section.unit)
            .ok_or_else(|| PrimerError::MissingConfigError {
                field: "watchdog.unit".to_string(),
            })?;

        let settings = WatchdogSettings {
            unit,
            threshold_percent: threshold
                .or(section.threshold_percent)
                .unwrap_or(DEFAULT_THRESHOLD_PERCENT),
            interval_seconds: interval
                .or(section.interval_seconds)
                .unwrap_or(DEFAULT_INTERVAL_SECONDS),
            max_cycles: cycles.or(section.max_cycles),
        };

        settings.validate()?;
        Ok(settings)
    }
}

/// Fully resolved exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterSettings {
    pub endpoint: String,
    pub interval_seconds: u64,
    pub metric_prefix: String,
    pub max_cycles: Option<u64>,
}

impl Validate for ExporterSettings {
    fn validate(&self) -> Result<()> {
        validate_url("exporter.endpoint", &self.endpoint)?;
        validate_positive_number("exporter.interval_seconds", self.interval_seconds, 1)?;
        validate_non_empty_string("exporter.metric_prefix", &self.metric_prefix)?;
        Ok(())
    }
}

impl ExporterConfig for ExporterSettings {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    fn metric_prefix(&self) -> &str {
        &self.metric_prefix
    }

    fn max_cycles(&self) -> Option<u64> {
        self.max_cycles
    }
}

/// Fully resolved watchdog configuration.
#[derive(Debug, Clone)]
pub struct WatchdogSettings {
    pub unit: String,
    pub threshold_percent: f32,
    pub interval_seconds: u64,
    pub max_cycles: Option<u64>,
}

impl Validate for WatchdogSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("watchdog.unit", &self.unit)?;
        validate_range(
            "watchdog.threshold_percent",
            self.threshold_percent,
            0.1,
            100.0,
        )?;
        validate_positive_number("watchdog.interval_seconds", self.interval_seconds, 1)?;
        Ok(())
    }
}

impl WatchdogConfig for WatchdogSettings {
    fn unit(&self) -> &str {
        &self.unit
    }

    fn threshold_percent(&self) -> f32 {
        self.threshold_percent
    }

    fn sample_interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    fn max_cycles(&self) -> Option<u64> {
        self.max_cycles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_exporter_from_toml() {
        let config: AgentConfig = toml::from_str(
            r#"
            [agent]
            name = "demo-agent"

            [exporter]
            endpoint = "http://localhost:9100/metrics"
            interval_seconds = 5
            metric_prefix = "node"
            "#,
        )
        .unwrap();

        let settings = config.resolve_exporter(None, None, None).unwrap();
        assert_eq!(settings.endpoint, "http://localhost:9100/metrics");
        assert_eq!(settings.interval_seconds, 5);
        assert_eq!(settings.metric_prefix, "node");
        assert_eq!(settings.max_cycles, None);
        assert_eq!(config.agent_name(), "demo-agent");
    }

    #[test]
    fn test_cli_overrides_win() {
        let config: AgentConfig = toml::from_str(
            r#"
            [exporter]
            endpoint = "http://localhost:9100/metrics"
            interval_seconds = 5
            "#,
        )
        .unwrap();

        let settings = config
            .resolve_exporter(Some("http://other:8080/m".to_string()), Some(2), Some(3))
            .unwrap();
        assert_eq!(settings.endpoint, "http://other:8080/m");
        assert_eq!(settings.interval_seconds, 2);
        assert_eq!(settings.max_cycles, Some(3));
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let config = AgentConfig::default();
        let err = config.resolve_exporter(None, None, None).unwrap_err();
        assert!(matches!(err, PrimerError::MissingConfigError { .. }));
    }

    #[test]
    fn test_exporter_rejects_bad_endpoint() {
        let config = AgentConfig::default();
        let err = config
            .resolve_exporter(Some("ftp://example.com".to_string()), None, None)
            .unwrap_err();
        assert!(matches!(err, PrimerError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_resolve_watchdog_defaults() {
        let config: AgentConfig = toml::from_str(
            r#"
            [watchdog]
            unit = "nginx.service"
            "#,
        )
        .unwrap();

        let settings = config.resolve_watchdog(None, None, None, None).unwrap();
        assert_eq!(settings.unit, "nginx.service");
        assert_eq!(settings.threshold_percent, DEFAULT_THRESHOLD_PERCENT);
        assert_eq!(settings.interval_seconds, DEFAULT_INTERVAL_SECONDS);
    }

    #[test]
    fn test_watchdog_rejects_zero_threshold() {
        let config = AgentConfig::default();
        let err = config
            .resolve_watchdog(Some("nginx.service".to_string()), Some(0.0), None, None)
            .unwrap_err();
        assert!(matches!(err, PrimerError::InvalidConfigValueError { .. }));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = AgentConfig::default();
        let err = config
            .resolve_exporter(Some("http://localhost/m".to_string()), Some(0), None)
            .unwrap_err();
        assert!(matches!(err, PrimerError::InvalidConfigValueError { .. }));
    }
}
