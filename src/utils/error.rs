use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrimerError {
    #[error("Metrics request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid config value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required config field: {field}")]
    MissingConfigError { field: String },

    #[error("Guide error: {message}")]
    GuideError { message: String },

    #[error("Process control error: {message}")]
    ControlError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Io,
    Config,
    Data,
    Control,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PrimerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Io,
            Self::SerializationError(_) | Self::CsvError(_) | Self::GuideError { .. } => {
                ErrorCategory::Data
            }
            Self::TomlError(_)
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Config,
            Self::ControlError { .. } => ErrorCategory::Control,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // Poll failures are retried on the next interval anyway.
            Self::ApiError(_) => ErrorSeverity::Medium,
            Self::IoError(_) => ErrorSeverity::High,
            Self::SerializationError(_) | Self::CsvError(_) => ErrorSeverity::High,
            Self::GuideError { .. } => ErrorSeverity::High,
            Self::TomlError(_)
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorSeverity::Critical,
            Self::ControlError { .. } => ErrorSeverity::Medium,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) => format!("Could not reach the metrics endpoint: {}", e),
            Self::IoError(e) => format!("File operation failed: {}", e),
            Self::SerializationError(e) => format!("Could not serialize guide data: {}", e),
            Self::CsvError(e) => format!("Could not write CSV output: {}", e),
            Self::TomlError(e) => format!("Config file is not valid TOML: {}", e),
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Config field '{}' is invalid: {}", field, reason)
            }
            Self::MissingConfigError { field } => {
                format!("Config field '{}' is required but missing", field)
            }
            Self::GuideError { message } => format!("Guide problem: {}", message),
            Self::ControlError { message } => format!("Service control failed: {}", message),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => {
                "Check that the endpoint URL is correct and the service is up".to_string()
            }
            Self::IoError(_) => "Check the path exists and is writable".to_string(),
            Self::SerializationError(_) | Self::CsvError(_) => {
                "Re-run with --verbose to see which entry failed".to_string()
            }
            Self::TomlError(_) => "Validate the config file against primer.toml.example".to_string(),
            Self::InvalidConfigValueError { .. } | Self::MissingConfigError { .. } => {
                "Fix the named field in the config file or pass it as a CLI flag".to_string()
            }
            Self::GuideError { .. } => {
                "Check the guide file follows the '## <n>. <title>' heading format".to_string()
            }
            Self::ControlError { .. } => {
                "Check the unit name and that this user may run systemctl restart".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, PrimerError>;
