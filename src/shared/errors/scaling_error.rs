use serde::Serialize;
use thiserror::Error;

/// The pre-flight check that rejected a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreflightCheck {
    Connection,
    Privilege,
    Variable,
    TargetTable,
}

impl std::fmt::Display for PreflightCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreflightCheck::Connection => write!(f, "connection"),
            PreflightCheck::Privilege => write!(f, "privilege"),
            PreflightCheck::Variable => write!(f, "variable"),
            PreflightCheck::TargetTable => write!(f, "target table"),
        }
    }
}

#[derive(Error, Debug, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum ScalingError {
    #[error("Can't find scaling job id {0}")]
    JobNotFound(i64),

    #[error("Pre-flight {check} check failed on data source '{data_source}': {reason}")]
    PreflightCheckFailed {
        check: PreflightCheck,
        data_source: String,
        reason: String,
    },

    #[error("Registry unavailable: {0}")]
    RegistryUnavailable(String),

    #[error("Malformed persisted state at '{key}': {reason}")]
    MalformedPersistedState { key: String, reason: String },

    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl ScalingError {
    pub fn preflight(
        check: PreflightCheck,
        data_source: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        ScalingError::PreflightCheckFailed {
            check,
            data_source: data_source.into(),
            reason: reason.to_string(),
        }
    }

    pub fn malformed(key: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ScalingError::MalformedPersistedState {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// The failed pre-flight check, if this error came from one
    pub fn failed_check(&self) -> Option<PreflightCheck> {
        match self {
            ScalingError::PreflightCheckFailed { check, .. } => Some(*check),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ScalingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScalingError::RegistryUnavailable("Request timeout".to_string())
        } else if err.is_connect() {
            ScalingError::RegistryUnavailable("Failed to connect to registry".to_string())
        } else if let Some(status) = err.status() {
            ScalingError::RegistryUnavailable(format!("HTTP {}: {}", status, err))
        } else {
            ScalingError::RegistryUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ScalingError {
    fn from(err: serde_json::Error) -> Self {
        ScalingError::SerializationError(err.to_string())
    }
}

impl From<std::num::ParseIntError> for ScalingError {
    fn from(err: std::num::ParseIntError) -> Self {
        ScalingError::InvalidConfiguration(format!("Invalid number: {}", err))
    }
}

// Result type alias for convenience
pub type ScalingResult<T> = Result<T, ScalingError>;
