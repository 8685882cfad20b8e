/// Value objects for the scaling jobs domain
use crate::shared::errors::ScalingError;
use serde::{Deserialize, Serialize};

/// Dialect tag of the source and target databases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DatabaseType {
    #[default]
    PostgreSQL,
    #[serde(rename = "openGauss")]
    OpenGauss,
}

impl std::fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseType::PostgreSQL => write!(f, "PostgreSQL"),
            DatabaseType::OpenGauss => write!(f, "openGauss"),
        }
    }
}

impl std::str::FromStr for DatabaseType {
    type Err = ScalingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(DatabaseType::PostgreSQL),
            "opengauss" => Ok(DatabaseType::OpenGauss),
            _ => Err(ScalingError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Job status as reported in progress snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Running,
    Stopped,
}

impl JobStatus {
    pub fn from_running(running: bool) -> Self {
        if running {
            JobStatus::Running
        } else {
            JobStatus::Stopped
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Running => write!(f, "RUNNING"),
            JobStatus::Stopped => write!(f, "STOPPED"),
        }
    }
}
