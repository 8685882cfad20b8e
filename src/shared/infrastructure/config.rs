use crate::shared::errors::{ScalingError, ScalingResult};
use crate::shared::infrastructure::database::PoolSettings;
use std::collections::HashMap;
use std::env;
use std::time::Duration;

/// Which registry backend the job service talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryKind {
    Memory,
    Consul,
}

impl std::str::FromStr for RegistryKind {
    type Err = ScalingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(RegistryKind::Memory),
            "consul" => Ok(RegistryKind::Consul),
            other => Err(ScalingError::InvalidConfiguration(format!(
                "Unknown registry type: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RegistryConfig {
    pub kind: RegistryKind,
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
}

/// Process configuration, read from the environment (and `.env` when present)
#[derive(Debug, Clone)]
pub struct ScalingConfig {
    pub registry: RegistryConfig,
    pub check_pool: PoolSettings,
}

impl ScalingConfig {
    pub fn from_env() -> ScalingResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(&env::vars().collect())
    }

    /// Build from an explicit variable map (useful for testing)
    pub fn from_vars(vars: &HashMap<String, String>) -> ScalingResult<Self> {
        let lookup = |name: &str| {
            vars.get(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let kind = match lookup("SCALING_REGISTRY_TYPE") {
            Some(value) => value.parse()?,
            None => RegistryKind::Memory,
        };

        let url = lookup("SCALING_REGISTRY_URL");
        if kind == RegistryKind::Consul {
            match &url {
                Some(u) if u.starts_with("http://") || u.starts_with("https://") => {}
                Some(u) => {
                    return Err(ScalingError::InvalidConfiguration(format!(
                        "SCALING_REGISTRY_URL must start with http:// or https://, got {}",
                        u
                    )))
                }
                None => {
                    return Err(ScalingError::InvalidConfiguration(
                        "SCALING_REGISTRY_URL is required for the consul registry".to_string(),
                    ))
                }
            }
        }

        let registry_timeout = Self::parse_secs(lookup("SCALING_REGISTRY_TIMEOUT_SECS"), 10)?;
        let check_timeout = Self::parse_secs(lookup("SCALING_CHECK_CONNECTION_TIMEOUT_SECS"), 10)?;
        let pool_size: u32 = match lookup("SCALING_CHECK_POOL_SIZE") {
            Some(value) => value.parse()?,
            None => 2,
        };
        if pool_size == 0 {
            return Err(ScalingError::InvalidConfiguration(
                "SCALING_CHECK_POOL_SIZE must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            registry: RegistryConfig {
                kind,
                url,
                token: lookup("SCALING_REGISTRY_TOKEN"),
                timeout: registry_timeout,
            },
            check_pool: PoolSettings {
                max_size: pool_size,
                connection_timeout: check_timeout,
            },
        })
    }

    fn parse_secs(value: Option<String>, default: u64) -> ScalingResult<Duration> {
        let secs = match value {
            Some(v) => v.parse::<u64>()?,
            None => default,
        };
        Ok(Duration::from_secs(secs))
    }
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig {
                kind: RegistryKind::Memory,
                url: None,
                token: None,
                timeout: Duration::from_secs(10),
            },
            check_pool: PoolSettings::default(),
        }
    }
}
