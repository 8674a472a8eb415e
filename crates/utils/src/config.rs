use std::env;

use thiserror::Error;
use tracing::{error, info};

/// Environment variable holding the verified sending identity.
pub const SOURCE_EMAIL_VAR: &str = "SOURCE_EMAIL";

/// Environment variable holding the forwarding destination.
pub const TARGET_EMAIL_VAR: &str = "TARGET_EMAIL";

/// Environment variable holding the bucket of stored inbound messages.
pub const BUCKET_NAME_VAR: &str = "S3_BUCKET_NAME";

/// Forwarding configuration, built once at process start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Verified identity the rewritten messages are sent from.
    pub source_email: String,

    /// Address every message is forwarded to.
    pub target_email: String,

    /// Bucket holding stored messages, only needed for stored deliveries.
    pub bucket_name: Option<String>,
}

impl Config {
    /// Creates a configuration without an object store bucket.
    pub fn new(source_email: impl Into<String>, target_email: impl Into<String>) -> Self {
        Self {
            source_email: source_email.into(),
            target_email: target_email.into(),
            bucket_name: None,
        }
    }

    /// Sets the bucket holding stored messages.
    pub fn with_bucket(mut self, bucket_name: impl Into<String>) -> Self {
        self.bucket_name = Some(bucket_name.into());
        self
    }

    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, which maps a variable name to
    /// its value.
    ///
    /// Blank values count as missing. The bucket is optional, both
    /// addresses are required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| {
            value(name).ok_or_else(|| {
                error!(variable = name, "Missing required configuration");
                ConfigError::Missing(name)
            })
        };

        let config = Self {
            source_email: required(SOURCE_EMAIL_VAR)?,
            target_email: required(TARGET_EMAIL_VAR)?,
            bucket_name: value(BUCKET_NAME_VAR),
        };

        info!(
            source = %config.source_email,
            target = %config.target_email,
            bucket = config.bucket_name.as_deref().unwrap_or("-"),
            "Configuration loaded"
        );
        Ok(config)
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
}
