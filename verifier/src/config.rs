//! Verifier configuration with TOML file support.

use crate::{RetryPolicy, VerifierError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Retry and settle timings for publishing to the ledger.
///
/// Every field has a default, so an empty `[verifier]` table is valid.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// Queries per confirmation before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between confirmation queries, in milliseconds.
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,

    /// Delay between submitting and the first confirmation query.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_retry_interval_ms() -> u64 {
    3_000
}

fn default_settle_delay_ms() -> u64 {
    8_000
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_interval_ms: default_retry_interval_ms(),
            settle_delay_ms: default_settle_delay_ms(),
        }
    }
}

impl VerifierConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, VerifierError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| VerifierError::Config(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, VerifierError> {
        let config: Self = toml::from_str(s).map_err(|e| VerifierError::Config(e.to_string()))?;
        config.retry_policy()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, VerifierError> {
        toml::to_string_pretty(self).map_err(|e| VerifierError::Config(e.to_string()))
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy, VerifierError> {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_interval_ms),
        )
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config = VerifierConfig::default();
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.interval(), Duration::from_secs(3));
        assert_eq!(config.settle_delay(), Duration::from_secs(8));
    }

    #[test]
    fn empty_toml_uses_defaults() {
        assert_eq!(
            VerifierConfig::from_toml_str("").unwrap(),
            VerifierConfig::default()
        );
    }

    #[test]
    fn partial_toml_overrides() {
        let config =
            VerifierConfig::from_toml_str("max_attempts = 2\nretry_interval_ms = 50").unwrap();
        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.retry_interval_ms, 50);
        assert_eq!(config.settle_delay_ms, 8_000);
    }

    #[test]
    fn zero_attempts_rejected() {
        assert!(matches!(
            VerifierConfig::from_toml_str("max_attempts = 0"),
            Err(VerifierError::InvalidParameter(_))
        ));
    }

    #[test]
    fn unreadable_file_is_config_error() {
        assert!(matches!(
            VerifierConfig::from_toml_file("/nonexistent/pubrand.toml"),
            Err(VerifierError::Config(_))
        ));
    }

    #[test]
    fn toml_file_roundtrip() {
        let config = VerifierConfig {
            max_attempts: 9,
            retry_interval_ms: 10,
            settle_delay_ms: 0,
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_toml_string().unwrap().as_bytes())
            .unwrap();
        assert_eq!(VerifierConfig::from_toml_file(file.path()).unwrap(), config);
    }
}
