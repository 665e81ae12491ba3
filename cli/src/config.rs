//! `pubrand` configuration file.
//!
//! ```toml
//! [logging]
//! format = "json"
//! level = "debug"
//!
//! [signer]
//! consumed_ledger = "/var/lib/pubrand/consumed.json"
//! ```
//!
//! Every table and field is optional. Command-line flags and environment
//! variables override file values.

use anyhow::Context;
use pubrand_utils::LogFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub signer: SignerConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// "human" or "json".
    #[serde(default)]
    pub format: LogFormat,

    /// Filter directive: "trace", "debug", "info", "warn", "error", or a
    /// full `RUST_LOG`-style expression.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// JSON file recording which batch indices were already revealed.
    /// When set, `generate-finality-sig` refuses to sign an index twice
    /// across invocations.
    #[serde(default)]
    pub consumed_ledger: Option<PathBuf>,
}

impl CliConfig {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("parsing config")
    }

    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("in {}", path.display()))
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
