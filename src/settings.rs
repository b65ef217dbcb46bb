// Layered application configuration
//
// Precedence, lowest first: built-in defaults, TOML file, WIPECERT_* environment.
// Command-line flags are applied on top by the binary.

use crate::algorithms::DEFAULT_BLOCK_SIZE;
use crate::CoreResult;
use ::config::{Config, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "WIPECERT";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine: EngineConfig,
    pub certificate: CertificateConfig,
    pub logging: LoggingConfig,
}

/// Wipe engine defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub block_size: usize,
    /// Hash the target after the final pass
    pub verify: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            verify: true,
        }
    }
}

/// Certificate issuance settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateConfig {
    pub operator: String,
    pub organization: String,
    pub compliance_standard: String,
    /// PKCS#8 signing key (PEM or DER). A fresh key is generated when unset or missing.
    pub private_key_path: Option<PathBuf>,
}

impl Default for CertificateConfig {
    fn default() -> Self {
        Self {
            operator: "wipecert".to_string(),
            organization: "Unspecified Organization".to_string(),
            compliance_standard: "NIST SP 800-88 Rev. 1".to_string(),
            private_key_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// EnvFilter directive; RUST_LOG takes precedence
    pub level: String,
    pub json: bool,
    /// Append logs to this file instead of stderr
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, `config.toml` in the platform
    /// config directory is used when present.
    pub fn load(explicit: Option<&Path>) -> CoreResult<Self> {
        let mut builder = Config::builder();

        match explicit {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.add_source(File::from(path).required(false));
                }
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        tracing::debug!(?app, "Configuration loaded");
        Ok(app)
    }
}

/// Platform config file location, e.g. `~/.config/wipecert/config.toml` on Linux
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "wipecert", "wipecert").map(|dirs| dirs.config_dir().join("config.toml"))
}
