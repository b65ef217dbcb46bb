pub mod algorithms;
pub mod crypto;
pub mod io;
pub mod logging;
pub mod settings;
pub mod ui;
pub mod wipe_engine;

// Re-export the main entry points for convenience
pub use algorithms::{PassBlock, PatternGenerator, WipePattern};
pub use settings::{AppConfig, CertificateConfig, EngineConfig, LoggingConfig};
pub use crypto::certificates::{
    CertificateGenerator, CertificateVerifier, TargetInfo, WipeCertificate,
};
pub use crypto::keys::{PublicKeyInfo, SignatureScheme, SigningKeyPair};
pub use io::{FileBackend, PerformanceStats, TargetBackend, TargetHandle, WipeMetrics};
pub use wipe_engine::{
    CallbackObserver, CancellationToken, ProgressEvent, ProgressObserver, WipeEngine,
    WipeOptions, WipeReport, WipeResult, WipeStatus,
};

use thiserror::Error;

/// Errors surfaced by the wipe engine and the certification subsystem.
///
/// Validation failures (`UnsupportedPattern`, `TargetUnavailable`,
/// `SizeDetermination`, `InvalidOptions`) are returned before any byte is
/// written. `WipeIo` is captured into a failed `WipeReport` by the engine and
/// only escapes from lower-level helpers.
#[derive(Error, Debug)]
pub enum WipeError {
    #[error("Unsupported wipe pattern: {0}")]
    UnsupportedPattern(String),

    #[error("Target unavailable: {target}: {reason}")]
    TargetUnavailable { target: String, reason: String },

    #[error("Cannot determine size of {target}: {reason}")]
    SizeDetermination { target: String, reason: String },

    #[error("Wipe I/O failure: {0}")]
    WipeIo(String),

    #[error("Wipe result is not terminal (status: {0})")]
    InvalidResultState(WipeStatus),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Secure random generator failure: {0}")]
    Rng(String),

    #[error("Invalid wipe options: {0}")]
    InvalidOptions(String),

    #[error("A wipe operation is already running on this engine")]
    OperationInProgress,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WipeError {
    /// True for errors that are raised before any destructive write.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WipeError::UnsupportedPattern(_)
                | WipeError::TargetUnavailable { .. }
                | WipeError::SizeDetermination { .. }
                | WipeError::InvalidOptions(_)
                | WipeError::OperationInProgress
        )
    }
}

impl From<::config::ConfigError> for WipeError {
    fn from(err: ::config::ConfigError) -> Self {
        WipeError::Config(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, WipeError>;
