// Wipe result state and its frozen report form

use crate::algorithms::WipePattern;
use crate::{CoreResult, WipeError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// Lifecycle of a wipe: `pending -> in_progress -> {completed, failed, cancelled}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WipeStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl WipeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WipeStatus::Pending => "pending",
            WipeStatus::InProgress => "in_progress",
            WipeStatus::Completed => "completed",
            WipeStatus::Failed => "failed",
            WipeStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WipeStatus::Completed | WipeStatus::Failed | WipeStatus::Cancelled
        )
    }
}

impl fmt::Display for WipeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable progress record owned by the engine during a wipe.
///
/// `bytes_wiped` is cumulative across passes and never decreases.
/// `passes_completed` counts passes entered, so
/// `bytes_wiped <= total_bytes * passes_completed` holds at every observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WipeResult {
    pub target: String,
    pub pattern: WipePattern,
    pub status: WipeStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub bytes_wiped: u64,
    /// Bytes written in the current pass, reset at each pass start
    pub pass_bytes_wiped: u64,
    pub total_bytes: u64,
    pub passes_completed: u32,
    pub total_passes: u32,
    pub error_message: Option<String>,
    pub verification_hash: Option<String>,
    pub metadata: BTreeMap<String, String>,
}

impl WipeResult {
    pub fn new(target: impl Into<String>, pattern: WipePattern) -> Self {
        Self {
            target: target.into(),
            pattern,
            status: WipeStatus::Pending,
            start_time: Utc::now(),
            end_time: None,
            bytes_wiped: 0,
            pass_bytes_wiped: 0,
            total_bytes: 0,
            passes_completed: 0,
            total_passes: pattern.pass_count(),
            error_message: None,
            verification_hash: None,
            metadata: BTreeMap::new(),
        }
    }

    /// `end - start` when both are known, zero otherwise
    pub fn duration(&self) -> Duration {
        self.end_time
            .and_then(|end| (end - self.start_time).to_std().ok())
            .unwrap_or(Duration::ZERO)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration().as_secs_f64()
    }

    /// Cumulative bytes against one pass worth of bytes, capped at 100
    pub fn progress_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        (self.bytes_wiped as f64 / self.total_bytes as f64 * 100.0).min(100.0)
    }

    /// Progress across every pass of the scheme
    pub fn overall_progress_percent(&self) -> f64 {
        let total = self.total_bytes as f64 * self.total_passes as f64;
        if total == 0.0 {
            return 0.0;
        }
        (self.bytes_wiped as f64 / total * 100.0).min(100.0)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Snapshot a terminal result into an immutable report
    pub fn freeze(&self) -> CoreResult<WipeReport> {
        if !self.is_terminal() {
            return Err(WipeError::InvalidResultState(self.status));
        }
        Ok(WipeReport {
            inner: self.clone(),
        })
    }
}

/// Immutable snapshot of a finished wipe; the only input certificate issuance accepts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WipeReport {
    inner: WipeResult,
}

impl WipeReport {
    pub fn target(&self) -> &str {
        &self.inner.target
    }

    pub fn pattern(&self) -> WipePattern {
        self.inner.pattern
    }

    pub fn status(&self) -> WipeStatus {
        self.inner.status
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.inner.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.inner.end_time
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.inner.duration_seconds()
    }

    pub fn bytes_wiped(&self) -> u64 {
        self.inner.bytes_wiped
    }

    pub fn total_bytes(&self) -> u64 {
        self.inner.total_bytes
    }

    pub fn passes_completed(&self) -> u32 {
        self.inner.passes_completed
    }

    pub fn total_passes(&self) -> u32 {
        self.inner.total_passes
    }

    pub fn error_message(&self) -> Option<&str> {
        self.inner.error_message.as_deref()
    }

    pub fn verification_hash(&self) -> Option<&str> {
        self.inner.verification_hash.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.inner.metadata
    }

    pub fn progress_percent(&self) -> f64 {
        self.inner.progress_percent()
    }

    pub fn overall_progress_percent(&self) -> f64 {
        self.inner.overall_progress_percent()
    }

    /// Read-only view of the underlying result
    pub fn as_result(&self) -> &WipeResult {
        &self.inner
    }
}
