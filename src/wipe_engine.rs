// Wipe Engine - pass-oriented overwrite of a target
//
// Validates the target, then streams every pass of the selected scheme across
// the whole target with a flush + sync after each block. Progress is published
// after every block; cancellation is cooperative and checked before every
// pass and every block write.

pub mod progress;
pub mod result;

pub use progress::{CallbackObserver, CancellationToken, ProgressEvent, ProgressObserver};
pub use result::{WipeReport, WipeResult, WipeStatus};

use crate::algorithms::{
    PassBlock, PatternGenerator, WipePattern, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE,
};
use crate::crypto::secure_rng::SecureRng;
use crate::io::{FileBackend, TargetBackend, TargetHandle, WipeMetrics};
use crate::settings::EngineConfig;
use crate::{CoreResult, WipeError};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Per-call wipe options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WipeOptions {
    pub block_size: usize,
    /// Hash the target after the final pass
    pub verify: bool,
    /// Delete the target after a completed wipe (regular files only)
    pub remove_after: bool,
}

impl Default for WipeOptions {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            verify: true,
            remove_after: false,
        }
    }
}

impl From<&EngineConfig> for WipeOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            block_size: config.block_size,
            verify: config.verify,
            remove_after: false,
        }
    }
}

enum PassOutcome {
    Completed,
    Cancelled,
}

/// Drives wipe schemes onto targets resolved through a [`TargetBackend`].
///
/// One wipe runs at a time per engine. The engine is `Sync`, so it can be
/// shared with another thread that calls [`WipeEngine::cancel`] or polls
/// [`WipeEngine::snapshot`].
pub struct WipeEngine<B: TargetBackend = FileBackend> {
    backend: B,
    config: EngineConfig,
    observer: Option<Arc<dyn ProgressObserver>>,
    cancel: CancellationToken,
    running: AtomicBool,
    current: Mutex<Option<WipeResult>>,
}

impl WipeEngine<FileBackend> {
    pub fn new(config: EngineConfig) -> Self {
        Self::with_backend(FileBackend::new(), config)
    }
}

impl<B: TargetBackend> WipeEngine<B> {
    pub fn with_backend(backend: B, config: EngineConfig) -> Self {
        Self {
            backend,
            config,
            observer: None,
            cancel: CancellationToken::new(),
            running: AtomicBool::new(false),
            current: Mutex::new(None),
        }
    }

    pub fn with_observer<O: ProgressObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn with_shared_observer(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Options derived from the engine config
    pub fn default_options(&self) -> WipeOptions {
        WipeOptions::from(&self.config)
    }

    /// Request cancellation of the running wipe. Idempotent.
    ///
    /// The flag stays set until [`WipeEngine::reset_cancellation`], so a wipe
    /// started afterwards is cancelled before its first pass.
    pub fn cancel(&self) {
        tracing::warn!("Wipe cancellation requested");
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn reset_cancellation(&self) {
        self.cancel.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Latest published state of the current or most recent wipe
    pub fn snapshot(&self) -> Option<WipeResult> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Wipe `target` with a scheme given by name
    pub fn wipe_named(
        &self,
        target: &str,
        pattern_name: &str,
        options: &WipeOptions,
    ) -> CoreResult<WipeReport> {
        let pattern: WipePattern = pattern_name.parse()?;
        self.wipe(target, pattern, options)
    }

    /// Overwrite every byte of `target` once per pass of `pattern`.
    ///
    /// Validation problems are returned as errors before anything is written.
    /// Once writing starts, I/O failures end the wipe with status `failed` and
    /// the report is still returned.
    pub fn wipe(
        &self,
        target: &str,
        pattern: WipePattern,
        options: &WipeOptions,
    ) -> CoreResult<WipeReport> {
        let _guard = RunGuard::acquire(&self.running)?;

        if options.block_size == 0 {
            return Err(WipeError::InvalidOptions(
                "block size must be greater than zero".to_string(),
            ));
        }
        if options.block_size > MAX_BLOCK_SIZE {
            return Err(WipeError::InvalidOptions(format!(
                "block size {} exceeds the maximum of {} bytes",
                options.block_size, MAX_BLOCK_SIZE
            )));
        }

        let mut result = WipeResult::new(target, pattern);

        if !self.backend.exists(target) {
            return Err(WipeError::TargetUnavailable {
                target: target.to_string(),
                reason: "target does not exist".to_string(),
            });
        }

        let mut handle =
            self.backend
                .open_read_write(target)
                .map_err(|e| WipeError::TargetUnavailable {
                    target: target.to_string(),
                    reason: e.to_string(),
                })?;

        result.total_bytes =
            self.backend
                .size(target)
                .map_err(|e| WipeError::SizeDetermination {
                    target: target.to_string(),
                    reason: e.to_string(),
                })?;
        result.total_passes = pattern.pass_count();
        result.status = WipeStatus::InProgress;

        // no pass ever writes more than the whole target in one block
        let block_size = options
            .block_size
            .min(usize::try_from(result.total_bytes).unwrap_or(usize::MAX))
            .max(1);

        tracing::info!(
            target = %target,
            pattern = %pattern,
            total_bytes = result.total_bytes,
            total_passes = result.total_passes,
            block_size = options.block_size,
            "Starting wipe"
        );
        self.publish(&result);
        self.notify_status(&result);

        let mut metrics = WipeMetrics::new();
        let outcome = self.run_passes(handle.as_mut(), &mut result, block_size, &mut metrics);

        match outcome {
            Ok(PassOutcome::Completed) => {
                result.end_time = Some(Utc::now());

                if options.verify {
                    self.verify_target(handle.as_mut(), &mut result, block_size);
                }
                drop(handle);

                if options.remove_after {
                    self.remove_target(&mut result);
                }

                result.status = WipeStatus::Completed;
                tracing::info!(
                    target = %target,
                    bytes_wiped = result.bytes_wiped,
                    passes = result.passes_completed,
                    duration = %humantime::format_duration(result.duration()),
                    "Wipe completed"
                );
            }
            Ok(PassOutcome::Cancelled) => {
                result.status = WipeStatus::Cancelled;
                result.end_time = Some(Utc::now());
                tracing::warn!(
                    target = %target,
                    bytes_wiped = result.bytes_wiped,
                    passes_completed = result.passes_completed,
                    "Wipe cancelled"
                );
            }
            Err(e) => {
                result.status = WipeStatus::Failed;
                result.error_message = Some(e.to_string());
                result.end_time = Some(Utc::now());
                tracing::error!(
                    target = %target,
                    error = %e,
                    bytes_wiped = result.bytes_wiped,
                    "Wipe failed"
                );
            }
        }

        let stats = metrics.stats();
        tracing::debug!(target = %target, stats = %stats.format(), "Wipe metrics");
        result.metadata.extend(stats.to_metadata());

        self.publish(&result);
        self.notify_status(&result);
        result.freeze()
    }

    fn run_passes(
        &self,
        handle: &mut dyn TargetHandle,
        result: &mut WipeResult,
        block_size: usize,
        metrics: &mut WipeMetrics,
    ) -> CoreResult<PassOutcome> {
        let generator = PatternGenerator::new(result.pattern, block_size);
        let mut rng = SecureRng::new();

        for block in generator.take(result.total_passes as usize) {
            if self.cancel.is_cancelled() {
                return Ok(PassOutcome::Cancelled);
            }

            let mut block = block?;
            result.passes_completed += 1;
            result.pass_bytes_wiped = 0;

            tracing::info!(
                pass = block.pass_number(),
                total_passes = result.total_passes,
                pattern = %block.label(),
                "Starting pass"
            );

            handle
                .seek_to(0)
                .map_err(|e| io_failure("seek", 0, e))?;

            if let PassOutcome::Cancelled =
                self.write_pass(handle, result, &mut block, &mut rng, metrics)?
            {
                return Ok(PassOutcome::Cancelled);
            }
        }

        Ok(PassOutcome::Completed)
    }

    fn write_pass(
        &self,
        handle: &mut dyn TargetHandle,
        result: &mut WipeResult,
        block: &mut PassBlock,
        rng: &mut SecureRng,
        metrics: &mut WipeMetrics,
    ) -> CoreResult<PassOutcome> {
        let mut first_block = true;

        while result.pass_bytes_wiped < result.total_bytes {
            if self.cancel.is_cancelled() {
                return Ok(PassOutcome::Cancelled);
            }

            // The yielded block covers the first write; random passes draw fresh data for the rest
            if !first_block {
                block.refresh(rng)?;
            }
            first_block = false;

            let offset = result.pass_bytes_wiped;
            let remaining = result.total_bytes - offset;
            let len = remaining.min(block.len() as u64) as usize;

            let written = handle
                .write_block(&block.as_slice()[..len])
                .map_err(|e| io_failure("write", offset, e))?;
            if written != len {
                return Err(WipeError::WipeIo(format!(
                    "short write at offset {}: {} of {} bytes",
                    offset, written, len
                )));
            }

            let sync_start = Instant::now();
            handle.flush().map_err(|e| io_failure("flush", offset, e))?;
            handle
                .force_sync()
                .map_err(|e| io_failure("sync", offset, e))?;
            metrics.record_block(len as u64, sync_start.elapsed());

            result.pass_bytes_wiped += len as u64;
            result.bytes_wiped += len as u64;

            self.publish(result);
            if let Some(observer) = &self.observer {
                observer.on_block(result);
            }
        }

        Ok(PassOutcome::Completed)
    }

    fn verify_target(&self, handle: &mut dyn TargetHandle, result: &mut WipeResult, block_size: usize) {
        match hash_target(handle, result.total_bytes, block_size) {
            Ok(hash) => {
                tracing::info!(target = %result.target, hash = %hash, "Post-wipe verification hash recorded");
                result.verification_hash = Some(hash);
            }
            Err(e) => {
                tracing::warn!(target = %result.target, error = %e, "Post-wipe verification failed");
                result
                    .metadata
                    .insert("verification_error".to_string(), e.to_string());
            }
        }
    }

    fn remove_target(&self, result: &mut WipeResult) {
        match self.backend.remove(&result.target) {
            Ok(()) => {
                tracing::info!(target = %result.target, "Wiped target removed");
                result.metadata.insert("removed".to_string(), "true".to_string());
            }
            Err(e) => {
                tracing::warn!(target = %result.target, error = %e, "Failed to remove wiped target");
                result
                    .metadata
                    .insert("remove_error".to_string(), e.to_string());
            }
        }
    }

    fn publish(&self, result: &WipeResult) {
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(result.clone());
    }

    fn notify_status(&self, result: &WipeResult) {
        if let Some(observer) = &self.observer {
            observer.on_status_change(result);
        }
    }
}

/// SHA-256 (hex) of the first `total_bytes` of the target
fn hash_target(handle: &mut dyn TargetHandle, total_bytes: u64, block_size: usize) -> io::Result<String> {
    handle.seek_to(0)?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; block_size];
    let mut remaining = total_bytes;

    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        let n = handle.read_block(&mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("target ended {} bytes before its reported size", remaining),
            ));
        }
        hasher.update(&buf[..n]);
        remaining -= n as u64;
    }

    Ok(hex::encode(hasher.finalize()))
}

fn io_failure(op: &str, offset: u64, err: io::Error) -> WipeError {
    WipeError::WipeIo(format!("{} failed at offset {}: {}", op, offset, err))
}

/// Marks the engine busy for the lifetime of one wipe
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> CoreResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| WipeError::OperationInProgress)?;
        Ok(Self { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
