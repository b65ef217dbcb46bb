// Progress observation and cooperative cancellation

use super::result::WipeResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Receives engine progress.
///
/// `on_block` fires exactly once per written block, in write order, with
/// non-decreasing `bytes_wiped`. Implementations run on the wipe thread and
/// should return quickly.
pub trait ProgressObserver: Send + Sync {
    fn on_block(&self, result: &WipeResult);

    /// Called on entering `in_progress` and on reaching a terminal state
    fn on_status_change(&self, _result: &WipeResult) {}
}

/// Adapts a closure into a block observer
pub struct CallbackObserver<F> {
    callback: F,
}

impl<F> CallbackObserver<F>
where
    F: Fn(&WipeResult) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> ProgressObserver for CallbackObserver<F>
where
    F: Fn(&WipeResult) + Send + Sync,
{
    fn on_block(&self, result: &WipeResult) {
        (self.callback)(result)
    }
}

/// Progress message for channel-based observers
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Block(WipeResult),
    Status(WipeResult),
}

// A closed receiver only means nobody is watching; the wipe carries on.

impl ProgressObserver for std::sync::mpsc::Sender<ProgressEvent> {
    fn on_block(&self, result: &WipeResult) {
        let _ = self.send(ProgressEvent::Block(result.clone()));
    }

    fn on_status_change(&self, result: &WipeResult) {
        let _ = self.send(ProgressEvent::Status(result.clone()));
    }
}

impl ProgressObserver for tokio::sync::mpsc::UnboundedSender<ProgressEvent> {
    fn on_block(&self, result: &WipeResult) {
        let _ = self.send(ProgressEvent::Block(result.clone()));
    }

    fn on_status_change(&self, result: &WipeResult) {
        let _ = self.send(ProgressEvent::Status(result.clone()));
    }
}

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent and safe from any thread or signal handler.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    /// Underlying flag, for `signal_hook::flag::register`
    pub fn as_atomic(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.flag)
    }
}
