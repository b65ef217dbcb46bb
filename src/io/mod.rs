// Target boundary
//
// The engine never touches the filesystem directly: it sees a backend that
// resolves target paths and a handle for positioned block I/O.

pub mod file_target;
pub mod metrics;


pub use file_target::FileBackend;
pub use metrics::{PerformanceStats, WipeMetrics};

use std::io;

/// Resolves and opens wipe targets
pub trait TargetBackend: Send + Sync {
    fn exists(&self, path: &str) -> bool;

    /// Addressable size in bytes
    fn size(&self, path: &str) -> io::Result<u64>;

    fn open_read_write(&self, path: &str) -> io::Result<Box<dyn TargetHandle>>;

    /// Delete the target after a completed wipe. Only meaningful for regular files.
    fn remove(&self, path: &str) -> io::Result<()>;
}

/// Open read/write handle on a target
pub trait TargetHandle: Send {
    fn seek_to(&mut self, offset: u64) -> io::Result<()>;

    /// Write the whole buffer at the current position; returns bytes written
    fn write_block(&mut self, data: &[u8]) -> io::Result<usize>;

    fn flush(&mut self) -> io::Result<()>;

    /// Durability barrier: data must reach stable storage before this returns
    fn force_sync(&mut self) -> io::Result<()>;

    /// Read up to `buf.len()` bytes; 0 means end of target
    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize>;
}
