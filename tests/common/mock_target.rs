/// In-memory wipe target
///
/// Implements the engine's target boundary over a shared byte vector. Every
/// write is logged as `(offset, len)` so tests can check block boundaries, and
/// faults can be injected at open, size, write, sync and read time.
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wipecert::{TargetBackend, TargetHandle};

/// Injected failures. Counters are 0-based: `fail_write_at = Some(2)` fails the third write.
#[derive(Debug, Clone, Default)]
pub struct Faults {
    pub fail_open: bool,
    pub fail_size: bool,
    pub fail_write_at: Option<usize>,
    pub fail_sync_at: Option<usize>,
    pub fail_read: bool,
    /// Sleep before every write, to give other threads a window
    pub write_delay: Option<Duration>,
}

struct MockState {
    name: String,
    data: Mutex<Vec<u8>>,
    writes: Mutex<Vec<(u64, usize)>>,
    faults: Mutex<Faults>,
    opens: AtomicUsize,
    syncs: AtomicUsize,
    removed: AtomicBool,
}

/// Cloning yields another handle to the same target
#[derive(Clone)]
pub struct MockTarget {
    state: Arc<MockState>,
}

impl MockTarget {
    pub fn new(name: &str, size: usize, fill: u8) -> Self {
        Self {
            state: Arc::new(MockState {
                name: name.to_string(),
                data: Mutex::new(vec![fill; size]),
                writes: Mutex::new(Vec::new()),
                faults: Mutex::new(Faults::default()),
                opens: AtomicUsize::new(0),
                syncs: AtomicUsize::new(0),
                removed: AtomicBool::new(false),
            }),
        }
    }

    pub fn with_faults(self, faults: Faults) -> Self {
        *self.state.faults.lock().unwrap() = faults;
        self
    }

    pub fn name(&self) -> &str {
        &self.state.name
    }

    pub fn contents(&self) -> Vec<u8> {
        self.state.data.lock().unwrap().clone()
    }

    pub fn write_log(&self) -> Vec<(u64, usize)> {
        self.state.writes.lock().unwrap().clone()
    }

    pub fn write_count(&self) -> usize {
        self.state.writes.lock().unwrap().len()
    }

    pub fn open_count(&self) -> usize {
        self.state.opens.load(Ordering::SeqCst)
    }

    pub fn sync_count(&self) -> usize {
        self.state.syncs.load(Ordering::SeqCst)
    }

    pub fn was_removed(&self) -> bool {
        self.state.removed.load(Ordering::SeqCst)
    }

    /// Split the write log into passes: a pass starts at every write to offset 0
    pub fn writes_per_pass(&self) -> Vec<Vec<(u64, usize)>> {
        let mut passes: Vec<Vec<(u64, usize)>> = Vec::new();
        for (offset, len) in self.write_log() {
            if offset == 0 || passes.is_empty() {
                passes.push(Vec::new());
            }
            if let Some(pass) = passes.last_mut() {
                pass.push((offset, len));
            }
        }
        passes
    }

    fn faults(&self) -> Faults {
        self.state.faults.lock().unwrap().clone()
    }
}

impl TargetBackend for MockTarget {
    fn exists(&self, path: &str) -> bool {
        path == self.state.name && !self.was_removed()
    }

    fn size(&self, _path: &str) -> io::Result<u64> {
        if self.faults().fail_size {
            return Err(io::Error::new(io::ErrorKind::Other, "injected size fault"));
        }
        Ok(self.state.data.lock().unwrap().len() as u64)
    }

    fn open_read_write(&self, _path: &str) -> io::Result<Box<dyn TargetHandle>> {
        if self.faults().fail_open {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected open fault",
            ));
        }
        self.state.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockHandle {
            target: self.clone(),
            position: 0,
        }))
    }

    fn remove(&self, _path: &str) -> io::Result<()> {
        self.state.removed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

struct MockHandle {
    target: MockTarget,
    position: u64,
}

impl TargetHandle for MockHandle {
    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.position = offset;
        Ok(())
    }

    fn write_block(&mut self, buf: &[u8]) -> io::Result<usize> {
        let faults = self.target.faults();
        if let Some(delay) = faults.write_delay {
            std::thread::sleep(delay);
        }

        let mut writes = self.target.state.writes.lock().unwrap();
        if faults.fail_write_at == Some(writes.len()) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write fault"));
        }

        let mut data = self.target.state.data.lock().unwrap();
        let start = self.position as usize;
        let end = start + buf.len();
        if end > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("write past end of target: {}..{} > {}", start, end, data.len()),
            ));
        }

        data[start..end].copy_from_slice(buf);
        writes.push((self.position, buf.len()));
        self.position = end as u64;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn force_sync(&mut self) -> io::Result<()> {
        let count = self.target.state.syncs.fetch_add(1, Ordering::SeqCst);
        if self.target.faults().fail_sync_at == Some(count) {
            return Err(io::Error::new(io::ErrorKind::Other, "injected sync fault"));
        }
        Ok(())
    }

    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.target.faults().fail_read {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read fault"));
        }

        let data = self.target.state.data.lock().unwrap();
        let start = (self.position as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }
}
