// File and block-device backed targets

use super::{TargetBackend, TargetHandle};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// Targets addressed by filesystem path: regular files or raw block devices
#[derive(Debug, Clone, Copy, Default)]
pub struct FileBackend;

impl FileBackend {
    pub fn new() -> Self {
        Self
    }
}

impl TargetBackend for FileBackend {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn size(&self, path: &str) -> io::Result<u64> {
        let metadata = std::fs::metadata(path)?;
        if metadata.is_file() {
            return Ok(metadata.len());
        }

        // Block devices report 0 in metadata; the end offset is the capacity
        let mut file = File::open(path)?;
        file.seek(SeekFrom::End(0))
    }

    fn open_read_write(&self, path: &str) -> io::Result<Box<dyn TargetHandle>> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Box::new(FileHandle { file }))
    }

    fn remove(&self, path: &str) -> io::Result<()> {
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path),
            ));
        }
        std::fs::remove_file(path)
    }
}

struct FileHandle {
    file: File,
}

impl TargetHandle for FileHandle {
    fn seek_to(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn write_block(&mut self, data: &[u8]) -> io::Result<usize> {
        self.file.write_all(data)?;
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }

    fn force_sync(&mut self) -> io::Result<()> {
        self.file.sync_all()
    }

    fn read_block(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
