/// Common test helper functions
use sha2::{Digest, Sha256};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Temp file of `size` bytes filled with `fill`, standing in for a used drive
pub fn temp_target(size: usize, fill: u8) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("failed to create temp target");
    file.write_all(&vec![fill; size]).expect("failed to fill temp target");
    file.flush().expect("failed to flush temp target");
    file
}

pub fn path_str(file: &NamedTempFile) -> &str {
    file.path().to_str().expect("temp path is not UTF-8")
}

/// Verify that a file contains only `byte`
pub fn verify_all_bytes(path: &Path, byte: u8) -> std::io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let mut buffer = vec![0u8; 4096];

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        if buffer[..bytes_read].iter().any(|&b| b != byte) {
            return Ok(false);
        }
    }

    Ok(true)
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
