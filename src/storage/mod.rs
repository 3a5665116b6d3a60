//! Key file storage.
//!
//! This module provides the pluggable byte-source used to read key files
//! and the atomic write discipline used to publish them. Readers never
//! observe a partially written key file: bytes are written to a temporary
//! file on the destination's filesystem and atomically renamed into place.

use crate::error::{Result, TrustKeysError};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A pluggable byte-source for reading key files.
///
/// The returned reader is scoped to a single read; acquisition failures
/// (missing file, permission denied) surface as a single I/O error kind
/// carrying the path.
pub trait StorageBackend {
    /// Open `path` for reading.
    fn get(&self, path: &Path) -> Result<Box<dyn Read>>;
}

/// The default backend, reading from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilesystemBackend;

impl StorageBackend for FilesystemBackend {
    fn get(&self, path: &Path) -> Result<Box<dyn Read>> {
        let file = File::open(path).map_err(|e| {
            TrustKeysError::Storage(io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })?;
        Ok(Box::new(file))
    }
}

/// Read the full contents of `path` through `backend`.
pub fn read_bytes(backend: &dyn StorageBackend, path: &Path) -> Result<Vec<u8>> {
    let mut reader = backend.get(path)?;
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Read the contents of `path` through `backend` as UTF-8 text.
pub fn read_string(backend: &dyn StorageBackend, path: &Path) -> Result<String> {
    let bytes = read_bytes(backend, path)?;
    String::from_utf8(bytes).map_err(|_| {
        TrustKeysError::Format(format!("{}: key file is not valid UTF-8", path.display()))
    })
}

/// Create all missing parent directories of `path`.
///
/// The "already exists" race is tolerated silently; any other creation
/// failure is propagated.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Atomically publish `bytes` at `destination`.
///
/// The bytes are written to a uniquely named temporary file in the
/// destination's directory (same filesystem, so the rename is atomic) and
/// then renamed over `destination`. On any failure the temporary file is
/// removed; observers of `destination` never see a partial file.
pub fn persist_temp_file(bytes: &[u8], destination: &Path) -> Result<()> {
    ensure_parent_dir(destination)?;

    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    // NamedTempFile removes the temporary file on drop, covering every
    // error path below.
    let mut temp = NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    temp.persist(destination)
        .map_err(|e| TrustKeysError::Storage(e.error))?;

    Ok(())
}
