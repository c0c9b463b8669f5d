//! Common test utilities for `Barfi` integration tests.
//!
//! This module provides shared functionality for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use barfi_core::progress::ProgressReader;

/// Progress callback invocations recorded as `(observed, total)`.
pub type ProgressLog = Arc<Mutex<Vec<(u64, u64)>>>;

/// Create a temporary directory for test files.
///
/// The directory will be automatically cleaned up when the returned
/// `TempDir` is dropped.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test file with the given content.
pub fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Generate random bytes for testing.
pub fn random_bytes(size: usize) -> Vec<u8> {
    use rand::RngCore;
    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Open a file behind a progress reader that records every callback.
pub fn recording_reader(path: &Path) -> (Arc<ProgressReader>, ProgressLog) {
    let log: ProgressLog = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    let reader = ProgressReader::open(path, move |read, size| {
        sink.lock().unwrap().push((read, size));
    })
    .expect("Failed to open test file");
    (Arc::new(reader), log)
}
