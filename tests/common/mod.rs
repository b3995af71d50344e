//! Common test utilities for rsync-task E2E tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Size of the generated source file (sparse, so cheap to create)
pub const SOURCE_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Check whether an rsync binary is available on PATH
pub fn has_rsync() -> bool {
    which::which("rsync").is_ok()
}

/// Create a scratch directory holding a single source file named `a`
pub fn scratch_with_source_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let source = temp_dir.path().join("a");
    create_sparse_file(&source, SOURCE_FILE_SIZE);
    (temp_dir, source)
}

/// Create a file of `len` bytes without writing its contents
pub fn create_sparse_file(path: &Path, len: u64) {
    let file = std::fs::File::create(path).expect("Failed to create source file");
    file.set_len(len).expect("Failed to size source file");
}
