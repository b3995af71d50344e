//! Core types for rsync-task

use serde::{Deserialize, Serialize};

/// Snapshot of rsync transfer progress
///
/// Fields that have not been observed in the output yet keep their zero value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Files still to be checked
    pub remain: i64,
    /// Total number of files known so far
    pub total: i64,
    /// Latest reported transfer rate, e.g. `"999.99kB/s"`
    pub speed: String,
    /// Percentage of files processed
    pub progress: f64,
}

/// Raw output captured from the rsync process
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Every stderr line, newline-terminated
    pub stderr: String,
    /// Every stdout line, newline-terminated
    pub stdout: String,
}
