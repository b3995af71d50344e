//! # rsync-task
//!
//! Run rsync from Rust and follow its progress.
//!
//! ## Design Philosophy
//!
//! rsync-task is designed to be:
//! - **Thin** - rsync does the copying; this crate starts it and reads its output
//! - **Lenient** - partial or unexpected output lines never fail a transfer
//! - **Poll-friendly** - progress is a cheap snapshot, readable at any time
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//!
//! ## Quick Start
//!
//! ```no_run
//! use rsync_task::{RsyncOptions, Task};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = RsyncOptions {
//!         progress: true,
//!         delete: true,
//!         ..Default::default()
//!     };
//!
//!     let task = Task::new("/home/me/projects/", "/mnt/backup/projects", options)?;
//!     task.run().await?;
//!
//!     let state = task.state();
//!     println!("{} of {} files checked", state.total - state.remain, state.total);
//!     println!("{}", serde_json::to_string(&task.log())?);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Error types
pub mod error;
/// Line matching with capture groups
pub mod matcher;
/// rsync command-line options
pub mod options;
/// Progress and speed parsing
pub mod parser;
/// rsync process wrapper
pub mod rsync;
/// Task orchestration and output readers
pub mod task;
/// Progress state and captured output
pub mod types;

// Re-export commonly used types
pub use error::{Error, Result};
pub use matcher::Matcher;
pub use options::RsyncOptions;
pub use rsync::Rsync;
pub use task::{Task, TaskHandle};
pub use types::{Log, State};
