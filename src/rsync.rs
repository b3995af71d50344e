//! rsync process wrapper

use crate::options::RsyncOptions;
use crate::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::{Child, Command};

/// A prepared rsync invocation
///
/// Holds the resolved binary, the source and destination, and the full
/// argument vector. Nothing is executed until [`Rsync::spawn`] is called.
///
/// # Examples
///
/// ```no_run
/// use rsync_task::{Rsync, RsyncOptions};
///
/// let options = RsyncOptions { archive: true, ..Default::default() };
/// let rsync = Rsync::new("src/", "backup/", &options)?;
/// println!("{:?} {:?}", rsync.binary(), rsync.args());
/// # Ok::<(), rsync_task::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Rsync {
    binary: PathBuf,
    source: PathBuf,
    destination: PathBuf,
    args: Vec<OsString>,
}

impl Rsync {
    /// Prepare an invocation, locating the rsync binary
    ///
    /// Uses `options.rsync_path` when set, otherwise searches `PATH` with the
    /// `which` crate if `options.search_path` is enabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BinaryNotFound`] if no binary could be resolved.
    pub fn new(
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        options: &RsyncOptions,
    ) -> Result<Self> {
        let binary = match &options.rsync_path {
            Some(path) => path.clone(),
            None if options.search_path => which::which("rsync")
                .map_err(|e| Error::BinaryNotFound(format!("rsync not found in PATH: {}", e)))?,
            None => {
                return Err(Error::BinaryNotFound(
                    "no rsync_path configured and PATH search disabled".into(),
                ));
            }
        };

        Ok(Self::with_binary(binary, source, destination, options))
    }

    /// Prepare an invocation of an explicit binary
    pub fn with_binary(
        binary: impl Into<PathBuf>,
        source: impl AsRef<Path>,
        destination: impl AsRef<Path>,
        options: &RsyncOptions,
    ) -> Self {
        let source = source.as_ref().to_path_buf();
        let destination = destination.as_ref().to_path_buf();

        let mut args = options.to_args();
        args.push(source.as_os_str().to_owned());
        args.push(destination.as_os_str().to_owned());

        Self {
            binary: binary.into(),
            source,
            destination,
            args,
        }
    }

    /// Path of the executable that will be run
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Local path or remote location being copied from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Local path or remote location being copied to
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Full argument vector: flags, then source, then destination
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Start the process with stdout and stderr piped and stdin closed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spawn`] if the process could not be started.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(&self) -> Result<Child> {
        tracing::info!(binary = ?self.binary, args = ?self.args, "starting rsync");

        Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::Spawn)
    }
}
