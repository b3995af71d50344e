//! Error types for rsync-task
//!
//! Only setup and process failures surface as errors. Malformed progress
//! output is tolerated by the parsers and never reaches this type.

use thiserror::Error;

/// Result type alias for rsync-task operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for rsync-task
#[derive(Debug, Error)]
pub enum Error {
    /// A line matcher pattern failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The rsync executable could not be located
    #[error("rsync binary not found: {0}")]
    BinaryNotFound(String),

    /// An output handle of the child process could not be acquired
    #[error("failed to acquire {stream} pipe of rsync process")]
    Pipe {
        /// Which stream was missing ("stdout" or "stderr")
        stream: &'static str,
    },

    /// The rsync process could not be started
    #[error("failed to start rsync: {0}")]
    Spawn(#[source] std::io::Error),

    /// The rsync process exited unsuccessfully
    #[error("rsync exited with {}: {stderr}", exit_code_label(.code))]
    ExitStatus {
        /// Exit code, or `None` if the process was terminated by a signal
        code: Option<i32>,
        /// Captured stderr at the time of exit
        stderr: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_code_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "signal".to_string(),
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_status_message_includes_code_and_stderr() {
        let err = Error::ExitStatus {
            code: Some(23),
            stderr: "rsync error: some files could not be transferred".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("exit code 23"), "got: {msg}");
        assert!(msg.contains("could not be transferred"), "got: {msg}");
    }

    #[test]
    fn exit_status_without_code_reports_signal() {
        let err = Error::ExitStatus {
            code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("signal"));
    }

    #[test]
    fn pipe_error_names_the_stream() {
        let err = Error::Pipe { stream: "stderr" };
        assert_eq!(
            err.to_string(),
            "failed to acquire stderr pipe of rsync process"
        );
    }

    #[test]
    fn regex_error_converts_into_pattern() {
        let regex_err = regex::Regex::new("(unclosed").unwrap_err();
        let err: Error = regex_err.into();
        assert!(matches!(err, Error::Pattern(_)));
    }
}
