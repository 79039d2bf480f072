//! Generator failure taxonomy

use std::process::ExitStatus;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    /// The executable could not be started at all
    #[error("failed to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading the child's pipes or waiting on it failed
    #[error("failed to collect generator output: {source}")]
    Io {
        #[source]
        source: std::io::Error,
    },

    /// The generator ran but did not exit successfully
    #[error("generator exited with {status}")]
    Exited {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    /// The generator was killed after exceeding the configured timeout
    #[error("generator timed out after {}ms and was killed", .after.as_millis())]
    TimedOut { after: Duration },
}

impl GeneratorError {
    /// Streams captured before the failure, `("", "")` when none were read
    pub fn captured_output(&self) -> (&str, &str) {
        match self {
            Self::Exited { stdout, stderr, .. } => (stdout, stderr),
            _ => ("", ""),
        }
    }
}
