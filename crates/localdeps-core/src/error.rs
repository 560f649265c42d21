use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, shared by fatal errors and recoverable scan warnings.
pub mod codes {
    pub const INVALID_PARAMETER: &str = "INVALID_PARAMETER";
    pub const FS_ERROR: &str = "FS_ERROR";
    pub const EXTERNAL_PROCESS_FAILED: &str = "EXTERNAL_PROCESS_FAILED";

    // Recoverable, reported as scan warnings
    pub const PARSE_ERROR: &str = "PARSE_ERROR";
    pub const DUPLICATE_PACKAGE: &str = "DUPLICATE_PACKAGE";
}

/// Fatal error for localdeps operations.
///
/// Recoverable per-entry conditions (unparseable manifests, duplicate names)
/// never show up here; see [`crate::pkg::ScanWarning`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameter - must specify an [ npm directory | packageName + --repo directory ]: {message}")]
    InvalidParameter { message: String },

    #[error("{context} {}: {source}", .path.display())]
    FileSystem {
        context: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` {reason}")]
    ExternalProcess { command: String, reason: String },
}

impl Error {
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn fs(context: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileSystem {
            context,
            path: path.into(),
            source,
        }
    }

    #[must_use]
    pub fn external(command: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExternalProcess {
            command: command.into(),
            reason: reason.into(),
        }
    }

    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidParameter { .. } => codes::INVALID_PARAMETER,
            Self::FileSystem { .. } => codes::FS_ERROR,
            Self::ExternalProcess { .. } => codes::EXTERNAL_PROCESS_FAILED,
        }
    }
}
