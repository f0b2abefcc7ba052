//! Error types for LaunchLens core.

use std::{error::Error, fmt, io};

/// Error type for LaunchLens core operations.
///
/// Data contradictions and insufficient data are not errors: they travel as
/// [`crate::ValidationOutcome`] variants and end in a terminal report.
#[derive(Debug)]
pub enum LaunchLensError {
    /// An underlying I/O error.
    Io(io::Error),
    /// Input or output JSON could not be processed.
    Json(serde_json::Error),
    /// An external collaborator (analyzer or generator) failed.
    Collaborator {
        /// Name of the collaborator that failed.
        name: String,
        /// Failure description.
        message: String,
    },
    /// Invalid configuration or registry input.
    Config(String),
    /// A catch-all error with a message.
    Other(String),
}

impl LaunchLensError {
    /// Build a collaborator failure.
    pub fn collaborator(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for LaunchLensError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {err}"),
            Self::Json(err) => write!(f, "json error: {err}"),
            Self::Collaborator { name, message } => write!(f, "{name} failed: {message}"),
            Self::Config(message) => write!(f, "invalid configuration: {message}"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

impl Error for LaunchLensError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for LaunchLensError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for LaunchLensError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Convenience result type for LaunchLens core.
pub type Result<T> = std::result::Result<T, LaunchLensError>;
