use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wizard::WizardStep;

/// Top-level application error type.
#[derive(Error, Debug)]
pub enum LiftError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Formatting error: {0}")]
    Format(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Archive too large: {size} bytes exceeds the {limit} byte limit")]
    ArchiveTooLarge { size: u64, limit: u64 },

    #[error("Cannot leave {step}: {reason}")]
    Guard { step: WizardStep, reason: String },

    #[error("Unknown download handle: {0}")]
    UnknownHandle(String),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Classification of errors for logging and user display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Caused by a wizard selection the user can fix.
    UserError,
    /// Package assembly failed; rerunning may help.
    PipelineError,
    /// Storage, file I/O or an invariant violation.
    SystemError,
    /// Invalid or missing configuration.
    ConfigError,
}

impl LiftError {
    /// Returns the broad error category for routing and display purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::ConfigError,
            Self::Format(_) => ErrorCategory::PipelineError,
            Self::Archive(_) => ErrorCategory::PipelineError,
            Self::ArchiveTooLarge { .. } => ErrorCategory::PipelineError,
            Self::Guard { .. } => ErrorCategory::UserError,
            Self::UnknownHandle(_) => ErrorCategory::SystemError,
            Self::FileSystem(_) => ErrorCategory::SystemError,
            Self::Internal(_) => ErrorCategory::SystemError,
        }
    }

    /// Whether rerunning the whole export may succeed.
    pub fn is_retryable(&self) -> bool {
        self.category() == ErrorCategory::PipelineError
    }

    /// Returns a user-friendly message (hides internal details).
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(msg) => format!("Configuration issue: {msg}"),
            Self::Format(_) | Self::Archive(_) | Self::ArchiveTooLarge { .. } => {
                "An error occurred during migration. Please try again.".into()
            }
            Self::Guard { reason, .. } => reason.clone(),
            Self::UnknownHandle(_) => "The download is no longer available.".into(),
            Self::FileSystem(msg) => format!("File error: {msg}"),
            Self::Internal(_) => "An unexpected error occurred.".into(),
        }
    }
}

impl From<std::io::Error> for LiftError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_errors_are_retryable() {
        assert!(LiftError::Archive("zip failed".into()).is_retryable());
        assert!(
            LiftError::ArchiveTooLarge {
                size: 10,
                limit: 5
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_guard_errors_are_user_errors() {
        let err = LiftError::Guard {
            step: WizardStep::DataSelection,
            reason: "Select at least one data type.".into(),
        };
        assert_eq!(err.category(), ErrorCategory::UserError);
        assert!(!err.is_retryable());
        assert_eq!(err.user_message(), "Select at least one data type.");
        assert!(err.to_string().contains("data-selection"));
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = LiftError::Archive("deflate stream corrupt at offset 42".into());
        assert!(!err.user_message().contains("offset"));
        let err = LiftError::Internal("worker panicked".into());
        assert!(!err.user_message().contains("panicked"));
    }

    #[test]
    fn test_io_error_maps_to_filesystem() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing dir");
        let err: LiftError = io.into();
        assert_eq!(err.category(), ErrorCategory::SystemError);
        assert!(err.to_string().contains("missing dir"));
    }
}
