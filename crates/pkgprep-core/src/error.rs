//! Error types for pkgprep-core

use crate::reconcile::{Field, Source};

/// Result type for pkgprep-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors raised while resolving a package identity.
///
/// Every variant terminates the pipeline. None of them is retried.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input matches no recognized grammar production
    #[error("Cannot parse \"{input}\": {reason}")]
    Parse { input: String, reason: String },

    /// The descriptor parsed but no acquisition method applies to it
    #[error("No acquisition method for \"{input}\": {reason}")]
    Unclassifiable { input: String, reason: String },

    /// Two authoritative sources disagree on a field
    #[error(
        "Conflicting {field}: {first_source} says \"{first}\" but {second_source} says \"{second}\""
    )]
    Conflict {
        field: Field,
        first_source: Source,
        first: String,
        second_source: Source,
        second: String,
    },

    /// The reconciled identity violates an invariant
    #[error("Invalid package identity: {message}")]
    Validation { message: String },
}

impl Error {
    pub(crate) fn parse(input: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unclassifiable(input: &str, reason: impl Into<String>) -> Self {
        Self::Unclassifiable {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
