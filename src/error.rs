//! Error types for record ingestion, querying, and the command shell.
//!
//! Every failure the core can surface has its own [`RosterError`] variant.
//! The shell renders them as a single capitalized line; the HTTP server maps
//! them onto client-error responses via [`RosterError::code`].

use std::path::PathBuf;

use thiserror::Error;

/// The error type for all record-level operations in this crate.
#[derive(Debug, Error)]
pub enum RosterError {
    /// A shell command was invoked with the wrong arguments.
    #[error("error executing command, {0}")]
    InvalidArgument(String),

    /// The ingestion target does not exist.
    #[error("file {} must exist", .0.display())]
    PathNotFound(PathBuf),

    /// The ingestion target exists but is a directory or other non-regular file.
    #[error("file {} must be a file with data", .0.display())]
    NotAFile(PathBuf),

    /// No delimiter strategy is registered for the format identifier.
    #[error("'{identifier}' is not a supported format, expected one of: {supported}")]
    UnsupportedFormat {
        identifier: String,
        supported: String,
    },

    /// A line could not be turned into a [`Record`](crate::models::Record).
    #[error("malformed record, {0}")]
    MalformedRecord(String),

    /// The request carried no `Content-Type` header.
    #[error("request is missing a content type")]
    MissingContentType,

    /// The `Content-Type` header is not of the form `type/subtype`.
    #[error("content type '{0}' is malformed, expected type/subtype")]
    MalformedContentType(String),

    /// The `Content-Type` header names a non-`text` media type.
    #[error("cannot process request with content type '{0}', only text types are accepted")]
    UnsupportedContentType(String),

    /// The requested sort profile is not part of the entry surface's set.
    #[error("invalid sort profile '{given}', expected one of: {allowed}")]
    InvalidSortProfile { given: String, allowed: String },

    /// Reading an ingestion source failed after it was confirmed to exist.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RosterError {
    /// Machine-readable code used in HTTP error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            RosterError::InvalidArgument(_) => "invalid_argument",
            RosterError::PathNotFound(_) => "path_not_found",
            RosterError::NotAFile(_) => "not_a_file",
            RosterError::UnsupportedFormat { .. } => "unsupported_format",
            RosterError::MalformedRecord(_) => "malformed_record",
            RosterError::MissingContentType => "missing_content_type",
            RosterError::MalformedContentType(_) => "malformed_content_type",
            RosterError::UnsupportedContentType(_) => "unsupported_content_type",
            RosterError::InvalidSortProfile { .. } => "invalid_sort_profile",
            RosterError::Io(_) => "internal",
        }
    }

    /// Whether the failure was caused by the caller's input rather than the host.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, RosterError::Io(_))
    }
}

/// A convenience `Result` alias using [`RosterError`].
pub type Result<T> = std::result::Result<T, RosterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_lowercase_sentences() {
        let err = RosterError::InvalidArgument("expecting 1 argument for 'list' command".into());
        assert_eq!(
            err.to_string(),
            "error executing command, expecting 1 argument for 'list' command"
        );

        let err = RosterError::PathNotFound(PathBuf::from("/tmp/nope.csv"));
        assert_eq!(err.to_string(), "file /tmp/nope.csv must exist");
    }

    #[test]
    fn test_io_is_the_only_server_error() {
        let io = RosterError::Io(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert!(!io.is_client_error());
        assert_eq!(io.code(), "internal");
        assert!(RosterError::MissingContentType.is_client_error());
    }
}
