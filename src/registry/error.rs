//! Error kinds shared by the index, the query engine and the fetch layer.

use std::fmt;
use thiserror::Error;

/// Result type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur while maintaining or querying a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Malformed or empty URL, empty search term, oversized query.
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// What was wrong with the argument.
        message: String,
    },

    /// A user with this URL is already registered.
    #[error("user {url} already exists")]
    DuplicateUser {
        /// The URL that collided.
        url: String,
    },

    /// User or resource absent.
    #[error("not found: {message}")]
    NotFound {
        /// Description of what was not found.
        message: String,
    },

    /// The fetched resource is not the kind the operation expected
    /// (a registry dump where a user feed was wanted, or the reverse).
    #[error("wrong resource kind: {message}")]
    WrongKind {
        /// Description of the mismatch.
        message: String,
    },

    /// Not a failure. The remote feed is unchanged since the last update.
    #[error("no new data at {url}")]
    NoNewData {
        /// The URL that was probed.
        url: String,
    },

    /// Network error, timeout, non-200 status or wrong content type.
    #[error("upstream unavailable: {message}")]
    UpstreamUnavailable {
        /// Description of the upstream failure.
        message: String,
    },

    /// Required fields could not be parsed.
    #[error("malformed data: {message}")]
    MalformedData {
        /// Description of the parse failure.
        message: String,
    },
}

impl RegistryError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn wrong_kind(message: impl Into<String>) -> Self {
        Self::WrongKind {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedData {
            message: message.into(),
        }
    }

    /// `true` for the `NoNewData` signal, which callers usually treat as success.
    pub fn is_no_new_data(&self) -> bool {
        matches!(self, Self::NoNewData { .. })
    }
}

impl From<reqwest::Error> for RegistryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::upstream(format!("request timed out: {}", err))
        } else {
            Self::upstream(err.to_string())
        }
    }
}

/// A problem with one line of fetched data.
///
/// Collected during parsing instead of aborting the whole fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIssue {
    /// 1-based line number in the fetched body.
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LineIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}
