//! Error types for dmlkit

use std::time::Duration;
use thiserror::Error;

/// Boxed error used for driver failures and valuer errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for dmlkit operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Coarse classification of a [`SqlError`], matchable without string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotValid,
    NotFound,
    NotSupported,
    Mismatch,
    Aborted,
    AlreadyClosed,
    Canceled,
    Timeout,
    /// A driver error without a more specific tag.
    Other,
}

/// Error types for statement building, interpolation and schema handling
#[derive(Debug, Error)]
pub enum SqlError {
    /// Malformed identifier, argument/placeholder imbalance, invalid UTF-8, empty list argument
    #[error("Not valid: {0}")]
    NotValid(String),

    /// Unknown table or unknown column in a mapper
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unsupported value type or mapper mode
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Schema divergence between the registry and the database
    #[error("Mismatch: {0}")]
    Mismatch(String),

    /// A value producer failed
    #[error("Aborted: {message}")]
    Aborted {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// Operation on a closed resource
    #[error("Already closed: {0}")]
    AlreadyClosed(String),

    /// The context was canceled
    #[error("context canceled")]
    Canceled,

    /// The context deadline passed
    #[error("context deadline exceeded after {0:?}")]
    Timeout(Duration),

    /// Error reported by the database driver, kept as-is.
    #[error("{source}")]
    Driver {
        kind: Option<ErrorKind>,
        #[source]
        source: BoxError,
    },
}

impl SqlError {
    /// Create a not-valid error
    pub fn not_valid(message: impl Into<String>) -> Self {
        Self::NotValid(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a not-supported error
    pub fn not_supported(message: impl Into<String>) -> Self {
        Self::NotSupported(message.into())
    }

    /// Create a mismatch error
    pub fn mismatch(message: impl Into<String>) -> Self {
        Self::Mismatch(message.into())
    }

    /// Create an already-closed error
    pub fn already_closed(message: impl Into<String>) -> Self {
        Self::AlreadyClosed(message.into())
    }

    /// Create an aborted error wrapping the failure of a value producer
    pub fn aborted(message: impl Into<String>, source: BoxError) -> Self {
        Self::Aborted {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Wrap a driver error without changing its message.
    pub fn driver(source: impl Into<BoxError>) -> Self {
        Self::Driver {
            kind: None,
            source: source.into(),
        }
    }

    /// Wrap a driver error and tag it with a kind.
    pub fn driver_with_kind(kind: ErrorKind, source: impl Into<BoxError>) -> Self {
        Self::Driver {
            kind: Some(kind),
            source: source.into(),
        }
    }

    /// The kind of this error. Tagged driver errors report their tag.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotValid(_) => ErrorKind::NotValid,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotSupported(_) => ErrorKind::NotSupported,
            Self::Mismatch(_) => ErrorKind::Mismatch,
            Self::Aborted { .. } => ErrorKind::Aborted,
            Self::AlreadyClosed(_) => ErrorKind::AlreadyClosed,
            Self::Canceled => ErrorKind::Canceled,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Driver { kind, .. } => kind.unwrap_or(ErrorKind::Other),
        }
    }

    /// Check if this is a not-valid error
    pub fn is_not_valid(&self) -> bool {
        self.kind() == ErrorKind::NotValid
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Check if this is a not-supported error
    pub fn is_not_supported(&self) -> bool {
        self.kind() == ErrorKind::NotSupported
    }

    /// Check if this is a mismatch error
    pub fn is_mismatch(&self) -> bool {
        self.kind() == ErrorKind::Mismatch
    }

    /// Check if this is an aborted error
    pub fn is_aborted(&self) -> bool {
        self.kind() == ErrorKind::Aborted
    }

    /// Check if this is an already-closed error
    pub fn is_already_closed(&self) -> bool {
        self.kind() == ErrorKind::AlreadyClosed
    }

    /// Check if this is a cancellation error
    pub fn is_canceled(&self) -> bool {
        self.kind() == ErrorKind::Canceled
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct PoolGone;

    impl std::fmt::Display for PoolGone {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("pool timed out while waiting for an open connection")
        }
    }

    impl std::error::Error for PoolGone {}

    #[test]
    fn driver_errors_keep_their_message() {
        let err = SqlError::driver(PoolGone);
        assert_eq!(
            err.to_string(),
            "pool timed out while waiting for an open connection"
        );
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn tagged_driver_errors_report_the_tag() {
        let err = SqlError::driver_with_kind(ErrorKind::AlreadyClosed, PoolGone);
        assert!(err.is_already_closed());
        assert!(!err.is_not_valid());
    }

    #[test]
    fn aborted_keeps_source() {
        let err = SqlError::aborted("valuer failed", Box::new(PoolGone));
        assert!(err.is_aborted());
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("pool timed out while waiting for an open connection")
        );
    }

    #[test]
    fn canceled_message() {
        assert_eq!(SqlError::Canceled.to_string(), "context canceled");
        assert!(SqlError::Canceled.is_canceled());
    }
}
