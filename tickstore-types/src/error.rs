use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the tickstore workspace.
///
/// Backend failures are tagged with the backend name, malformed result rows
/// carry every defect found in the offending row, and operations attempted
/// after shutdown report [`TickstoreError::Closed`].
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TickstoreError {
    /// Transport, write, or connection failure reported by a backend.
    #[error("{backend} failed: {msg}")]
    Backend {
        /// Backend name that failed.
        backend: String,
        /// Human-readable error message.
        msg: String,
    },

    /// The requested value does not exist in the backend.
    #[error("not found: {what}")]
    NotFound {
        /// Description of the missing resource, e.g. "ticker for BTCUSD".
        what: String,
    },

    /// A result row had the wrong shape or a field failed to decode.
    #[error("malformed row {row}: {}", join_defects(defects))]
    MalformedRow {
        /// Zero-based index of the row within the backend response.
        row: usize,
        /// Every defect found in the row.
        defects: Vec<RowDefect>,
    },

    /// The service has been closed.
    #[error("service is closed")]
    Closed,

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

/// Coarse classification of [`TickstoreError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ErrorKind {
    /// See [`TickstoreError::Backend`].
    Backend,
    /// See [`TickstoreError::NotFound`].
    NotFound,
    /// See [`TickstoreError::MalformedRow`].
    MalformedRow,
    /// See [`TickstoreError::Closed`].
    Closed,
    /// See [`TickstoreError::InvalidArg`].
    InvalidArg,
}

impl TickstoreError {
    /// Helper: build a `Backend` error with the backend name and message.
    pub fn backend(backend: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build a `NotFound` error for a description of the missing resource.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Helper: build a `MalformedRow` error for a single defect.
    #[must_use]
    pub fn malformed(row: usize, defect: RowDefect) -> Self {
        Self::MalformedRow {
            row,
            defects: vec![defect],
        }
    }

    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Backend { .. } => ErrorKind::Backend,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::MalformedRow { .. } => ErrorKind::MalformedRow,
            Self::Closed => ErrorKind::Closed,
            Self::InvalidArg(_) => ErrorKind::InvalidArg,
        }
    }
}

/// Failure to decode a single backend scalar.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The scalar is not a valid decimal literal.
    #[error("invalid numeric value {raw:?}")]
    InvalidNumeric {
        /// The offending value as received.
        raw: String,
    },

    /// The scalar is not a valid RFC 3339 timestamp.
    #[error("invalid timestamp {raw:?}")]
    InvalidTimestamp {
        /// The offending value as received.
        raw: String,
    },
}

/// Classification of [`DecodeError`] values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DecodeErrorKind {
    /// See [`DecodeError::InvalidNumeric`].
    InvalidNumeric,
    /// See [`DecodeError::InvalidTimestamp`].
    InvalidTimestamp,
}

impl DecodeError {
    /// Classify this error.
    #[must_use]
    pub const fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::InvalidNumeric { .. } => DecodeErrorKind::InvalidNumeric,
            Self::InvalidTimestamp { .. } => DecodeErrorKind::InvalidTimestamp,
        }
    }
}

/// One reason a result row could not be turned into a typed record.
#[derive(Debug, Error, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RowDefect {
    /// The row does not have the column count the query shape produces.
    #[error("expected {expected} columns, got {actual}")]
    ColumnCount {
        /// Columns produced by the query shape.
        expected: usize,
        /// Columns present in the row.
        actual: usize,
    },

    /// A column was present but its value did not decode.
    #[error("column {column}: {error}")]
    Field {
        /// Column name, e.g. "open".
        column: String,
        /// The decode failure.
        error: DecodeError,
    },
}

fn join_defects(defects: &[RowDefect]) -> String {
    defects
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
