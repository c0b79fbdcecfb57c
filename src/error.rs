//! Codec-level error type.
//!
//! Failures raised by the columnar library itself (`ParquetError`,
//! `ArrowError`, `std::io::Error`) are never wrapped in [`CodecError`]; they
//! travel through `anyhow` untouched so callers can `downcast_ref` to the
//! original library error. `CodecError` covers what the codec itself rejects.

use thiserror::Error;

/// Errors produced by the codec (as opposed to the physical layer).
#[derive(Debug, Error)]
pub enum CodecError {
    /// Invalid arguments detected before any decode/encode work started.
    #[error("precondition violated: {0}")]
    Precondition(String),
    /// A row handed to an extract routine does not match its layout width.
    #[error("row has {actual} values but the layout has {expected} fields")]
    RowWidth {
        /// Number of fields in the layout.
        expected: usize,
        /// Number of values in the offending row.
        actual: usize,
    },
    /// A required field held a null value while encoding.
    #[error("field `{field}` is required but row {row} holds null")]
    NullInRequired {
        /// Field name.
        field: String,
        /// Row index within the flushed batch.
        row: usize,
    },
    /// A row value does not have the kind its field declares.
    #[error("field `{field}` expects {expected} but row {row} holds {actual}")]
    ValueKind {
        /// Field name.
        field: String,
        /// Expected logical kind.
        expected: &'static str,
        /// Kind of the value actually found.
        actual: &'static str,
        /// Row index within the flushed batch.
        row: usize,
    },
    /// A decoded column did not have the physical type recorded in the schema.
    #[error("column `{field}` decoded as {actual} but the schema expects {expected}")]
    ColumnType {
        /// Field name.
        field: String,
        /// Expected Arrow data type.
        expected: String,
        /// Arrow data type actually decoded.
        actual: String,
    },
    /// A row group produced columns of different lengths.
    #[error("row group {group}: column `{field}` has {actual} values, expected {expected}")]
    ColumnLength {
        /// Row group index.
        group: usize,
        /// Field name.
        field: String,
        /// Row count reported by the row group.
        expected: usize,
        /// Number of values decoded.
        actual: usize,
    },
}

impl CodecError {
    pub(crate) fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }
}
