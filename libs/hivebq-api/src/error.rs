use std::fmt;

use hivebq_temporal::TemporalError;

/// Conversion failure. Raised at the leaf where it is detected and returned
/// unchanged through the whole recursion: one bad leaf fails the value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    #[error("schema mismatch: cannot convert {found} to Hive {expected}")]
    SchemaMismatch { expected: String, found: String },

    #[error("non-nullable field was null")]
    NonNullableNull,

    #[error("decimal {value} does not fit decimal({precision},{scale})")]
    DecimalOverflow {
        value: String,
        precision: usize,
        scale: usize,
    },

    #[error("unsupported Avro type: {0}")]
    UnsupportedType(String),

    #[error("invalid Hive type '{input}': {detail}")]
    InvalidTypeString { input: String, detail: String },

    /// Bytes that do not decode against the writer schema.
    #[error("avro decode: {0}")]
    Decode(String),

    #[error(transparent)]
    Temporal(#[from] TemporalError),
}

impl ConvertError {
    pub fn mismatch(expected: impl fmt::Display, found: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            expected: expected.to_string(),
            found: found.into(),
        }
    }
}
