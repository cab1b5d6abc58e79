//! Error types for DMG decoding.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DmgError {
    /// None of the DMG processing-stage markers were found.
    #[error("not a DMG file: {0}")]
    FormatMismatch(String),

    /// DMG markers are present but no concrete header layout can be selected.
    #[error("unsupported DMG variant: {0}")]
    UnsupportedVariant(String),

    /// The layout is known but a required header field could not be resolved.
    #[error("corrupt header at line {line}: {reason}")]
    CorruptHeader { line: usize, reason: String },

    #[error("malformed sample data at line {line}: {reason}")]
    MalformedData { line: usize, reason: String },

    #[error("sample count mismatch: header says {expected}, decoded {actual}")]
    SampleCountMismatch { expected: usize, actual: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DmgError {
    pub(crate) fn corrupt_header(line: usize, reason: impl Into<String>) -> Self {
        Self::CorruptHeader {
            line,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_data(line: usize, reason: impl Into<String>) -> Self {
        Self::MalformedData {
            line,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DmgError>;
