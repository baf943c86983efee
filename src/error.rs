//! Typed leaf errors. Everything else travels as `anyhow::Error` with context.

use thiserror::Error;

/// Snapshot container violations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unexpected format number: {found} (supported: {expected})")]
    UnsupportedVersion { expected: u64, found: u64 },

    #[error("expected end of stream but found extra data")]
    TrailingData,

    #[error("database name is not valid UTF-8: {lossy:?}")]
    InvalidName { lossy: String },

    #[error("refusing unsafe database name {name:?}")]
    UnsafeName { name: String },
}

/// Failures reported by the decompression engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("failed to create LZ4 decompression context: {0}")]
    ContextCreate(String),

    #[error("LZ4 decompress: {0}")]
    Decompress(String),

    #[error("LZ4 decoder made no progress ({input} input byte(s) pending)")]
    NoProgress { input: usize },

    #[error("LZ4 decompression context already closed")]
    Closed,
}
