//! Error types for omniwire core.

use thiserror::Error;

/// Fatal pre-flight errors in the declarative graph.
///
/// These abort reconciliation for the affected pathway before any
/// transactions are produced.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "requiredDVNs must be specified for pathway {pathway} \
         (set to an empty array to use defaults)"
    )]
    MissingRequiredDvns { pathway: String },

    #[error(
        "optionalDVNs must be specified for pathway {pathway} \
         (set to an empty array to use defaults)"
    )]
    MissingOptionalDvns { pathway: String },

    #[error(
        "optionalDVNThreshold must be specified for pathway {pathway} \
         (set to 0 to use defaults)"
    )]
    MissingOptionalDvnThreshold { pathway: String },

    #[error("pathway {pathway} references undeclared contract {point}")]
    UnknownContract { pathway: String, point: String },

    #[error("duplicate contract declaration for {point}")]
    DuplicateContract { point: String },
}

/// Errors produced by the binary codecs (options blobs, ULN and executor
/// config bytes).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("truncated input: needed {needed} more byte(s) at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown worker id: {0:#04x}")]
    UnknownWorker(u8),

    #[error("unknown option type: {0:#04x}")]
    UnknownOptionType(u8),

    #[error("option segment length {declared} does not match payload for type {option_type:#04x}")]
    SegmentLengthMismatch { option_type: u8, declared: usize },

    #[error("trailing bytes after decoding: {0}")]
    TrailingBytes(usize),
}
