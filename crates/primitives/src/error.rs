//! Error types for the crate.
//!
//! Each subsystem reports its own error kind (`SpanError`, `ConfigError`,
//! `ChunkError`, `ProofError`, `FileError`); the crate-level [`Error`]
//! wraps them transparently so callers can match on the component that
//! failed. Nothing is recovered internally: every failure surfaces at the
//! boundary of the operation that detected it, and operations are pure, so
//! a failed call leaves no state behind.

use thiserror::Error;

/// Result type for operations in this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level error wrapping the component errors.
#[derive(Error, Debug)]
pub enum Error {
    /// Errors from span encoding and decoding.
    #[error(transparent)]
    Span(#[from] crate::span::SpanError),

    /// Errors from configuration validation.
    #[error(transparent)]
    Config(#[from] crate::config::ConfigError),

    /// Errors from chunk construction and decoding.
    #[error(transparent)]
    Chunk(#[from] crate::chunk::ChunkError),

    /// Errors from proof generation and consumption.
    #[error(transparent)]
    Proof(#[from] crate::bmt::ProofError),

    /// Internal invariant violations of the level builder.
    #[error(transparent)]
    File(#[from] crate::file::FileError),

    /// Array conversion errors.
    #[error("array conversion error: {0}")]
    ArrayConversion(#[from] std::array::TryFromSliceError),
}
