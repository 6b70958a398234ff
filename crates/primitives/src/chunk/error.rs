use thiserror::Error;

use crate::address::ChunkAddress;

/// Errors specific to chunk construction and decoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ChunkError {
    /// The payload does not fit one chunk.
    #[error("chunk payload of {actual} bytes exceeds the capacity of {capacity}")]
    PayloadTooLarge { capacity: usize, actual: usize },

    /// Wire data ends before the span prefix is complete.
    #[error("chunk wire data of {actual} bytes is shorter than the {expected}-byte span")]
    TruncatedWire { expected: usize, actual: usize },

    /// A span within one chunk's capacity must equal the payload length.
    #[error("span of {span} bytes does not match the payload length {actual}")]
    SpanMismatch { span: u64, actual: usize },

    /// The computed address differs from the expected one.
    #[error("chunk address mismatch: expected {expected}, computed {actual}")]
    AddressMismatch {
        expected: ChunkAddress,
        actual: ChunkAddress,
    },
}
