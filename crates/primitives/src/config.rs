//! Runtime chunking parameters.
//!
//! One [`ChunkConfig`] is shared by every chunk of a tree. It fixes the
//! chunk payload capacity, the span width and the hash function; changing
//! any of them changes every address in the tree.

use alloy_primitives::{Keccak256, B256};
use thiserror::Error;

use crate::bmt::SEGMENT_SIZE;
use crate::span::{DEFAULT_SPAN_SIZE, MIN_SPAN_SIZE};

/// Default chunk payload capacity in bytes.
pub const DEFAULT_MAX_PAYLOAD_SIZE: usize = 4096;

/// Capability type for the 32-byte hash applied throughout the tree.
///
/// The function receives the byte parts in hashing order and digests their
/// concatenation. Every hash in the chunk and file trees goes through this
/// capability, so an injected function applies uniformly.
pub type SegmentHashFn = fn(&[&[u8]]) -> B256;

/// Keccak-256 over the concatenation of `parts`, the default hash.
pub fn keccak_hash(parts: &[&[u8]]) -> B256 {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize()
}

/// Errors from configuration validation.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The payload capacity does not describe a balanced tree.
    #[error("chunk payload capacity {0} is not a power-of-two multiple of 32 bytes")]
    InvalidPayloadCapacity(usize),

    /// The span width cannot hold realistic payload lengths.
    #[error("span width {0} is below the minimum of 4 bytes")]
    SpanTooNarrow(usize),
}

/// Parameters shared by every chunk of one tree.
#[derive(Debug, Clone, Copy)]
pub struct ChunkConfig {
    max_payload_size: usize,
    span_length: usize,
    hash_fn: SegmentHashFn,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD_SIZE,
            span_length: DEFAULT_SPAN_SIZE,
            hash_fn: keccak_hash,
        }
    }
}

impl ChunkConfig {
    /// Validated constructor.
    ///
    /// `max_payload_size` must be a power-of-two multiple of the segment
    /// size so that the in-chunk tree is perfectly balanced;
    /// `span_length` must be at least [`MIN_SPAN_SIZE`] bytes.
    pub fn new(max_payload_size: usize, span_length: usize) -> Result<Self, ConfigError> {
        let segments = max_payload_size / SEGMENT_SIZE;
        if max_payload_size == 0
            || max_payload_size % SEGMENT_SIZE != 0
            || !segments.is_power_of_two()
        {
            return Err(ConfigError::InvalidPayloadCapacity(max_payload_size));
        }
        if span_length < MIN_SPAN_SIZE {
            return Err(ConfigError::SpanTooNarrow(span_length));
        }
        Ok(Self {
            max_payload_size,
            span_length,
            hash_fn: keccak_hash,
        })
    }

    /// Replace the hash function applied to every node of the tree.
    pub fn with_hash_fn(mut self, hash_fn: SegmentHashFn) -> Self {
        self.hash_fn = hash_fn;
        self
    }

    /// Chunk payload capacity in bytes.
    pub fn max_payload_size(&self) -> usize {
        self.max_payload_size
    }

    /// Span width in bytes.
    pub fn span_length(&self) -> usize {
        self.span_length
    }

    /// Number of segments (and child addresses) a chunk can hold.
    pub fn branches(&self) -> usize {
        self.max_payload_size / SEGMENT_SIZE
    }

    /// Depth of the in-chunk tree: log2 of the branch count.
    pub fn depth(&self) -> u32 {
        self.branches().trailing_zeros()
    }

    /// Apply the configured hash to `parts` in order.
    #[inline]
    pub fn hash(&self, parts: &[&[u8]]) -> B256 {
        (self.hash_fn)(parts)
    }
}
