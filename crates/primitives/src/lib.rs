//! Content addressing primitives for chunked payloads.
//!
//! This crate turns an arbitrary byte payload into a single fixed-length
//! content address and produces compact inclusion proofs that any 32-byte
//! segment of the payload sits at a given offset under that address.
//!
//! ## Key components
//!
//! - **Chunks**: fixed-capacity containers addressed by a binary merkle
//!   tree over their padded payload ([`BmtChunk`])
//! - **Chunked files**: multi-level grouping of chunk addresses up to a
//!   single root whose address names the whole payload ([`ChunkedFile`])
//! - **Inclusion proofs**: per-chunk sister paths that rebuild the file
//!   address from one segment ([`ChunkedFile::inclusion_proof`],
//!   [`file_address_from_proof`])
//!
//! ## Example
//!
//! ```
//! use comb_primitives::{file_address_from_proof, ChunkConfig, ChunkedFile};
//!
//! let config = ChunkConfig::default();
//! let file = ChunkedFile::new(b"hello world".as_slice(), config);
//! let address = file.address().unwrap();
//!
//! // prove that the first segment belongs to the file
//! let records = file.inclusion_proof(0).unwrap();
//! let mut segment = [0u8; 32];
//! segment[..11].copy_from_slice(b"hello world");
//! let rebuilt = file_address_from_proof(&records, segment.into(), 0, &config).unwrap();
//! assert_eq!(rebuilt, address);
//! ```

// Re-export dependencies that are part of our public API
pub use bytes;

pub mod address;
pub mod bmt;
mod cache;
pub mod chunk;
pub mod config;
pub mod error;
pub mod file;
pub mod span;

// Core types
pub use address::{ChunkAddress, FileAddress};
pub use bmt::{root_hash_from_proof, ChunkTree, ProofError, Segment, SEGMENT_SIZE};
pub use chunk::{BmtChunk, BmtChunkBuilder, ChunkError};
pub use config::{
    keccak_hash, ChunkConfig, ConfigError, SegmentHashFn, DEFAULT_MAX_PAYLOAD_SIZE,
};
pub use error::{Error, Result};
pub use file::{
    bmt_index_of_segment, file_address_from_proof, ChunkInclusionProof, ChunkedFile, FileError,
    SegmentPosition,
};
pub use span::{make_span, span_value, SpanError, DEFAULT_SPAN_SIZE, MAX_SPAN_VALUE};
