//! Chunk values.
//!
//! A chunk holds at most one payload capacity of bytes plus its span. Its
//! address is the configured hash over the span followed by the root of
//! the binary merkle tree of the padded payload. Parent chunks in a file
//! tree carry the concatenated addresses of their children as payload and
//! the summed child spans as span.

mod bmt_chunk;
mod error;

pub use bmt_chunk::{BmtChunk, BmtChunkBuilder, BuilderState, Initial, Ready};
pub use error::ChunkError;
