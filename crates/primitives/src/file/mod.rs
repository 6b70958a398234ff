//! Multi-level chunking of arbitrary payloads.
//!
//! A payload is cut into leaf chunks of at most one payload capacity each.
//! The addresses of every group of up to `branches` chunks are packed into
//! a parent chunk whose span is the sum of the child spans, and the
//! process repeats until a single root chunk remains. The root chunk's
//! address is the file address and its span is the total payload length.
//!
//! A level whose chunk count is one above a multiple of the branch count
//! leaves its last chunk without siblings. That chunk is popped from its
//! level and carried upwards until it reaches a level with room for it;
//! this keeps the address of such payloads well defined and their
//! inclusion proofs reconstructable.

mod error;
mod position;
mod proof;

pub use error::FileError;
pub use position::{bmt_index_of_segment, SegmentPosition};
pub use proof::{file_address_from_proof, ChunkInclusionProof};

use bytes::{Bytes, BytesMut};
use rayon::prelude::*;

use crate::address::FileAddress;
use crate::bmt::SEGMENT_SIZE;
use crate::cache::Memo;
use crate::chunk::BmtChunk;
use crate::config::ChunkConfig;
use crate::error::Result;
use crate::span;

/// A payload together with its chunk tree derivations.
///
/// Construction never fails; every derivation is computed on first use.
/// The leaf chunks and the root chunk are memoised.
#[derive(Debug, Clone)]
pub struct ChunkedFile {
    payload: Bytes,
    config: ChunkConfig,
    leaves: Memo<Vec<BmtChunk>>,
    root: Memo<BmtChunk>,
}

impl ChunkedFile {
    /// Chunk a payload of any length under the given configuration.
    pub fn new(payload: impl Into<Bytes>, config: ChunkConfig) -> Self {
        Self {
            payload: payload.into(),
            config,
            leaves: Memo::new(),
            root: Memo::new(),
        }
    }

    /// The raw payload.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The configuration the file was chunked with.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// The encoded total span of the payload.
    pub fn span(&self) -> Bytes {
        span::encode_span(self.span_value(), self.config.span_length())
    }

    /// Total payload length in bytes.
    pub fn span_value(&self) -> u64 {
        self.payload.len() as u64
    }

    /// Level 0 of the tree: one chunk per payload window.
    ///
    /// An empty payload yields exactly one empty leaf chunk.
    pub fn leaf_chunks(&self) -> &[BmtChunk] {
        self.leaves.get_or_compute(|| {
            let capacity = self.config.max_payload_size();
            if self.payload.is_empty() {
                return vec![BmtChunk::from_parts(Bytes::new(), 0, self.config)];
            }
            let windows = self.payload.len().div_ceil(capacity);
            (0..windows)
                .into_par_iter()
                .map(|window| {
                    let start = window * capacity;
                    let end = (start + capacity).min(self.payload.len());
                    BmtChunk::from_parts(
                        self.payload.slice(start..end),
                        (end - start) as u64,
                        self.config,
                    )
                })
                .collect()
        })
    }

    /// The root chunk; its address is the file address and its span the
    /// total payload length.
    pub fn root_chunk(&self) -> Result<&BmtChunk> {
        if let Some(root) = self.root.get() {
            return Ok(root);
        }
        let root = self.build_root()?;
        Ok(self.root.get_or_compute(|| root))
    }

    /// The file address.
    pub fn address(&self) -> Result<FileAddress> {
        Ok(*self.root_chunk()?.address())
    }

    /// Every level of the chunk tree, leaves first; the last level holds
    /// exactly the root chunk.
    ///
    /// A popped carrier chunk is absent from its native level and appears
    /// on the level where it was absorbed.
    pub fn bmt(&self) -> Result<Vec<Vec<BmtChunk>>> {
        let branches = self.config.branches();
        let mut level = self.leaf_chunks().to_vec();
        let mut carrier = pop_carrier(&mut level, branches);
        let mut levels = Vec::new();
        while level.len() != 1 || carrier.is_some() {
            levels.push(level.clone());
            (level, carrier) = next_level(level, carrier, &self.config)?;
        }
        levels.push(level);
        Ok(levels)
    }

    fn build_root(&self) -> Result<BmtChunk> {
        let branches = self.config.branches();
        let mut level = self.leaf_chunks().to_vec();
        let mut carrier = pop_carrier(&mut level, branches);
        while level.len() != 1 || carrier.is_some() {
            (level, carrier) = next_level(level, carrier, &self.config)?;
        }
        match level.pop() {
            Some(root) => Ok(root),
            None => Err(FileError::EmptyLevel.into()),
        }
    }
}

/// Derive the next level up from `level`, threading the carrier chunk.
///
/// Children are grouped `branches` at a time into parent chunks. An
/// incoming carrier is appended to the new level if that level is not
/// aligned to the branch count; otherwise it keeps travelling. Without an
/// incoming carrier the new level may pop one of its own.
pub(crate) fn next_level(
    level: Vec<BmtChunk>,
    carrier: Option<BmtChunk>,
    config: &ChunkConfig,
) -> Result<(Vec<BmtChunk>, Option<BmtChunk>)> {
    if level.is_empty() {
        return Err(FileError::EmptyLevel.into());
    }
    let branches = config.branches();
    let mut parents: Vec<BmtChunk> = level
        .par_chunks(branches)
        .map(|group| parent_chunk(group, config))
        .collect();
    let carrier = match carrier {
        Some(chunk) => {
            if parents.len() % branches != 0 {
                parents.push(chunk);
                None
            } else {
                Some(chunk)
            }
        }
        None => pop_carrier(&mut parents, branches),
    };
    Ok((parents, carrier))
}

/// Pack one group of child chunks into their parent: the payload is the
/// concatenation of the child addresses, the span the sum of the child
/// spans.
fn parent_chunk(children: &[BmtChunk], config: &ChunkConfig) -> BmtChunk {
    let mut payload = BytesMut::with_capacity(children.len() * SEGMENT_SIZE);
    let mut span_value = 0u64;
    for child in children {
        payload.extend_from_slice(child.address().as_bytes());
        span_value += child.span_value();
    }
    BmtChunk::from_parts(payload.freeze(), span_value, *config)
}

/// Detach the chunk that cannot be paired under a parent, if any.
///
/// A level of `branches * n + 1` chunks (n >= 1) leaves its last chunk
/// without siblings; it is removed here and re-attached on a higher level.
pub(crate) fn pop_carrier(level: &mut Vec<BmtChunk>, branches: usize) -> Option<BmtChunk> {
    if level.len() > 1 && level.len() % branches == 1 {
        level.pop()
    } else {
        None
    }
}

#[cfg(test)]
mod tests;
