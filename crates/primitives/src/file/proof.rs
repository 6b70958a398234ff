//! File-level inclusion proofs.
//!
//! A file proof is the ordered list of per-chunk records on the path from
//! a payload segment to the root chunk: for each chunk, the sister
//! segments of its in-chunk tree plus the chunk span. Re-hashing that list
//! bottom-up reproduces the file address without access to the payload.

use bytes::Bytes;

use super::{bmt_index_of_segment, next_level, pop_carrier, ChunkedFile, FileError};
use crate::address::FileAddress;
use crate::bmt::{ProofError, Segment, SEGMENT_SIZE};
use crate::config::ChunkConfig;
use crate::error::Result;
use crate::span;

/// Proof that one segment belongs to one chunk: the chunk's span and the
/// sister segments of the in-chunk path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkInclusionProof {
    span: Bytes,
    sister_segments: Vec<Segment>,
}

impl ChunkInclusionProof {
    /// Assemble a record from its parts.
    pub fn new(span: Bytes, sister_segments: Vec<Segment>) -> Self {
        Self {
            span,
            sister_segments,
        }
    }

    /// The encoded span of the chunk this record closes.
    pub fn span(&self) -> &Bytes {
        &self.span
    }

    /// The sister segments of the in-chunk path, leaves first.
    pub fn sister_segments(&self) -> &[Segment] {
        &self.sister_segments
    }
}

impl ChunkedFile {
    /// Collect the per-chunk proof records for `segment_index`, bottom-up.
    ///
    /// When the target segment sits in a chunk that was popped as a
    /// carrier, the levels the carrier skipped contribute no record; the
    /// proof continues on the level where the carrier was absorbed.
    pub fn inclusion_proof(&self, segment_index: u64) -> Result<Vec<ChunkInclusionProof>> {
        let total = self.span_value();
        if segment_index >= total.div_ceil(SEGMENT_SIZE as u64) {
            return Err(ProofError::SegmentOutOfRange {
                index: segment_index,
                limit: total,
            }
            .into());
        }
        let config = self.config;
        let branches = config.branches() as u64;
        let depth = config.depth();

        let mut level = self.leaf_chunks().to_vec();
        let mut carrier = pop_carrier(&mut level, branches as usize);
        let mut records = Vec::new();
        let mut segment_index = segment_index;
        while level.len() != 1 || carrier.is_some() {
            let chunk_segment_index = (segment_index % branches) as usize;
            let mut chunk_for_proof = (segment_index / branches) as usize;
            if chunk_for_proof == level.len() {
                // the target chunk was popped; walk up to where it lands
                if carrier.is_none() {
                    return Err(FileError::MissingCarrier.into());
                }
                segment_index >>= depth;
                loop {
                    (level, carrier) = next_level(level, carrier, &config)?;
                    segment_index >>= depth;
                    if segment_index % branches != 0 {
                        break;
                    }
                }
                chunk_for_proof = level.len() - 1;
            }
            let chunk = &level[chunk_for_proof];
            records.push(ChunkInclusionProof::new(
                chunk.span().clone(),
                chunk.inclusion_proof(chunk_segment_index)?,
            ));
            segment_index = chunk_for_proof as u64;
            (level, carrier) = next_level(level, carrier, &config)?;
        }
        let root = &level[0];
        records.push(ChunkInclusionProof::new(
            root.span().clone(),
            root.inclusion_proof(segment_index as usize)?,
        ));
        Ok(records)
    }
}

/// Recompute the file address from one payload segment and its proof.
///
/// `records` must be ordered bottom-up as produced by
/// [`ChunkedFile::inclusion_proof`]; the total payload length is read from
/// the root record's span. The caller compares the result with a known
/// file address. For well-formed proofs this never fails.
pub fn file_address_from_proof(
    records: &[ChunkInclusionProof],
    prove_segment: Segment,
    prove_segment_index: u64,
    config: &ChunkConfig,
) -> Result<FileAddress> {
    let root_record = records.last().ok_or(ProofError::EmptyProof)?;
    let file_size = span::span_value(root_record.span())?;
    let branches = config.branches() as u64;

    // index of the last chunk on the current level, floor-divided while
    // climbing; it feeds the position resolver so carrier promotions are
    // tracked without replaying the tree
    let mut last_chunk_index = file_size.saturating_sub(1) / config.max_payload_size() as u64;
    let mut segment_index = prove_segment_index;
    let mut hash = prove_segment;
    for record in records {
        let parent_index =
            bmt_index_of_segment(segment_index, last_chunk_index, config.max_payload_size())
                .chunk_index;
        for sister in record.sister_segments() {
            hash = if segment_index & 1 == 0 {
                config.hash(&[hash.as_slice(), sister.as_slice()])
            } else {
                config.hash(&[sister.as_slice(), hash.as_slice()])
            };
            segment_index >>= 1;
        }
        // closing the chunk: span onto the recombined root gives the
        // child address seen by the parent
        hash = config.hash(&[record.span().as_ref(), hash.as_slice()]);
        segment_index = parent_index;
        last_chunk_index /= branches;
    }
    Ok(FileAddress::from(hash))
}
