//! Construction of the in-chunk tree.

use bytes::{Bytes, BytesMut};
use rayon::prelude::*;

use super::{Segment, SEGMENT_PAIR_SIZE, SEGMENT_SIZE};
use crate::config::ChunkConfig;

/// All levels of one chunk's binary merkle tree, leaves first.
///
/// Level 0 is the padded chunk body; every following level halves in size
/// and the last level is the single 32-byte root. For the default capacity
/// of 4096 bytes the tree has 8 levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkTree {
    levels: Vec<Bytes>,
}

impl ChunkTree {
    /// Build the tree over a chunk body already padded to the configured
    /// payload capacity.
    pub(crate) fn build(data: Bytes, config: &ChunkConfig) -> Self {
        debug_assert_eq!(data.len(), config.max_payload_size());
        let mut levels = Vec::with_capacity(config.depth() as usize + 1);
        let mut current = data;
        while current.len() > SEGMENT_SIZE {
            let next = hash_pairs(&current, config);
            levels.push(current);
            current = next;
        }
        levels.push(current);
        Self { levels }
    }

    /// The tree levels, leaves first; the last level holds the root.
    pub fn levels(&self) -> &[Bytes] {
        &self.levels
    }

    /// The 32-byte tree root.
    pub fn root(&self) -> Segment {
        // build() always terminates on a single-segment level
        Segment::from_slice(&self.levels[self.levels.len() - 1])
    }

    /// Sister segments on the path from segment `index` up to the root.
    ///
    /// At every level the sister is the other half of the 64-byte window
    /// that produced the next level's segment; the index halves per level.
    pub(crate) fn sister_path(&self, mut index: usize) -> Vec<Segment> {
        let mut sisters = Vec::with_capacity(self.levels.len().saturating_sub(1));
        for level in &self.levels[..self.levels.len() - 1] {
            let offset = (index ^ 1) * SEGMENT_SIZE;
            sisters.push(Segment::from_slice(&level[offset..offset + SEGMENT_SIZE]));
            index >>= 1;
        }
        sisters
    }
}

/// Hash adjacent 64-byte windows into the next, half-sized level.
fn hash_pairs(level: &[u8], config: &ChunkConfig) -> Bytes {
    let parents: Vec<Segment> = level
        .par_chunks_exact(SEGMENT_PAIR_SIZE)
        .map(|pair| config.hash(&[pair]))
        .collect();
    let mut next = BytesMut::with_capacity(level.len() / 2);
    for parent in &parents {
        next.extend_from_slice(parent.as_slice());
    }
    next.freeze()
}
