//! Recombination of in-chunk inclusion proofs.

use super::Segment;
use crate::config::ChunkConfig;

/// Recompute a chunk's tree root from one segment and its sister path.
///
/// Walking upwards, the running hash is combined with each sister: on an
/// even index the running value is the left input, on an odd index the
/// right; the index halves per level. The result is the tree root, not the
/// chunk address — hashing the chunk span onto it yields the address.
pub fn root_hash_from_proof(
    sisters: &[Segment],
    segment: Segment,
    segment_index: u64,
    config: &ChunkConfig,
) -> Segment {
    let mut hash = segment;
    let mut index = segment_index;
    for sister in sisters {
        hash = if index & 1 == 0 {
            config.hash(&[hash.as_slice(), sister.as_slice()])
        } else {
            config.hash(&[sister.as_slice(), hash.as_slice()])
        };
        index >>= 1;
    }
    hash
}
