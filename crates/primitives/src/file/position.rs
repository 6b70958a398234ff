//! Analytic position of a payload segment inside the chunk tree.

use crate::bmt::SEGMENT_SIZE;

/// Where a payload segment's chunk terminates in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPosition {
    /// Tree level of the chunk holding the segment (0 = leaves).
    pub level: usize,
    /// Index of that chunk within its level.
    pub chunk_index: u64,
}

/// Locate the chunk a payload segment ends up in, accounting for carrier
/// promotion.
///
/// `last_chunk_index` is the index of the last chunk on the level the
/// segment index is relative to — `(file_size - 1) / max_payload_size` for
/// a payload segment. A segment inside a popped trailing chunk travels up
/// one level for every branch alignment it crosses; every other segment
/// terminates on its own level.
///
/// This is the analytic counterpart of the carrier rules in the level
/// builder. It lets a verifier track chunk indices without replaying the
/// tree construction: while climbing, the verifier floor-divides
/// `last_chunk_index` by the branch count per level and feeds each chunk
/// index back in.
pub fn bmt_index_of_segment(
    segment_index: u64,
    last_chunk_index: u64,
    max_payload_size: usize,
) -> SegmentPosition {
    let branches = (max_payload_size / SEGMENT_SIZE) as u64;
    let depth = branches.trailing_zeros();
    let mut level = 0usize;
    let mut index = segment_index;
    if index / branches == last_chunk_index && last_chunk_index % branches == 0 && last_chunk_index != 0
    {
        // the segment is in the popped trailing chunk
        index >>= depth;
        while index % branches == 0 {
            level += 1;
            index >>= depth;
        }
    } else {
        index >>= depth;
    }
    SegmentPosition { level, chunk_index: index }
}
