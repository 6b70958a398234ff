//! Tests for the chunked file engine.

use alloy_primitives::keccak256;
use bytes::Bytes;
use proptest::prelude::*;

use super::*;
use crate::bmt::{ProofError, Segment};
use crate::error::Error;

const CHUNK: usize = 4096;

/// Deterministic filler so large fixtures need no external files.
fn patterned(len: usize) -> Bytes {
    let mut data = Vec::with_capacity(len);
    let mut state = 0x6c07_8965_u32;
    for _ in 0..len {
        state = state.wrapping_mul(1664525).wrapping_add(1013904223);
        data.push((state >> 24) as u8);
    }
    Bytes::from(data)
}

fn chunked(payload: impl Into<Bytes>) -> ChunkedFile {
    ChunkedFile::new(payload, ChunkConfig::default())
}

/// The `index`-th 32-byte segment of `payload`, zero-padded.
fn segment_of(payload: &[u8], index: u64) -> Segment {
    let start = index as usize * 32;
    let end = (start + 32).min(payload.len());
    let mut segment = [0u8; 32];
    segment[..end - start].copy_from_slice(&payload[start..end]);
    segment.into()
}

/// Round-trip helper: prove `index` and rebuild the file address.
fn prove_and_rebuild(file: &ChunkedFile, index: u64) -> (usize, FileAddress) {
    let records = file.inclusion_proof(index).unwrap();
    let segment = segment_of(file.payload(), index);
    let address =
        file_address_from_proof(&records, segment, index, file.config()).unwrap();
    (records.len(), address)
}

#[test]
fn test_single_chunk_file() {
    let file = chunked(b"hello world".as_slice());

    assert_eq!(file.leaf_chunks().len(), 1);
    let leaf = file.leaf_chunks()[0].clone();
    let root = file.root_chunk().unwrap();
    assert_eq!(root, &leaf);
    assert_eq!(file.address().unwrap(), *leaf.address());
    assert_eq!(file.span_value(), 11);
    assert_eq!(file.bmt().unwrap().len(), 1);

    let (len, address) = prove_and_rebuild(&file, 0);
    assert_eq!(len, 1);
    assert_eq!(address, file.address().unwrap());
}

#[test]
fn test_empty_payload() {
    let file = chunked(Bytes::new());

    let leaves = file.leaf_chunks();
    assert_eq!(leaves.len(), 1);
    assert!(leaves[0].payload().is_empty());
    assert_eq!(file.span().as_ref(), &[0u8; 8]);
    assert_eq!(file.address().unwrap(), *leaves[0].address());

    // nothing is provable in an empty payload
    assert!(matches!(
        file.inclusion_proof(0),
        Err(Error::Proof(ProofError::SegmentOutOfRange { index: 0, limit: 0 }))
    ));
}

#[test]
fn test_exact_multiple_has_no_carrier() {
    let payload = patterned(3 * CHUNK);
    let file = chunked(payload);

    let tree = file.bmt().unwrap();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].len(), 3);
    assert_eq!(tree[1].len(), 1);

    let root = file.root_chunk().unwrap();
    assert_eq!(root.span_value(), 3 * CHUNK as u64);
    assert_eq!(root.payload().len(), 3 * 32);

    // the root payload is the concatenation of the leaf addresses
    for (index, leaf) in tree[0].iter().enumerate() {
        assert_eq!(
            &root.payload()[index * 32..(index + 1) * 32],
            leaf.address().as_bytes()
        );
    }

    let (len, address) = prove_and_rebuild(&file, 200);
    assert_eq!(len, 2);
    assert_eq!(address, file.address().unwrap());
}

#[test]
fn test_intermediate_spans_are_additive() {
    // 131 leaves: two parents of 128 and 3 children
    let total = 130 * CHUNK + 17;
    let file = chunked(patterned(total));

    let tree = file.bmt().unwrap();
    assert_eq!(tree[0].len(), 131);
    assert_eq!(tree[1].len(), 2);
    assert_eq!(tree[1][0].span_value(), 128 * CHUNK as u64);
    assert_eq!(tree[1][1].span_value(), 2 * CHUNK as u64 + 17);

    // every level covers the whole payload
    for level in &tree {
        let covered: u64 = level.iter().map(|chunk| chunk.span_value()).sum();
        assert_eq!(covered, total as u64);
    }

    assert_eq!(
        file.root_chunk().unwrap().span_value(),
        file.span_value()
    );
}

#[test]
fn test_three_level_tree_shape() {
    // 3840 leaves fold into 30 intermediate chunks and one root
    let total = 15_726_634;
    let file = chunked(patterned(total));

    let tree = file.bmt().unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree[0].len(), 3840);
    assert_eq!(tree[1].len(), 30);
    assert_eq!(tree[2].len(), 1);
    assert_eq!(tree[2][0].payload().len(), 960);
    assert_eq!(&tree[2][0], file.root_chunk().unwrap());
    assert_eq!(file.root_chunk().unwrap().span_value(), total as u64);

    let last_segment = (total as u64 - 1) / 32;
    for index in [0, 4095 / 32 + 7, last_segment] {
        let (len, address) = prove_and_rebuild(&file, index);
        assert_eq!(len, 3);
        assert_eq!(address, file.address().unwrap());
    }
}

#[test]
fn test_carrier_chunk_at_leaf_level() {
    // 129 leaves: the trailing 33-byte leaf cannot be paired and is
    // promoted next to the single parent of the other 128
    let total = 128 * CHUNK + 33;
    let file = chunked(patterned(total));

    let leaves = file.leaf_chunks().to_vec();
    assert_eq!(leaves.len(), 129);

    let tree = file.bmt().unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree[0].len(), leaves.len() - 1);
    assert_eq!(tree[1].len(), 2);
    assert_eq!(tree[1][1], leaves[128]);

    let last_segment = (total as u64 - 1) / 32;
    assert_eq!(
        bmt_index_of_segment(last_segment, 128, CHUNK),
        SegmentPosition { level: 1, chunk_index: 1 }
    );

    // the promoted chunk contributes its record one level late, so the
    // proof is one record shorter than a dense path
    let (len, address) = prove_and_rebuild(&file, last_segment);
    assert_eq!(len, 2);
    assert_eq!(address, file.address().unwrap());

    let (len, address) = prove_and_rebuild(&file, 0);
    assert_eq!(len, 3);
    assert_eq!(address, file.address().unwrap());
}

#[test]
fn test_carrier_chunk_at_intermediate_level() {
    // 128 * 128 full leaves saturate level 1; two more leaves form a
    // parent that is popped at level 1 and absorbed one level higher
    let total = 128 * CHUNK * 128 + 2 * CHUNK;
    let file = chunked(vec![0u8; total]);

    let tree = file.bmt().unwrap();
    assert_eq!(tree.len(), 4);
    assert_eq!(tree[0].len(), 16386);
    assert_eq!(tree[1].len(), 128);
    assert_eq!(tree[2].len(), 2);
    assert_eq!(tree[2][1].span_value(), 2 * CHUNK as u64);
    assert_eq!(file.root_chunk().unwrap().span_value(), total as u64);

    // the final segment sits under the promoted parent: its proof skips
    // one level of the four
    let last_segment = (total as u64 - 1) / 32;
    let (len, address) = prove_and_rebuild(&file, last_segment);
    assert_eq!(len, 3);
    assert_eq!(address, file.address().unwrap());

    let (len, address) = prove_and_rebuild(&file, 0);
    assert_eq!(len, 4);
    assert_eq!(address, file.address().unwrap());
}

#[test]
fn test_proof_bounds() {
    let file = chunked(b"hello world".as_slice());
    assert!(file.inclusion_proof(0).is_ok());
    assert!(matches!(
        file.inclusion_proof(1),
        Err(Error::Proof(ProofError::SegmentOutOfRange { index: 1, limit: 11 }))
    ));
}

#[test]
fn test_changed_segment_keeps_proof_sisters() {
    let mut payload = patterned(2 * CHUNK).to_vec();
    let file = chunked(payload.clone());
    payload[5 * 32] ^= 0xFF;
    let changed = chunked(payload.clone());

    assert_ne!(file.address().unwrap(), changed.address().unwrap());

    // the sister segments for the changed index are untouched; only the
    // address the proof verifies to moves
    let before = file.inclusion_proof(5).unwrap();
    let after = changed.inclusion_proof(5).unwrap();
    assert_eq!(before, after);

    let address = file_address_from_proof(
        &after,
        segment_of(&payload, 5),
        5,
        changed.config(),
    )
    .unwrap();
    assert_eq!(address, changed.address().unwrap());
}

#[test]
fn test_injected_hash_function() {
    fn salted(parts: &[&[u8]]) -> Segment {
        let mut bytes = vec![0x5a];
        for part in parts {
            bytes.extend_from_slice(part);
        }
        keccak256(&bytes)
    }

    let config = ChunkConfig::default().with_hash_fn(salted);
    let payload = patterned(3 * CHUNK + 100);
    let file = ChunkedFile::new(payload.clone(), config);
    let plain = chunked(payload.clone());

    assert_ne!(file.address().unwrap(), plain.address().unwrap());

    let records = file.inclusion_proof(17).unwrap();
    let address =
        file_address_from_proof(&records, segment_of(&payload, 17), 17, &config).unwrap();
    assert_eq!(address, file.address().unwrap());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Narrow chunks (4 branches) exercise the carrier rules across many
    /// levels without large payloads.
    #[test]
    fn test_round_trip_with_narrow_chunks(len in 1usize..=1600, seed in any::<u8>()) {
        let config = ChunkConfig::new(128, 8).unwrap();
        let payload: Vec<u8> = (0..len).map(|i| (i as u8).wrapping_mul(31) ^ seed).collect();
        let file = ChunkedFile::new(payload.clone(), config);
        let address = file.address().unwrap();

        prop_assert_eq!(file.root_chunk().unwrap().span_value(), len as u64);

        let segments = (len as u64).div_ceil(32);
        let step = (segments / 7).max(1);
        for index in (0..segments).step_by(step as usize) {
            let records = file.inclusion_proof(index).unwrap();
            let rebuilt = file_address_from_proof(
                &records,
                segment_of(&payload, index),
                index,
                &config,
            ).unwrap();
            prop_assert_eq!(rebuilt, address);
        }

        // the last segment crosses the carrier path most often
        let records = file.inclusion_proof(segments - 1).unwrap();
        let rebuilt = file_address_from_proof(
            &records,
            segment_of(&payload, segments - 1),
            segments - 1,
            &config,
        ).unwrap();
        prop_assert_eq!(rebuilt, address);
    }

    #[test]
    fn test_leaf_windows(len in 0usize..=40_000) {
        let file = chunked(patterned(len));
        let leaves = file.leaf_chunks();

        prop_assert_eq!(leaves.len(), len.div_ceil(CHUNK).max(1));
        let covered: u64 = leaves.iter().map(|chunk| chunk.span_value()).sum();
        prop_assert_eq!(covered, len as u64);
        for leaf in &leaves[..leaves.len() - 1] {
            prop_assert_eq!(leaf.payload().len(), CHUNK);
        }
    }
}
