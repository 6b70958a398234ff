use thiserror::Error;

/// Errors raised while generating or consuming inclusion proofs.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProofError {
    /// The requested segment lies beyond the provable payload. Segments in
    /// the zero padding of a chunk are not provable.
    #[error("segment index {index} is beyond the covered payload of {limit} bytes")]
    SegmentOutOfRange { index: u64, limit: u64 },

    /// A proof must contain at least the record of the root chunk.
    #[error("inclusion proof contains no records")]
    EmptyProof,
}
