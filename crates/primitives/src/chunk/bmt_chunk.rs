//! Content-addressed chunk implementation.

use std::fmt;
use std::marker::PhantomData;

use alloy_primitives::hex;
use bytes::{Bytes, BytesMut};

use crate::address::ChunkAddress;
use crate::bmt::{ChunkTree, ProofError, Segment, SEGMENT_SIZE};
use crate::cache::Memo;
use crate::chunk::error::ChunkError;
use crate::config::ChunkConfig;
use crate::error::Result;
use crate::span;

/// A content-addressed chunk: payload, span and the derivations over them.
///
/// Immutable once built. The tree and address are computed on first use
/// and kept for the lifetime of the value.
#[derive(Debug, Clone)]
pub struct BmtChunk {
    payload: Bytes,
    span: Bytes,
    span_value: u64,
    config: ChunkConfig,
    tree: Memo<ChunkTree>,
    address: Memo<ChunkAddress>,
}

impl BmtChunk {
    /// Create a chunk whose span equals the payload length.
    pub fn new(payload: impl Into<Bytes>, config: ChunkConfig) -> Result<Self> {
        Self::builder(config).payload(payload)?.build()
    }

    /// Start building a chunk, optionally overriding the span value.
    pub fn builder(config: ChunkConfig) -> BmtChunkBuilder<Initial> {
        BmtChunkBuilder {
            config,
            span_value: None,
            payload: None,
            _state: PhantomData,
        }
    }

    /// Constructor for callers that uphold the size invariants themselves:
    /// the payload fits the capacity and the span value is in range.
    pub(crate) fn from_parts(payload: Bytes, span_value: u64, config: ChunkConfig) -> Self {
        Self {
            span: span::encode_span(span_value, config.span_length()),
            payload,
            span_value,
            config,
            tree: Memo::new(),
            address: Memo::new(),
        }
    }

    /// The chunk payload as sliced from the input, without padding.
    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// The encoded span prefix.
    pub fn span(&self) -> &Bytes {
        &self.span
    }

    /// The number of payload bytes covered by this chunk's subtree.
    pub fn span_value(&self) -> u64 {
        self.span_value
    }

    /// The configuration the chunk was built with.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// The payload right-padded with zeros to the payload capacity.
    pub fn data(&self) -> Bytes {
        let mut padded = BytesMut::zeroed(self.config.max_payload_size());
        padded[..self.payload.len()].copy_from_slice(&self.payload);
        padded.freeze()
    }

    /// The chunk's binary merkle tree, built on first use.
    pub fn tree(&self) -> &ChunkTree {
        self.tree
            .get_or_compute(|| ChunkTree::build(self.data(), &self.config))
    }

    /// The chunk address: the configured hash over span and tree root.
    pub fn address(&self) -> &ChunkAddress {
        self.address.get_or_compute(|| {
            // reuse the tree when it has already been built, but do not
            // retain a full tree just to produce the address
            let root = match self.tree.get() {
                Some(tree) => tree.root(),
                None => ChunkTree::build(self.data(), &self.config).root(),
            };
            ChunkAddress::from(self.config.hash(&[self.span.as_ref(), root.as_slice()]))
        })
    }

    /// Sister segments proving that segment `segment_index` is part of
    /// this chunk.
    ///
    /// The bound is the payload length, not the capacity: indices into the
    /// zero padding are not provable.
    pub fn inclusion_proof(&self, segment_index: usize) -> Result<Vec<Segment>> {
        let provable = self.payload.len().div_ceil(SEGMENT_SIZE);
        if segment_index >= provable {
            return Err(ProofError::SegmentOutOfRange {
                index: segment_index as u64,
                limit: self.payload.len() as u64,
            }
            .into());
        }
        Ok(self.tree().sister_path(segment_index))
    }

    /// Check the computed address against an expected one.
    pub fn verify(&self, expected: &ChunkAddress) -> Result<()> {
        let actual = self.address();
        if actual != expected {
            return Err(ChunkError::AddressMismatch {
                expected: *expected,
                actual: *actual,
            }
            .into());
        }
        Ok(())
    }

    /// Decode a chunk from its wire form, `span ‖ payload`.
    pub fn from_wire(mut buf: Bytes, config: ChunkConfig) -> Result<Self> {
        let span_length = config.span_length();
        if buf.len() < span_length {
            return Err(ChunkError::TruncatedWire {
                expected: span_length,
                actual: buf.len(),
            }
            .into());
        }
        let span_bytes = buf.split_to(span_length);
        let span_value = span::span_value(&span_bytes)?;
        let payload = buf;
        if payload.len() > config.max_payload_size() {
            return Err(ChunkError::PayloadTooLarge {
                capacity: config.max_payload_size(),
                actual: payload.len(),
            }
            .into());
        }
        // only subtree spans may exceed the payload: a span within one
        // chunk's capacity must match the payload exactly
        if span_value <= config.max_payload_size() as u64 && span_value != payload.len() as u64 {
            return Err(ChunkError::SpanMismatch {
                span: span_value,
                actual: payload.len(),
            }
            .into());
        }
        Ok(Self {
            span: span_bytes,
            payload,
            span_value,
            config,
            tree: Memo::new(),
            address: Memo::new(),
        })
    }
}

impl From<BmtChunk> for Bytes {
    fn from(chunk: BmtChunk) -> Self {
        let mut wire = BytesMut::with_capacity(chunk.span.len() + chunk.payload.len());
        wire.extend_from_slice(&chunk.span);
        wire.extend_from_slice(&chunk.payload);
        wire.freeze()
    }
}

impl TryFrom<Bytes> for BmtChunk {
    type Error = crate::error::Error;

    fn try_from(buf: Bytes) -> Result<Self> {
        Self::from_wire(buf, ChunkConfig::default())
    }
}

impl TryFrom<&[u8]> for BmtChunk {
    type Error = crate::error::Error;

    fn try_from(buf: &[u8]) -> Result<Self> {
        Self::try_from(Bytes::copy_from_slice(buf))
    }
}

impl fmt::Display for BmtChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BmtChunk[{}]", hex::encode(&self.address().as_bytes()[..8]))
    }
}

impl PartialEq for BmtChunk {
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for BmtChunk {}

/// Marker trait for builder progress.
pub trait BuilderState {}

/// Builder state before a payload is attached.
#[derive(Debug, Default)]
pub struct Initial;
impl BuilderState for Initial {}

/// Builder state holding a validated payload.
#[derive(Debug)]
pub struct Ready;
impl BuilderState for Ready {}

/// Typestate builder for [`BmtChunk`].
///
/// The span defaults to the payload length; parent chunks of a file tree
/// override it with the summed span of their children.
#[derive(Debug)]
pub struct BmtChunkBuilder<S: BuilderState = Initial> {
    config: ChunkConfig,
    span_value: Option<u64>,
    payload: Option<Bytes>,
    _state: PhantomData<S>,
}

impl BmtChunkBuilder<Initial> {
    /// Override the span value recorded for the chunk.
    pub fn span_value(mut self, value: u64) -> Self {
        self.span_value = Some(value);
        self
    }

    /// Attach the payload, validating it against the payload capacity.
    pub fn payload(self, payload: impl Into<Bytes>) -> Result<BmtChunkBuilder<Ready>> {
        let payload = payload.into();
        if payload.len() > self.config.max_payload_size() {
            return Err(ChunkError::PayloadTooLarge {
                capacity: self.config.max_payload_size(),
                actual: payload.len(),
            }
            .into());
        }
        Ok(BmtChunkBuilder {
            config: self.config,
            span_value: self.span_value,
            payload: Some(payload),
            _state: PhantomData,
        })
    }
}

impl BmtChunkBuilder<Ready> {
    /// Build the chunk, encoding the span.
    pub fn build(self) -> Result<BmtChunk> {
        // the payload is always present in the Ready state
        let payload = self.payload.unwrap_or_default();
        let span_value = self.span_value.unwrap_or(payload.len() as u64);
        let span = span::make_span(span_value, self.config.span_length())?;
        Ok(BmtChunk {
            payload,
            span,
            span_value,
            config: self.config,
            tree: Memo::new(),
            address: Memo::new(),
        })
    }
}

#[cfg(any(test, feature = "arbitrary"))]
impl<'a> arbitrary::Arbitrary<'a> for BmtChunk {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let config = ChunkConfig::default();
        let len = u.int_in_range(0..=config.max_payload_size())?;
        let mut payload = vec![0u8; len];
        u.fill_buffer(&mut payload)?;
        Ok(Self::from_parts(payload.into(), len as u64, config))
    }
}
