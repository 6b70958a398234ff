//! Chunk span encoding.
//!
//! Every chunk carries a length prefix, the span: the number of payload
//! bytes covered by the subtree rooted at that chunk. Spans are unsigned
//! little-endian integers written into a fixed-width buffer (8 bytes on
//! the wire by default) and capped at 2^53 - 1 so that the encoding stays
//! bit-compatible with implementations that lack native 64-bit integers.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

/// Default span width in bytes.
pub const DEFAULT_SPAN_SIZE: usize = 8;

/// Smallest supported span width in bytes.
pub const MIN_SPAN_SIZE: usize = 4;

/// Largest value a span may carry (2^53 - 1).
pub const MAX_SPAN_VALUE: u64 = (1 << 53) - 1;

/// Errors from span encoding and decoding.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SpanError {
    /// The value does not fit the span encoding.
    #[error("span value {value} exceeds the maximum of {max}")]
    ValueTooLarge { value: u64, max: u64 },
}

/// Largest value representable by a span of `length` bytes.
fn max_for_width(length: usize) -> u64 {
    if length >= 7 {
        MAX_SPAN_VALUE
    } else {
        (1u64 << (8 * length as u32)) - 1
    }
}

/// Encode `value` as a little-endian span of `length` bytes.
pub fn make_span(value: u64, length: usize) -> Result<Bytes, SpanError> {
    let max = max_for_width(length);
    if value > max {
        return Err(SpanError::ValueTooLarge { value, max });
    }
    Ok(encode_span(value, length))
}

/// Encode without range checks. Callers uphold `value <= MAX_SPAN_VALUE`.
pub(crate) fn encode_span(value: u64, length: usize) -> Bytes {
    let mut buf = BytesMut::zeroed(length);
    let le = value.to_le_bytes();
    let n = length.min(le.len());
    buf[..n].copy_from_slice(&le[..n]);
    buf.freeze()
}

/// Decode a little-endian span back into its value.
pub fn span_value(span: &[u8]) -> Result<u64, SpanError> {
    let mut le = [0u8; 8];
    let n = span.len().min(8);
    le[..n].copy_from_slice(&span[..n]);
    let value = u64::from_le_bytes(le);
    let wide = span.len() > 8 && span[8..].iter().any(|byte| *byte != 0);
    if wide || value > MAX_SPAN_VALUE {
        return Err(SpanError::ValueTooLarge {
            value: if wide { u64::MAX } else { value },
            max: MAX_SPAN_VALUE,
        });
    }
    Ok(value)
}
