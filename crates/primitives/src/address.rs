//! Content addresses.
//!
//! A chunk is addressed by the 32-byte hash of its span and tree root. The
//! address of a payload's root chunk doubles as the address of the whole
//! payload.

use std::fmt;
use std::ops::Deref;

use alloy_primitives::{hex, B256};

use crate::error::Result;

/// 32-byte content address of a chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ChunkAddress(pub B256);

/// Address of a whole payload: the address of its root chunk.
pub type FileAddress = ChunkAddress;

impl ChunkAddress {
    /// Creates an address from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(B256::from(bytes))
    }

    /// Creates an address from a slice, checking the length.
    pub fn from_slice(slice: &[u8]) -> Result<Self> {
        let address = B256::try_from(slice)?;
        Ok(Self(address))
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Whether every byte of the address is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// The all-zero address.
    pub fn zero() -> Self {
        Self(B256::ZERO)
    }
}

impl fmt::Display for ChunkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(&self.0.as_slice()[..8]))
    }
}

impl Deref for ChunkAddress {
    type Target = B256;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<B256> for ChunkAddress {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<[u8; 32]> for ChunkAddress {
    fn from(bytes: [u8; 32]) -> Self {
        Self::new(bytes)
    }
}

impl From<ChunkAddress> for B256 {
    fn from(address: ChunkAddress) -> Self {
        address.0
    }
}

impl AsRef<[u8]> for ChunkAddress {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
