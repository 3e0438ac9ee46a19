//! Running content checksum shared with upload clients.
//!
//! The checksum is CRC-32 (IEEE polynomial) over the asset content in the
//! order the caller lists its chunks. Clients feed every chunk into one
//! running CRC while uploading; the engine recomputes it from the staged
//! chunks at commit time. Feeding the bytes in pieces gives the same value
//! as hashing the whole concatenation, and zero bytes hash to `0`.

use crc32fast::Hasher as Crc32Hasher;
use sha2::{Digest, Sha256};

#[derive(Clone, Default)]
pub struct Checksum {
    hasher: Crc32Hasher,
}

impl Checksum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, bytes: &[u8]) {
        self.hasher.update(bytes);
    }

    pub fn finalize(self) -> u32 {
        self.hasher.finalize()
    }
}

/// Checksum of the concatenation of `parts`, in iteration order.
pub fn compute_checksum<'a, I>(parts: I) -> u32
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut checksum = Checksum::new();
    for part in parts {
        checksum.update(part);
    }
    checksum.finalize()
}

/// Hex-encoded SHA-256 of a committed asset's content.
pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
