//! Content keys and hashes for write de-duplication.
//!
//! Sample payloads are keyed by a 128-bit MurmurHash3 digest, like the
//! `ArraySample::Key` of AbcCoreAbstract. The same hash family feeds the
//! property and object hashes stored in Ogawa headers.

use std::io::Cursor;

use crate::util::PlainOldDataType;

/// 128-bit digest for content-based deduplication.
pub type SampleDigest = [u8; 16];

/// Compute the MurmurHash3 x64_128 digest of a byte slice.
#[inline]
pub fn compute_digest(data: &[u8]) -> SampleDigest {
    // Reading from an in-memory cursor cannot fail.
    let hash = murmur3::murmur3_x64_128(&mut Cursor::new(data), 0).unwrap_or_default();
    hash.to_le_bytes()
}

/// Content-based key for write deduplication.
#[derive(Clone, Copy, Hash, Eq, PartialEq, Debug)]
pub struct ArraySampleContentKey {
    /// 128-bit digest of the data.
    pub digest: SampleDigest,
    /// Size of the data in bytes (for collision detection).
    pub size: usize,
    /// Storage tag: strings are kept apart from plain bytes.
    pub pod_tag: u8,
}

impl ArraySampleContentKey {
    /// Create a new content key from encoded sample bytes.
    pub fn from_data(data: &[u8], pod: PlainOldDataType) -> Self {
        let pod_tag = if pod.is_string() {
            pod.code()
        } else {
            PlainOldDataType::Int8.code()
        };
        Self {
            digest: compute_digest(data),
            size: data.len(),
            pod_tag,
        }
    }

    /// Get the digest bytes.
    pub fn digest(&self) -> &SampleDigest {
        &self.digest
    }

    /// Digest split into the two 64-bit halves used when mixing hashes.
    pub fn halves(&self) -> (u64, u64) {
        split_digest(&self.digest)
    }
}

fn split_digest(digest: &SampleDigest) -> (u64, u64) {
    let mut lo = [0u8; 8];
    let mut hi = [0u8; 8];
    lo.copy_from_slice(&digest[0..8]);
    hi.copy_from_slice(&digest[8..16]);
    (u64::from_le_bytes(lo), u64::from_le_bytes(hi))
}

/// Incremental 128-bit hasher for object and property hashes.
///
/// Bytes are buffered and digested once on [`ContentHasher::finalize`].
#[derive(Default)]
pub struct ContentHasher {
    buf: Vec<u8>,
}

impl ContentHasher {
    /// Create an empty hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes to the hashed stream.
    pub fn update(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Append a pair of 64-bit hash halves.
    pub fn update_pair(&mut self, pair: (u64, u64)) {
        self.buf.extend_from_slice(&pair.0.to_le_bytes());
        self.buf.extend_from_slice(&pair.1.to_le_bytes());
    }

    /// Digest everything written so far.
    pub fn finalize(&self) -> (u64, u64) {
        split_digest(&compute_digest(&self.buf))
    }

    /// Fold two hash pairs into one.
    pub fn mix(a: (u64, u64), b: (u64, u64)) -> (u64, u64) {
        let mut hasher = Self::new();
        hasher.update_pair(a);
        hasher.update_pair(b);
        hasher.finalize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_deterministic() {
        assert_eq!(compute_digest(b"alembic"), compute_digest(b"alembic"));
        assert_ne!(compute_digest(b"alembic"), compute_digest(b"alembic!"));
    }

    #[test]
    fn test_content_key_separates_strings() {
        let a = ArraySampleContentKey::from_data(b"abc\0", PlainOldDataType::String);
        let b = ArraySampleContentKey::from_data(b"abc\0", PlainOldDataType::Uint8);
        assert_eq!(a.digest, b.digest);
        assert_ne!(a, b);
    }

    #[test]
    fn test_hasher_matches_digest() {
        let mut h = ContentHasher::new();
        h.update(b"ab");
        h.update(b"c");
        assert_eq!(h.finalize(), split_digest(&compute_digest(b"abc")));
        assert_ne!(ContentHasher::mix((1, 2), (3, 4)), ContentHasher::mix((3, 4), (1, 2)));
    }
}
