//! xxHash32 and xxHash64, used for value hashes and `HashedStringRef`.

/// Seed used by [`Slice::hash`](crate::Slice::hash) and string refs.
pub const DEFAULT_SEED: u64 = 0xdead_beef;

/// 32-bit variant of [`DEFAULT_SEED`].
pub const DEFAULT_SEED32: u32 = 0xdead_beef;

/// Compute xxHash32 of `data` with `seed`.
#[inline]
#[must_use]
pub fn xxh32(data: &[u8], seed: u32) -> u32 {
    xxhash_rust::xxh32::xxh32(data, seed)
}

/// Compute xxHash64 of `data` with `seed`.
#[inline]
#[must_use]
pub fn xxh64(data: &[u8], seed: u64) -> u64 {
    xxhash_rust::xxh64::xxh64(data, seed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xxh32_reference_values() {
        assert_eq!(xxh32(b"", 0), 0x02CC_5D05);
        assert_eq!(xxh32(b"a", 0), 0x550D_7456);
        assert_eq!(xxh32(b"abc", 0), 0x32D1_53FF);
    }

    #[test]
    fn xxh64_reference_values() {
        assert_eq!(xxh64(b"", 0), 0xEF46_DB37_51D8_E999);
        assert_eq!(xxh64(b"a", 0), 0xD24E_C4F1_A98C_6E5B);
        assert_eq!(xxh64(b"abc", 0), 0x44BC_2CF5_AD77_0999);
    }

    #[test]
    fn seeds_change_the_hash() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        assert_ne!(xxh64(&data, DEFAULT_SEED), xxh64(&data, 0));
        assert_ne!(xxh32(&data, DEFAULT_SEED32), xxh32(&data, 0));
    }
}
