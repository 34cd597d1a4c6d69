//! Non-owning string views over VelocyPack strings.
//!
//! [`StringRef`] is a plain borrowed byte string. [`HashedStringRef`] also
//! carries a precomputed xxHash32 so it can serve as a cheap map key: two
//! refs are compared by their packed `(length, hash)` tag first and by their
//! bytes only when the tags agree.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::{Error, Result};
use crate::hash::{DEFAULT_SEED32, xxh32};
use crate::slice::Slice;

/// Borrowed byte string, usually the payload of a String value.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringRef<'a> {
    data: &'a [u8],
}

impl<'a> StringRef<'a> {
    #[inline]
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Borrow the payload of a String slice.
    pub fn from_slice(slice: &Slice<'a>) -> Result<Self> {
        slice.get_string_bytes().map(Self::new)
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn as_str(&self) -> Result<&'a str> {
        std::str::from_utf8(self.data).map_err(|_| Error::InvalidUtf8)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at `index`.
    pub fn at(&self, index: usize) -> Result<u8> {
        self.data
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                index,
                length: self.len(),
            })
    }

    #[must_use]
    pub fn front(&self) -> Option<u8> {
        self.data.first().copied()
    }

    #[must_use]
    pub fn back(&self) -> Option<u8> {
        self.data.last().copied()
    }

    /// Up to `count` bytes starting at `pos`. `pos` past the end fails.
    pub fn substr(&self, pos: usize, count: usize) -> Result<StringRef<'a>> {
        if pos > self.len() {
            return Err(Error::IndexOutOfBounds {
                index: pos,
                length: self.len(),
            });
        }
        let end = pos.saturating_add(count).min(self.len());
        Ok(Self::new(&self.data[pos..end]))
    }

    /// Position of the first occurrence of `byte` at or after `from`.
    #[must_use]
    pub fn find(&self, byte: u8, from: usize) -> Option<usize> {
        self.data
            .get(from..)?
            .iter()
            .position(|&b| b == byte)
            .map(|p| p + from)
    }

    /// Position of the last occurrence of `byte`.
    #[must_use]
    pub fn rfind(&self, byte: u8) -> Option<usize> {
        self.data.iter().rposition(|&b| b == byte)
    }

    #[must_use]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.data.starts_with(prefix)
    }

    #[must_use]
    pub fn hash32(&self) -> u32 {
        xxh32(self.data, DEFAULT_SEED32)
    }

    #[must_use]
    pub fn to_hashed(&self) -> Result<HashedStringRef<'a>> {
        HashedStringRef::new(self.data)
    }
}

impl<'a> From<&'a str> for StringRef<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for StringRef<'a> {
    fn from(data: &'a [u8]) -> Self {
        Self::new(data)
    }
}

impl PartialEq<str> for StringRef<'_> {
    fn eq(&self, other: &str) -> bool {
        self.data == other.as_bytes()
    }
}

impl PartialEq<&str> for StringRef<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.data == other.as_bytes()
    }
}

impl fmt::Debug for StringRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StringRef({:?})", String::from_utf8_lossy(self.data))
    }
}

impl fmt::Display for StringRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.data))
    }
}

/// Borrowed byte string with a cached xxHash32. Length is limited to
/// `u32::MAX` bytes.
#[derive(Clone, Copy)]
pub struct HashedStringRef<'a> {
    data: &'a [u8],
    length: u32,
    hash: u32,
}

impl<'a> HashedStringRef<'a> {
    pub fn new(data: &'a [u8]) -> Result<Self> {
        let length = checked_length(data.len())?;
        Ok(Self {
            data,
            length,
            hash: xxh32(data, DEFAULT_SEED32),
        })
    }

    /// Borrow the payload of a String slice.
    pub fn from_slice(slice: &Slice<'a>) -> Result<Self> {
        Self::new(slice.get_string_bytes()?)
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    pub fn as_str(&self) -> Result<&'a str> {
        std::str::from_utf8(self.data).map_err(|_| Error::InvalidUtf8)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.length as usize
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Cached xxHash32 of the bytes.
    #[inline]
    #[must_use]
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Length in the upper and hash in the lower 32 bits.
    #[inline]
    #[must_use]
    pub fn tag(&self) -> u64 {
        (u64::from(self.length) << 32) | u64::from(self.hash)
    }

    #[must_use]
    pub fn string_ref(&self) -> StringRef<'a> {
        StringRef::new(self.data)
    }

    /// Up to `count` bytes starting at `pos`, rehashed.
    pub fn substr(&self, pos: usize, count: usize) -> Result<HashedStringRef<'a>> {
        self.string_ref().substr(pos, count)?.to_hashed()
    }
}

fn checked_length(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::IndexOutOfBounds {
        index: len,
        length: u32::MAX as usize,
    })
}

impl PartialEq for HashedStringRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.tag() == other.tag() && self.data == other.data
    }
}

impl Eq for HashedStringRef<'_> {}

impl PartialEq<StringRef<'_>> for HashedStringRef<'_> {
    fn eq(&self, other: &StringRef<'_>) -> bool {
        self.data == other.as_bytes()
    }
}

impl Hash for HashedStringRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.tag());
    }
}

impl PartialOrd for HashedStringRef<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Byte order, like [`StringRef`].
impl Ord for HashedStringRef<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.data.cmp(other.data)
    }
}

impl fmt::Debug for HashedStringRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "HashedStringRef({:?}, hash={:#010x})",
            String::from_utf8_lossy(self.data),
            self.hash
        )
    }
}

impl fmt::Display for HashedStringRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.data))
    }
}
