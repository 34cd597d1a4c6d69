//! Owned or borrowed buffer holding one complete value.

use std::borrow::Cow;
use std::fmt;

use crate::options::Options;
use crate::slice::Slice;

/// A finished VelocyPack value that can outlive the [`Builder`] it came
/// from.
///
/// [`Builder`]: crate::Builder
#[derive(Clone)]
pub struct OwnedSlice<'a> {
    buffer: Cow<'a, [u8]>,
    options: &'a Options,
}

impl OwnedSlice<'static> {
    /// Take ownership of an encoded buffer, using the default options.
    #[must_use]
    pub fn from_vec(buffer: Vec<u8>) -> Self {
        Self::from_vec_with_options(buffer, Options::defaults())
    }
}

impl<'a> OwnedSlice<'a> {
    #[must_use]
    pub fn from_vec_with_options(buffer: Vec<u8>, options: &'a Options) -> Self {
        Self {
            buffer: Cow::Owned(buffer),
            options,
        }
    }

    /// Wrap borrowed bytes without copying.
    #[must_use]
    pub fn borrowed(slice: &Slice<'a>) -> Self {
        Self {
            buffer: Cow::Borrowed(slice.as_bytes()),
            options: slice.options(),
        }
    }

    /// Copy a slice's bytes into an owned buffer.
    #[must_use]
    pub fn copied(slice: &Slice<'a>) -> Self {
        Self {
            buffer: Cow::Owned(slice.as_bytes().to_vec()),
            options: slice.options(),
        }
    }

    /// View of the held value.
    #[must_use]
    pub fn slice(&self) -> Slice<'_> {
        Slice::with_options(&self.buffer, self.options)
    }

    /// Get the underlying buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[must_use]
    pub fn is_owned(&self) -> bool {
        matches!(self.buffer, Cow::Owned(_))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buffer.into_owned()
    }
}

/// Byte equality of the held values; options are not compared.
impl PartialEq for OwnedSlice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.buffer == other.buffer
    }
}

impl Eq for OwnedSlice<'_> {}

impl fmt::Debug for OwnedSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedSlice")
            .field("value", &self.slice())
            .field("owned", &self.is_owned())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn borrowed_and_copied() {
        let data = [0x43, b'a', b'b', b'c', 0xff];
        let slice = Slice::new(&data);
        let borrowed = OwnedSlice::borrowed(&slice);
        assert!(!borrowed.is_owned());
        assert_eq!(borrowed.as_bytes(), &data[..4]);

        let copied = OwnedSlice::copied(&slice);
        assert!(copied.is_owned());
        assert_eq!(copied.slice(), slice);
        assert_eq!(copied.into_vec(), data[..4].to_vec());
    }

    #[test]
    fn from_vec() {
        let owned = OwnedSlice::from_vec(vec![0x1a]);
        assert!(owned.slice().get_bool().unwrap());
        assert_eq!(format!("{owned:?}"), "OwnedSlice { value: Slice::Bool(true), owned: true }");
    }
}
