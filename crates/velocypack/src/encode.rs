//! Encoding utilities for writing VelocyPack scalars.
//!
//! # The `Encode` Trait
//!
//! The [`Encode`] trait writes a value's head byte and payload into a buffer.
//! It is implemented for the Rust types that map directly to VelocyPack
//! types:
//!
//! | Rust Type            | VelocyPack Type          |
//! |----------------------|--------------------------|
//! | `Null`, `Option<T>`  | null                     |
//! | `bool`               | false / true             |
//! | `i8`..`i64`, `isize` | SmallInt / Int           |
//! | `u8`..`u64`, `usize` | SmallInt / UInt          |
//! | `f64`, `f32`         | double                   |
//! | `&str`, `String`     | string                   |
//! | `Binary`             | binary                   |
//! | `UtcDate`            | utc-date                 |
//! | `MinKey`, `MaxKey`   | min-key / max-key        |
//! | `Slice`              | copied verbatim          |
//!
//! Compounds are written through [`Builder`](crate::Builder).

use crate::head::{self, Head, MAX_SHORT_STRING, minimal_int_width, minimal_uint_encoding};
use crate::slice::Slice;

/// Trait for values that can be written as VelocyPack.
pub trait Encode {
    /// Append the encoded value to `out`.
    fn encode_into(&self, out: &mut Vec<u8>);

    /// Encode into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_into(&self, out: &mut Vec<u8>) {
        (**self).encode_into(out);
    }
}

/// Null value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Null;

impl Encode for Null {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(head::NULL);
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Some(value) => value.encode_into(out),
            None => out.push(head::NULL),
        }
    }
}

/// Minimum key, sorts before every other value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinKey;

impl Encode for MinKey {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(head::MIN_KEY);
    }
}

/// Maximum key, sorts after every other value.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxKey;

impl Encode for MaxKey {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(head::MAX_KEY);
    }
}

impl Encode for bool {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(Head::encode_bool(*self));
    }
}

macro_rules! impl_encode_signed {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode_into(&self, out: &mut Vec<u8>) {
                write_int(out, *self as i64);
            }
        }
    )*};
}

macro_rules! impl_encode_unsigned {
    ($($t:ty),*) => {$(
        impl Encode for $t {
            fn encode_into(&self, out: &mut Vec<u8>) {
                write_uint(out, *self as u64);
            }
        }
    )*};
}

impl_encode_signed!(i8, i16, i32, i64, isize);
impl_encode_unsigned!(u8, u16, u32, u64, usize);

impl Encode for f64 {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_double(*self));
    }
}

impl Encode for f32 {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_double(f64::from(*self)));
    }
}

impl Encode for str {
    fn encode_into(&self, out: &mut Vec<u8>) {
        write_string(out, self.as_bytes());
    }
}

impl Encode for String {
    fn encode_into(&self, out: &mut Vec<u8>) {
        write_string(out, self.as_bytes());
    }
}

/// Binary data wrapper (to distinguish from strings).
#[derive(Debug, Clone, Copy)]
pub struct Binary<'a>(pub &'a [u8]);

impl Encode for Binary<'_> {
    fn encode_into(&self, out: &mut Vec<u8>) {
        write_binary(out, self.0);
    }
}

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtcDate(pub i64);

impl Encode for UtcDate {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&encode_utc_date(self.0));
    }
}

/// A complete value, copied byte for byte.
impl Encode for Slice<'_> {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

/// Encode a double (9 bytes).
#[inline]
#[must_use]
pub fn encode_double(value: f64) -> [u8; 9] {
    let mut buf = [0u8; 9];
    buf[0] = head::DOUBLE;
    buf[1..9].copy_from_slice(&value.to_le_bytes());
    buf
}

/// Encode a UTC date (9 bytes).
#[inline]
#[must_use]
pub fn encode_utc_date(millis: i64) -> [u8; 9] {
    let mut buf = [0u8; 9];
    buf[0] = head::UTC_DATE;
    buf[1..9].copy_from_slice(&millis.to_le_bytes());
    buf
}

/// Write a signed integer in its narrowest form: SmallInt for -6..=9,
/// otherwise Int with the fewest two's-complement bytes.
pub fn write_int(out: &mut Vec<u8>, value: i64) {
    if (-6..=9).contains(&value) {
        out.push(Head::encode_small_int(value));
        return;
    }
    let width = minimal_int_width(value);
    out.push(Head::encode_int(width));
    out.extend_from_slice(&value.to_le_bytes()[..width]);
}

/// Write an unsigned integer in its narrowest form: SmallInt up to 9,
/// otherwise UInt with the fewest bytes.
pub fn write_uint(out: &mut Vec<u8>, value: u64) {
    if value <= 9 {
        out.push(Head::encode_small_int(value as i64));
        return;
    }
    let (width, bytes) = minimal_uint_encoding(value);
    out.push(Head::encode_uint(width));
    out.extend_from_slice(&bytes[..width]);
}

/// Write a string. Up to 126 bytes use a short head carrying the length,
/// longer strings use `0xbf` and an 8-byte length.
pub fn write_string(out: &mut Vec<u8>, bytes: &[u8]) {
    let len = bytes.len();
    if len <= MAX_SHORT_STRING {
        out.push(Head::encode_short_string(len));
    } else {
        out.push(head::LONG_STRING);
        out.extend_from_slice(&(len as u64).to_le_bytes());
    }
    out.extend_from_slice(bytes);
}

/// Write a binary blob with the narrowest length field.
pub fn write_binary(out: &mut Vec<u8>, bytes: &[u8]) {
    let (width, len_bytes) = minimal_uint_encoding(bytes.len() as u64);
    out.push(Head::encode_binary(width));
    out.extend_from_slice(&len_bytes[..width]);
    out.extend_from_slice(bytes);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_ints() {
        assert_eq!(0i64.encode(), vec![0x30]);
        assert_eq!(9i64.encode(), vec![0x39]);
        assert_eq!((-1i64).encode(), vec![0x3f]);
        assert_eq!((-6i64).encode(), vec![0x3a]);
        assert_eq!(5u64.encode(), vec![0x35]);
    }

    #[test]
    fn test_minimal_width() {
        assert_eq!((-7i64).encode(), vec![0x20, 0xf9]);
        assert_eq!(10i64.encode(), vec![0x20, 0x0a]);
        assert_eq!(300i64.encode(), vec![0x21, 0x2c, 0x01]);
        assert_eq!(1234u64.encode(), vec![0x29, 0xd2, 0x04]);
        assert_eq!(255u64.encode(), vec![0x28, 0xff]);
        assert_eq!(128i64.encode(), vec![0x21, 0x80, 0x00]);
        assert_eq!((-128i64).encode(), vec![0x20, 0x80]);

        let mut expected = vec![0x27];
        expected.extend_from_slice(&i64::MAX.to_le_bytes());
        assert_eq!(i64::MAX.encode(), expected);

        let mut expected = vec![0x2f];
        expected.extend_from_slice(&u64::MAX.to_le_bytes());
        assert_eq!(u64::MAX.encode(), expected);
    }

    #[test]
    fn test_double() {
        assert_eq!(
            2.3f64.encode(),
            vec![0x1b, 0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x02, 0x40]
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!("".encode(), vec![0x40]);
        assert_eq!("abc".encode(), vec![0x43, b'a', b'b', b'c']);

        let s = "x".repeat(126);
        assert_eq!(s.encode()[0], 0xbe);

        let s = "x".repeat(127);
        let encoded = s.encode();
        assert_eq!(encoded[0], 0xbf);
        assert_eq!(&encoded[1..9], &127u64.to_le_bytes());
        assert_eq!(encoded.len(), 1 + 8 + 127);
    }

    #[test]
    fn test_binary_and_specials() {
        assert_eq!(
            Binary(&[0xaa, 0xbb]).encode(),
            vec![0xc0, 0x02, 0xaa, 0xbb]
        );
        let big = vec![0u8; 300];
        let encoded = Binary(&big).encode();
        assert_eq!(&encoded[..3], &[0xc1, 0x2c, 0x01]);

        assert_eq!(Null.encode(), vec![0x18]);
        assert_eq!(None::<i64>.encode(), vec![0x18]);
        assert_eq!(true.encode(), vec![0x1a]);
        assert_eq!(false.encode(), vec![0x19]);
        assert_eq!(MinKey.encode(), vec![0x1e]);
        assert_eq!(MaxKey.encode(), vec![0x1f]);
        assert_eq!(UtcDate(-1).encode(), {
            let mut v = vec![0x1c];
            v.extend_from_slice(&[0xff; 8]);
            v
        });
    }
}
