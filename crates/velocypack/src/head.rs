//! Head byte tables for VelocyPack values.
//!
//! Every value starts with a one-byte head. The head alone selects the value
//! type and, for arrays and objects, the byte width of the length, count and
//! offset fields. All lookups here are constant tables; nothing is computed
//! from the payload.

/// Value type selected by the head byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    None,
    /// Reserved head bytes and the explicit illegal marker `0x17`.
    Illegal,
    Null,
    Bool,
    Array,
    Object,
    Double,
    UtcDate,
    External,
    MinKey,
    MaxKey,
    Int,
    UInt,
    SmallInt,
    String,
    Binary,
    Bcd,
    Custom,
}

impl ValueType {
    /// Look up the value type of a head byte.
    #[inline]
    #[must_use]
    pub fn from_head(head: u8) -> Self {
        TYPE_MAP[head as usize]
    }

    /// Get the type name as a string (for error messages).
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueType::None => "none",
            ValueType::Illegal => "illegal",
            ValueType::Null => "null",
            ValueType::Bool => "bool",
            ValueType::Array => "array",
            ValueType::Object => "object",
            ValueType::Double => "double",
            ValueType::UtcDate => "utc-date",
            ValueType::External => "external",
            ValueType::MinKey => "min-key",
            ValueType::MaxKey => "max-key",
            ValueType::Int => "int",
            ValueType::UInt => "uint",
            ValueType::SmallInt => "smallint",
            ValueType::String => "string",
            ValueType::Binary => "binary",
            ValueType::Bcd => "bcd",
            ValueType::Custom => "custom",
        }
    }

    const fn classify(head: u8) -> Self {
        match head {
            0x00 => ValueType::None,
            0x01..=0x09 | 0x13 => ValueType::Array,
            0x0a..=0x12 | 0x14 => ValueType::Object,
            0x15..=0x17 => ValueType::Illegal,
            0x18 => ValueType::Null,
            0x19 | 0x1a => ValueType::Bool,
            0x1b => ValueType::Double,
            0x1c => ValueType::UtcDate,
            0x1d => ValueType::External,
            0x1e => ValueType::MinKey,
            0x1f => ValueType::MaxKey,
            0x20..=0x27 => ValueType::Int,
            0x28..=0x2f => ValueType::UInt,
            0x30..=0x3f => ValueType::SmallInt,
            0x40..=0xbf => ValueType::String,
            0xc0..=0xc7 => ValueType::Binary,
            0xc8..=0xd7 => ValueType::Bcd,
            0xd8..=0xef => ValueType::Illegal,
            0xf0..=0xff => ValueType::Custom,
        }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Head byte to value type, one entry per possible byte.
static TYPE_MAP: [ValueType; 256] = {
    let mut map = [ValueType::Illegal; 256];
    let mut i = 0;
    while i < 256 {
        map[i] = ValueType::classify(i as u8);
        i += 1;
    }
    map
};

/// Byte width of the length/count/offset fields for heads `0x00..=0x1f`.
const WIDTH_MAP: [u8; 32] = [
    0, // 0x00 none
    1, // 0x01 empty array
    1, 2, 4, 8, // 0x02-0x05 array without index table
    1, 2, 4, 8, // 0x06-0x09 array with index table
    1, // 0x0a empty object
    1, 2, 4, 8, // 0x0b-0x0e object, sorted index table
    1, 2, 4, 8, // 0x0f-0x12 object, unsorted index table
    0, 0, // 0x13-0x14 compact array/object (varint)
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0x15-0x1f
];

/// Smallest possible offset of the first member for heads `0x00..=0x1f`.
///
/// Encoders may leave zero padding after the header fields, so the real
/// offset is found by probing for the first non-zero byte.
const FIRST_SUB_MAP: [u8; 32] = [
    0, // 0x00 none
    1, // 0x01 empty array
    2, 3, 5, 9, // 0x02-0x05
    3, 5, 9, 9, // 0x06-0x09
    1, // 0x0a empty object
    3, 5, 9, 9, // 0x0b-0x0e
    3, 5, 9, 9, // 0x0f-0x12
    0, 0, // 0x13-0x14, dynamic
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, // 0x15-0x1f
];

// Head bytes used by the encoder.
pub const NONE: u8 = 0x00;
pub const EMPTY_ARRAY: u8 = 0x01;
pub const ARRAY_NO_INDEX: u8 = 0x02;
pub const ARRAY_INDEXED: u8 = 0x06;
pub const EMPTY_OBJECT: u8 = 0x0a;
pub const OBJECT_SORTED: u8 = 0x0b;
pub const OBJECT_UNSORTED: u8 = 0x0f;
pub const COMPACT_ARRAY: u8 = 0x13;
pub const COMPACT_OBJECT: u8 = 0x14;
pub const ILLEGAL: u8 = 0x17;
pub const NULL: u8 = 0x18;
pub const FALSE: u8 = 0x19;
pub const TRUE: u8 = 0x1a;
pub const DOUBLE: u8 = 0x1b;
pub const UTC_DATE: u8 = 0x1c;
pub const EXTERNAL: u8 = 0x1d;
pub const MIN_KEY: u8 = 0x1e;
pub const MAX_KEY: u8 = 0x1f;
pub const INT_BASE: u8 = 0x1f;
pub const UINT_BASE: u8 = 0x27;
pub const SMALL_INT_ZERO: u8 = 0x30;
pub const SHORT_STRING: u8 = 0x40;
pub const LONG_STRING: u8 = 0xbf;
pub const BINARY_BASE: u8 = 0xbf;

/// Longest string that still fits into a short-string head.
pub const MAX_SHORT_STRING: usize = 126;

/// Parsed head byte - cheaply constructed, no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Head(u8);

impl Head {
    #[inline]
    #[must_use]
    pub const fn from_byte(b: u8) -> Self {
        Head(b)
    }

    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn value_type(self) -> ValueType {
        ValueType::from_head(self.0)
    }

    // --- Arrays and objects ---

    /// Empty array or empty object marker.
    #[inline]
    #[must_use]
    pub const fn is_empty_compound(self) -> bool {
        self.0 == EMPTY_ARRAY || self.0 == EMPTY_OBJECT
    }

    #[inline]
    #[must_use]
    pub const fn is_compact(self) -> bool {
        self.0 == COMPACT_ARRAY || self.0 == COMPACT_OBJECT
    }

    /// Array whose members share one byte size and carry no index table.
    #[inline]
    #[must_use]
    pub const fn is_array_without_index(self) -> bool {
        self.0 >= 0x02 && self.0 <= 0x05
    }

    /// Array or object with an explicit offset table at its tail.
    #[inline]
    #[must_use]
    pub const fn has_index_table(self) -> bool {
        (self.0 >= 0x06 && self.0 <= 0x09) || (self.0 >= 0x0b && self.0 <= 0x12)
    }

    #[inline]
    #[must_use]
    pub const fn is_sorted_object(self) -> bool {
        self.0 >= 0x0b && self.0 <= 0x0e
    }

    /// Width (1, 2, 4 or 8) of the byte length, item count and offset fields.
    /// Only meaningful for non-compact, non-empty compounds.
    #[inline]
    #[must_use]
    pub fn offset_width(self) -> usize {
        WIDTH_MAP.get(self.0 as usize).copied().unwrap_or(0) as usize
    }

    /// Minimal offset of the first member, before padding is considered.
    #[inline]
    #[must_use]
    pub fn first_sub_hint(self) -> usize {
        FIRST_SUB_MAP.get(self.0 as usize).copied().unwrap_or(0) as usize
    }

    // --- Numbers ---

    /// Payload width (1-8) of an Int or UInt head.
    #[inline]
    #[must_use]
    pub const fn int_width(self) -> usize {
        if self.0 >= 0x28 {
            (self.0 - UINT_BASE) as usize
        } else {
            (self.0 - INT_BASE) as usize
        }
    }

    /// Value of a SmallInt head (-6..=9).
    #[inline]
    #[must_use]
    pub const fn small_int_value(self) -> i64 {
        if self.0 <= 0x39 {
            (self.0 - SMALL_INT_ZERO) as i64
        } else {
            self.0 as i64 - 0x40
        }
    }

    // --- Strings, binaries, BCD, custom ---

    /// Length embedded in a short-string head.
    #[inline]
    #[must_use]
    pub const fn short_string_len(self) -> usize {
        (self.0 - SHORT_STRING) as usize
    }

    /// Width (1-8) of the explicit length field of a Binary head.
    #[inline]
    #[must_use]
    pub const fn binary_len_width(self) -> usize {
        (self.0 - BINARY_BASE) as usize
    }

    /// Width (1-8) of the mantissa length field of a BCD head.
    #[inline]
    #[must_use]
    pub const fn bcd_len_width(self) -> usize {
        if self.0 <= 0xcf {
            (self.0 - 0xc7) as usize
        } else {
            (self.0 - 0xcf) as usize
        }
    }

    // --- Encoding ---

    /// Encode a bool head.
    #[inline]
    #[must_use]
    pub const fn encode_bool(value: bool) -> u8 {
        if value { TRUE } else { FALSE }
    }

    /// Encode a SmallInt head. `value` must be in -6..=9.
    #[inline]
    #[must_use]
    pub const fn encode_small_int(value: i64) -> u8 {
        if value >= 0 {
            SMALL_INT_ZERO + value as u8
        } else {
            (0x40 + value) as u8
        }
    }

    /// Encode an Int head for a payload of `width` bytes (1-8).
    #[inline]
    #[must_use]
    pub const fn encode_int(width: usize) -> u8 {
        INT_BASE + width as u8
    }

    /// Encode a UInt head for a payload of `width` bytes (1-8).
    #[inline]
    #[must_use]
    pub const fn encode_uint(width: usize) -> u8 {
        UINT_BASE + width as u8
    }

    /// Encode a short-string head (`len` up to 126).
    #[inline]
    #[must_use]
    pub const fn encode_short_string(len: usize) -> u8 {
        SHORT_STRING + len as u8
    }

    /// Encode a Binary head whose length field is `width` bytes (1-8).
    #[inline]
    #[must_use]
    pub const fn encode_binary(width: usize) -> u8 {
        BINARY_BASE + width as u8
    }

    /// Adjust a base compound head (`0x02`, `0x06`, `0x0b`, `0x0f`) to the
    /// given field width.
    #[inline]
    #[must_use]
    pub const fn encode_compound(base: u8, width: usize) -> u8 {
        match width {
            1 => base,
            2 => base + 1,
            4 => base + 2,
            _ => base + 3,
        }
    }
}

/// Read a little-endian unsigned integer of up to 8 bytes.
#[inline]
#[must_use]
pub fn read_uint_le(bytes: &[u8]) -> u64 {
    debug_assert!(bytes.len() <= 8);
    let mut buf = [0u8; 8];
    buf[..bytes.len()].copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}

/// Read a little-endian two's complement integer of 1-8 bytes.
#[inline]
#[must_use]
pub fn read_int_le(bytes: &[u8]) -> i64 {
    let width = bytes.len();
    let raw = read_uint_le(bytes);
    if width == 8 {
        return raw as i64;
    }
    let shift = 64 - 8 * width as u32;
    ((raw << shift) as i64) >> shift
}

/// Compute minimal byte count needed to encode an unsigned value.
/// Returns (`byte_count`, bytes) where `byte_count` is 1-8.
#[must_use]
pub fn minimal_uint_encoding(value: u64) -> (usize, [u8; 8]) {
    let n = 8 - (value.leading_zeros() / 8) as usize;
    (n.max(1), value.to_le_bytes())
}

/// Compute the minimal two's complement width (1-8) of a signed value.
#[must_use]
pub fn minimal_int_width(value: i64) -> usize {
    // Bits needed besides the sign bit.
    let magnitude = (if value < 0 { !value } else { value }) as u64;
    let bits = 64 - magnitude.leading_zeros() as usize + 1;
    bits.div_ceil(8).clamp(1, 8)
}

/// Number of bytes a value occupies in the 7-bit varint encoding.
#[must_use]
pub fn varint_len(mut value: u64) -> usize {
    let mut len = 1;
    while value >= 0x80 {
        value >>= 7;
        len += 1;
    }
    len
}

/// Append a varint, low 7-bit group first.
pub fn write_varint(out: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        out.push((value & 0x7f) as u8 | 0x80);
        value >>= 7;
    }
    out.push(value as u8);
}

/// Append a varint that is read back to front: the last byte holds the
/// lowest 7-bit group.
pub fn write_varint_reversed(out: &mut Vec<u8>, value: u64) {
    let at = out.len();
    write_varint(out, value);
    out[at..].reverse();
}

/// Read a varint starting at `bytes[0]`.
#[must_use]
pub fn read_varint(bytes: &[u8]) -> u64 {
    let mut value = 0u64;
    let mut shift = 0;
    for &b in bytes {
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 {
            break;
        }
        shift += 7;
    }
    value
}

/// Read a varint stored back to front whose lowest group is `bytes[end]`.
#[must_use]
pub fn read_varint_reversed(bytes: &[u8], end: usize) -> u64 {
    let mut value = 0u64;
    let mut shift = 0;
    let mut pos = end;
    loop {
        let b = bytes[pos];
        value |= u64::from(b & 0x7f) << shift;
        if b & 0x80 == 0 || pos == 0 {
            break;
        }
        shift += 7;
        pos -= 1;
    }
    value
}

/// Byte size of a custom value using the self-describing layout of the
/// `0xf0..=0xff` head range.
#[must_use]
pub fn custom_byte_size(data: &[u8]) -> usize {
    let head = data[0];
    match head {
        0xf0 => 2,
        0xf1 => 3,
        0xf2 => 5,
        0xf3 => 9,
        0xf4..=0xf6 => 1 + 1 + read_uint_le(&data[1..2]) as usize,
        0xf7..=0xf9 => 1 + 2 + read_uint_le(&data[1..3]) as usize,
        0xfa..=0xfc => 1 + 4 + read_uint_le(&data[1..5]) as usize,
        _ => 1 + 8 + read_uint_le(&data[1..9]) as usize,
    }
}
