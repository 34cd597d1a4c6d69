//! Zero-copy read view over VelocyPack data.
//!
//! A [`Slice`] borrows the encoded bytes and reads everything on demand from
//! the head byte and the stored length fields. Nothing is parsed up front and
//! nothing is allocated.
//!
//! # `TypedValue` Access
//!
//! Use [`Slice::typed()`] to get an enum for pattern matching:
//!
//! ```
//! use velocypack::slice::{Slice, TypedValue};
//!
//! let data = [0x29, 0xd2, 0x04]; // uint(1234)
//! let slice = Slice::new(&data);
//!
//! match slice.typed().unwrap() {
//!     TypedValue::UInt(n) => assert_eq!(n, 1234),
//!     _ => panic!("expected uint"),
//! }
//! ```

use std::fmt;

use crate::array::ArrayIterator;
use crate::error::{Error, Result};
use crate::hash::{DEFAULT_SEED, xxh64};
use crate::head::{self, Head, ValueType, read_int_le, read_uint_le, read_varint, varint_len};
use crate::object::{self, ObjectIterator};
use crate::options::Options;

static NONE_BYTES: [u8; 1] = [head::NONE];
static ILLEGAL_BYTES: [u8; 1] = [head::ILLEGAL];
static NULL_BYTES: [u8; 1] = [head::NULL];
static FALSE_BYTES: [u8; 1] = [head::FALSE];
static TRUE_BYTES: [u8; 1] = [head::TRUE];
static ZERO_BYTES: [u8; 1] = [head::SMALL_INT_ZERO];
static EMPTY_ARRAY_BYTES: [u8; 1] = [head::EMPTY_ARRAY];
static EMPTY_OBJECT_BYTES: [u8; 1] = [head::EMPTY_OBJECT];
static MIN_KEY_BYTES: [u8; 1] = [head::MIN_KEY];
static MAX_KEY_BYTES: [u8; 1] = [head::MAX_KEY];

/// A typed view of a value for pattern matching.
#[derive(Debug, Clone, Copy)]
pub enum TypedValue<'a> {
    None,
    Illegal,
    Null,
    Bool(bool),
    Double(f64),
    /// Milliseconds since the Unix epoch.
    UtcDate(i64),
    /// Raw pointer bits of an external value. Never dereferenced.
    External(u64),
    MinKey,
    MaxKey,
    Int(i64),
    UInt(u64),
    SmallInt(i64),
    String(&'a str),
    Binary(&'a [u8]),
    Bcd(Slice<'a>),
    Custom(Slice<'a>),
    Array(Slice<'a>),
    Object(Slice<'a>),
}

/// A zero-copy view of the value whose head byte is `data[0]`.
///
/// `data` may extend past the end of the value; [`Slice::as_bytes`] returns
/// exactly the bytes of this value.
#[derive(Clone, Copy)]
pub struct Slice<'a> {
    data: &'a [u8],
    options: &'a Options,
}

impl<'a> Slice<'a> {
    /// Create a view with the default options. An empty buffer yields the
    /// None slice.
    #[inline]
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_options(data, Options::defaults())
    }

    #[inline]
    #[must_use]
    pub fn with_options(data: &'a [u8], options: &'a Options) -> Self {
        if data.is_empty() {
            return Self {
                data: &NONE_BYTES,
                options,
            };
        }
        Self { data, options }
    }

    // --- Static single-byte values ---

    #[must_use]
    pub fn none() -> Slice<'static> {
        Slice::new(&NONE_BYTES)
    }

    #[must_use]
    pub fn illegal() -> Slice<'static> {
        Slice::new(&ILLEGAL_BYTES)
    }

    #[must_use]
    pub fn null() -> Slice<'static> {
        Slice::new(&NULL_BYTES)
    }

    #[must_use]
    pub fn false_value() -> Slice<'static> {
        Slice::new(&FALSE_BYTES)
    }

    #[must_use]
    pub fn true_value() -> Slice<'static> {
        Slice::new(&TRUE_BYTES)
    }

    #[must_use]
    pub fn zero() -> Slice<'static> {
        Slice::new(&ZERO_BYTES)
    }

    #[must_use]
    pub fn empty_array() -> Slice<'static> {
        Slice::new(&EMPTY_ARRAY_BYTES)
    }

    #[must_use]
    pub fn empty_object() -> Slice<'static> {
        Slice::new(&EMPTY_OBJECT_BYTES)
    }

    #[must_use]
    pub fn min_key() -> Slice<'static> {
        Slice::new(&MIN_KEY_BYTES)
    }

    #[must_use]
    pub fn max_key() -> Slice<'static> {
        Slice::new(&MAX_KEY_BYTES)
    }

    // --- Basic properties ---

    /// The underlying buffer, starting at the head byte.
    #[inline]
    #[must_use]
    pub fn start(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    #[must_use]
    pub fn options(&self) -> &'a Options {
        self.options
    }

    #[inline]
    #[must_use]
    pub fn head(&self) -> u8 {
        self.data[0]
    }

    #[inline]
    #[must_use]
    pub fn value_type(&self) -> ValueType {
        ValueType::from_head(self.head())
    }

    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    /// Exactly the bytes of this value.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.data[..self.byte_size()]
    }

    /// Total byte size of this value, computed from the head byte and the
    /// length fields only.
    #[must_use]
    pub fn byte_size(&self) -> usize {
        let head = Head::from_byte(self.head());
        match head.value_type() {
            ValueType::None
            | ValueType::Illegal
            | ValueType::Null
            | ValueType::Bool
            | ValueType::MinKey
            | ValueType::MaxKey
            | ValueType::SmallInt => 1,
            ValueType::Double | ValueType::UtcDate | ValueType::External => 9,
            ValueType::Int | ValueType::UInt => 1 + head.int_width(),
            ValueType::String => {
                if head.raw() == head::LONG_STRING {
                    1 + 8 + self.read_field(1, 8)
                } else {
                    1 + head.short_string_len()
                }
            }
            ValueType::Binary => {
                let w = head.binary_len_width();
                1 + w + self.read_field(1, w)
            }
            ValueType::Bcd => {
                let w = head.bcd_len_width();
                1 + w + 4 + self.read_field(1, w)
            }
            ValueType::Array | ValueType::Object => {
                if head.is_empty_compound() {
                    1
                } else if head.is_compact() {
                    read_varint(&self.data[1..]) as usize
                } else {
                    self.read_field(1, head.offset_width())
                }
            }
            ValueType::Custom => match &self.options.custom_type_handler {
                Some(handler) => handler.byte_size(self),
                None => head::custom_byte_size(self.data),
            },
        }
    }

    // --- Type predicates ---

    #[inline]
    #[must_use]
    pub fn is_type(&self, value_type: ValueType) -> bool {
        self.value_type() == value_type
    }

    #[must_use]
    pub fn is_none(&self) -> bool {
        self.is_type(ValueType::None)
    }

    #[must_use]
    pub fn is_illegal(&self) -> bool {
        self.is_type(ValueType::Illegal)
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.is_type(ValueType::Null)
    }

    #[must_use]
    pub fn is_bool(&self) -> bool {
        self.is_type(ValueType::Bool)
    }

    #[must_use]
    pub fn is_true(&self) -> bool {
        self.head() == head::TRUE
    }

    #[must_use]
    pub fn is_false(&self) -> bool {
        self.head() == head::FALSE
    }

    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_type(ValueType::Array)
    }

    #[must_use]
    pub fn is_object(&self) -> bool {
        self.is_type(ValueType::Object)
    }

    /// Array or object.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        self.is_array() || self.is_object()
    }

    #[must_use]
    pub fn is_empty_array(&self) -> bool {
        self.head() == head::EMPTY_ARRAY
    }

    #[must_use]
    pub fn is_empty_object(&self) -> bool {
        self.head() == head::EMPTY_OBJECT
    }

    /// Object with a sorted index table.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        Head::from_byte(self.head()).is_sorted_object()
    }

    #[must_use]
    pub fn is_double(&self) -> bool {
        self.is_type(ValueType::Double)
    }

    #[must_use]
    pub fn is_utc_date(&self) -> bool {
        self.is_type(ValueType::UtcDate)
    }

    #[must_use]
    pub fn is_external(&self) -> bool {
        self.is_type(ValueType::External)
    }

    #[must_use]
    pub fn is_min_key(&self) -> bool {
        self.is_type(ValueType::MinKey)
    }

    #[must_use]
    pub fn is_max_key(&self) -> bool {
        self.is_type(ValueType::MaxKey)
    }

    #[must_use]
    pub fn is_int(&self) -> bool {
        self.is_type(ValueType::Int)
    }

    #[must_use]
    pub fn is_uint(&self) -> bool {
        self.is_type(ValueType::UInt)
    }

    #[must_use]
    pub fn is_small_int(&self) -> bool {
        self.is_type(ValueType::SmallInt)
    }

    /// Int, UInt or SmallInt.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        matches!(
            self.value_type(),
            ValueType::Int | ValueType::UInt | ValueType::SmallInt
        )
    }

    /// Any integer type or Double.
    #[must_use]
    pub fn is_number(&self) -> bool {
        self.is_integer() || self.is_double()
    }

    #[must_use]
    pub fn is_string(&self) -> bool {
        self.is_type(ValueType::String)
    }

    #[must_use]
    pub fn is_binary(&self) -> bool {
        self.is_type(ValueType::Binary)
    }

    #[must_use]
    pub fn is_bcd(&self) -> bool {
        self.is_type(ValueType::Bcd)
    }

    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.is_type(ValueType::Custom)
    }

    // --- Scalar accessors ---

    /// Get a typed view of this value for pattern matching.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUtf8` for strings that are not valid UTF-8.
    pub fn typed(&self) -> Result<TypedValue<'a>> {
        Ok(match self.value_type() {
            ValueType::None => TypedValue::None,
            ValueType::Illegal => TypedValue::Illegal,
            ValueType::Null => TypedValue::Null,
            ValueType::Bool => TypedValue::Bool(self.is_true()),
            ValueType::Double => TypedValue::Double(self.read_f64()),
            ValueType::UtcDate => TypedValue::UtcDate(self.read_field(1, 8) as i64),
            ValueType::External => TypedValue::External(read_uint_le(&self.data[1..9])),
            ValueType::MinKey => TypedValue::MinKey,
            ValueType::MaxKey => TypedValue::MaxKey,
            ValueType::Int => TypedValue::Int(self.read_int()),
            ValueType::UInt => TypedValue::UInt(self.read_uint()),
            ValueType::SmallInt => {
                TypedValue::SmallInt(Head::from_byte(self.head()).small_int_value())
            }
            ValueType::String => TypedValue::String(self.get_str()?),
            ValueType::Binary => TypedValue::Binary(self.get_binary()?),
            ValueType::Bcd => TypedValue::Bcd(*self),
            ValueType::Custom => TypedValue::Custom(*self),
            ValueType::Array => TypedValue::Array(*self),
            ValueType::Object => TypedValue::Object(*self),
        })
    }

    pub fn get_bool(&self) -> Result<bool> {
        match self.head() {
            head::TRUE => Ok(true),
            head::FALSE => Ok(false),
            _ => Err(self.expecting("bool")),
        }
    }

    pub fn get_double(&self) -> Result<f64> {
        if !self.is_double() {
            return Err(self.expecting("double"));
        }
        Ok(self.read_f64())
    }

    /// Signed integer value of an Int, SmallInt or (in range) UInt.
    pub fn get_int(&self) -> Result<i64> {
        match self.value_type() {
            ValueType::Int => Ok(self.read_int()),
            ValueType::SmallInt => Ok(Head::from_byte(self.head()).small_int_value()),
            ValueType::UInt => i64::try_from(self.read_uint()).map_err(|_| Error::NumberOutOfRange),
            _ => Err(self.expecting("int")),
        }
    }

    /// Unsigned integer value of a UInt or a non-negative Int/SmallInt.
    pub fn get_uint(&self) -> Result<u64> {
        match self.value_type() {
            ValueType::UInt => Ok(self.read_uint()),
            ValueType::Int => u64::try_from(self.read_int()).map_err(|_| Error::NumberOutOfRange),
            ValueType::SmallInt => u64::try_from(Head::from_byte(self.head()).small_int_value())
                .map_err(|_| Error::NumberOutOfRange),
            _ => Err(self.expecting("uint")),
        }
    }

    pub fn get_small_int(&self) -> Result<i64> {
        match self.value_type() {
            ValueType::SmallInt | ValueType::Int | ValueType::UInt => self.get_int(),
            _ => Err(self.expecting("smallint")),
        }
    }

    /// Milliseconds since the Unix epoch.
    pub fn get_utc_date(&self) -> Result<i64> {
        if !self.is_utc_date() {
            return Err(self.expecting("utc-date"));
        }
        Ok(self.read_field(1, 8) as i64)
    }

    /// Raw pointer bits of an External value.
    pub fn get_external(&self) -> Result<u64> {
        if !self.is_external() {
            return Err(self.expecting("external"));
        }
        Ok(read_uint_le(&self.data[1..9]))
    }

    /// Convert any numeric value to `T`, failing with
    /// `Error::NumberOutOfRange` if `T` cannot hold it. Doubles are truncated
    /// toward zero for integer targets.
    pub fn get_number<T: FromNumber>(&self) -> Result<T> {
        let converted = match self.value_type() {
            ValueType::Int => T::from_i64(self.read_int()),
            ValueType::SmallInt => T::from_i64(Head::from_byte(self.head()).small_int_value()),
            ValueType::UInt => T::from_u64(self.read_uint()),
            ValueType::Double => T::from_f64(self.read_f64()),
            _ => return Err(self.expecting("numeric type")),
        };
        converted.ok_or(Error::NumberOutOfRange)
    }

    /// Raw bytes of a string value.
    pub fn get_string_bytes(&self) -> Result<&'a [u8]> {
        let head = self.head();
        match head {
            0x40..=0xbe => {
                let len = Head::from_byte(head).short_string_len();
                Ok(&self.data[1..1 + len])
            }
            head::LONG_STRING => {
                let len = self.read_field(1, 8);
                Ok(&self.data[9..9 + len])
            }
            _ => Err(self.expecting("string")),
        }
    }

    /// String value as `&str`.
    pub fn get_str(&self) -> Result<&'a str> {
        std::str::from_utf8(self.get_string_bytes()?).map_err(|_| Error::InvalidUtf8)
    }

    pub fn copy_string(&self) -> Result<String> {
        self.get_str().map(str::to_owned)
    }

    pub fn get_string_length(&self) -> Result<usize> {
        self.get_string_bytes().map(<[u8]>::len)
    }

    pub fn get_binary(&self) -> Result<&'a [u8]> {
        if !self.is_binary() {
            return Err(self.expecting("binary"));
        }
        let w = Head::from_byte(self.head()).binary_len_width();
        let len = self.read_field(1, w);
        Ok(&self.data[1 + w..1 + w + len])
    }

    pub fn get_binary_length(&self) -> Result<usize> {
        self.get_binary().map(<[u8]>::len)
    }

    // --- Arrays and objects ---

    /// Number of members of an array or key/value pairs of an object.
    pub fn length(&self) -> Result<usize> {
        if !self.is_compound() {
            return Err(self.expecting("array or object"));
        }
        Ok(self.compound_length())
    }

    /// Array member at `index`.
    pub fn at(&self, index: usize) -> Result<Slice<'a>> {
        if !self.is_array() {
            return Err(self.expecting("array"));
        }
        let n = self.compound_length();
        if index >= n {
            return Err(Error::IndexOutOfBounds { index, length: n });
        }
        Ok(self.at_offset(self.entry_offset(index, n)))
    }

    /// Key of the object entry at `index`, in index table order.
    pub fn key_at(&self, index: usize) -> Result<Slice<'a>> {
        if !self.is_object() {
            return Err(self.expecting("object"));
        }
        let n = self.compound_length();
        if index >= n {
            return Err(Error::IndexOutOfBounds { index, length: n });
        }
        Ok(self.at_offset(self.entry_offset(index, n)))
    }

    /// Value of the object entry at `index`, in index table order.
    pub fn value_at(&self, index: usize) -> Result<Slice<'a>> {
        let key = self.key_at(index)?;
        Ok(key.following())
    }

    /// Look up an attribute. An absent key yields the None slice.
    pub fn get(&self, attribute: &str) -> Result<Slice<'a>> {
        if !self.is_object() {
            return Err(self.expecting("object"));
        }
        Ok(object::find_value(self, attribute.as_bytes()).unwrap_or_else(|| Slice::none()))
    }

    /// Walk a path of attribute names. Returns the None slice as soon as a
    /// segment is missing or an intermediate value is not an object.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Result<Slice<'a>> {
        let (first, rest) = path.split_first().ok_or(Error::InvalidAttributePath)?;
        let mut current = self.get(first.as_ref())?;
        for segment in rest {
            if !current.is_object() {
                return Ok(Slice::none());
            }
            current = current.get(segment.as_ref())?;
        }
        Ok(current)
    }

    pub fn has_key(&self, attribute: &str) -> Result<bool> {
        Ok(!self.get(attribute)?.is_none())
    }

    pub fn iter_array(&self) -> Result<ArrayIterator<'a>> {
        if !self.is_array() {
            return Err(self.expecting("array"));
        }
        Ok(ArrayIterator::new(*self))
    }

    pub fn iter_object(&self) -> Result<ObjectIterator<'a>> {
        if !self.is_object() {
            return Err(self.expecting("object"));
        }
        Ok(ObjectIterator::new(*self))
    }

    // --- Hashing and comparison ---

    /// Hash of the encoded bytes. Equal encodings hash alike; equal values
    /// with different encodings (e.g. Int 5 vs Double 5.0) need not.
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash_with_seed(DEFAULT_SEED)
    }

    #[must_use]
    pub fn hash_with_seed(&self, seed: u64) -> u64 {
        xxh64(self.as_bytes(), seed)
    }

    /// Hash of a string value. Same result as [`Slice::hash`].
    pub fn hash_string(&self) -> Result<u64> {
        if !self.is_string() {
            return Err(self.expecting("string"));
        }
        Ok(self.hash())
    }

    /// Hash by logical value. Numbers with the same numeric value hash alike
    /// in any encoding, and object hashes ignore key order.
    #[must_use]
    pub fn normalized_hash(&self) -> u64 {
        self.normalized_hash_with_seed(DEFAULT_SEED)
    }

    #[must_use]
    pub fn normalized_hash_with_seed(&self, seed: u64) -> u64 {
        if self.is_number() {
            let value = self.get_number::<f64>().unwrap_or(0.0);
            // -0.0 and 0.0 are the same number.
            let value = if value == 0.0 { 0.0 } else { value };
            return xxh64(&value.to_bits().to_le_bytes(), seed);
        }
        match self.value_type() {
            ValueType::Array => {
                let n = self.compound_length();
                let mut hash = xxh64(&(n as u64).to_le_bytes(), seed ^ 0xa);
                for member in ArrayIterator::new(*self) {
                    hash = member.normalized_hash_with_seed(hash);
                }
                hash
            }
            ValueType::Object => {
                let n = self.compound_length();
                let mut hash = xxh64(&(n as u64).to_le_bytes(), seed ^ 0xb);
                for pair in ObjectIterator::new(*self) {
                    let key_hash = pair.key.normalized_hash_with_seed(seed);
                    hash ^= pair.value.normalized_hash_with_seed(key_hash);
                }
                hash
            }
            // short and long strings with the same payload hash alike
            ValueType::String => match self.get_string_bytes() {
                Ok(bytes) => xxh64(bytes, seed ^ 0xc),
                Err(_) => self.hash_with_seed(seed),
            },
            _ => self.hash_with_seed(seed),
        }
    }

    /// Binary equality of the encoded bytes.
    #[must_use]
    pub fn equals(&self, other: &Slice<'_>) -> bool {
        self.as_bytes() == other.as_bytes()
    }

    // --- Internals ---

    fn expecting(&self, expected: &'static str) -> Error {
        Error::invalid_type(expected, self.value_type())
    }

    /// View of the value starting `offset` bytes after this one's head.
    #[inline]
    pub(crate) fn at_offset(&self, offset: usize) -> Slice<'a> {
        Slice {
            data: &self.data[offset..],
            options: self.options,
        }
    }

    /// View of the value directly following this one in the buffer.
    #[inline]
    pub(crate) fn following(&self) -> Slice<'a> {
        self.at_offset(self.byte_size())
    }

    #[inline]
    fn read_field(&self, offset: usize, width: usize) -> usize {
        read_uint_le(&self.data[offset..offset + width]) as usize
    }

    fn read_f64(&self) -> f64 {
        f64::from_bits(read_uint_le(&self.data[1..9]))
    }

    fn read_int(&self) -> i64 {
        let w = Head::from_byte(self.head()).int_width();
        read_int_le(&self.data[1..1 + w])
    }

    fn read_uint(&self) -> u64 {
        let w = Head::from_byte(self.head()).int_width();
        read_uint_le(&self.data[1..1 + w])
    }

    /// Offset of the first member of a non-empty array or object.
    ///
    /// Encoders may keep zero padding between the header fields and the
    /// first member; members never start with a zero byte.
    pub(crate) fn first_sub_offset(&self) -> usize {
        let head = Head::from_byte(self.head());
        if head.is_compact() {
            let byte_len = read_varint(&self.data[1..]);
            return 1 + varint_len(byte_len);
        }
        let hint = head.first_sub_hint();
        if hint <= 2 && self.data[2] != 0 {
            return 2;
        }
        if hint <= 3 && self.data[3] != 0 {
            return 3;
        }
        if hint <= 5 && self.data[5] != 0 {
            return 5;
        }
        9
    }

    /// Member count of an array or object (type already checked).
    pub(crate) fn compound_length(&self) -> usize {
        let head = Head::from_byte(self.head());
        if head.is_empty_compound() {
            return 0;
        }
        let end = self.byte_size();
        if head.is_compact() {
            return head::read_varint_reversed(self.data, end - 1) as usize;
        }
        if head.is_array_without_index() {
            let first = self.first_sub_offset();
            let item_size = self.at_offset(first).byte_size();
            return (end - first) / item_size;
        }
        let w = head.offset_width();
        if w < 8 {
            self.read_field(1 + w, w)
        } else {
            self.read_field(end - 8, 8)
        }
    }

    /// Start of the offset table of an indexed compound with `n` members.
    pub(crate) fn index_table_base(&self, n: usize) -> usize {
        let w = Head::from_byte(self.head()).offset_width();
        let end = self.byte_size();
        if w == 8 { end - 8 - n * 8 } else { end - n * w }
    }

    /// Offset stored in slot `index` of the offset table.
    pub(crate) fn nth_offset(&self, table_base: usize, index: usize) -> usize {
        let w = Head::from_byte(self.head()).offset_width();
        self.read_field(table_base + index * w, w)
    }

    /// Offset of member `index` (the key, for objects) of a compound with
    /// `n` members. `index` must be in bounds.
    pub(crate) fn entry_offset(&self, index: usize, n: usize) -> usize {
        let head = Head::from_byte(self.head());
        if head.has_index_table() {
            return self.nth_offset(self.index_table_base(n), index);
        }
        let first = self.first_sub_offset();
        if head.is_array_without_index() {
            return first + index * self.at_offset(first).byte_size();
        }
        // compact: walk members in memory order
        let per_entry = if self.is_object() { 2 } else { 1 };
        let mut offset = first;
        for _ in 0..index * per_entry {
            offset += self.at_offset(offset).byte_size();
        }
        offset
    }
}

impl PartialEq for Slice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Slice<'_> {}

impl std::hash::Hash for Slice<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u64(Slice::hash(self));
    }
}

impl Default for Slice<'static> {
    fn default() -> Self {
        Slice::none()
    }
}

impl fmt::Debug for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.typed() {
            Ok(TypedValue::None) => write!(f, "Slice::None"),
            Ok(TypedValue::Illegal) => write!(f, "Slice::Illegal({:#04x})", self.head()),
            Ok(TypedValue::Null) => write!(f, "Slice::Null"),
            Ok(TypedValue::Bool(b)) => write!(f, "Slice::Bool({b:?})"),
            Ok(TypedValue::Double(n)) => write!(f, "Slice::Double({n:?})"),
            Ok(TypedValue::UtcDate(ms)) => write!(f, "Slice::UtcDate({ms})"),
            Ok(TypedValue::External(p)) => write!(f, "Slice::External({p:#x})"),
            Ok(TypedValue::MinKey) => write!(f, "Slice::MinKey"),
            Ok(TypedValue::MaxKey) => write!(f, "Slice::MaxKey"),
            Ok(TypedValue::Int(n)) => write!(f, "Slice::Int({n})"),
            Ok(TypedValue::UInt(n)) => write!(f, "Slice::UInt({n})"),
            Ok(TypedValue::SmallInt(n)) => write!(f, "Slice::SmallInt({n})"),
            Ok(TypedValue::String(s)) => write!(f, "Slice::String({s:?})"),
            Ok(TypedValue::Binary(b)) => write!(f, "Slice::Binary({b:02x?})"),
            Ok(TypedValue::Bcd(_)) => write!(f, "Slice::Bcd({} bytes)", self.byte_size()),
            Ok(TypedValue::Custom(_)) => write!(f, "Slice::Custom({:#04x})", self.head()),
            Ok(TypedValue::Array(_)) => {
                write!(f, "Slice::Array(len={})", self.compound_length())
            }
            Ok(TypedValue::Object(_)) => {
                write!(f, "Slice::Object(len={})", self.compound_length())
            }
            Err(e) => write!(f, "Slice::Invalid({e})"),
        }
    }
}

/// Numeric types [`Slice::get_number`] can convert into.
pub trait FromNumber: Sized {
    fn from_i64(value: i64) -> Option<Self>;
    fn from_u64(value: u64) -> Option<Self>;
    fn from_f64(value: f64) -> Option<Self>;
}

macro_rules! impl_from_number_for_int {
    ($($t:ty),*) => {$(
        impl FromNumber for $t {
            fn from_i64(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn from_u64(value: u64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            fn from_f64(value: f64) -> Option<Self> {
                let value = value.trunc();
                // MAX as f64 rounds up for 64-bit types, hence `<`.
                if value >= <$t>::MIN as f64 && value < <$t>::MAX as f64 + 1.0 {
                    Some(value as $t)
                } else {
                    None
                }
            }
        }
    )*};
}

impl_from_number_for_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromNumber for f64 {
    fn from_i64(value: i64) -> Option<Self> {
        Some(value as f64)
    }

    fn from_u64(value: u64) -> Option<Self> {
        Some(value as f64)
    }

    fn from_f64(value: f64) -> Option<Self> {
        Some(value)
    }
}

impl FromNumber for f32 {
    fn from_i64(value: i64) -> Option<Self> {
        Some(value as f32)
    }

    fn from_u64(value: u64) -> Option<Self> {
        Some(value as f32)
    }

    fn from_f64(value: f64) -> Option<Self> {
        if value.is_finite() && value.abs() > f64::from(f32::MAX) {
            return None;
        }
        Some(value as f32)
    }
}
