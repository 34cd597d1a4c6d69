//! Append-only writer for VelocyPack values.
//!
//! Scalars are written straight into the buffer. Arrays and objects reserve
//! a 9-byte header when opened and collect the offsets of their members;
//! the final layout (compact, width class, index table) is only decided in
//! [`Builder::close`], once every member is known.

use tracing::{debug, trace};

use crate::encode::Encode;
use crate::error::{Error, Result};
use crate::head::{self, Head, ValueType, varint_len, write_varint, write_varint_reversed};
use crate::options::Options;
use crate::owned::OwnedSlice;
use crate::slice::Slice;

/// Head byte plus the widest byte length and item count fields.
const RESERVED_HEADER: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CompoundKind {
    Array,
    Object,
}

/// An array or object that has been opened but not closed yet.
#[derive(Debug)]
struct Frame {
    start: usize,
    kind: CompoundKind,
    compact: bool,
    /// Offsets of members (keys, for objects) relative to `start`.
    entries: Vec<usize>,
    /// Object only: a key has been written and its value is missing.
    key_pending: bool,
}

#[derive(Debug)]
pub struct Builder<'o> {
    buffer: Vec<u8>,
    stack: Vec<Frame>,
    options: &'o Options,
}

impl Default for Builder<'static> {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder<'static> {
    #[must_use]
    pub fn new() -> Self {
        Builder::with_options(Options::defaults())
    }
}

impl<'o> Builder<'o> {
    #[must_use]
    pub fn with_options(options: &'o Options) -> Self {
        Self {
            buffer: Vec::new(),
            stack: Vec::new(),
            options,
        }
    }

    /// Start a builder holding a copy of `slice`, sealed.
    #[must_use]
    pub fn from_slice(slice: &Slice<'o>) -> Self {
        Self {
            buffer: slice.as_bytes().to_vec(),
            stack: Vec::new(),
            options: slice.options(),
        }
    }

    #[must_use]
    pub fn options(&self) -> &'o Options {
        self.options
    }

    /// Drop all content and open compounds.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.stack.clear();
    }

    /// Bytes written so far, including unfinished compounds.
    #[must_use]
    pub fn size(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// No compound is open.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.stack.is_empty()
    }

    #[must_use]
    pub fn is_open_array(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|f| f.kind == CompoundKind::Array)
    }

    #[must_use]
    pub fn is_open_object(&self) -> bool {
        self.stack
            .last()
            .is_some_and(|f| f.kind == CompoundKind::Object)
    }

    // --- Output ---

    /// The encoded bytes of all top-level values.
    pub fn bytes(&self) -> Result<&[u8]> {
        self.ensure_sealed()?;
        Ok(&self.buffer)
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        self.ensure_sealed()?;
        Ok(self.buffer)
    }

    /// View of the first top-level value, or the None slice if nothing was
    /// written.
    pub fn slice(&self) -> Result<Slice<'_>> {
        self.ensure_sealed()?;
        Ok(Slice::with_options(&self.buffer, self.options))
    }

    /// Move the finished buffer out, leaving the builder empty.
    pub fn steal(&mut self) -> Result<OwnedSlice<'o>> {
        self.ensure_sealed()?;
        let buffer = std::mem::take(&mut self.buffer);
        Ok(OwnedSlice::from_vec_with_options(buffer, self.options))
    }

    fn ensure_sealed(&self) -> Result<()> {
        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(Error::BuilderNotSealed)
        }
    }

    // --- Adding values ---

    /// Append a value. Inside an object without a pending key the value
    /// must be a string and becomes the key.
    pub fn add<V: Encode>(&mut self, value: V) -> Result<()> {
        let at = self.buffer.len();
        value.encode_into(&mut self.buffer);
        if let Err(e) = self.check_position(self.buffer[at]) {
            self.buffer.truncate(at);
            return Err(e);
        }
        self.record_entry(at);
        Ok(())
    }

    /// Write an object key. Fails unless an object is open and waiting for
    /// a key.
    pub fn add_key(&mut self, key: &str) -> Result<()> {
        match self.stack.last() {
            Some(frame) if frame.kind == CompoundKind::Object => {
                if frame.key_pending {
                    return Err(Error::BuilderKeyAlreadyWritten);
                }
            }
            _ => return Err(Error::BuilderNeedOpenObject),
        }
        self.add(key)
    }

    pub fn add_key_value<V: Encode>(&mut self, key: &str, value: V) -> Result<()> {
        self.add_key(key)?;
        self.add(value)
    }

    /// Append a pre-encoded custom value (head `0xf0..=0xff`).
    pub fn add_custom(&mut self, bytes: &[u8]) -> Result<()> {
        let value_type = bytes
            .first()
            .map_or(ValueType::None, |&h| ValueType::from_head(h));
        if value_type != ValueType::Custom {
            return Err(Error::BuilderUnexpectedType(value_type));
        }
        if self.options.disallow_custom_types {
            return Err(Error::BuilderCustomDisallowed);
        }
        let size = Slice::with_options(bytes, self.options).byte_size();
        let at = self.buffer.len();
        self.check_position(bytes[0])?;
        self.buffer.extend_from_slice(&bytes[..size]);
        self.record_entry(at);
        Ok(())
    }

    /// Copy every member of `array` into the open array.
    pub fn add_array_items(&mut self, array: &Slice<'_>) -> Result<()> {
        if !self.is_open_array() {
            return Err(Error::BuilderNeedOpenArray);
        }
        for member in array.iter_array()? {
            self.add(member)?;
        }
        Ok(())
    }

    /// Copy every entry of `object` into the open object, skipping keys the
    /// attribute exclude handler rejects.
    pub fn add_object_entries(&mut self, object: &Slice<'_>) -> Result<()> {
        match self.stack.last() {
            Some(frame) if frame.kind == CompoundKind::Object => {
                if frame.key_pending {
                    return Err(Error::BuilderKeyAlreadyWritten);
                }
            }
            _ => return Err(Error::BuilderNeedOpenObject),
        }
        let nesting = self.stack.len() - 1;
        for pair in object.iter_object()? {
            if self.options.excludes(&pair.key, nesting) {
                continue;
            }
            self.add(pair.key)?;
            self.add(pair.value)?;
        }
        Ok(())
    }

    // --- Compounds ---

    pub fn open_array(&mut self) -> Result<()> {
        self.open(CompoundKind::Array, false)
    }

    /// Open an array that is always closed with the compact encoding.
    pub fn open_array_compact(&mut self) -> Result<()> {
        self.open(CompoundKind::Array, true)
    }

    pub fn open_object(&mut self) -> Result<()> {
        self.open(CompoundKind::Object, false)
    }

    /// Open an object that is always closed with the compact encoding.
    pub fn open_object_compact(&mut self) -> Result<()> {
        self.open(CompoundKind::Object, true)
    }

    fn open(&mut self, kind: CompoundKind, compact: bool) -> Result<()> {
        let head = match kind {
            CompoundKind::Array => head::ARRAY_INDEXED,
            CompoundKind::Object => head::OBJECT_SORTED,
        };
        self.check_position(head)?;
        let at = self.buffer.len();
        self.record_entry(at);
        self.buffer.push(head);
        self.buffer.extend_from_slice(&[0u8; RESERVED_HEADER - 1]);
        self.stack.push(Frame {
            start: at,
            kind,
            compact,
            entries: Vec::new(),
            key_pending: false,
        });
        Ok(())
    }

    /// Seal the innermost open compound.
    pub fn close(&mut self) -> Result<()> {
        let frame = self.stack.pop().ok_or(Error::BuilderNeedOpenCompound)?;
        if frame.key_pending {
            self.stack.push(frame);
            return Err(Error::BuilderKeyAlreadyWritten);
        }
        if frame.kind == CompoundKind::Object
            && self.options.check_attribute_uniqueness
            && let Some(duplicate) = self.find_duplicate_key(&frame)
        {
            debug!(key = %duplicate, "duplicate attribute name");
            self.stack.push(frame);
            return Err(Error::DuplicateAttributeName(duplicate));
        }
        self.close_frame(frame);
        Ok(())
    }

    /// Remove the most recent member of the innermost open compound (for
    /// objects, the whole key/value entry).
    pub fn remove_last(&mut self) -> Result<()> {
        let frame = self.stack.last_mut().ok_or(Error::BuilderNeedOpenCompound)?;
        let offset = frame.entries.pop().ok_or(Error::BuilderNeedSubvalue)?;
        frame.key_pending = false;
        self.buffer.truncate(frame.start + offset);
        Ok(())
    }

    /// Whether the innermost open object already contains `key`.
    pub fn has_key(&self, key: &str) -> Result<bool> {
        Ok(!self.get_key(key)?.is_none())
    }

    /// Value of `key` in the innermost open object, or the None slice.
    pub fn get_key(&self, key: &str) -> Result<Slice<'_>> {
        let frame = match self.stack.last() {
            Some(frame) if frame.kind == CompoundKind::Object => frame,
            _ => return Err(Error::BuilderNeedOpenObject),
        };
        let complete = if frame.key_pending {
            frame.entries.len() - 1
        } else {
            frame.entries.len()
        };
        for &offset in &frame.entries[..complete] {
            let candidate = Slice::with_options(&self.buffer[frame.start + offset..], self.options);
            if candidate.get_string_bytes().ok() == Some(key.as_bytes()) {
                return Ok(candidate.following());
            }
        }
        Ok(Slice::none())
    }

    // --- Internals ---

    /// Validate that a value with `head` may be written at the current
    /// position.
    fn check_position(&self, head: u8) -> Result<()> {
        let value_type = ValueType::from_head(head);
        if value_type == ValueType::Custom && self.options.disallow_custom_types {
            return Err(Error::BuilderCustomDisallowed);
        }
        match self.stack.last() {
            None => Ok(()),
            Some(frame) if frame.kind == CompoundKind::Object && !frame.key_pending => {
                if value_type == ValueType::String {
                    Ok(())
                } else {
                    Err(Error::BuilderKeyMustBeString)
                }
            }
            Some(frame)
                if frame.kind == CompoundKind::Object && value_type == ValueType::None =>
            {
                Err(Error::BuilderUnexpectedType(value_type))
            }
            Some(_) => Ok(()),
        }
    }

    /// Register the value starting at `at` with the innermost open compound.
    fn record_entry(&mut self, at: usize) {
        let Some(frame) = self.stack.last_mut() else {
            return;
        };
        match frame.kind {
            CompoundKind::Array => frame.entries.push(at - frame.start),
            CompoundKind::Object if frame.key_pending => frame.key_pending = false,
            CompoundKind::Object => {
                frame.entries.push(at - frame.start);
                frame.key_pending = true;
            }
        }
    }

    fn key_bytes(&self, start: usize, offset: usize) -> &[u8] {
        Slice::with_options(&self.buffer[start + offset..], self.options)
            .get_string_bytes()
            .unwrap_or_default()
    }

    fn find_duplicate_key(&self, frame: &Frame) -> Option<String> {
        if frame.entries.len() < 2 {
            return None;
        }
        let mut keys: Vec<&[u8]> = frame
            .entries
            .iter()
            .map(|&offset| self.key_bytes(frame.start, offset))
            .collect();
        keys.sort_unstable();
        keys.windows(2)
            .find(|pair| pair[0] == pair[1])
            .map(|pair| String::from_utf8_lossy(pair[0]).into_owned())
    }

    fn close_frame(&mut self, mut frame: Frame) {
        let start = frame.start;
        let is_array = frame.kind == CompoundKind::Array;
        let n = frame.entries.len();

        if n == 0 {
            self.buffer.truncate(start + 1);
            self.buffer[start] = if is_array {
                head::EMPTY_ARRAY
            } else {
                head::EMPTY_OBJECT
            };
            trace!(start, "closed empty compound");
            return;
        }

        let wants_compact = frame.compact
            || (is_array && self.options.build_unindexed_arrays)
            || (!is_array && (self.options.build_unindexed_objects || n == 1));
        if wants_compact && self.close_compact(start, is_array, n) {
            return;
        }

        let (need_index, need_count) = if is_array {
            let indexed = !self.same_size_members(&frame);
            (indexed, indexed)
        } else {
            (true, true)
        };

        // A None member starts with a zero byte, so readers could not tell it
        // from header padding. Such arrays keep the full 9-byte header.
        let keeps_padding = is_array
            && frame
                .entries
                .iter()
                .any(|&offset| self.buffer[start + offset] == head::NONE);

        // `used` still includes the 8 reserved header bytes; width 1 gives
        // back 6 of them (7 without an item count).
        let used = self.buffer.len() - start;
        let table = |w: usize| if need_index { w * n } else { 0 };
        let reclaimed = match (keeps_padding, need_count) {
            (true, _) => 0,
            (false, true) => 6,
            (false, false) => 7,
        };
        let width = if used + table(1) - reclaimed <= 0xff {
            1
        } else if used + table(2) <= 0xffff {
            2
        } else if used + table(4) <= 0xffff_ffff {
            4
        } else {
            8
        };

        // Only the narrowest class drops the header padding.
        if width == 1 && !keeps_padding {
            let target = if need_index { 3 } else { 2 };
            let diff = RESERVED_HEADER - target;
            self.buffer
                .copy_within(start + RESERVED_HEADER.., start + target);
            self.buffer.truncate(self.buffer.len() - diff);
            if need_index {
                for offset in &mut frame.entries {
                    *offset -= diff;
                }
            }
        }

        let mut head = if !is_array {
            if self.options.sort_attribute_names {
                head::OBJECT_SORTED
            } else {
                head::OBJECT_UNSORTED
            }
        } else if need_index {
            head::ARRAY_INDEXED
        } else {
            head::ARRAY_NO_INDEX
        };

        if need_index {
            if !is_array && self.options.sort_attribute_names && n > 1 {
                frame
                    .entries
                    .sort_by(|&a, &b| self.key_bytes(start, a).cmp(self.key_bytes(start, b)));
            }
            for &offset in &frame.entries {
                self.buffer
                    .extend_from_slice(&(offset as u64).to_le_bytes()[..width]);
            }
        }

        head = Head::encode_compound(head, width);
        if width == 8 && need_count {
            self.buffer.extend_from_slice(&(n as u64).to_le_bytes());
        }
        self.buffer[start] = head;

        let byte_size = (self.buffer.len() - start) as u64;
        self.buffer[start + 1..start + 1 + width]
            .copy_from_slice(&byte_size.to_le_bytes()[..width]);
        if width < 8 && need_count {
            self.buffer[start + 1 + width..start + 1 + 2 * width]
                .copy_from_slice(&(n as u64).to_le_bytes()[..width]);
        }

        trace!(
            head,
            width,
            items = n,
            byte_size,
            "closed compound"
        );
    }

    /// Arrays with one member, or whose members all share one byte size,
    /// need neither index table nor item count.
    fn same_size_members(&self, frame: &Frame) -> bool {
        let entries = &frame.entries;
        if entries.len() == 1 {
            return true;
        }
        let total = self.buffer.len() - frame.start;
        let member_size = entries[1] - entries[0];
        if total - entries[0] != entries.len() * member_size {
            return false;
        }
        entries
            .windows(2)
            .all(|pair| pair[1] - pair[0] == member_size)
            && total - entries[entries.len() - 1] == member_size
    }

    /// Rewrite the frame at `start` in compact form. Returns false (leaving
    /// the buffer untouched) if the byte length needs more than 8 varint
    /// bytes.
    fn close_compact(&mut self, start: usize, is_array: bool, n: usize) -> bool {
        let count_len = varint_len(n as u64);
        let data_len = self.buffer.len() - (start + RESERVED_HEADER);
        let mut byte_size = (1 + data_len + count_len) as u64;
        let mut size_len = varint_len(byte_size);
        byte_size += size_len as u64;
        if varint_len(byte_size) != size_len {
            byte_size += 1;
            size_len += 1;
        }
        if size_len >= RESERVED_HEADER {
            return false;
        }

        self.buffer[start] = if is_array {
            head::COMPACT_ARRAY
        } else {
            head::COMPACT_OBJECT
        };
        self.buffer
            .copy_within(start + RESERVED_HEADER.., start + 1 + size_len);
        self.buffer
            .truncate(self.buffer.len() - (RESERVED_HEADER - 1 - size_len));
        let mut size_field = Vec::with_capacity(size_len);
        write_varint(&mut size_field, byte_size);
        self.buffer[start + 1..start + 1 + size_len].copy_from_slice(&size_field);
        write_varint_reversed(&mut self.buffer, n as u64);

        trace!(
            head = self.buffer[start],
            items = n,
            byte_size,
            "closed compact compound"
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::{Binary, Null};

    fn hex(bytes: &[u8]) -> String {
        bytes
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    const DOUBLE_2_3: [u8; 8] = [0x66, 0x66, 0x66, 0x66, 0x66, 0x66, 0x02, 0x40];

    fn some_values(b: &mut Builder<'_>) {
        b.add(1200u64).unwrap();
        b.add(2.3).unwrap();
        b.add("abc").unwrap();
        b.add(true).unwrap();
    }

    #[test]
    fn empty_compounds() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        b.close().unwrap();
        assert_eq!(b.bytes().unwrap(), &[0x01]);

        let mut b = Builder::new();
        b.open_object_compact().unwrap();
        b.close().unwrap();
        assert_eq!(b.bytes().unwrap(), &[0x0a]);
    }

    #[test]
    fn array_single_entry() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        b.add(1u64).unwrap();
        b.close().unwrap();
        assert_eq!(b.bytes().unwrap(), &[0x02, 0x03, 0x31]);
    }

    #[test]
    fn array_same_size_entries() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        for i in 1u64..=3 {
            b.add(i).unwrap();
        }
        b.close().unwrap();
        assert_eq!(b.bytes().unwrap(), &[0x02, 0x05, 0x31, 0x32, 0x33]);
    }

    #[test]
    fn array_some_values() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        some_values(&mut b);
        b.close().unwrap();

        let mut expected = vec![0x06, 0x18, 0x04, 0x29, 0xb0, 0x04, 0x1b];
        expected.extend_from_slice(&DOUBLE_2_3);
        expected.extend_from_slice(&[0x43, 0x61, 0x62, 0x63, 0x1a, 0x03, 0x06, 0x0f, 0x13]);
        assert_eq!(hex(b.bytes().unwrap()), hex(&expected));
    }

    #[test]
    fn array_compact() {
        let mut b = Builder::new();
        b.open_array_compact().unwrap();
        some_values(&mut b);
        b.close().unwrap();

        let mut expected = vec![0x13, 0x14, 0x29, 0xb0, 0x04, 0x1b];
        expected.extend_from_slice(&DOUBLE_2_3);
        expected.extend_from_slice(&[0x43, 0x61, 0x62, 0x63, 0x1a, 0x04]);
        assert_eq!(hex(b.bytes().unwrap()), hex(&expected));
    }

    #[test]
    fn array_compact_two_byte_length() {
        let mut b = Builder::new();
        b.open_array_compact().unwrap();
        for _ in 0..125 {
            b.add(1u64).unwrap();
        }
        b.close().unwrap();
        let bytes = b.bytes().unwrap();
        assert_eq!(bytes.len(), 129);
        assert_eq!(&bytes[..3], &[0x13, 0x81, 0x01]);
        assert_eq!(bytes[128], 0x7d);
        assert_eq!(b.slice().unwrap().length().unwrap(), 125);
    }

    #[test]
    fn array_compact_two_byte_count() {
        let mut b = Builder::new();
        b.open_array_compact().unwrap();
        for _ in 0..128 {
            b.add("aaa").unwrap();
        }
        b.close().unwrap();
        let bytes = b.bytes().unwrap();
        assert_eq!(bytes.len(), 517);
        assert_eq!(&bytes[..3], &[0x13, 0x85, 0x04]);
        assert_eq!(&bytes[515..], &[0x01, 0x80]);
        let s = b.slice().unwrap();
        assert_eq!(s.length().unwrap(), 128);
        assert_eq!(s.at(127).unwrap().get_str().unwrap(), "aaa");
    }

    #[test]
    fn array_single_entry_long() {
        let value = "x".repeat(273);
        let mut b = Builder::new();
        b.open_array().unwrap();
        b.add(value.as_str()).unwrap();
        b.close().unwrap();
        let bytes = b.bytes().unwrap();
        // 9 header + 1 + 8 + 273
        assert_eq!(bytes.len(), 291);
        assert_eq!(&bytes[..9], &[0x03, 0x23, 0x01, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes[9], 0xbf);
        let s = b.slice().unwrap();
        assert_eq!(s.length().unwrap(), 1);
        assert_eq!(s.at(0).unwrap().get_str().unwrap(), value);
    }

    #[test]
    fn array_two_byte_index_table() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        for i in 0..100u64 {
            b.add(i * 1000).unwrap();
            b.add("some text").unwrap();
        }
        b.close().unwrap();
        let s = b.slice().unwrap();
        assert_eq!(s.head(), 0x07);
        assert_eq!(s.byte_size(), b.size());
        assert_eq!(s.length().unwrap(), 200);
        assert_eq!(s.at(198).unwrap().get_uint().unwrap(), 99_000);
        assert_eq!(s.at(199).unwrap().get_str().unwrap(), "some text");
    }

    #[test]
    fn object_sorted() {
        let mut b = Builder::new();
        b.open_object().unwrap();
        b.add_key_value("d", 1200u64).unwrap();
        b.add_key_value("c", 2.3).unwrap();
        b.add_key_value("b", "abc").unwrap();
        b.add_key_value("a", true).unwrap();
        b.close().unwrap();

        let mut expected = vec![0x0b, 0x20, 0x04, 0x41, 0x64, 0x29, 0xb0, 0x04, 0x41, 0x63, 0x1b];
        expected.extend_from_slice(&DOUBLE_2_3);
        expected.extend_from_slice(&[
            0x41, 0x62, 0x43, 0x61, 0x62, 0x63, 0x41, 0x61, 0x1a, 0x19, 0x13, 0x08, 0x03,
        ]);
        assert_eq!(hex(b.bytes().unwrap()), hex(&expected));
    }

    #[test]
    fn object_unsorted_keeps_insertion_order() {
        let options = Options {
            sort_attribute_names: false,
            ..Options::default()
        };
        let mut b = Builder::with_options(&options);
        b.open_object().unwrap();
        b.add_key_value("b", 1u64).unwrap();
        b.add_key_value("a", 2u64).unwrap();
        b.close().unwrap();
        let s = b.slice().unwrap();
        assert_eq!(s.head(), 0x0f);
        assert_eq!(s.key_at(0).unwrap().get_str().unwrap(), "b");
        assert_eq!(s.get("a").unwrap().get_uint().unwrap(), 2);
    }

    #[test]
    fn object_compact() {
        let mut b = Builder::new();
        b.open_object_compact().unwrap();
        b.add_key_value("d", 1200u64).unwrap();
        b.add_key_value("c", 2.3).unwrap();
        b.add_key_value("b", "abc").unwrap();
        b.add_key_value("a", true).unwrap();
        b.close().unwrap();

        let mut expected = vec![0x14, 0x1c, 0x41, 0x64, 0x29, 0xb0, 0x04, 0x41, 0x63, 0x1b];
        expected.extend_from_slice(&DOUBLE_2_3);
        expected.extend_from_slice(&[0x41, 0x62, 0x43, 0x61, 0x62, 0x63, 0x41, 0x61, 0x1a, 0x04]);
        assert_eq!(hex(b.bytes().unwrap()), hex(&expected));
    }

    #[test]
    fn single_entry_object_is_compact() {
        let mut b = Builder::new();
        b.open_object().unwrap();
        b.add_key_value("a", 1u64).unwrap();
        b.close().unwrap();
        assert_eq!(b.bytes().unwrap(), &[0x14, 0x06, 0x41, 0x61, 0x31, 0x01]);
    }

    #[test]
    fn nested_compounds() {
        let mut b = Builder::new();
        b.open_object().unwrap();
        b.add_key("list").unwrap();
        b.open_array().unwrap();
        b.add(1u64).unwrap();
        b.add(Null).unwrap();
        b.close().unwrap();
        b.add_key("blob").unwrap();
        b.add(Binary(b"xyz")).unwrap();
        b.close().unwrap();

        let s = b.slice().unwrap();
        let list = s.get("list").unwrap();
        assert_eq!(list.length().unwrap(), 2);
        assert!(list.at(1).unwrap().is_null());
        assert_eq!(s.get("blob").unwrap().get_binary().unwrap(), b"xyz");
    }

    #[test]
    fn lifo_errors() {
        let mut b = Builder::new();
        assert_eq!(b.close(), Err(Error::BuilderNeedOpenCompound));

        b.open_array().unwrap();
        assert!(matches!(b.slice(), Err(Error::BuilderNotSealed)));
        assert!(matches!(b.bytes(), Err(Error::BuilderNotSealed)));
        assert!(matches!(b.steal(), Err(Error::BuilderNotSealed)));
        b.close().unwrap();
        assert!(b.slice().is_ok());
    }

    #[test]
    fn object_key_rules() {
        let mut b = Builder::new();
        assert_eq!(b.add_key("a"), Err(Error::BuilderNeedOpenObject));
        b.open_object().unwrap();
        assert_eq!(b.add(1u64), Err(Error::BuilderKeyMustBeString));
        assert_eq!(b.open_array(), Err(Error::BuilderKeyMustBeString));
        b.add_key("a").unwrap();
        assert_eq!(b.add_key("b"), Err(Error::BuilderKeyAlreadyWritten));
        assert_eq!(b.close(), Err(Error::BuilderKeyAlreadyWritten));
        b.add(1u64).unwrap();
        b.close().unwrap();
        assert_eq!(b.slice().unwrap().get("a").unwrap().get_uint().unwrap(), 1);
    }

    #[test]
    fn hundred_nones_keep_the_padded_header() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        for _ in 0..100 {
            b.add(Slice::none()).unwrap();
        }
        b.close().unwrap();

        let bytes = b.bytes().unwrap();
        assert_eq!(bytes.len(), 109);
        assert_eq!(&bytes[..2], &[0x02, 0x6d]);
        assert!(bytes[2..].iter().all(|&byte| byte == 0x00));

        let s = b.slice().unwrap();
        assert_eq!(s.byte_size(), 109);
        assert_eq!(s.length().unwrap(), 100);
        assert!(s.at(0).unwrap().is_none());
        assert!(s.at(99).unwrap().is_none());
        assert!(s.iter_array().unwrap().all(|member| member.is_none()));
    }

    #[test]
    fn thousand_nones_use_two_byte_width() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        for _ in 0..1000 {
            b.add(Slice::none()).unwrap();
        }
        b.close().unwrap();

        let bytes = b.bytes().unwrap();
        assert_eq!(bytes.len(), 1009);
        assert_eq!(&bytes[..3], &[0x03, 0xf1, 0x03]);
        let s = b.slice().unwrap();
        assert_eq!(s.length().unwrap(), 1000);
        assert!(s.at(999).unwrap().is_none());
    }

    #[test]
    fn hundred_nones_compact() {
        let mut b = Builder::new();
        b.open_array_compact().unwrap();
        for _ in 0..100 {
            b.add(Slice::none()).unwrap();
        }
        b.close().unwrap();

        let bytes = b.bytes().unwrap();
        assert_eq!(bytes.len(), 103);
        assert_eq!(&bytes[..2], &[0x13, 0x67]);
        assert_eq!(bytes[102], 0x64);
        let s = b.slice().unwrap();
        assert_eq!(s.length().unwrap(), 100);
        assert!(s.iter_array().unwrap().all(|member| member.is_none()));
    }

    #[test]
    fn nones_mixed_with_values_keep_index_reachable() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        b.add(Slice::none()).unwrap();
        for i in 0..110u64 {
            b.add(i % 5).unwrap();
        }
        b.add("abcdefghijklmnopqrst").unwrap();
        b.close().unwrap();

        let bytes = b.bytes().unwrap();
        // 112 members with an index table still fit width 1, padded
        assert_eq!(&bytes[..9], &[0x06, 0xfd, 0x70, 0, 0, 0, 0, 0, 0]);
        let s = b.slice().unwrap();
        assert_eq!(s.byte_size(), 0xfd);
        assert_eq!(s.length().unwrap(), 112);
        assert!(s.at(0).unwrap().is_none());
        assert_eq!(s.at(7).unwrap().get_uint().unwrap(), 1);
        assert_eq!(s.at(111).unwrap().get_str().unwrap(), "abcdefghijklmnopqrst");
    }

    #[test]
    fn none_is_rejected_as_object_value() {
        let mut b = Builder::new();
        b.open_object().unwrap();
        b.add_key("a").unwrap();
        assert_eq!(
            b.add(Slice::none()),
            Err(Error::BuilderUnexpectedType(ValueType::None))
        );
        b.add(Null).unwrap();
        b.close().unwrap();
    }

    #[test]
    fn uniqueness_checked_at_close() {
        let options = Options {
            check_attribute_uniqueness: true,
            ..Options::default()
        };
        let mut b = Builder::with_options(&options);
        b.open_object().unwrap();
        b.add_key_value("a", 1u64).unwrap();
        b.add_key_value("a", 2u64).unwrap();
        assert_eq!(
            b.close(),
            Err(Error::DuplicateAttributeName("a".to_owned()))
        );
        assert!(b.is_open_object());

        // duplicates are accepted without the check
        let mut b = Builder::new();
        b.open_object().unwrap();
        b.add_key_value("a", 1u64).unwrap();
        b.add_key_value("a", 2u64).unwrap();
        b.close().unwrap();
    }

    #[test]
    fn builder_lookups_and_remove_last() {
        let mut b = Builder::new();
        b.open_object().unwrap();
        b.add_key_value("x", 7u64).unwrap();
        assert!(b.has_key("x").unwrap());
        assert!(!b.has_key("y").unwrap());
        assert_eq!(b.get_key("x").unwrap().get_uint().unwrap(), 7);

        b.add_key_value("y", 8u64).unwrap();
        b.remove_last().unwrap();
        assert!(!b.has_key("y").unwrap());
        b.close().unwrap();
        assert_eq!(b.slice().unwrap().length().unwrap(), 1);

        let mut b = Builder::new();
        b.open_array().unwrap();
        assert_eq!(b.remove_last(), Err(Error::BuilderNeedSubvalue));
        assert_eq!(b.has_key("x"), Err(Error::BuilderNeedOpenObject));
    }

    #[test]
    fn custom_values() {
        let mut b = Builder::new();
        b.open_array().unwrap();
        b.add_custom(&[0xf0, 0x2a]).unwrap();
        assert_eq!(
            b.add_custom(&[0x18]),
            Err(Error::BuilderUnexpectedType(ValueType::Null))
        );
        b.close().unwrap();
        assert!(b.slice().unwrap().at(0).unwrap().is_custom());

        let options = Options {
            disallow_custom_types: true,
            ..Options::default()
        };
        let mut b = Builder::with_options(&options);
        assert_eq!(
            b.add_custom(&[0xf0, 0x2a]),
            Err(Error::BuilderCustomDisallowed)
        );
    }

    #[test]
    fn unindexed_options() {
        let options = Options {
            build_unindexed_arrays: true,
            build_unindexed_objects: true,
            ..Options::default()
        };
        let mut b = Builder::with_options(&options);
        b.open_object().unwrap();
        b.add_key("a").unwrap();
        b.open_array().unwrap();
        some_values(&mut b);
        b.close().unwrap();
        b.add_key_value("b", 1u64).unwrap();
        b.close().unwrap();
        let s = b.slice().unwrap();
        assert_eq!(s.head(), 0x14);
        assert_eq!(s.get("a").unwrap().head(), 0x13);
        assert_eq!(s.get("a").unwrap().at(2).unwrap().get_str().unwrap(), "abc");
    }

    #[test]
    fn unindexed_arrays_include_same_size_members() {
        let options = Options {
            build_unindexed_arrays: true,
            ..Options::default()
        };
        let mut b = Builder::with_options(&options);
        b.open_array().unwrap();
        for i in 1..=3u64 {
            b.add(i).unwrap();
        }
        b.close().unwrap();
        assert_eq!(b.bytes().unwrap(), &[0x13, 0x06, 0x31, 0x32, 0x33, 0x03]);
    }

    #[test]
    fn steal_and_from_slice() {
        let mut b = Builder::new();
        b.add("hello").unwrap();
        let owned = b.steal().unwrap();
        assert!(b.is_empty());
        assert_eq!(owned.slice().get_str().unwrap(), "hello");

        let copy = Builder::from_slice(&owned.slice());
        assert_eq!(copy.bytes().unwrap(), owned.as_bytes());
    }

    #[test]
    fn copies_with_exclusions() {
        use crate::options::AttributeExcludeHandler;
        use std::sync::Arc;

        struct HideSecret;
        impl AttributeExcludeHandler for HideSecret {
            fn should_exclude(&self, key: &Slice<'_>, _nesting: usize) -> bool {
                key.get_str().is_ok_and(|k| k == "secret")
            }
        }

        let mut source = Builder::new();
        source.open_object().unwrap();
        source.add_key_value("name", "x").unwrap();
        source.add_key_value("secret", "y").unwrap();
        source.close().unwrap();

        let options = Options {
            attribute_exclude_handler: Some(Arc::new(HideSecret)),
            ..Options::default()
        };
        let mut b = Builder::with_options(&options);
        b.open_object().unwrap();
        b.add_object_entries(&source.slice().unwrap()).unwrap();
        b.close().unwrap();
        let s = b.slice().unwrap();
        assert_eq!(s.length().unwrap(), 1);
        assert!(s.has_key("name").unwrap());
    }
}
