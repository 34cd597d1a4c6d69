//! Object key lookup and iteration.
//!
//! Sorted objects with enough entries are searched by bisecting the index
//! table; everything else is scanned. Values always directly follow their
//! key in memory.

use std::cmp::Ordering;

use crate::head::Head;
use crate::slice::Slice;

/// Below this many entries a linear scan beats binary search.
pub const SORTED_SEARCH_THRESHOLD: usize = 4;

/// Bytes of a key, if the key is a string. Other key types never match an
/// attribute name.
fn key_bytes<'a>(key: &Slice<'a>) -> Option<&'a [u8]> {
    key.get_string_bytes().ok()
}

/// Look up `key` in `object` (type already checked), returning its value.
pub(crate) fn find_value<'a>(object: &Slice<'a>, key: &[u8]) -> Option<Slice<'a>> {
    let n = object.compound_length();
    if n == 0 {
        return None;
    }
    let head = Head::from_byte(object.head());
    if head.is_sorted_object() && n >= SORTED_SEARCH_THRESHOLD {
        search_binary(object, key, n)
    } else {
        search_linear(object, key, n)
    }
}

/// Scan the entries of a non-empty object in index table order (memory
/// order for compact objects).
pub(crate) fn search_linear<'a>(object: &Slice<'a>, key: &[u8], n: usize) -> Option<Slice<'a>> {
    let head = Head::from_byte(object.head());
    if head.has_index_table() {
        let table = object.index_table_base(n);
        return (0..n)
            .map(|i| object.at_offset(object.nth_offset(table, i)))
            .find(|k| key_bytes(k) == Some(key))
            .map(|k| k.following());
    }
    let mut offset = object.first_sub_offset();
    for _ in 0..n {
        let candidate = object.at_offset(offset);
        let value = candidate.following();
        if key_bytes(&candidate) == Some(key) {
            return Some(value);
        }
        offset += candidate.byte_size() + value.byte_size();
    }
    None
}

/// Bisect the sorted index table of an object with `n` entries.
pub(crate) fn search_binary<'a>(object: &Slice<'a>, key: &[u8], n: usize) -> Option<Slice<'a>> {
    let table = object.index_table_base(n);
    let (mut lo, mut hi) = (0, n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        let candidate = object.at_offset(object.nth_offset(table, mid));
        let candidate_bytes = key_bytes(&candidate)?;
        match candidate_bytes.cmp(key) {
            Ordering::Equal => return Some(candidate.following()),
            Ordering::Less => lo = mid + 1,
            Ordering::Greater => hi = mid,
        }
    }
    None
}

/// One key/value entry of an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectPair<'a> {
    pub key: Slice<'a>,
    pub value: Slice<'a>,
}

/// Iterator over the entries of an object.
///
/// Indexed objects are visited in index table order, which is key order for
/// sorted objects. Compact objects are visited in memory order.
#[derive(Debug, Clone)]
pub struct ObjectIterator<'a> {
    object: Slice<'a>,
    position: usize,
    size: usize,
    table: Option<usize>,
    offset: usize,
}

impl<'a> ObjectIterator<'a> {
    pub(crate) fn new(object: Slice<'a>) -> Self {
        let size = object.compound_length();
        let head = Head::from_byte(object.head());
        let (table, offset) = if size == 0 {
            (None, 0)
        } else if head.has_index_table() {
            (Some(object.index_table_base(size)), 0)
        } else {
            (None, object.first_sub_offset())
        };
        Self {
            object,
            position: 0,
            size,
            table,
            offset,
        }
    }

    #[must_use]
    pub fn object(&self) -> Slice<'a> {
        self.object
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    fn key_offset(&self) -> usize {
        match self.table {
            Some(table) => self.object.nth_offset(table, self.position),
            None => self.offset,
        }
    }
}

impl<'a> Iterator for ObjectIterator<'a> {
    type Item = ObjectPair<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.size {
            return None;
        }
        let key = self.object.at_offset(self.key_offset());
        let value = key.following();
        self.position += 1;
        if self.table.is_none() {
            self.offset += key.byte_size() + value.byte_size();
        }
        Some(ObjectPair { key, value })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ObjectIterator<'_> {}

impl std::iter::FusedIterator for ObjectIterator<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn object_with_keys(keys: &[&str], sorted: bool, compact: bool) -> Vec<u8> {
        let options = crate::Options {
            sort_attribute_names: sorted,
            build_unindexed_objects: compact,
            ..crate::Options::default()
        };
        let mut b = Builder::with_options(&options);
        b.open_object().unwrap();
        for (i, k) in keys.iter().enumerate() {
            b.add_key_value(k, i as u64).unwrap();
        }
        b.close().unwrap();
        b.into_bytes().unwrap()
    }

    #[test]
    fn binary_and_linear_agree() {
        let keys: Vec<String> = (0..40).map(|i| format!("key{i:02}")).collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let bytes = object_with_keys(&key_refs, true, false);
        let object = Slice::new(&bytes);
        assert!(object.is_sorted());
        let n = object.length().unwrap();
        for (i, k) in keys.iter().enumerate() {
            let by_bisect = search_binary(&object, k.as_bytes(), n).unwrap();
            let by_scan = search_linear(&object, k.as_bytes(), n).unwrap();
            assert_eq!(by_bisect, by_scan);
            assert_eq!(by_bisect.get_uint().unwrap(), i as u64);
        }
        assert!(search_binary(&object, b"zzz", n).is_none());
        assert!(search_binary(&object, b"", n).is_none());
    }

    #[test]
    fn lookup_in_every_layout() {
        for (sorted, compact) in [(true, false), (false, false), (true, true)] {
            let bytes = object_with_keys(&["b", "a", "d", "c", "e"], sorted, compact);
            let object = Slice::new(&bytes);
            assert_eq!(object.get("d").unwrap().get_uint().unwrap(), 2);
            assert!(object.get("x").unwrap().is_none());
        }
    }

    #[test]
    fn iteration_order() {
        let bytes = object_with_keys(&["b", "a", "c"], true, false);
        let keys: Vec<&str> = Slice::new(&bytes)
            .iter_object()
            .unwrap()
            .map(|p| p.key.get_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);

        let bytes = object_with_keys(&["b", "a", "c"], false, true);
        let it = Slice::new(&bytes).iter_object().unwrap();
        assert_eq!(it.len(), 3);
        let keys: Vec<&str> = it.map(|p| p.key.get_str().unwrap()).collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }
}
