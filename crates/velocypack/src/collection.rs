//! Algorithms over arrays and objects.
//!
//! Inputs are never modified. Every function that produces a value returns a
//! new sealed [`Builder`] that uses the options of its (first) input.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::builder::Builder;
use crate::error::{Error, Result};
use crate::slice::Slice;

/// Order in which [`visit_recursive`] reports compound values relative to
/// their members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitationOrder {
    /// A compound is reported before its members.
    #[default]
    PreOrder,
    /// A compound is reported after its members.
    PostOrder,
}

/// Call `f(member, index)` for every array member until it returns false.
pub fn for_each<'a, F>(array: &Slice<'a>, mut f: F) -> Result<()>
where
    F: FnMut(Slice<'a>, usize) -> bool,
{
    for (index, member) in array.iter_array()?.enumerate() {
        if !f(member, index) {
            break;
        }
    }
    Ok(())
}

/// New array with the members for which `predicate` holds.
pub fn filter<'a, F>(array: &Slice<'a>, mut predicate: F) -> Result<Builder<'a>>
where
    F: FnMut(Slice<'a>, usize) -> bool,
{
    let mut b = Builder::with_options(array.options());
    b.open_array()?;
    for (index, member) in array.iter_array()?.enumerate() {
        if predicate(member, index) {
            b.add(member)?;
        }
    }
    b.close()?;
    Ok(b)
}

/// First member for which `predicate` holds, or the None slice.
pub fn find<'a, F>(array: &Slice<'a>, mut predicate: F) -> Result<Slice<'a>>
where
    F: FnMut(Slice<'a>, usize) -> bool,
{
    Ok(array
        .iter_array()?
        .enumerate()
        .find(|&(index, member)| predicate(member, index))
        .map_or_else(|| Slice::none(), |(_, member)| member))
}

pub fn contains<'a, F>(array: &Slice<'a>, predicate: F) -> Result<bool>
where
    F: FnMut(Slice<'a>, usize) -> bool,
{
    Ok(!find(array, predicate)?.is_none())
}

/// Whether any member is byte-equal to `value`.
pub fn contains_value(array: &Slice<'_>, value: &Slice<'_>) -> Result<bool> {
    Ok(index_of(array, value)?.is_some())
}

/// Position of the first member byte-equal to `value`.
pub fn index_of(array: &Slice<'_>, value: &Slice<'_>) -> Result<Option<usize>> {
    Ok(array.iter_array()?.position(|member| member.equals(value)))
}

pub fn all<'a, F>(array: &Slice<'a>, mut predicate: F) -> Result<bool>
where
    F: FnMut(Slice<'a>, usize) -> bool,
{
    Ok(array
        .iter_array()?
        .enumerate()
        .all(|(index, member)| predicate(member, index)))
}

pub fn any<'a, F>(array: &Slice<'a>, mut predicate: F) -> Result<bool>
where
    F: FnMut(Slice<'a>, usize) -> bool,
{
    Ok(array
        .iter_array()?
        .enumerate()
        .any(|(index, member)| predicate(member, index)))
}

/// Keys of an object, in iteration order.
pub fn keys(object: &Slice<'_>) -> Result<Vec<String>> {
    object
        .iter_object()?
        .map(|pair| pair.key.copy_string())
        .collect()
}

/// New array with the values of an object, in iteration order.
pub fn values<'a>(object: &Slice<'a>) -> Result<Builder<'a>> {
    let mut b = Builder::with_options(object.options());
    b.open_array()?;
    for pair in object.iter_object()? {
        b.add(pair.value)?;
    }
    b.close()?;
    Ok(b)
}

/// New object with only the entries whose key is listed.
pub fn keep<'a, S: AsRef<str>>(object: &Slice<'a>, keys: &[S]) -> Result<Builder<'a>> {
    retain_keys(object, |key| keys.iter().any(|k| k.as_ref().as_bytes() == key))
}

/// New object without the entries whose key is listed.
pub fn remove<'a, S: AsRef<str>>(object: &Slice<'a>, keys: &[S]) -> Result<Builder<'a>> {
    retain_keys(object, |key| !keys.iter().any(|k| k.as_ref().as_bytes() == key))
}

fn retain_keys<'a, F>(object: &Slice<'a>, mut retain: F) -> Result<Builder<'a>>
where
    F: FnMut(&[u8]) -> bool,
{
    let mut b = Builder::with_options(object.options());
    b.open_object()?;
    for pair in object.iter_object()? {
        if retain(pair.key.get_string_bytes()?) {
            b.add(pair.key)?;
            b.add(pair.value)?;
        }
    }
    b.close()?;
    Ok(b)
}

/// New array with up to `limit` members of `array`, skipping the first
/// `skip`. A negative `limit` counts back from the end of the array.
pub fn extract<'a>(array: &Slice<'a>, skip: usize, limit: i64) -> Result<Builder<'a>> {
    let members = array.iter_array()?;
    let length = members.len() as i64;
    let take = if limit < 0 {
        length + limit - skip as i64
    } else {
        limit
    };
    let mut b = Builder::with_options(array.options());
    b.open_array()?;
    if take > 0 {
        for member in members.skip(skip).take(take as usize) {
            b.add(member)?;
        }
    }
    b.close()?;
    Ok(b)
}

/// New array with the members of `first` followed by those of `second`.
pub fn concat<'a>(first: &Slice<'a>, second: &Slice<'_>) -> Result<Builder<'a>> {
    let mut b = Builder::with_options(first.options());
    b.open_array()?;
    b.add_array_items(first)?;
    b.add_array_items(second)?;
    b.close()?;
    Ok(b)
}

/// New array with the members of `array` in the order given by `compare`.
/// The sort is stable.
pub fn sort<'a, F>(array: &Slice<'a>, mut compare: F) -> Result<Builder<'a>>
where
    F: FnMut(&Slice<'a>, &Slice<'a>) -> Ordering,
{
    let mut members: Vec<Slice<'a>> = array.iter_array()?.collect();
    members.sort_by(|a, b| compare(a, b));
    let mut b = Builder::with_options(array.options());
    b.open_array()?;
    for member in members {
        b.add(member)?;
    }
    b.close()?;
    Ok(b)
}

/// Deep-merge two objects.
///
/// Keys only present on one side are copied. For keys on both sides the
/// right value wins, except that two objects are merged recursively when
/// `merge_values` is set. With `null_means_remove`, a right-hand `null`
/// removes the key from the result.
pub fn merge<'a>(
    left: &Slice<'a>,
    right: &Slice<'_>,
    merge_values: bool,
    null_means_remove: bool,
) -> Result<Builder<'a>> {
    if !left.is_object() {
        return Err(Error::invalid_type("object", left.value_type()));
    }
    if !right.is_object() {
        return Err(Error::invalid_type("object", right.value_type()));
    }

    // right-hand entries in order, each taken once it has been used
    let mut pending: Vec<(Slice<'_>, Option<Slice<'_>>)> = Vec::new();
    let mut position: HashMap<&[u8], usize> = HashMap::new();
    for pair in right.iter_object()? {
        let key = pair.key.get_string_bytes()?;
        match position.get(key) {
            Some(&i) => pending[i].1 = Some(pair.value),
            None => {
                position.insert(key, pending.len());
                pending.push((pair.key, Some(pair.value)));
            }
        }
    }

    let mut b = Builder::with_options(left.options());
    b.open_object()?;
    for pair in left.iter_object()? {
        let key_bytes = pair.key.get_string_bytes()?;
        let Some(&i) = position.get(key_bytes) else {
            b.add(pair.key)?;
            b.add(pair.value)?;
            continue;
        };
        let Some(right_value) = pending[i].1.take() else {
            // duplicate key on the left, right value already consumed
            continue;
        };
        if null_means_remove && right_value.is_null() {
            continue;
        }
        b.add(pair.key)?;
        if merge_values && pair.value.is_object() && right_value.is_object() {
            let merged = merge(&pair.value, &right_value, true, null_means_remove)?;
            b.add(merged.slice()?)?;
        } else {
            b.add(right_value)?;
        }
    }
    for (key, value) in pending {
        let Some(value) = value else { continue };
        if null_means_remove && value.is_null() {
            continue;
        }
        b.add(key)?;
        b.add(value)?;
    }
    b.close()?;
    Ok(b)
}

/// Walk all nested members of `slice`, calling `f(key, value)` for each.
/// `key` is the None slice for array members. Returns false if `f` stopped
/// the walk.
pub fn visit_recursive<'a, F>(slice: &Slice<'a>, order: VisitationOrder, mut f: F) -> Result<bool>
where
    F: FnMut(Slice<'a>, Slice<'a>) -> bool,
{
    visit(slice, order, &mut f)
}

fn visit<'a, F>(slice: &Slice<'a>, order: VisitationOrder, f: &mut F) -> Result<bool>
where
    F: FnMut(Slice<'a>, Slice<'a>) -> bool,
{
    let entries: Box<dyn Iterator<Item = (Slice<'a>, Slice<'a>)> + 'a> = if slice.is_object() {
        Box::new(slice.iter_object()?.map(|pair| (pair.key, pair.value)))
    } else if slice.is_array() {
        Box::new(slice.iter_array()?.map(|member| (Slice::none(), member)))
    } else {
        return Ok(true);
    };

    for (key, value) in entries {
        let nested = value.is_compound();
        if nested && order == VisitationOrder::PostOrder && !visit(&value, order, f)? {
            return Ok(false);
        }
        if !f(key, value) {
            return Ok(false);
        }
        if nested && order == VisitationOrder::PreOrder && !visit(&value, order, f)? {
            return Ok(false);
        }
    }
    Ok(true)
}
