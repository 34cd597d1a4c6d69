//! Array member iteration.
//!
//! Array members are stored back to back in memory for every array layout,
//! so iteration walks byte sizes forward and never touches the index table.

use crate::slice::Slice;

/// Iterator over the members of an array, in order.
#[derive(Debug, Clone)]
pub struct ArrayIterator<'a> {
    array: Slice<'a>,
    position: usize,
    size: usize,
    offset: usize,
}

impl<'a> ArrayIterator<'a> {
    pub(crate) fn new(array: Slice<'a>) -> Self {
        let size = array.compound_length();
        let offset = if size == 0 { 0 } else { array.first_sub_offset() };
        Self {
            array,
            position: 0,
            size,
            offset,
        }
    }

    /// The array being iterated.
    #[must_use]
    pub fn array(&self) -> Slice<'a> {
        self.array
    }

    /// Index of the next member.
    #[must_use]
    pub fn index(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn is_first(&self) -> bool {
        self.position == 0
    }

    /// Member `next()` would return, without advancing.
    #[must_use]
    pub fn peek(&self) -> Option<Slice<'a>> {
        (self.position < self.size).then(|| self.array.at_offset(self.offset))
    }
}

impl<'a> Iterator for ArrayIterator<'a> {
    type Item = Slice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let member = self.peek()?;
        self.position += 1;
        self.offset += member.byte_size();
        Some(member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArrayIterator<'_> {}

impl std::iter::FusedIterator for ArrayIterator<'_> {}
