//! Text edits between a previous parse and the next one.

use std::ops::Range;

use crate::error::EditError;

/// Replacement of `start..old_end` in the previous text by `new_len` bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub old_end: usize,
    pub new_len: usize,
}

impl Edit {
    pub fn new(old_range: Range<usize>, new_len: usize) -> Self {
        Self {
            start: old_range.start,
            old_end: old_range.end,
            new_len,
        }
    }

    pub fn insert(at: usize, len: usize) -> Self {
        Self::new(at..at, len)
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self::new(range, 0)
    }

    pub fn old_range(&self) -> Range<usize> {
        self.start..self.old_end
    }

    pub fn new_end(&self) -> usize {
        self.start + self.new_len
    }

    fn delta(&self) -> isize {
        self.new_len as isize - (self.old_end - self.start) as isize
    }
}

/// A validated, sorted set of non-overlapping edits.
#[derive(Clone, Debug, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    /// Validates `edits` against the previous and the new text length.
    pub fn new(edits: &[Edit], old_len: usize, new_len: usize) -> Result<Self, EditError> {
        let mut sorted = edits.to_vec();
        sorted.sort_by_key(|e| (e.start, e.old_end));

        for edit in &sorted {
            if edit.start > edit.old_end || edit.old_end > old_len {
                return Err(EditError::OutOfBounds {
                    range: edit.old_range(),
                    len: old_len,
                });
            }
        }
        for pair in sorted.windows(2) {
            let (first, second) = (pair[0], pair[1]);
            // Two insertions at one point have no defined order.
            if second.start < first.old_end || second.start == first.start {
                return Err(EditError::Overlapping {
                    first: first.old_range(),
                    second: second.old_range(),
                });
            }
        }

        let expected = sorted
            .iter()
            .fold(old_len as isize, |len, e| len + e.delta()) as usize;
        if expected != new_len {
            return Err(EditError::LengthMismatch {
                expected,
                found: new_len,
            });
        }
        Ok(Self { edits: sorted })
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }

    /// Maps a previous-text position into the new text. Positions inside a
    /// replaced range clamp to the end of its replacement, and a position at
    /// an insertion point moves past the inserted text.
    pub fn map_position(&self, old: usize) -> usize {
        let mut delta = 0isize;
        for edit in &self.edits {
            if old < edit.start {
                break;
            }
            if old < edit.old_end {
                return (edit.new_end() as isize + delta) as usize;
            }
            delta += edit.delta();
        }
        (old as isize + delta) as usize
    }

    /// Maps a new-text position back into the previous text, or `None` when
    /// it falls inside inserted text. The end of a replacement maps to the
    /// end of the replaced range.
    pub fn to_old(&self, new: usize) -> Option<usize> {
        let mut delta = 0isize;
        for edit in &self.edits {
            let new_start = (edit.start as isize + delta) as usize;
            let new_end = new_start + edit.new_len;
            if new < new_start {
                break;
            }
            if new == new_end {
                return Some(edit.old_end);
            }
            if new < new_end {
                return None;
            }
            delta += edit.delta();
        }
        Some((new as isize - delta) as usize)
    }

    /// Whether any edit touches the previous-text range
    /// `start..examined_end`. Insertions at `start` do not.
    pub fn affects(&self, start: usize, examined_end: usize) -> bool {
        let first = self.edits.partition_point(|e| e.old_end <= start);
        self.edits[first..]
            .first()
            .is_some_and(|e| e.start < examined_end)
    }
}
