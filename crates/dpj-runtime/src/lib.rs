//! Runtime support for compiled programs.
//!
//! [`ArraySlice`] is a window onto an ordinary array. Indices are relative to the start of the
//! window and are checked against the window's length, even when they would be in bounds for
//! the underlying array.

#![forbid(unsafe_code)]

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SliceError {
    #[error("index {index} out of bounds for slice of length {length}")]
    IndexOutOfBounds { index: usize, length: usize },
    #[error("range {start}..{start}+{length} out of bounds for slice of length {bound}")]
    RangeOutOfBounds {
        start: usize,
        length: usize,
        bound: usize,
    },
}

/// A bounds-checked view of a contiguous run of cells of an array.
#[derive(Debug, PartialEq, Eq)]
pub struct ArraySlice<'a, T> {
    elts: &'a mut [T],
    start: usize,
}

impl<'a, T> ArraySlice<'a, T> {
    /// Wraps the whole of `elts`.
    pub fn new(elts: &'a mut [T]) -> Self {
        Self { elts, start: 0 }
    }

    /// Offset of index 0 within the underlying array.
    pub fn start(&self) -> usize {
        self.start
    }

    pub fn len(&self) -> usize {
        self.elts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    fn check(&self, index: usize) -> Result<(), SliceError> {
        if index < self.len() {
            Ok(())
        } else {
            Err(SliceError::IndexOutOfBounds {
                index,
                length: self.len(),
            })
        }
    }

    pub fn get(&self, index: usize) -> Result<&T, SliceError> {
        self.check(index)?;
        Ok(&self.elts[index])
    }

    /// Replaces the value at `index`, returning the previous one.
    pub fn put(&mut self, index: usize, value: T) -> Result<T, SliceError> {
        self.check(index)?;
        Ok(std::mem::replace(&mut self.elts[index], value))
    }

    pub fn swap(&mut self, i: usize, j: usize) -> Result<(), SliceError> {
        self.check(i)?;
        self.check(j)?;
        self.elts.swap(i, j);
        Ok(())
    }

    /// A view of `length` cells starting at `start`, sharing this slice's storage.
    ///
    /// Index `i` of the result is index `start + i` of `self`.
    pub fn subslice(
        &mut self,
        start: usize,
        length: usize,
    ) -> Result<ArraySlice<'_, T>, SliceError> {
        let bound = self.len();
        let end = start
            .checked_add(length)
            .filter(|end| *end <= bound)
            .ok_or(SliceError::RangeOutOfBounds {
                start,
                length,
                bound,
            })?;
        Ok(ArraySlice {
            elts: &mut self.elts[start..end],
            start: self.start + start,
        })
    }

    /// Splits into two disjoint views at `mid`, so each half can be written independently.
    pub fn split_at(
        self,
        mid: usize,
    ) -> Result<(ArraySlice<'a, T>, ArraySlice<'a, T>), SliceError> {
        if mid > self.len() {
            return Err(SliceError::RangeOutOfBounds {
                start: 0,
                length: mid,
                bound: self.len(),
            });
        }
        let start = self.start;
        let (left, right) = self.elts.split_at_mut(mid);
        Ok((
            ArraySlice { elts: left, start },
            ArraySlice {
                elts: right,
                start: start + mid,
            },
        ))
    }

    /// The cells covered by this view.
    pub fn as_slice(&self) -> &[T] {
        &*self.elts
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut *self.elts
    }
}

impl<T: fmt::Display> fmt::Display for ArraySlice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elt) in self.elts.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{elt}")?;
        }
        Ok(())
    }
}
