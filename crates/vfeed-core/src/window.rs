#![forbid(unsafe_code)]

//! The logical index window.

use std::ops::Range;

/// Logical `[start, end)` range of dataset indices held by the slot pool.
///
/// Both bounds move together once the pool is full, so `len()` is the pool
/// length at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Window {
    start: usize,
    end: usize,
}

impl Window {
    /// Empty window at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Window covering `[start, end)`.
    ///
    /// # Panics
    /// Panics if `start > end`.
    #[must_use]
    pub fn from_range(range: Range<usize>) -> Self {
        assert!(range.start <= range.end, "window start after end: {range:?}");
        Self {
            start: range.start,
            end: range.end,
        }
    }

    /// First materialized index.
    #[must_use]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// One past the last materialized index.
    #[must_use]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Number of materialized indices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether the window sits at the top of the dataset.
    #[must_use]
    pub const fn at_top(&self) -> bool {
        self.start == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }

    /// Extend the end only (pool still filling).
    pub fn grow(&mut self, count: usize) {
        self.end += count;
    }

    /// Slide both bounds forward.
    pub fn advance(&mut self, count: usize) {
        self.start += count;
        self.end += count;
    }

    /// Slide both bounds back. Returns `false` and leaves the window unchanged
    /// if that would move `start` below zero.
    #[must_use]
    pub fn retreat(&mut self, count: usize) -> bool {
        match self.start.checked_sub(count) {
            Some(start) => {
                self.start = start;
                self.end -= count;
                true
            }
            None => false,
        }
    }
}
