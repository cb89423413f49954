#![forbid(unsafe_code)]

//! Bounded pool of rendered slots.
//!
//! The pool grows from empty to its capacity during the initial fill and
//! then stays that size: a transition relocates existing slots instead of
//! creating or dropping elements.
//!
//! # Invariants
//!
//! 1. `len() <= capacity()` at all times.
//! 2. After [`SlotPool::append`] or [`SlotPool::recycle`], slots are sorted by
//!    strictly ascending logical order.
//! 3. Adjacent slots satisfy
//!    `next.offset_y == prev.offset_y + height(prev) + margin`.
//!
//! The re-sort after a recycle is a full stable sort by logical order. An
//! upward recycle walks the tail in reverse, so the slots it touches end up
//! in the wrong physical positions until the sort runs.

use std::ops::Range;

use crate::error::{FeedError, Result};
use crate::geometry::{Direction, next_offset};
use crate::render::ItemRenderer;

/// One reusable rendered unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Slot<E> {
    logical_order: usize,
    offset_y: f64,
    element: E,
}

impl<E> Slot<E> {
    /// Dataset index the slot currently represents.
    ///
    /// This is a sort key for the current window, not a stable identity:
    /// the same slot represents a different index after every recycle.
    #[must_use]
    pub fn logical_order(&self) -> usize {
        self.logical_order
    }

    /// Absolute vertical offset from the top of the content box.
    #[must_use]
    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    /// The rendered element.
    #[must_use]
    pub fn element(&self) -> &E {
        &self.element
    }
}

/// Fixed-capacity, order-sorted pool of slots.
#[derive(Debug, Clone)]
pub struct SlotPool<E> {
    slots: Vec<Slot<E>>,
    capacity: usize,
}

impl<E> SlotPool<E> {
    /// Empty pool that will hold at most `capacity` slots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the initial fill is complete.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Slots still available before the pool is full.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.slots.len())
    }

    #[must_use]
    pub fn first(&self) -> Option<&Slot<E>> {
        self.slots.first()
    }

    #[must_use]
    pub fn last(&self) -> Option<&Slot<E>> {
        self.slots.last()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Slot<E>> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Slot<E>> {
        self.slots.iter()
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot<E>] {
        &self.slots
    }

    /// Whether logical orders are strictly ascending in pool order.
    #[must_use]
    pub fn is_ordered(&self) -> bool {
        self.slots
            .windows(2)
            .all(|pair| pair[0].logical_order < pair[1].logical_order)
    }

    /// Distance from the first slot's top to the last slot's bottom.
    pub fn content_extent(&self, measure: impl Fn(&E) -> f64) -> f64 {
        match (self.slots.first(), self.slots.last()) {
            (Some(first), Some(last)) => last.offset_y + measure(&last.element) - first.offset_y,
            _ => 0.0,
        }
    }

    /// Render `items` into new slots at the end of the pool.
    ///
    /// Logical orders continue from the current length. The first slot ever
    /// created sits at offset 0; every other new slot is chained below its
    /// predecessor. Returns the logical orders that were created.
    pub fn append<T, R>(
        &mut self,
        items: &[T],
        renderer: &mut R,
        margin: f64,
    ) -> Result<Range<usize>>
    where
        R: ItemRenderer<T, Element = E> + ?Sized,
    {
        let requested = self.slots.len() + items.len();
        if requested > self.capacity {
            return Err(FeedError::PoolOverflow {
                capacity: self.capacity,
                requested,
            });
        }

        let base = self.slots.len();
        for (i, item) in items.iter().enumerate() {
            let offset_y = match self.slots.last() {
                Some(prev) => next_offset(
                    prev.offset_y,
                    renderer.measure(&prev.element),
                    margin,
                    Direction::Down,
                ),
                None => 0.0,
            };
            let mut element = renderer.create(item);
            renderer.place(&mut element, offset_y);
            self.slots.push(Slot {
                logical_order: base + i,
                offset_y,
                element,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(message = "vfeed.pool.append", count = items.len(), len = self.slots.len());

        self.sort_by_order();
        Ok(base..base + items.len())
    }

    /// Relocate `items.len()` slots to the far side of the pool.
    ///
    /// - `Down`: the first slots move below the current last slot and take
    ///   orders `first_order..`, item `i` going to the `i`-th relocated slot.
    /// - `Up`: the last slots move above the current first slot. Item `j`
    ///   goes to slot `len - n + j`, processed tail to head so each slot is
    ///   positioned against the one placed before it.
    ///
    /// Content is rewritten through [`ItemRenderer::update`] before the slot
    /// is measured. Returns the logical orders that were assigned.
    pub fn recycle<T, R>(
        &mut self,
        direction: Direction,
        first_order: usize,
        items: &[T],
        renderer: &mut R,
        margin: f64,
    ) -> Result<Range<usize>>
    where
        R: ItemRenderer<T, Element = E> + ?Sized,
    {
        let count = items.len();
        let len = self.slots.len();
        if count > len {
            return Err(FeedError::PoolOverflow {
                capacity: len,
                requested: count,
            });
        }
        if count == 0 {
            return Ok(first_order..first_order);
        }

        match direction {
            Direction::Down => {
                let mut cursor = match self.slots.last() {
                    Some(last) => next_offset(
                        last.offset_y,
                        renderer.measure(&last.element),
                        margin,
                        Direction::Down,
                    ),
                    None => 0.0,
                };
                for (i, (slot, item)) in self.slots[..count].iter_mut().zip(items).enumerate() {
                    slot.logical_order = first_order + i;
                    renderer.update(&mut slot.element, item);
                    slot.offset_y = cursor;
                    renderer.place(&mut slot.element, cursor);
                    cursor = next_offset(
                        cursor,
                        renderer.measure(&slot.element),
                        margin,
                        Direction::Down,
                    );
                }
            }
            Direction::Up => {
                let mut anchor = self.slots.first().map_or(0.0, |first| first.offset_y);
                for (j, item) in items.iter().enumerate().rev() {
                    let slot = &mut self.slots[len - count + j];
                    slot.logical_order = first_order + j;
                    renderer.update(&mut slot.element, item);
                    anchor = next_offset(
                        anchor,
                        renderer.measure(&slot.element),
                        margin,
                        Direction::Up,
                    );
                    slot.offset_y = anchor;
                    renderer.place(&mut slot.element, anchor);
                }
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(
            message = "vfeed.pool.recycle",
            direction = direction.as_str(),
            first_order,
            count
        );

        self.sort_by_order();
        Ok(first_order..first_order + count)
    }

    /// Stable sort by logical order.
    pub fn sort_by_order(&mut self) {
        self.slots.sort_by_key(|slot| slot.logical_order);
    }

    /// Tear the pool down, returning elements in pool order.
    #[must_use]
    pub fn into_elements(self) -> Vec<E> {
        self.slots.into_iter().map(|slot| slot.element).collect()
    }
}

impl<'a, E> IntoIterator for &'a SlotPool<E> {
    type Item = &'a Slot<E>;
    type IntoIter = std::slice::Iter<'a, Slot<E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.slots.iter()
    }
}
