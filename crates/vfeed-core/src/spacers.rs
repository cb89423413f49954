#![forbid(unsafe_code)]

//! Values derived from the pool after every mutation.
//!
//! Neither the padding spacers nor the sentinel offsets are ever mutated on
//! their own: both are recomputed from `pool.first()` / `pool.last()` once a
//! transition has finished placing slots.

use crate::geometry::Edge;
use crate::pool::SlotPool;

/// Synthetic empty space above and below the pool.
///
/// `padding_top` always equals the first slot's offset. `padding_bottom`
/// absorbs the first slot's movement so the scrollable height stays put
/// without knowing the dataset size up front: it shrinks when the pool slides
/// down and grows back when it slides up, never going below zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spacers {
    padding_top: f64,
    padding_bottom: f64,
}

impl Spacers {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            padding_top: 0.0,
            padding_bottom: 0.0,
        }
    }

    #[must_use]
    pub fn padding_top(&self) -> f64 {
        self.padding_top
    }

    #[must_use]
    pub fn padding_bottom(&self) -> f64 {
        self.padding_bottom
    }

    /// Apply the padding rule for a first slot now at `first_offset`.
    ///
    /// Returns how far the first slot moved since the previous settle.
    pub fn settle(&mut self, first_offset: f64) -> f64 {
        let moved = first_offset - self.padding_top;
        self.padding_bottom = (self.padding_bottom - moved).max(0.0);
        self.padding_top = first_offset;
        moved
    }

    /// Recompute from the pool's current first slot. An empty pool leaves the
    /// spacers unchanged.
    pub fn settle_from<E>(&mut self, pool: &SlotPool<E>) -> f64 {
        match pool.first() {
            Some(first) => self.settle(first.offset_y()),
            None => 0.0,
        }
    }

    /// Total scrollable height given the pool's own extent.
    #[must_use]
    pub fn total_extent(&self, pool_extent: f64) -> f64 {
        self.padding_top + pool_extent + self.padding_bottom
    }
}

/// Vertical offsets of the two sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SentinelOffsets {
    /// Offset of the top sentinel (first slot).
    pub top: f64,
    /// Offset of the bottom sentinel (last slot).
    pub bottom: f64,
}

impl SentinelOffsets {
    /// Derive from the pool. Both sentinels sit at the origin while the pool
    /// is empty.
    #[must_use]
    pub fn from_pool<E>(pool: &SlotPool<E>) -> Self {
        Self {
            top: pool.first().map_or(0.0, |slot| slot.offset_y()),
            bottom: pool.last().map_or(0.0, |slot| slot.offset_y()),
        }
    }

    #[must_use]
    pub fn get(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }
}
