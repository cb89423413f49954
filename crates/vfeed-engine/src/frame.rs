#![forbid(unsafe_code)]

//! Paint snapshot produced by [`WindowController::render`](crate::WindowController::render).

use vfeed_core::{SentinelOffsets, Window};

/// One slot as the host should paint it.
#[derive(Debug)]
pub struct SlotView<'a, E> {
    pub logical_order: usize,
    pub offset_y: f64,
    /// Post-layout height at the time of the snapshot.
    pub height: f64,
    pub element: &'a E,
}

/// Everything a host needs to paint the list.
#[derive(Debug)]
pub struct FeedFrame<'a, E> {
    pub window: Window,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub sentinels: SentinelOffsets,
    /// Slots in logical order.
    pub slots: Vec<SlotView<'a, E>>,
}

impl<'a, E> FeedFrame<'a, E> {
    /// First slot's top to last slot's bottom.
    #[must_use]
    pub fn pool_extent(&self) -> f64 {
        match (self.slots.first(), self.slots.last()) {
            (Some(first), Some(last)) => last.offset_y + last.height - first.offset_y,
            _ => 0.0,
        }
    }

    /// Scrollable height: both spacers plus the pool.
    #[must_use]
    pub fn total_extent(&self) -> f64 {
        self.padding_top + self.pool_extent() + self.padding_bottom
    }

    /// Slots intersecting `[top, top + height)`.
    pub fn visible(&self, top: f64, height: f64) -> impl Iterator<Item = &SlotView<'a, E>> {
        let bottom = top + height;
        self.slots
            .iter()
            .filter(move |slot| slot.offset_y < bottom && slot.offset_y + slot.height > top)
    }
}
