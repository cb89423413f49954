#![forbid(unsafe_code)]

//! Boundary observer seam.
//!
//! The host owns the actual visibility detection. The controller only asks it
//! to create one sentinel per edge at mount and to drop them at unmount; the
//! host reports visibility back through
//! [`WindowController::on_visibility`](crate::WindowController::on_visibility).
//! Sentinel *positions* are never pushed through this trait: the controller
//! derives them from the pool and the host paints them from the frame.

use vfeed_core::{Edge, ObserverOptions};

/// Host handle for one sentinel element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SentinelId(u64);

impl SentinelId {
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Creates zero-size sentinels and reports their visibility.
pub trait BoundaryObserver {
    /// Insert a sentinel for `edge` into the host container and start
    /// observing it.
    fn observe(&mut self, edge: Edge, options: &ObserverOptions) -> SentinelId;

    /// Stop observing and remove the sentinel.
    fn disconnect(&mut self, sentinel: SentinelId);
}

impl<O: BoundaryObserver + ?Sized> BoundaryObserver for &mut O {
    fn observe(&mut self, edge: Edge, options: &ObserverOptions) -> SentinelId {
        (**self).observe(edge, options)
    }

    fn disconnect(&mut self, sentinel: SentinelId) {
        (**self).disconnect(sentinel);
    }
}

/// The two sentinels created at mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelPair {
    pub top: SentinelId,
    pub bottom: SentinelId,
}

impl SentinelPair {
    #[must_use]
    pub fn get(&self, edge: Edge) -> SentinelId {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
        }
    }

    /// Which edge a sentinel belongs to, if it is one of ours.
    #[must_use]
    pub fn edge_of(&self, sentinel: SentinelId) -> Option<Edge> {
        Edge::ALL.into_iter().find(|&edge| self.get(edge) == sentinel)
    }
}

/// One visibility report from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityEntry {
    pub sentinel: SentinelId,
    pub edge: Edge,
    /// Fraction of the sentinel inside the viewport, in `[0, 1]`.
    pub ratio: f64,
}
