#![forbid(unsafe_code)]

//! Scroll viewport that plays the boundary observer.
//!
//! Sentinels are zero-size, so a sentinel's ratio is either `1.0` (its offset
//! lies inside `[scroll_top, scroll_top + height]`) or `0.0`. Reports are
//! edge-triggered: an entry is produced the first time a sentinel is seen and
//! whenever its ratio changes. Moving a sentinel re-arms it, so a sentinel
//! that lands inside the viewport again after a transition reports again.

use vfeed_core::{Edge, ObserverOptions, SentinelOffsets};
use vfeed_engine::{BoundaryObserver, SentinelId, VisibilityEntry};

#[derive(Debug, Clone)]
struct Tracked {
    id: SentinelId,
    edge: Edge,
    offset: f64,
    classes: String,
    last_ratio: Option<f64>,
}

fn ratio(offset: f64, top: f64, height: f64) -> f64 {
    if offset >= top && offset <= top + height {
        1.0
    } else {
        0.0
    }
}

#[derive(Debug, Clone)]
pub struct Viewport {
    scroll_top: f64,
    height: f64,
    next_id: u64,
    tracked: Vec<Tracked>,
}

impl Viewport {
    #[must_use]
    pub fn new(height: f64) -> Self {
        Self {
            scroll_top: 0.0,
            height: height.max(0.0),
            next_id: 1,
            tracked: Vec::new(),
        }
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Live sentinels.
    #[must_use]
    pub fn observed(&self) -> usize {
        self.tracked.len()
    }

    /// CSS classes the host would put on `edge`'s sentinel.
    #[must_use]
    pub fn sentinel_classes(&self, edge: Edge) -> Option<&str> {
        self.tracked
            .iter()
            .find(|t| t.edge == edge)
            .map(|t| t.classes.as_str())
    }

    /// Scroll to `top`, clamped to `[0, extent - height]`.
    pub fn scroll_to(&mut self, top: f64, extent: f64) {
        let max_top = (extent - self.height).max(0.0);
        self.scroll_top = top.clamp(0.0, max_top);
    }

    /// Move the sentinels to where the latest frame painted them.
    pub fn place(&mut self, offsets: SentinelOffsets) {
        for tracked in &mut self.tracked {
            let offset = offsets.get(tracked.edge);
            if offset != tracked.offset {
                tracked.offset = offset;
                tracked.last_ratio = None;
            }
        }
    }

    /// Forget the last ratio reported for `edge`, so the next call to
    /// [`take_entries`](Self::take_entries) reports it again.
    pub fn rearm(&mut self, edge: Edge) {
        for tracked in self.tracked.iter_mut().filter(|t| t.edge == edge) {
            tracked.last_ratio = None;
        }
    }

    #[must_use]
    pub fn ratio_of(&self, offset: f64) -> f64 {
        ratio(offset, self.scroll_top, self.height)
    }

    /// Visibility changes since the last call, top sentinel first.
    pub fn take_entries(&mut self) -> Vec<VisibilityEntry> {
        let (top, height) = (self.scroll_top, self.height);
        let mut entries = Vec::new();
        for tracked in &mut self.tracked {
            let ratio = ratio(tracked.offset, top, height);
            if tracked.last_ratio != Some(ratio) {
                tracked.last_ratio = Some(ratio);
                entries.push(VisibilityEntry {
                    sentinel: tracked.id,
                    edge: tracked.edge,
                    ratio,
                });
            }
        }
        entries.sort_by_key(|entry| entry.edge.index());
        entries
    }
}

impl BoundaryObserver for Viewport {
    fn observe(&mut self, edge: Edge, options: &ObserverOptions) -> SentinelId {
        let id = SentinelId::new(self.next_id);
        self.next_id += 1;
        tracing::trace!(message = "sim.viewport.observe", edge = ?edge, id = id.get());
        self.tracked.push(Tracked {
            id,
            edge,
            offset: 0.0,
            classes: options.classes().collect::<Vec<_>>().join(" "),
            last_ratio: None,
        });
        id
    }

    fn disconnect(&mut self, sentinel: SentinelId) {
        self.tracked.retain(|t| t.id != sentinel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mounted(height: f64) -> Viewport {
        let mut viewport = Viewport::new(height);
        viewport.observe(Edge::Top, &ObserverOptions::sentinel(Edge::Top));
        viewport.observe(Edge::Bottom, &ObserverOptions::sentinel(Edge::Bottom));
        viewport
    }

    #[test]
    fn first_report_is_always_delivered() {
        let mut viewport = mounted(500.0);
        viewport.place(SentinelOffsets {
            top: 0.0,
            bottom: 900.0,
        });
        let entries = viewport.take_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].edge, entries[0].ratio), (Edge::Top, 1.0));
        assert_eq!((entries[1].edge, entries[1].ratio), (Edge::Bottom, 0.0));
        assert!(viewport.take_entries().is_empty(), "edge-triggered");
    }

    #[test]
    fn scrolling_flips_ratios() {
        let mut viewport = mounted(500.0);
        viewport.place(SentinelOffsets {
            top: 0.0,
            bottom: 900.0,
        });
        viewport.take_entries();
        viewport.scroll_to(450.0, 2000.0);
        let entries = viewport.take_entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| match e.edge {
            Edge::Top => e.ratio == 0.0,
            Edge::Bottom => e.ratio == 1.0,
        }));
    }

    #[test]
    fn moved_sentinel_reports_again() {
        let mut viewport = mounted(500.0);
        viewport.place(SentinelOffsets {
            top: 0.0,
            bottom: 300.0,
        });
        viewport.take_entries();
        viewport.place(SentinelOffsets {
            top: 0.0,
            bottom: 450.0,
        });
        let entries = viewport.take_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!((entries[0].edge, entries[0].ratio), (Edge::Bottom, 1.0));
    }

    #[test]
    fn rearmed_sentinel_reports_unchanged_ratio() {
        let mut viewport = mounted(500.0);
        viewport.take_entries();
        assert!(viewport.take_entries().is_empty());
        viewport.rearm(Edge::Top);
        let entries = viewport.take_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].edge, Edge::Top);
    }

    #[test]
    fn scroll_is_clamped_to_content() {
        let mut viewport = Viewport::new(500.0);
        viewport.scroll_to(10_000.0, 1200.0);
        assert_eq!(viewport.scroll_top(), 700.0);
        viewport.scroll_to(-5.0, 1200.0);
        assert_eq!(viewport.scroll_top(), 0.0);
        viewport.scroll_to(100.0, 300.0);
        assert_eq!(viewport.scroll_top(), 0.0);
    }

    #[test]
    fn disconnect_forgets_sentinel() {
        let mut viewport = mounted(500.0);
        assert_eq!(
            viewport.sentinel_classes(Edge::Top),
            Some("intersection-observer virtual-top-observer absolute-center")
        );
        viewport.disconnect(SentinelId::new(1));
        assert_eq!(viewport.observed(), 1);
        assert_eq!(viewport.sentinel_classes(Edge::Top), None);
    }
}
