#![forbid(unsafe_code)]

//! Scroll driver: moves the viewport and feeds visibility changes to the
//! controller until the layout settles.
//!
//! One settle round paints the current frame (sentinel positions and total
//! extent), asks the viewport for changed ratios, and delivers them. A
//! transition moves the sentinels, so rounds repeat until the viewport has
//! nothing new to report.

use serde::Serialize;
use vfeed_core::{Edge, ItemRenderer, Result};
use vfeed_engine::{ControllerCell, DataSource, Transition, WindowController};

use crate::viewport::Viewport;

/// Upper bound on settle rounds after a single scroll.
pub const MAX_SETTLE_ROUNDS: usize = 64;

/// One transition, as printed by the simulator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceLine {
    pub step: usize,
    pub scroll_top: f64,
    pub edge: &'static str,
    pub outcome: &'static str,
    pub start: usize,
    pub end: usize,
    pub padding_top: f64,
    pub padding_bottom: f64,
    pub total_extent: f64,
}

pub struct ScrollDriver<T, S, R: ItemRenderer<T>> {
    cell: ControllerCell<T, S, R>,
    viewport: Viewport,
    step: usize,
}

impl<T, S, R> ScrollDriver<T, S, R>
where
    S: DataSource<T>,
    R: ItemRenderer<T>,
{
    #[must_use]
    pub fn new(controller: WindowController<T, S, R>, viewport: Viewport) -> Self {
        Self {
            cell: ControllerCell::new(controller),
            viewport,
            step: 0,
        }
    }

    #[must_use]
    pub fn cell(&self) -> &ControllerCell<T, S, R> {
        &self.cell
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Mount the sentinels, run the first fill, and settle.
    pub async fn mount(&mut self) -> Result<Vec<TraceLine>> {
        let outcome = self.cell.init(&mut self.viewport).await?;
        let mut lines = Vec::new();
        self.record(&mut lines, Edge::Bottom, outcome);
        self.settle(&mut lines).await?;
        Ok(lines)
    }

    /// Scroll by `delta` px (negative scrolls up) and settle.
    pub async fn scroll_by(&mut self, delta: f64) -> Result<Vec<TraceLine>> {
        self.step += 1;
        let extent = self.total_extent();
        let target = self.viewport.scroll_top() + delta;
        self.viewport.scroll_to(target, extent);
        let mut lines = Vec::new();
        self.settle(&mut lines).await?;
        Ok(lines)
    }

    async fn settle(&mut self, lines: &mut Vec<TraceLine>) -> Result<()> {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let Some(sentinels) = self.cell.with_frame(|frame| frame.sentinels) else {
                return Ok(());
            };
            self.viewport.place(sentinels);
            let entries = self.viewport.take_entries();
            if entries.is_empty() {
                return Ok(());
            }
            for (index, entry) in entries.iter().enumerate() {
                match self.cell.on_visibility(entry.edge, entry.ratio).await {
                    Ok(outcome) => self.record(lines, entry.edge, outcome),
                    Err(err) => {
                        // Nothing moved: report this entry and the undelivered
                        // ones again on the next settle.
                        for pending in &entries[index..] {
                            self.viewport.rearm(pending.edge);
                        }
                        return Err(err);
                    }
                }
            }
        }
        tracing::warn!(
            message = "sim.settle_exhausted",
            rounds = MAX_SETTLE_ROUNDS,
            scroll_top = self.viewport.scroll_top()
        );
        Ok(())
    }

    fn record(&self, lines: &mut Vec<TraceLine>, edge: Edge, outcome: Transition) {
        if outcome == Transition::Ignored {
            return;
        }
        let line = self.cell.with_frame(|frame| TraceLine {
            step: self.step,
            scroll_top: self.viewport.scroll_top(),
            edge: match edge {
                Edge::Top => "top",
                Edge::Bottom => "bottom",
            },
            outcome: outcome.as_str(),
            start: frame.window.start(),
            end: frame.window.end(),
            padding_top: frame.padding_top,
            padding_bottom: frame.padding_bottom,
            total_extent: frame.total_extent(),
        });
        if let Some(line) = line {
            tracing::info!(
                message = "sim.transition",
                step = line.step,
                edge = line.edge,
                outcome = line.outcome,
                start = line.start,
                end = line.end
            );
            lines.push(line);
        }
    }

    #[must_use]
    pub fn total_extent(&self) -> f64 {
        self.cell
            .with_frame(|frame| frame.total_extent())
            .unwrap_or(0.0)
    }

    /// Logical orders of the slots currently inside the viewport.
    #[must_use]
    pub fn visible_orders(&self) -> Vec<usize> {
        let (top, height) = (self.viewport.scroll_top(), self.viewport.height());
        self.cell
            .with_frame(|frame| {
                frame
                    .visible(top, height)
                    .map(|slot| slot.logical_order)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Disconnect the sentinels and hand back the elements.
    pub fn unmount(self) -> Vec<R::Element> {
        let mut viewport = self.viewport;
        self.cell.into_inner().unmount(&mut viewport)
    }
}
