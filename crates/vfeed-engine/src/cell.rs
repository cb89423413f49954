#![forbid(unsafe_code)]

//! Single-flight ownership of a controller.
//!
//! Visibility callbacks are delivered on one thread, but a second callback can
//! start while an earlier transition is still awaiting its fetch. Two
//! transitions resolving out of order would corrupt the slot order, so the
//! controller is lent to exactly one transition at a time.
//!
//! A trigger that finds the controller lent out returns [`Transition::Busy`]
//! and is remembered as the *deferred* direction (last one wins). When the
//! in-flight transition finishes, the deferred direction is replayed if its
//! sentinel is still reported visible. A deferred [`trigger`] counts as a
//! visibility report for its edge, so it is replayed unless
//! [`on_visibility`] reports that edge hidden in the meantime.
//!
//! A replay runs inside the call that owns the controller, so its outcome
//! belongs to that call: if the replayed fetch fails, the call returns the
//! error even though its own transition was applied.
//!
//! [`trigger`]: ControllerCell::trigger
//! [`on_visibility`]: ControllerCell::on_visibility

use std::cell::{Cell, RefCell};

use vfeed_core::{Direction, Edge, ItemRenderer, Result};

use crate::controller::{Transition, WindowController};
use crate::frame::FeedFrame;
use crate::observer::BoundaryObserver;
use crate::source::DataSource;

/// Shared handle that serializes transitions on one controller.
pub struct ControllerCell<T, S, R: ItemRenderer<T>> {
    controller: RefCell<WindowController<T, S, R>>,
    deferred: Cell<Option<Direction>>,
    visible: Cell<[bool; 2]>,
    threshold: f64,
}

impl<T, S, R> ControllerCell<T, S, R>
where
    S: DataSource<T>,
    R: ItemRenderer<T>,
{
    #[must_use]
    pub fn new(controller: WindowController<T, S, R>) -> Self {
        let threshold = controller.config().sentinel_threshold();
        Self {
            controller: RefCell::new(controller),
            deferred: Cell::new(None),
            visible: Cell::new([false; 2]),
            threshold,
        }
    }

    /// Whether a transition currently holds the controller.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.controller.try_borrow_mut().is_err()
    }

    /// The direction waiting for the in-flight transition, if any.
    #[must_use]
    pub fn deferred(&self) -> Option<Direction> {
        self.deferred.get()
    }

    /// Last visibility reported for `edge`.
    #[must_use]
    pub fn is_visible(&self, edge: Edge) -> bool {
        self.visible.get()[edge.index()]
    }

    /// Mount sentinels and run the first fill.
    #[allow(clippy::await_holding_refcell_ref)]
    pub async fn init<O>(&self, observer: &mut O) -> Result<Transition>
    where
        O: BoundaryObserver + ?Sized,
    {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            return Ok(Transition::Busy);
        };
        let outcome = controller.init(observer).await;
        self.finish(&mut controller, outcome).await
    }

    /// Visibility callback for one sentinel.
    pub async fn on_visibility(&self, edge: Edge, ratio: f64) -> Result<Transition> {
        let above = ratio > self.threshold;
        self.set_visible(edge, above);
        if !above {
            return Ok(Transition::Ignored);
        }
        self.trigger(edge.direction()).await
    }

    fn set_visible(&self, edge: Edge, visible: bool) {
        let mut edges = self.visible.get();
        edges[edge.index()] = visible;
        self.visible.set(edges);
    }

    /// Request a transition, or defer it if one is already running.
    // The RefMut is the lease: it is held across the fetch on purpose, and
    // every other entry point probes it with `try_borrow*`.
    #[allow(clippy::await_holding_refcell_ref)]
    pub async fn trigger(&self, direction: Direction) -> Result<Transition> {
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            self.set_visible(direction.edge(), true);
            self.deferred.set(Some(direction));
            tracing::debug!(message = "vfeed.busy", direction = direction.as_str());
            return Ok(Transition::Busy);
        };

        let outcome = controller.update(direction).await;
        self.finish(&mut controller, outcome).await
    }

    /// Replay deferred directions after a successful transition. Returns the
    /// first replay error in place of `outcome`.
    async fn finish(
        &self,
        controller: &mut WindowController<T, S, R>,
        outcome: Result<Transition>,
    ) -> Result<Transition> {
        if outcome.is_err() {
            self.deferred.set(None);
            return outcome;
        }
        while let Some(direction) = self.deferred.take() {
            if !self.is_visible(direction.edge()) {
                tracing::debug!(
                    message = "vfeed.replay_skipped",
                    direction = direction.as_str()
                );
                continue;
            }
            match controller.update(direction).await {
                Ok(replayed) => tracing::debug!(
                    message = "vfeed.replay",
                    direction = direction.as_str(),
                    outcome = replayed.as_str()
                ),
                Err(err) => {
                    self.deferred.set(None);
                    tracing::warn!(
                        message = "vfeed.replay_failed",
                        direction = direction.as_str(),
                        error = %err
                    );
                    return Err(err);
                }
            }
        }
        outcome
    }

    /// Read the controller, unless a transition holds it.
    pub fn with_controller<U>(&self, f: impl FnOnce(&WindowController<T, S, R>) -> U) -> Option<U> {
        self.controller.try_borrow().ok().map(|controller| f(&controller))
    }

    /// Build a paint snapshot, unless a transition holds the controller.
    pub fn with_frame<U>(&self, f: impl FnOnce(&FeedFrame<'_, R::Element>) -> U) -> Option<U> {
        self.with_controller(|controller| f(&controller.render()))
    }

    /// Give the controller back, e.g. to unmount it.
    pub fn into_inner(self) -> WindowController<T, S, R> {
        self.controller.into_inner()
    }
}
