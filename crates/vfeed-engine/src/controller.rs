#![forbid(unsafe_code)]

//! The window controller.
//!
//! Owns the logical window, the slot pool, and the padding spacers, and
//! changes them only from two transitions:
//!
//! ```text
//!                  bottom sentinel visible
//!   ┌──────────┐ ───────────────────────────▶ ┌───────────────────────┐
//!   │  FILLING │  pool < capacity: append      │ FULL                  │
//!   │ len < 2p │  one page, end += p           │ len == 2p             │
//!   └──────────┘ ◀── (never goes back) ─────── │ DOWN: recycle head    │
//!                                               │ UP:   recycle tail    │
//!                                               └───────────────────────┘
//! ```
//!
//! # Failure modes
//!
//! | Condition | Outcome | State |
//! |-----------|---------|-------|
//! | UP with `start == 0` | [`Transition::AtTop`], no fetch | unchanged |
//! | DOWN page empty | [`Transition::Exhausted`] | unchanged |
//! | DOWN page short | batch shrinks to the returned length | window moves by that length |
//! | UP page short | [`FeedError::ShortPage`] | unchanged |
//! | fetch rejected | [`FeedError::Fetch`] | unchanged |
//!
//! Mutation happens only in the synchronous continuation after the fetch
//! resolves, so a rejected or dropped fetch never leaves the pool half
//! rewritten.

use std::marker::PhantomData;

use tracing::Instrument;
use vfeed_core::{
    Direction, Edge, FeedConfig, FeedError, ItemRenderer, Result, SentinelOffsets, SlotPool,
    Spacers, ValidConfig, Window,
};
use web_time::Instant;

use crate::frame::{FeedFrame, SlotView};
use crate::observer::{BoundaryObserver, SentinelPair};
use crate::source::DataSource;

/// Outcome of one visibility event or transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Pool still filling: a page was appended as new slots.
    Grew { appended: usize },
    /// Pool full: slots were relocated to the far side.
    Recycled { direction: Direction, moved: usize },
    /// UP requested with the window already at index 0. No fetch.
    AtTop,
    /// DOWN fetch returned no items.
    Exhausted,
    /// Visibility ratio at or below the trigger threshold.
    Ignored,
    /// Another transition is in flight; the request was deferred.
    Busy,
}

impl Transition {
    /// Whether the window or pool changed.
    #[must_use]
    pub fn mutated(&self) -> bool {
        matches!(self, Self::Grew { .. } | Self::Recycled { .. })
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grew { .. } => "grew",
            Self::Recycled { .. } => "recycled",
            Self::AtTop => "at_top",
            Self::Exhausted => "exhausted",
            Self::Ignored => "ignored",
            Self::Busy => "busy",
        }
    }
}

/// Windowing engine over a data source and an item renderer.
pub struct WindowController<T, S, R: ItemRenderer<T>> {
    config: ValidConfig,
    source: S,
    renderer: R,
    window: Window,
    pool: SlotPool<R::Element>,
    spacers: Spacers,
    sentinels: Option<SentinelPair>,
    transitions: u64,
    _item: PhantomData<fn(&T)>,
}

impl<T, S, R> std::fmt::Debug for WindowController<T, S, R>
where
    R: ItemRenderer<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowController")
            .field("window", &self.window)
            .field("pool_len", &self.pool.len())
            .field("spacers", &self.spacers)
            .field("sentinels", &self.sentinels)
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}

/// Builder that validates every collaborator before anything is mounted.
pub struct WindowControllerBuilder<T, S, R> {
    config: FeedConfig,
    source: Option<S>,
    renderer: Option<R>,
    _item: PhantomData<fn(&T)>,
}

impl<T, S, R> WindowControllerBuilder<T, S, R>
where
    S: DataSource<T>,
    R: ItemRenderer<T>,
{
    #[must_use]
    pub fn new(config: FeedConfig) -> Self {
        Self {
            config,
            source: None,
            renderer: None,
            _item: PhantomData,
        }
    }

    #[must_use]
    pub fn source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn renderer(mut self, renderer: R) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Validate the config and collaborators.
    pub fn build(self) -> Result<WindowController<T, S, R>> {
        let config = self.config.validated()?;
        let source = self
            .source
            .ok_or(FeedError::MissingCollaborator("data source"))?;
        let renderer = self
            .renderer
            .ok_or(FeedError::MissingCollaborator("item renderer"))?;
        Ok(WindowController::from_parts(config, source, renderer))
    }
}

impl<T, S, R> WindowController<T, S, R>
where
    S: DataSource<T>,
    R: ItemRenderer<T>,
{
    /// Start building a controller.
    #[must_use]
    pub fn builder(config: FeedConfig) -> WindowControllerBuilder<T, S, R> {
        WindowControllerBuilder::new(config)
    }

    /// Validate `config` and build a controller in one step.
    pub fn new(config: FeedConfig, source: S, renderer: R) -> Result<Self> {
        Self::builder(config).source(source).renderer(renderer).build()
    }

    fn from_parts(config: ValidConfig, source: S, renderer: R) -> Self {
        let pool = SlotPool::with_capacity(config.pool_capacity());
        Self {
            config,
            source,
            renderer,
            window: Window::new(),
            pool,
            spacers: Spacers::new(),
            sentinels: None,
            transitions: 0,
            _item: PhantomData,
        }
    }

    // --- Read access ------------------------------------------------------

    #[must_use]
    pub fn config(&self) -> &ValidConfig {
        &self.config
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn pool(&self) -> &SlotPool<R::Element> {
        &self.pool
    }

    #[must_use]
    pub fn spacers(&self) -> Spacers {
        self.spacers
    }

    /// Sentinel offsets derived from the first and last slot.
    #[must_use]
    pub fn sentinel_offsets(&self) -> SentinelOffsets {
        SentinelOffsets::from_pool(&self.pool)
    }

    /// Sentinel handles, once mounted.
    #[must_use]
    pub fn sentinels(&self) -> Option<SentinelPair> {
        self.sentinels
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.sentinels.is_some()
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Number of transitions that mutated the window.
    #[must_use]
    pub fn transitions(&self) -> u64 {
        self.transitions
    }

    // --- Lifecycle --------------------------------------------------------

    /// Mount both sentinels and perform the first fill.
    ///
    /// Calling `init` again on a mounted controller keeps the existing
    /// sentinels and only runs another DOWN transition.
    pub async fn init<O>(&mut self, observer: &mut O) -> Result<Transition>
    where
        O: BoundaryObserver + ?Sized,
    {
        if self.sentinels.is_none() {
            let pair = SentinelPair {
                top: observer.observe(Edge::Top, self.config.get().sentinel_options(Edge::Top)),
                bottom: observer.observe(
                    Edge::Bottom,
                    self.config.get().sentinel_options(Edge::Bottom),
                ),
            };
            tracing::debug!(
                message = "vfeed.mount",
                top = pair.top.get(),
                bottom = pair.bottom.get(),
                page_size = self.config.page_size(),
                capacity = self.config.pool_capacity()
            );
            self.sentinels = Some(pair);
        }
        self.update(Direction::Down).await
    }

    /// Snapshot for painting.
    #[must_use]
    pub fn render(&self) -> FeedFrame<'_, R::Element> {
        FeedFrame {
            window: self.window,
            padding_top: self.spacers.padding_top(),
            padding_bottom: self.spacers.padding_bottom(),
            sentinels: self.sentinel_offsets(),
            slots: self
                .pool
                .iter()
                .map(|slot| SlotView {
                    logical_order: slot.logical_order(),
                    offset_y: slot.offset_y(),
                    height: self.renderer.measure(slot.element()),
                    element: slot.element(),
                })
                .collect(),
        }
    }

    /// Disconnect both sentinels and hand back the elements, in pool order.
    pub fn unmount<O>(self, observer: &mut O) -> Vec<R::Element>
    where
        O: BoundaryObserver + ?Sized,
    {
        if let Some(pair) = self.sentinels {
            observer.disconnect(pair.top);
            observer.disconnect(pair.bottom);
            tracing::debug!(message = "vfeed.unmount", slots = self.pool.len());
        }
        self.pool.into_elements()
    }

    // --- Transitions ------------------------------------------------------

    /// Visibility callback for one sentinel.
    ///
    /// Starts a transition only when `ratio` exceeds the sentinel threshold.
    pub async fn on_visibility(&mut self, edge: Edge, ratio: f64) -> Result<Transition> {
        if ratio <= self.config.sentinel_threshold() {
            return Ok(Transition::Ignored);
        }
        self.update(edge.direction()).await
    }

    /// Run one transition in `direction`.
    pub async fn update(&mut self, direction: Direction) -> Result<Transition> {
        let span = tracing::debug_span!(
            "vfeed.transition",
            direction = direction.as_str(),
            start = self.window.start(),
            end = self.window.end(),
            outcome = tracing::field::Empty,
            duration_us = tracing::field::Empty
        );
        let started = Instant::now();

        let result = match direction {
            Direction::Down => self.scroll_down().instrument(span.clone()).await,
            Direction::Up => self.scroll_up().instrument(span.clone()).await,
        };

        span.record("duration_us", started.elapsed().as_micros() as u64);
        match &result {
            Ok(outcome) => {
                span.record("outcome", outcome.as_str());
                if outcome.mutated() {
                    self.transitions += 1;
                }
            }
            Err(_) => {
                span.record("outcome", "error");
            }
        }
        result
    }

    async fn scroll_down(&mut self) -> Result<Transition> {
        let filling = !self.pool.is_full();
        let requested = if filling {
            self.config.page_size().min(self.pool.remaining())
        } else {
            self.config.page_size()
        };
        let start = self.window.end();
        let items = self.fetch(start, requested).await?;

        if items.is_empty() {
            tracing::debug!(message = "vfeed.noop", reason = "exhausted", start);
            return Ok(Transition::Exhausted);
        }

        let margin = self.config.item_margin();
        let outcome = if filling {
            let orders = self.pool.append(&items, &mut self.renderer, margin)?;
            self.window.grow(orders.len());
            tracing::debug!(
                message = "vfeed.grow",
                appended = orders.len(),
                len = self.pool.len(),
                end = self.window.end()
            );
            Transition::Grew {
                appended: orders.len(),
            }
        } else {
            let orders =
                self.pool
                    .recycle(Direction::Down, start, &items, &mut self.renderer, margin)?;
            self.window.advance(orders.len());
            tracing::debug!(
                message = "vfeed.recycle",
                direction = "down",
                moved = orders.len(),
                start = self.window.start(),
                end = self.window.end()
            );
            Transition::Recycled {
                direction: Direction::Down,
                moved: orders.len(),
            }
        };

        self.settle();
        Ok(outcome)
    }

    async fn scroll_up(&mut self) -> Result<Transition> {
        if self.window.at_top() {
            tracing::debug!(message = "vfeed.noop", reason = "at_top");
            return Ok(Transition::AtTop);
        }

        let requested = self
            .config
            .page_size()
            .min(self.window.start())
            .min(self.pool.len());
        let start = self.window.start() - requested;
        let items = self.fetch(start, requested).await?;

        if items.len() < requested {
            tracing::warn!(
                message = "vfeed.short_page",
                start,
                requested,
                returned = items.len()
            );
            return Err(FeedError::ShortPage {
                start,
                requested,
                returned: items.len(),
            });
        }

        let margin = self.config.item_margin();
        let orders = self
            .pool
            .recycle(Direction::Up, start, &items, &mut self.renderer, margin)?;
        let retreated = self.window.retreat(orders.len());
        debug_assert!(retreated, "window retreat past zero");
        tracing::debug!(
            message = "vfeed.recycle",
            direction = "up",
            moved = orders.len(),
            start = self.window.start(),
            end = self.window.end()
        );

        self.settle();
        Ok(Transition::Recycled {
            direction: Direction::Up,
            moved: orders.len(),
        })
    }

    async fn fetch(&self, start: usize, limit: usize) -> Result<Vec<T>> {
        let mut items = self.source.load(start, limit).await.map_err(|source| {
            tracing::warn!(message = "vfeed.fetch_failed", start, limit, error = %source);
            FeedError::Fetch {
                start,
                limit,
                source,
            }
        })?;
        items.truncate(limit);
        Ok(items)
    }

    /// Recompute padding from the first slot. Sentinels are derived on read.
    fn settle(&mut self) {
        let moved = self.spacers.settle_from(&self.pool);
        tracing::trace!(
            message = "vfeed.settle",
            moved,
            padding_top = self.spacers.padding_top(),
            padding_bottom = self.spacers.padding_bottom()
        );
    }
}
