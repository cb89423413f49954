#![forbid(unsafe_code)]

//! vfeed window engine.
//!
//! Renders an unbounded, sequentially paged dataset with a constant number of
//! live elements. Two sentinels, pinned to the first and last slot, report
//! visibility; each crossing fetches one page and either grows the pool (while
//! it fills) or relocates half of it to the far side.
//!
//! # Key Components
//!
//! - [`WindowController`] - owns window, pool, and spacers; runs transitions
//! - [`ControllerCell`] - single-flight guard for hosts that deliver
//!   callbacks while a fetch is outstanding
//! - [`DataSource`] / [`BoundaryObserver`] - host seams
//! - [`PlainList`] / [`LazyList`] - the non-recycling list variants
//!
//! # Example
//!
//! ```
//! use futures::executor::block_on;
//! use futures::future::ready;
//! use vfeed_core::{FeedConfig, ItemRenderer, SourceError};
//! use vfeed_engine::{Transition, WindowController, source_fn};
//!
//! struct Rows;
//! impl ItemRenderer<usize> for Rows {
//!     type Element = usize;
//!     fn create(&mut self, item: &usize) -> usize { *item }
//!     fn update(&mut self, el: &mut usize, item: &usize) { *el = *item; }
//!     fn measure(&self, _: &usize) -> f64 { 24.0 }
//! }
//!
//! let source = source_fn(|start: usize, limit: usize| {
//!     ready(Ok::<_, SourceError>((start..start + limit).collect::<Vec<usize>>()))
//! });
//! let mut feed = WindowController::new(FeedConfig::with_page_size(10), source, Rows).unwrap();
//! block_on(feed.update(vfeed_core::Direction::Down)).unwrap();
//! let outcome = block_on(feed.update(vfeed_core::Direction::Down)).unwrap();
//! assert_eq!(outcome, Transition::Grew { appended: 10 });
//! assert_eq!(feed.window().range(), 0..20);
//! ```

pub mod cell;
pub mod controller;
pub mod frame;
pub mod lazy;
pub mod observer;
pub mod plain;
pub mod source;

pub use cell::ControllerCell;
pub use controller::{Transition, WindowController, WindowControllerBuilder};
pub use frame::{FeedFrame, SlotView};
pub use lazy::LazyList;
pub use observer::{BoundaryObserver, SentinelId, SentinelPair, VisibilityEntry};
pub use plain::PlainList;
pub use source::{DataSource, FnSource, source_fn};

/// Component id used by hosts that key mounted lists by name.
pub const COMPONENT_ID: &str = "feed";
