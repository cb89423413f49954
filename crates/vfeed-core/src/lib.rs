#![forbid(unsafe_code)]

//! vfeed core data model.
//!
//! This crate holds everything about the recycling list that can be stated
//! without a clock or an executor:
//!
//! - [`Window`] - the logical `[start, end)` index range currently materialized
//! - [`SlotPool`] - the bounded pool of rendered slots (capacity `2 * page_size`)
//! - [`next_offset`] - placement arithmetic that chains slot offsets
//! - [`Spacers`] / [`SentinelOffsets`] - values derived from the pool after
//!   every mutation
//! - [`FeedConfig`] - the validated mount configuration
//!
//! # Role in vfeed
//! `vfeed-engine` owns one of each of these inside a `WindowController` and
//! mutates them only from its UP/DOWN transitions. Hosts read them back to
//! paint.

pub mod config;
pub mod error;
pub mod geometry;
pub mod pool;
pub mod render;
pub mod spacers;
pub mod window;

pub use config::{FeedConfig, InsertPosition, ObserverOptions, ValidConfig};
pub use error::{ConfigError, FeedError, Result, SourceError};
pub use geometry::{Direction, Edge, next_offset};
pub use pool::{Slot, SlotPool};
pub use render::ItemRenderer;
pub use spacers::{SentinelOffsets, Spacers};
pub use window::Window;
