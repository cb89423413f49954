#![forbid(unsafe_code)]

//! vfeed public facade crate.
//!
//! Re-exports the data model from `vfeed-core` and the window engine from
//! `vfeed-engine`, plus a prelude with everything a host needs to mount a
//! recycling feed.

// --- Model re-exports ------------------------------------------------------

pub use vfeed_core::{
    ConfigError, Direction, Edge, FeedConfig, FeedError, InsertPosition, ItemRenderer,
    ObserverOptions, Result, SentinelOffsets, Slot, SlotPool, SourceError, Spacers, ValidConfig,
    Window, next_offset,
};

// --- Engine re-exports -----------------------------------------------------

pub use vfeed_engine::{
    BoundaryObserver, COMPONENT_ID, ControllerCell, DataSource, FeedFrame, FnSource, LazyList,
    PlainList, SentinelId, SentinelPair, SlotView, Transition, VisibilityEntry, WindowController,
    WindowControllerBuilder, source_fn,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        BoundaryObserver, ControllerCell, DataSource, Direction, Edge, FeedConfig, FeedError,
        FeedFrame, ItemRenderer, Result, SourceError, Transition, WindowController, source_fn,
    };

    pub use crate::{core, engine};

    #[cfg(feature = "sim")]
    pub use crate::sim;
}

pub use vfeed_core as core;
pub use vfeed_engine as engine;
#[cfg(feature = "sim")]
pub use vfeed_sim as sim;
