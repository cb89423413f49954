#![forbid(unsafe_code)]

//! In-memory host for the vfeed window engine.
//!
//! Stands in for a browser: [`MemoryDb`] serves pages, [`HtmlRenderer`]
//! produces recyclable elements, and [`Viewport`] reports sentinel
//! visibility as a [`ScrollDriver`] scrolls it. The `vfeed-sim` binary
//! wires them together and prints one line per transition.

pub mod cli;
pub mod db;
pub mod driver;
pub mod error;
pub mod item;
pub mod template;
pub mod viewport;

pub use cli::{Cli, Mode, Summary, run, run_from_env};
pub use db::{CursorInfo, DbError, MemoryDb};
pub use driver::{MAX_SETTLE_ROUNDS, ScrollDriver, TraceLine};
pub use error::{Result, SimError};
pub use item::{FeedItem, feed_item};
pub use template::{HtmlElement, HtmlRenderer, TextMetrics, template};
pub use viewport::Viewport;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber. `RUST_LOG` wins over the default
/// `warn` level.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(err) = installed {
        eprintln!("vfeed-sim: logging disabled: {err}");
    }
}
