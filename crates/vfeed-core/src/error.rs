#![forbid(unsafe_code)]

//! Error taxonomy for the recycling list.
//!
//! | Variant | Raised by | State after |
//! |---------|-----------|-------------|
//! | [`FeedError::Config`] | construction | nothing built |
//! | [`FeedError::Fetch`] | a data source rejection | window and pool untouched |
//! | [`FeedError::ShortPage`] | an UP page shorter than requested | window and pool untouched |
//! | [`FeedError::PoolOverflow`] | appending past capacity | pool untouched |
//! | [`FeedError::MissingCollaborator`] | builder without source or renderer | nothing built |

use thiserror::Error;

/// Boxed error produced by a data source.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while loading or validating a [`FeedConfig`](crate::FeedConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a file.
    #[cfg(feature = "config-file")]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parse error.
    #[cfg(feature = "config-file")]
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    /// JSON parse error.
    #[cfg(feature = "config-file")]
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// One or more parameters out of range.
    #[error("invalid feed configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Errors surfaced by the window engine.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The data source rejected a load.
    #[error("failed to load {limit} items starting at {start}: {source}")]
    Fetch {
        start: usize,
        limit: usize,
        #[source]
        source: SourceError,
    },

    /// An upward page came back shorter than the gap above the window.
    #[error("page at {start} returned {returned} of {requested} items")]
    ShortPage {
        start: usize,
        requested: usize,
        returned: usize,
    },

    #[error("pool capacity {capacity} exceeded by {requested} slots")]
    PoolOverflow { capacity: usize, requested: usize },

    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

impl FeedError {
    /// Process exit code for command line front ends.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::MissingCollaborator(_) => 2,
            Self::Fetch { .. } => 3,
            Self::ShortPage { .. } | Self::PoolOverflow { .. } => 4,
        }
    }

    /// Whether a later visibility event may succeed where this one failed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Fetch { .. } | Self::ShortPage { .. })
    }
}

/// Standard result type for vfeed APIs.
pub type Result<T> = std::result::Result<T, FeedError>;
