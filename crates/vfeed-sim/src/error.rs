#![forbid(unsafe_code)]

use thiserror::Error;
use vfeed_core::{ConfigError, FeedError};

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },
}

impl From<ConfigError> for SimError {
    fn from(error: ConfigError) -> Self {
        Self::Feed(FeedError::Config(error))
    }
}

impl SimError {
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Feed(error) => error.exit_code(),
            Self::InvalidArgument { .. } => 2,
            Self::Json(_) => 1,
        }
    }

    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
