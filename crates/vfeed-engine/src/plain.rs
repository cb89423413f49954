#![forbid(unsafe_code)]

//! Non-virtualized list: loads once and renders every item.

use std::marker::PhantomData;

use vfeed_core::{FeedError, Result};

use crate::source::DataSource;

/// Renders the whole dataset through the item template in one pass.
pub struct PlainList<T, S, F> {
    source: S,
    template: F,
    limit: usize,
    _item: PhantomData<fn(&T)>,
}

impl<T, S, F> PlainList<T, S, F>
where
    S: DataSource<T>,
    F: Fn(&T) -> String,
{
    /// List over the first `limit` items of `source`.
    pub fn new(source: S, template: F, limit: usize) -> Self {
        Self {
            source,
            template,
            limit,
            _item: PhantomData,
        }
    }

    /// Fetch `[0, limit)` and concatenate every item's markup.
    pub async fn render(&self) -> Result<String> {
        let items = self
            .source
            .load(0, self.limit)
            .await
            .map_err(|source| FeedError::Fetch {
                start: 0,
                limit: self.limit,
                source,
            })?;
        let markup: String = items.iter().map(&self.template).collect();
        tracing::debug!(message = "vfeed.plain.render", items = items.len());
        Ok(markup.trim().to_owned())
    }
}
