#![forbid(unsafe_code)]

//! Append-only list: one page per bottom sentinel crossing, nothing recycled.

use std::marker::PhantomData;

use vfeed_core::{FeedConfig, FeedError, ItemRenderer, Result, ValidConfig};

use crate::source::DataSource;

pub struct LazyList<T, S, R: ItemRenderer<T>> {
    source: S,
    renderer: R,
    config: ValidConfig,
    elements: Vec<R::Element>,
    exhausted: bool,
    _item: PhantomData<fn(&T)>,
}

impl<T, S, R> LazyList<T, S, R>
where
    S: DataSource<T>,
    R: ItemRenderer<T>,
{
    /// Uses `page_size` and `sentinel_threshold` from `config`; the pool and
    /// margin settings have no meaning for an append-only list.
    ///
    /// # Errors
    /// Fails fast when `config` does not validate.
    pub fn new(config: FeedConfig, source: S, renderer: R) -> Result<Self> {
        Ok(Self {
            source,
            renderer,
            config: config.validated()?,
            elements: Vec::new(),
            exhausted: false,
            _item: PhantomData,
        })
    }

    #[must_use]
    pub fn elements(&self) -> &[R::Element] {
        &self.elements
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether the source has returned a short page.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Bottom sentinel callback. Returns how many elements were appended.
    pub async fn on_visibility(&mut self, ratio: f64) -> Result<usize> {
        if ratio <= self.config.sentinel_threshold() || self.exhausted {
            return Ok(0);
        }
        self.load_next().await
    }

    /// Fetch the next page and append one element per item.
    pub async fn load_next(&mut self) -> Result<usize> {
        let start = self.elements.len();
        let limit = self.config.page_size();
        let mut items = self
            .source
            .load(start, limit)
            .await
            .map_err(|source| FeedError::Fetch {
                start,
                limit,
                source,
            })?;
        items.truncate(limit);
        if items.len() < limit {
            self.exhausted = true;
        }
        for item in &items {
            let element = self.renderer.create(item);
            self.elements.push(element);
        }
        tracing::debug!(
            message = "vfeed.lazy.append",
            appended = items.len(),
            len = self.elements.len(),
            exhausted = self.exhausted
        );
        Ok(items.len())
    }
}
