#![forbid(unsafe_code)]

//! In-memory paged dataset.

use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;

use futures::future::{LocalBoxFuture, ready};
use serde::Serialize;
use thiserror::Error;
use vfeed_core::SourceError;
use vfeed_engine::DataSource;

/// One page of results plus the cursors around it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CursorInfo<T> {
    /// Number of items in `chunk`.
    pub size: usize,
    /// Where the next page starts.
    pub next_cursor: usize,
    /// Where this page started.
    pub prev_cursor: usize,
    pub chunk: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DbError {
    #[error("injected failure loading page at {start}")]
    Injected { start: usize },
}

/// Fixed-size dataset generated up front.
///
/// Loads are clipped to the dataset, so a request past the end yields an
/// empty chunk rather than an error.
#[derive(Debug)]
pub struct MemoryDb<T> {
    items: Vec<T>,
    page_size: usize,
    failures: RefCell<BTreeSet<usize>>,
    loads: Cell<usize>,
}

impl<T: Clone> MemoryDb<T> {
    pub fn new(size: usize, page_size: usize, generator: impl FnMut(usize) -> T) -> Self {
        Self {
            items: (0..size).map(generator).collect(),
            page_size,
            failures: RefCell::new(BTreeSet::new()),
            loads: Cell::new(0),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Loads served so far, failed ones included.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.get()
    }

    /// Make the next load starting at `start` fail once.
    pub fn fail_at(&self, start: usize) {
        self.failures.borrow_mut().insert(start);
    }

    /// Items `[start, start + limit)`, clipped to the dataset.
    pub fn load(&self, start: usize, limit: usize) -> Result<CursorInfo<T>, DbError> {
        self.loads.set(self.loads.get() + 1);
        if self.failures.borrow_mut().remove(&start) {
            tracing::debug!(message = "sim.db.injected_failure", start, limit);
            return Err(DbError::Injected { start });
        }
        let end = start.saturating_add(limit).min(self.items.len());
        let chunk = self.items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();
        Ok(CursorInfo {
            size: chunk.len(),
            next_cursor: start.saturating_add(limit),
            prev_cursor: start,
            chunk,
        })
    }

    /// A page of the default size.
    pub fn load_page(&self, start: usize) -> Result<CursorInfo<T>, DbError> {
        self.load(start, self.page_size)
    }
}

impl<T: Clone + 'static> DataSource<T> for MemoryDb<T> {
    fn load(&self, start: usize, limit: usize) -> LocalBoxFuture<'_, Result<Vec<T>, SourceError>> {
        let page = MemoryDb::load(self, start, limit)
            .map(|cursor| cursor.chunk)
            .map_err(SourceError::from);
        Box::pin(ready(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn db() -> MemoryDb<usize> {
        MemoryDb::new(25, 10, |index| index * 2)
    }

    #[test]
    fn load_covers_start_to_start_plus_limit() {
        let cursor = db().load(10, 5).expect("load");
        assert_eq!(cursor.chunk, vec![20, 22, 24, 26, 28]);
        assert_eq!(cursor.size, 5);
        assert_eq!(cursor.prev_cursor, 10);
        assert_eq!(cursor.next_cursor, 15);
    }

    #[test]
    fn load_is_clipped_at_the_end() {
        let db = db();
        assert_eq!(db.load_page(20).expect("tail").size, 5);
        assert!(db.load_page(25).expect("end").chunk.is_empty());
        assert!(db.load(400, 10).expect("past end").chunk.is_empty());
        assert_eq!(db.loads(), 3);
    }

    #[test]
    fn injected_failure_fires_once() {
        let db = db();
        db.fail_at(10);
        assert_eq!(db.load(10, 10), Err(DbError::Injected { start: 10 }));
        assert_eq!(db.load(10, 10).expect("second try").size, 10);
    }

    #[test]
    fn data_source_returns_the_chunk() {
        let db = db();
        db.fail_at(0);
        let err = block_on(DataSource::load(&db, 0, 3)).unwrap_err();
        assert_eq!(err.to_string(), "injected failure loading page at 0");
        let items = block_on(DataSource::load(&db, 0, 3)).expect("items");
        assert_eq!(items, vec![0, 2, 4]);
    }
}
