#![forbid(unsafe_code)]

//! Data source seam.

use std::future::Future;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use vfeed_core::SourceError;

/// Asynchronous, index-addressed item source.
///
/// `load(start, limit)` resolves to the items covering `[start, start + limit)`
/// in index order. It may return fewer than `limit` items at the end of the
/// dataset; it must not reorder items within a call.
pub trait DataSource<T> {
    fn load(&self, start: usize, limit: usize) -> LocalBoxFuture<'_, Result<Vec<T>, SourceError>>;
}

impl<T, S: DataSource<T> + ?Sized> DataSource<T> for &S {
    fn load(&self, start: usize, limit: usize) -> LocalBoxFuture<'_, Result<Vec<T>, SourceError>> {
        (**self).load(start, limit)
    }
}

impl<T, S: DataSource<T> + ?Sized> DataSource<T> for Rc<S> {
    fn load(&self, start: usize, limit: usize) -> LocalBoxFuture<'_, Result<Vec<T>, SourceError>> {
        (**self).load(start, limit)
    }
}

/// Adapter returned by [`source_fn`].
#[derive(Debug, Clone)]
pub struct FnSource<F>(F);

/// Wrap a `Fn(start, limit) -> Future` closure as a [`DataSource`].
pub fn source_fn<F>(f: F) -> FnSource<F> {
    FnSource(f)
}

impl<T, F, Fut> DataSource<T> for FnSource<F>
where
    F: Fn(usize, usize) -> Fut,
    Fut: Future<Output = Result<Vec<T>, SourceError>> + 'static,
{
    fn load(&self, start: usize, limit: usize) -> LocalBoxFuture<'_, Result<Vec<T>, SourceError>> {
        Box::pin((self.0)(start, limit))
    }
}
