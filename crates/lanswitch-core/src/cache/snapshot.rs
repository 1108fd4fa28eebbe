// ── Snapshot sequences ──
//
// Finite, one-shot sequences of cache values captured at call time.
// Iteration ends when the captured values run out; no sentinel values.

use std::sync::Arc;

use tokio_stream::Iter;

/// Point-in-time copy of a cache store's values.
///
/// Later mutations of the cache are not observed. Dropping a partially
/// consumed snapshot releases everything; there is no producer task.
#[derive(Debug)]
pub struct Snapshot<T> {
    inner: std::vec::IntoIter<Arc<T>>,
}

impl<T> Snapshot<T> {
    pub(crate) fn new(values: Vec<Arc<T>>) -> Self {
        Self {
            inner: values.into_iter(),
        }
    }

    /// Convert into a `Stream` for async consumers.
    pub fn into_stream(self) -> Iter<std::vec::IntoIter<Arc<T>>> {
        tokio_stream::iter(self.inner)
    }
}

impl<T> Iterator for Snapshot<T> {
    type Item = Arc<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Snapshot<T> {}

impl<T> std::iter::FusedIterator for Snapshot<T> {}
