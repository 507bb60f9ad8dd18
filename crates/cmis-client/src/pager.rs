//! Restartable lazy listings.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_stream::try_stream;
use cmis_core::types::{Page, PageRequest};
use futures::TryStreamExt;
use futures::future::BoxFuture;
use futures::stream::BoxStream;

use crate::Result;

/// A boxed stream of listing items.
pub type ItemStream<T> = BoxStream<'static, Result<T>>;

type FetchPage<T> = dyn Fn(PageRequest) -> BoxFuture<'static, Result<Page<T>>> + Send + Sync;

/// A server-side listing fetched page by page on demand.
///
/// Every call to [`iter`](Self::iter) starts a fresh cursor at the
/// configured position, so the same listing can be walked any number of
/// times. The server-reported total may disagree with the number of items
/// yielded while other clients modify the listing, but iteration never
/// continues past it.
pub struct ItemIterable<T> {
    fetch: Arc<FetchPage<T>>,
    page_size: u32,
    skip_count: u64,
}

impl<T: Send + 'static> ItemIterable<T> {
    pub(crate) fn new<F, Fut>(page_size: u32, fetch: F) -> Self
    where
        F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Page<T>>> + Send + 'static,
    {
        Self {
            fetch: Arc::new(move |request| Box::pin(fetch(request))),
            page_size,
            skip_count: 0,
        }
    }

    /// Sets the number of items requested per round trip.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        if page_size > 0 {
            self.page_size = page_size;
        }
        self
    }

    /// Starts iteration after the first `position` items.
    pub fn skip_to(mut self, position: u64) -> Self {
        self.skip_count = position;
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Fetches the page at the current position.
    pub async fn page(&self) -> Result<Page<T>> {
        (self.fetch)(PageRequest::new(self.page_size, self.skip_count)).await
    }

    /// Returns the server's estimate of the listing size, if it reports one.
    pub async fn total_num_items(&self) -> Result<Option<u64>> {
        Ok(self.page().await?.num_items)
    }

    /// Streams every item from the current position on.
    pub fn iter(&self) -> ItemStream<T> {
        let fetch = Arc::clone(&self.fetch);
        let mut request = PageRequest::new(self.page_size, self.skip_count);

        Box::pin(try_stream! {
            loop {
                let page = fetch(request).await?;
                let received = page.items.len();

                for item in page.items {
                    yield item;
                }

                // An empty page cannot advance the cursor.
                if !page.has_more_items || received == 0 {
                    break;
                }
                request = request.next(received);

                // The reported total bounds the listing even if the server
                // keeps claiming more items.
                if page.num_items.is_some_and(|total| request.skip_count >= total) {
                    break;
                }
            }
        })
    }

    /// Drains the listing into a vector.
    pub async fn collect_all(&self) -> Result<Vec<T>> {
        self.iter().try_collect().await
    }
}

impl<T> Clone for ItemIterable<T> {
    fn clone(&self) -> Self {
        Self {
            fetch: Arc::clone(&self.fetch),
            page_size: self.page_size,
            skip_count: self.skip_count,
        }
    }
}

impl<T> fmt::Debug for ItemIterable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemIterable")
            .field("page_size", &self.page_size)
            .field("skip_count", &self.skip_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::StreamExt;

    use super::*;
    use crate::Error;

    fn numbers(total: u32, calls: Arc<AtomicUsize>) -> ItemIterable<u32> {
        ItemIterable::new(3, move |request: PageRequest| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                let start = request.skip_count as u32;
                let end = (start + request.max_items).min(total);
                let items = (start..end).collect();
                Ok(Page::new(items, end < total, Some(u64::from(total))))
            }
        })
    }

    #[tokio::test]
    async fn walks_every_page() {
        let calls = Arc::new(AtomicUsize::new(0));
        let listing = numbers(7, calls.clone());

        let items = listing.collect_all().await.unwrap();
        assert_eq!(items, (0..7).collect::<Vec<_>>());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn iteration_restarts_from_the_beginning() {
        let listing = numbers(5, Arc::default());

        let first: Vec<_> = listing.iter().take(2).collect().await;
        assert_eq!(first.len(), 2);

        let again = listing.collect_all().await.unwrap();
        assert_eq!(again, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn skip_and_page_size_shape_requests() {
        let listing = numbers(10, Arc::default()).with_page_size(4).skip_to(6);

        let page = listing.page().await.unwrap();
        assert_eq!(page.items, vec![6, 7, 8, 9]);
        assert!(!page.has_more_items);
        assert_eq!(listing.total_num_items().await.unwrap(), Some(10));
    }

    #[tokio::test]
    async fn reported_total_bounds_the_listing() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let listing: ItemIterable<u64> = ItemIterable::new(2, move |request: PageRequest| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move {
                let items = (request.skip_count..request.skip_count + 2).collect();
                Ok(Page::new(items, true, Some(5)))
            }
        });

        let items = listing.collect_all().await.unwrap();
        assert_eq!(items, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn errors_end_the_stream() {
        let listing: ItemIterable<u32> = ItemIterable::new(2, |_| async {
            Err(Error::connectivity().with_message("offline"))
        });

        let mut stream = listing.iter();
        assert!(stream.next().await.unwrap().is_err());
        assert!(stream.next().await.is_none());
    }
}
