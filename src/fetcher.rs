use crate::traits::FeedStore;
use crate::types::{Cursor, FeedError, FeedFilter, Page, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Fetches single pages from the backing store. Stateless: pagination
/// position lives in the aggregator, retry policy lives with the caller.
pub struct PageFetcher<T> {
    store: Arc<dyn FeedStore<T>>,
    timeout: Duration,
}

impl<T> PageFetcher<T> {
    pub fn new(store: Arc<dyn FeedStore<T>>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fetch the page at `cursor`. A failed fetch returns no items and the
    /// caller's cursor must not advance; exceeding the deadline is reported
    /// as a transport failure like any other.
    pub async fn fetch(
        &self,
        filter: &FeedFilter,
        cursor: Cursor,
        page_size: usize,
    ) -> Result<Page<T>> {
        let page_number = cursor.page_number();
        debug!("Fetching page {} (page_size {})", page_number, page_size);

        let page = tokio::time::timeout(
            self.timeout,
            self.store.get_page(filter, page_number, page_size),
        )
        .await
        .map_err(|_| {
            FeedError::Transport(format!(
                "page fetch timed out after {:?}",
                self.timeout
            ))
        })??;

        debug!("Page {} returned {} items", page_number, page.len());
        Ok(page)
    }
}
