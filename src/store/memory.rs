use crate::traits::{CommentStore, FeedStore};
use crate::types::{CommentRecord, ContentItem, FeedError, FeedFilter, Page, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// In-memory backing store, newest item first.
///
/// Used by the integration tests and the demo: items can be inserted while
/// an aggregator is live, and the next requests can be scripted to fail or
/// to stall for a while. Filters are accepted but not applied; filtering is
/// the real backend's concern.
pub struct InMemoryFeedStore<T> {
    items: RwLock<Vec<ContentItem<T>>>,
    fail_next: AtomicU32,
    delay_next: Mutex<Option<Duration>>,
}

impl<T: Clone + Send + Sync> InMemoryFeedStore<T> {
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            fail_next: AtomicU32::new(0),
            delay_next: Mutex::new(None),
        }
    }

    /// Seed the store with items already ordered newest-first.
    pub async fn seed(&self, items: Vec<ContentItem<T>>) {
        *self.items.write().await = items;
    }

    /// Insert an item at the newest end, as an upstream write would.
    pub async fn insert_newest(&self, item: ContentItem<T>) {
        self.items.write().await.insert(0, item);
    }

    /// Make the next `n` requests fail with a transport error.
    pub fn fail_next_requests(&self, n: u32) {
        self.fail_next.store(n, Ordering::SeqCst);
    }

    /// Stall the next request for `delay` before answering.
    pub async fn delay_next_request(&self, delay: Duration) {
        *self.delay_next.lock().await = Some(delay);
    }

    async fn apply_scripting(&self) -> Result<()> {
        // Take the slot before sleeping so the stall only affects this
        // request, not every caller queued behind the lock.
        let delay = self.delay_next.lock().await.take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let remaining = self.fail_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_next.store(remaining - 1, Ordering::SeqCst);
            return Err(FeedError::Transport(
                "injected store failure".to_string(),
            ));
        }
        Ok(())
    }
}

impl<T: Clone + Send + Sync> Default for InMemoryFeedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Clone + Send + Sync> FeedStore<T> for InMemoryFeedStore<T> {
    async fn get_page(
        &self,
        _filter: &FeedFilter,
        page: u32,
        page_size: usize,
    ) -> Result<Page<T>> {
        self.apply_scripting().await?;

        let items = self.items.read().await;
        let start = (page.saturating_sub(1) as usize) * page_size;
        let end = (start + page_size).min(items.len());
        if start >= items.len() {
            return Ok(Vec::new());
        }
        Ok(items[start..end].to_vec())
    }

    async fn get_recent(&self, _filter: &FeedFilter, count: usize) -> Result<Page<T>> {
        self.apply_scripting().await?;

        let items = self.items.read().await;
        Ok(items.iter().take(count).cloned().collect())
    }
}

/// In-memory comment rows keyed the way the read API serves them.
pub struct InMemoryCommentStore {
    top_level: RwLock<HashMap<String, Vec<CommentRecord>>>,
    replies: RwLock<HashMap<String, Vec<CommentRecord>>>,
}

impl InMemoryCommentStore {
    pub fn new() -> Self {
        Self {
            top_level: RwLock::new(HashMap::new()),
            replies: RwLock::new(HashMap::new()),
        }
    }

    pub async fn add_top_level(&self, content_id: &str, record: CommentRecord) {
        self.top_level
            .write()
            .await
            .entry(content_id.to_string())
            .or_default()
            .push(record);
    }

    pub async fn add_reply(&self, record: CommentRecord) {
        let parent = record
            .parent_id
            .clone()
            .unwrap_or_else(|| "<none>".to_string());
        self.replies
            .write()
            .await
            .entry(parent)
            .or_default()
            .push(record);
    }
}

impl Default for InMemoryCommentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn top_level_comments(&self, content_id: &str) -> Result<Vec<CommentRecord>> {
        Ok(self
            .top_level
            .read()
            .await
            .get(content_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn replies(&self, comment_id: &str) -> Result<Vec<CommentRecord>> {
        Ok(self
            .replies
            .read()
            .await
            .get(comment_id)
            .cloned()
            .unwrap_or_default())
    }
}
