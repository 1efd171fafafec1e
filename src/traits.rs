use crate::types::{CommentRecord, FeedFilter, Page, Result};
use async_trait::async_trait;

/// Paged, read-only access to the backing content store.
///
/// Both reads are idempotent and side-effect free. The aggregator is the
/// only consumer; a push-subscription or change-feed backend can replace
/// the polling path by implementing `get_recent` over its own delivery
/// mechanism without touching the merge logic.
#[async_trait]
pub trait FeedStore<T>: Send + Sync {
    /// Fetch one page of items for a 1-based page number. A result shorter
    /// than `page_size` means the feed has no further pages.
    async fn get_page(&self, filter: &FeedFilter, page: u32, page_size: usize) -> Result<Page<T>>;

    /// Fetch the `count` most recent items, newest first.
    async fn get_recent(&self, filter: &FeedFilter, count: usize) -> Result<Page<T>>;
}

/// Read-only access to the flat comment rows for a piece of content.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Top-level comments for a content item, in store order.
    async fn top_level_comments(&self, content_id: &str) -> Result<Vec<CommentRecord>>;

    /// Direct replies to a single comment, in store order.
    async fn replies(&self, comment_id: &str) -> Result<Vec<CommentRecord>>;
}
