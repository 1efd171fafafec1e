use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single item in the feed. Identity is `id`: two items with the same id
/// are the same logical item regardless of payload differences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem<T> {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub payload: T,
}

/// One page of items as returned by the backing store. A page shorter than
/// the requested page size signals that no further pages exist.
pub type Page<T> = Vec<ContentItem<T>>;

/// 1-based, forward-only page position. A refresh resets it to `FIRST`;
/// nothing else ever moves it backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cursor(u32);

impl Cursor {
    pub const FIRST: Self = Self(1);

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    pub fn page_number(self) -> u32 {
        self.0
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::FIRST
    }
}

/// Server-side filter applied to feed reads. All fields optional; an empty
/// filter selects the whole feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedFilter {
    pub channel: Option<String>,
    pub author: Option<String>,
}

impl FeedFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn channel(name: impl Into<String>) -> Self {
        Self {
            channel: Some(name.into()),
            author: None,
        }
    }
}

/// A flat comment row as stored upstream. `parent_id` is `None` for
/// top-level comments and references a top-level comment id for replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub parent_id: Option<String>,
}

/// A top-level comment with its replies attached, ordered oldest-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentNode {
    pub record: CommentRecord,
    pub replies: Vec<CommentNode>,
}

#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for FeedError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FeedError>;
