pub mod aggregator;
pub mod config;
pub mod fetcher;
pub mod poller;
pub mod probe;
pub mod store;
pub mod threads;
pub mod traits;
pub mod types;

pub use aggregator::{FeedAggregator, FeedPhase, LoadOutcome};
pub use config::FeedConfig;
pub use fetcher::PageFetcher;
pub use poller::UpdatePoller;
pub use probe::DeltaProbe;
pub use store::memory::{InMemoryCommentStore, InMemoryFeedStore};
pub use store::rest::RestFeedStore;
pub use threads::{ThreadBuilder, ThreadLoader};
pub use traits::{CommentStore, FeedStore};
pub use types::*;
