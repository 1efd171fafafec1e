use std::time::Duration;

/// Tuning knobs for the aggregator and its stores.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Items requested per page.
    pub page_size: usize,
    /// How many recent items the update probe inspects per tick.
    pub probe_recent_count: usize,
    /// Interval between background update probes.
    pub poll_interval: Duration,
    /// Per-request deadline for page and probe fetches. Exceeding it is
    /// treated the same as a transport failure.
    pub fetch_timeout: Duration,
    /// User agent sent by the REST store.
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            probe_recent_count: 10,
            poll_interval: Duration::from_secs(30),
            fetch_timeout: Duration::from_secs(10),
            user_agent: "feed-sync/0.1".to_string(),
        }
    }
}
