use crate::traits::FeedStore;
use crate::types::{FeedFilter, Page};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Best-effort check for items that exist upstream but are not yet part of
/// the aggregated view. Never fails: a probe that cannot reach the store
/// simply reports nothing new.
pub struct DeltaProbe<T> {
    store: Arc<dyn FeedStore<T>>,
    timeout: Duration,
}

impl<T> DeltaProbe<T> {
    pub fn new(store: Arc<dyn FeedStore<T>>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// Fetch the `recent_n` most recent items and return those whose id is
    /// not in `known_ids`, preserving upstream order (newest first).
    pub async fn probe(
        &self,
        filter: &FeedFilter,
        recent_n: usize,
        known_ids: &HashSet<String>,
    ) -> Page<T> {
        let recent = match tokio::time::timeout(
            self.timeout,
            self.store.get_recent(filter, recent_n),
        )
        .await
        {
            Ok(Ok(items)) => items,
            Ok(Err(e)) => {
                warn!("Update probe failed, skipping this tick: {}", e);
                return Vec::new();
            }
            Err(_) => {
                warn!("Update probe timed out after {:?}, skipping this tick", self.timeout);
                return Vec::new();
            }
        };

        let unknown: Page<T> = recent
            .into_iter()
            .filter(|item| !known_ids.contains(&item.id))
            .collect();

        if !unknown.is_empty() {
            debug!("Probe found {} unknown items", unknown.len());
        }
        unknown
    }
}
