use crate::aggregator::FeedAggregator;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Background driver for `check_for_updates`: ticks on a fixed interval
/// until stopped. Probe failures never escape the task; stopping discards
/// whatever the in-flight probe would have produced.
pub struct UpdatePoller {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl UpdatePoller {
    pub fn spawn<T>(aggregator: Arc<FeedAggregator<T>>, interval: Duration) -> Self
    where
        T: Clone + Send + Sync + 'static,
    {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let buffered = aggregator.check_for_updates().await;
                        if buffered > 0 {
                            debug!("Poller buffered {} new items", buffered);
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        info!("Update poller stopping");
                        break;
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Stop the poll loop and wait for the task to finish.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
