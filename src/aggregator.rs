use crate::config::FeedConfig;
use crate::fetcher::PageFetcher;
use crate::probe::DeltaProbe;
use crate::traits::FeedStore;
use crate::types::{ContentItem, Cursor, FeedFilter, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

/// Coarse lifecycle of one aggregator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedPhase {
    /// Nothing loaded yet, or the last initialize failed. Retryable.
    Empty,
    /// Initial page fetch in flight.
    Loading,
    /// At least one page loaded; pagination and probing are live.
    Ready,
}

/// What a page-loading operation actually did. The no-op cases exist so a
/// caller can tell idempotent suppression apart from real progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Appended this many new items to the view.
    Loaded(usize),
    /// The previous page was short; there is nothing left to fetch.
    EndOfFeed,
    /// A fetch for this instance was already in flight, or the instance has
    /// not been initialized yet.
    AlreadyLoading,
    /// A refresh superseded this request while it was in flight; its
    /// response was discarded without touching state.
    Superseded,
}

struct AggregatorState<T> {
    phase: FeedPhase,
    filter: FeedFilter,
    view: Vec<ContentItem<T>>,
    view_ids: HashSet<String>,
    delta: Vec<ContentItem<T>>,
    delta_ids: HashSet<String>,
    cursor: Cursor,
    exhausted: bool,
    loading: bool,
    probing: bool,
    // Bumped by every initialize/refresh. A response whose recorded
    // generation no longer matches is stale and must not mutate state.
    generation: u64,
}

impl<T> AggregatorState<T> {
    fn new() -> Self {
        Self {
            phase: FeedPhase::Empty,
            filter: FeedFilter::all(),
            view: Vec::new(),
            view_ids: HashSet::new(),
            delta: Vec::new(),
            delta_ids: HashSet::new(),
            cursor: Cursor::FIRST,
            exhausted: false,
            loading: false,
            probing: false,
            generation: 0,
        }
    }

    fn reset_for(&mut self, filter: FeedFilter) {
        self.phase = FeedPhase::Loading;
        self.filter = filter;
        self.view.clear();
        self.view_ids.clear();
        self.delta.clear();
        self.delta_ids.clear();
        self.cursor = Cursor::FIRST;
        self.exhausted = false;
        self.loading = true;
        self.probing = false;
        self.generation += 1;
    }
}

/// Turns the paged, append-only backing store into one stable, de-duplicated
/// content stream.
///
/// The view only changes when the caller asks it to: `load_more` appends,
/// `accept_pending_updates` prepends the buffered delta, `refresh` starts
/// over. Background probes fill the delta buffer but never reorder the view
/// out from under a caller holding a snapshot.
///
/// Operations may be requested concurrently (scroll, timer tick, user
/// action) but are serialized per instance: an in-flight fetch turns a
/// duplicate request into a no-op, and a refresh invalidates any fetch still
/// in flight.
pub struct FeedAggregator<T> {
    fetcher: PageFetcher<T>,
    probe: DeltaProbe<T>,
    config: FeedConfig,
    state: RwLock<AggregatorState<T>>,
    pending_tx: watch::Sender<bool>,
}

impl<T> FeedAggregator<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<dyn FeedStore<T>>, config: FeedConfig) -> Self {
        let fetcher = PageFetcher::new(store.clone(), config.fetch_timeout);
        let probe = DeltaProbe::new(store, config.fetch_timeout);
        let (pending_tx, _) = watch::channel(false);

        Self {
            fetcher,
            probe,
            config,
            state: RwLock::new(AggregatorState::new()),
            pending_tx,
        }
    }

    /// Load the first page for `filter`, discarding any previous state.
    ///
    /// On failure the instance drops back to `Empty` with the filter
    /// retained, so retry is a plain re-invocation (or a `refresh`).
    pub async fn initialize(&self, filter: FeedFilter) -> Result<LoadOutcome> {
        let generation = {
            let mut st = self.state.write().await;
            st.reset_for(filter.clone());
            self.pending_tx.send_replace(false);
            st.generation
        };

        let fetched = self
            .fetcher
            .fetch(&filter, Cursor::FIRST, self.config.page_size)
            .await;

        let mut st = self.state.write().await;
        if st.generation != generation {
            debug!("Discarding superseded initialize response");
            return Ok(LoadOutcome::Superseded);
        }
        st.loading = false;

        match fetched {
            Ok(page) => {
                st.exhausted = page.len() < self.config.page_size;
                for item in page {
                    if st.view_ids.insert(item.id.clone()) {
                        st.view.push(item);
                    }
                }
                st.phase = FeedPhase::Ready;
                let count = st.view.len();
                info!("Initialized feed with {} items", count);
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                st.phase = FeedPhase::Empty;
                warn!("Initial feed load failed: {}", e);
                Err(e)
            }
        }
    }

    /// Fetch the next page and append its items to the view.
    ///
    /// No-op when a fetch is already in flight or the feed is exhausted.
    /// On failure the loaded view is left intact and the cursor does not
    /// advance; calling again retries the same page.
    pub async fn load_more(&self) -> Result<LoadOutcome> {
        let (generation, filter, next) = {
            let mut st = self.state.write().await;
            if st.loading || st.phase != FeedPhase::Ready {
                return Ok(LoadOutcome::AlreadyLoading);
            }
            if st.exhausted {
                return Ok(LoadOutcome::EndOfFeed);
            }
            st.loading = true;
            (st.generation, st.filter.clone(), st.cursor.next())
        };

        let fetched = self
            .fetcher
            .fetch(&filter, next, self.config.page_size)
            .await;

        let mut st = self.state.write().await;
        if st.generation != generation {
            debug!("Discarding superseded load_more response");
            return Ok(LoadOutcome::Superseded);
        }
        st.loading = false;

        match fetched {
            Ok(page) => {
                st.exhausted = page.len() < self.config.page_size;
                st.cursor = next;
                let mut added = 0;
                // Defensive de-dup: a write landing between page fetches can
                // shift items across page boundaries.
                for item in page {
                    if st.delta_ids.contains(&item.id) {
                        continue;
                    }
                    if st.view_ids.insert(item.id.clone()) {
                        st.view.push(item);
                        added += 1;
                    }
                }
                debug!(
                    "Loaded page {}, {} new items, exhausted={}",
                    next.page_number(),
                    added,
                    st.exhausted
                );
                Ok(LoadOutcome::Loaded(added))
            }
            Err(e) => {
                warn!("load_more failed at page {}: {}", next.page_number(), e);
                Err(e)
            }
        }
    }

    /// Probe the store for items not yet in the view or delta buffer and
    /// stash them in the delta buffer.
    ///
    /// Best-effort: failures are logged and absorbed, and a probe already
    /// in flight suppresses this one. Returns the number of items buffered.
    pub async fn check_for_updates(&self) -> usize {
        let (generation, filter, known_ids) = {
            let mut st = self.state.write().await;
            if st.phase != FeedPhase::Ready || st.probing {
                return 0;
            }
            st.probing = true;
            let known: HashSet<String> =
                st.view_ids.union(&st.delta_ids).cloned().collect();
            (st.generation, st.filter.clone(), known)
        };

        let fresh = self
            .probe
            .probe(&filter, self.config.probe_recent_count, &known_ids)
            .await;

        let mut st = self.state.write().await;
        if st.generation != generation {
            debug!("Discarding superseded probe result");
            return 0;
        }
        st.probing = false;

        if fresh.is_empty() {
            return 0;
        }

        // Probe results are newer than anything already buffered; prepend
        // them as a block to keep the buffer newest-first.
        let mut buffered = 0;
        let mut incoming = Vec::with_capacity(fresh.len());
        for item in fresh {
            // Re-check against the view: a page load finishing while the
            // probe was in flight may have pulled this id in already.
            if st.view_ids.contains(&item.id) {
                continue;
            }
            if st.delta_ids.insert(item.id.clone()) {
                incoming.push(item);
                buffered += 1;
            }
        }
        if buffered > 0 {
            st.delta.splice(0..0, incoming);
            self.pending_tx.send_replace(true);
            info!("{} new upstream items pending", st.delta.len());
        }
        buffered
    }

    /// Move the buffered delta to the front of the view, preserving its
    /// newest-first order, and clear the pending flag. The cursor is
    /// untouched. Returns the number of items merged.
    pub async fn accept_pending_updates(&self) -> usize {
        let mut st = self.state.write().await;
        if st.delta.is_empty() {
            return 0;
        }

        let delta = std::mem::take(&mut st.delta);
        let delta_ids = std::mem::take(&mut st.delta_ids);
        let count = delta.len();

        st.view.splice(0..0, delta);
        st.view_ids.extend(delta_ids);

        self.pending_tx.send_replace(false);
        info!("Merged {} pending items into the view", count);
        count
    }

    /// Start over from the first page with the current filter, discarding
    /// the loaded view, the delta buffer, and any in-flight fetch results.
    pub async fn refresh(&self) -> Result<LoadOutcome> {
        let filter = self.state.read().await.filter.clone();
        self.initialize(filter).await
    }

    /// Snapshot of the caller-visible view, in order. Pending delta items
    /// are not included until `accept_pending_updates` is called.
    pub async fn items(&self) -> Vec<ContentItem<T>> {
        self.state.read().await.view.clone()
    }

    /// Whether another `load_more` can make progress.
    pub async fn has_more(&self) -> bool {
        let st = self.state.read().await;
        st.phase == FeedPhase::Ready && !st.exhausted
    }

    /// Whether probed items are waiting in the delta buffer.
    pub async fn has_pending_updates(&self) -> bool {
        !self.state.read().await.delta.is_empty()
    }

    pub async fn phase(&self) -> FeedPhase {
        self.state.read().await.phase
    }

    /// Watch channel mirroring `has_pending_updates`, for callers that want
    /// a signal instead of polling the aggregator.
    pub fn subscribe_pending(&self) -> watch::Receiver<bool> {
        self.pending_tx.subscribe()
    }
}
