use clap::Parser;
use feed_sync::{FeedAggregator, FeedConfig, FeedFilter, RestFeedStore, UpdatePoller};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Tail a paged content feed: load it page by page, then poll for new items
/// and fold them in as they arrive.
#[derive(Parser)]
struct Args {
    /// Base URL of the feed read API
    #[arg(long)]
    base_url: String,

    /// Restrict the feed to one channel
    #[arg(long)]
    channel: Option<String>,

    #[arg(long, default_value_t = 20)]
    page_size: usize,

    /// Seconds between update probes
    #[arg(long, default_value_t = 30)]
    poll_secs: u64,
}

fn describe(item: &feed_sync::ContentItem<Value>) -> String {
    let title = item
        .payload
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or("(untitled)");
    format!("{}  {}  {}", item.created_at, item.id, title)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let config = FeedConfig {
        page_size: args.page_size,
        poll_interval: Duration::from_secs(args.poll_secs),
        ..FeedConfig::default()
    };

    let store = Arc::new(RestFeedStore::new(&args.base_url, &config)?);
    let aggregator = Arc::new(FeedAggregator::<Value>::new(store, config.clone()));

    let filter = match args.channel {
        Some(channel) => FeedFilter::channel(channel),
        None => FeedFilter::all(),
    };

    info!("Loading feed from {}", args.base_url);
    aggregator.initialize(filter).await?;

    // Page through everything currently upstream.
    while aggregator.has_more().await {
        if let Err(e) = aggregator.load_more().await {
            error!("Pagination failed, keeping what we have: {}", e);
            break;
        }
    }

    for item in aggregator.items().await {
        println!("{}", describe(&item));
    }

    info!("Watching for new items every {}s, Ctrl-C to stop", args.poll_secs);
    let poller = UpdatePoller::spawn(aggregator.clone(), config.poll_interval);
    let mut pending = aggregator.subscribe_pending();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = pending.changed() => {
                if changed.is_err() {
                    break;
                }
                if *pending.borrow() {
                    let before = aggregator.items().await.len();
                    let merged = aggregator.accept_pending_updates().await;
                    let items = aggregator.items().await;
                    info!("Accepted {} new items", merged);
                    for item in items.iter().take(items.len() - before) {
                        println!("{}", describe(item));
                    }
                }
            }
        }
    }

    poller.stop().await;
    Ok(())
}
