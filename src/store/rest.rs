use crate::config::FeedConfig;
use crate::traits::{CommentStore, FeedStore};
use crate::types::{CommentRecord, FeedError, FeedFilter, Page, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// JSON REST implementation of the read APIs.
///
/// Endpoints, relative to the base URL:
///   GET items?page=N&page_size=S[&channel=..][&author=..]
///   GET items/recent?count=N[&channel=..][&author=..]   (newest first)
///   GET content/{id}/comments
///   GET comments/{id}/replies
///
/// No retries here: a failed request surfaces as a transport error and the
/// aggregator decides what to do with it.
pub struct RestFeedStore {
    client: Client,
    base: Url,
}

impl RestFeedStore {
    pub fn new(base_url: &str, config: &FeedConfig) -> Result<Self> {
        let mut base = Url::parse(base_url)?;
        // Url::join drops the last path segment unless it ends with '/'.
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.fetch_timeout)
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str, filter: Option<&FeedFilter>) -> Result<Url> {
        let mut url = self.base.join(path)?;
        if let Some(filter) = filter {
            let mut query = url.query_pairs_mut();
            if let Some(channel) = &filter.channel {
                query.append_pair("channel", channel);
            }
            if let Some(author) = &filter.author {
                query.append_pair("author", author);
            }
        }
        Ok(url)
    }

    async fn get_json<R: DeserializeOwned>(&self, url: Url) -> Result<R> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Transport(format!(
                "HTTP {} from {}",
                status, url
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl<T> FeedStore<T> for RestFeedStore
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    async fn get_page(&self, filter: &FeedFilter, page: u32, page_size: usize) -> Result<Page<T>> {
        let mut url = self.endpoint("items", Some(filter))?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());
        self.get_json(url).await
    }

    async fn get_recent(&self, filter: &FeedFilter, count: usize) -> Result<Page<T>> {
        let mut url = self.endpoint("items/recent", Some(filter))?;
        url.query_pairs_mut()
            .append_pair("count", &count.to_string());
        self.get_json(url).await
    }
}

#[async_trait]
impl CommentStore for RestFeedStore {
    async fn top_level_comments(&self, content_id: &str) -> Result<Vec<CommentRecord>> {
        let url = self.endpoint(&format!("content/{}/comments", content_id), None)?;
        self.get_json(url).await
    }

    async fn replies(&self, comment_id: &str) -> Result<Vec<CommentRecord>> {
        let url = self.endpoint(&format!("comments/{}/replies", comment_id), None)?;
        self.get_json(url).await
    }
}
