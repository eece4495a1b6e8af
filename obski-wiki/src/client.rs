//! MediaWiki action API client.

use std::time::Duration;

use async_trait::async_trait;
use obski_core::config::WikiConfig;
use obski_core::{ApiError, ArticleContent, ContentApi, SearchApi, SearchHit};

use crate::response::{parse_article_response, parse_opensearch_response};

/// Client for `opensearch` title search and `parse` article rendering.
///
/// One request per call: no retries, no rate limiting. Non-success statuses
/// surface as [`ApiError::Status`] without reading the body.
#[derive(Debug, Clone)]
pub struct WikipediaClient {
    client: reqwest::Client,
    api_base: String,
}

impl WikipediaClient {
    pub fn new(config: &WikiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| ApiError::Request {
                message: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            api_base: config.api_base.clone(),
        })
    }

    /// Client against an explicit endpoint, other settings default.
    pub fn with_base(api_base: impl Into<String>) -> Result<Self, ApiError> {
        let config = WikiConfig {
            api_base: api_base.into(),
            ..WikiConfig::default()
        };
        Self::new(&config)
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    async fn get_text(&self, url: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::Request {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "MediaWiki request rejected");
            return Err(ApiError::Status {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| ApiError::Decode {
            message: format!("failed to read MediaWiki response: {}", e),
        })
    }
}

fn build_search_url(api_base: &str, query: &str, limit: usize) -> String {
    format!(
        "{}?action=opensearch&search={}&limit={}&namespace=0&format=json",
        api_base,
        urlencoding::encode(query),
        limit
    )
}

fn build_parse_url(api_base: &str, title: &str) -> String {
    format!(
        "{}?action=parse&page={}&format=json&prop=text",
        api_base,
        urlencoding::encode(title)
    )
}

#[async_trait]
impl SearchApi for WikipediaClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>, ApiError> {
        let url = build_search_url(&self.api_base, query, limit);
        tracing::debug!("MediaWiki search URL: {}", url);
        let body = self.get_text(&url).await?;
        parse_opensearch_response(&body)
    }
}

#[async_trait]
impl ContentApi for WikipediaClient {
    async fn fetch_article(&self, title: &str) -> Result<ArticleContent, ApiError> {
        let url = build_parse_url(&self.api_base, title);
        tracing::debug!("MediaWiki parse URL: {}", url);
        let body = self.get_text(&url).await?;
        parse_article_response(&body)
    }
}
