use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::FeedConfig;
use crate::core::feed::FeedFetcher;

/// Fetches the rate feed with a single HTTP GET.
pub struct HttpFeedFetcher {
    url: String,
    client: reqwest::Client,
}

impl HttpFeedFetcher {
    pub fn new(config: &FeedConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(HttpFeedFetcher {
            url: config.url.clone(),
            client: builder.build()?,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    #[instrument(name = "FeedFetch", skip(self), fields(url = %self.url))]
    async fn fetch(&self) -> Result<String> {
        debug!("Requesting rate feed");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for feed URL: {}", e, self.url))?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "HTTP error: {} for feed URL: {}",
                response.status(),
                self.url
            ));
        }

        let text = response
            .text()
            .await
            .map_err(|e| anyhow!("Failed to read response body from {}: {}", self.url, e))?;
        debug!(bytes = text.len(), "Received rate feed");
        Ok(text)
    }
}
