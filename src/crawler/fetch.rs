use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log2::debug;
use reqwest::Client;
use url::Url;

use super::error::FetchError;

/// Retrieves the raw bytes behind a URL
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, headers: &HashMap<String, String>) -> Result<Vec<u8>, FetchError>;
}

/// Plain GET over reqwest, one attempt per call
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, headers: &HashMap<String, String>) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(url.clone()).timeout(self.timeout);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            debug!("GET {} -> {}", url, response.status());
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
