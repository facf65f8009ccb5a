use crate::error::VrStatsError;
use crate::vrstats::materialize::DocumentSource;
use anyhow::Result;
use reqwest::blocking::Client;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("vrstats/", env!("CARGO_PKG_VERSION"));

/// Blocking HTTP client with one fixed timeout for every request.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, VrStatsError> {
        debug!(url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|source| VrStatsError::Request {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(VrStatsError::HttpStatus {
                url: url.to_string(),
                status,
            });
        }
        Ok(response)
    }

    pub fn get_text(&self, url: &str) -> Result<String, VrStatsError> {
        self.get(url)?
            .text()
            .map_err(|source| VrStatsError::Request {
                url: url.to_string(),
                source,
            })
    }

    pub fn get_bytes(&self, url: &str) -> Result<Vec<u8>, VrStatsError> {
        self.get(url)?
            .bytes()
            .map(|body| body.to_vec())
            .map_err(|source| VrStatsError::Request {
                url: url.to_string(),
                source,
            })
    }
}

impl DocumentSource for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        Ok(self.get_bytes(url)?)
    }
}
