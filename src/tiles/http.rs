use super::source::{expand_url, FetchError, TileImage, TileSource};
use crate::core::config::FetchConfig;
use crate::core::constants::DEFAULT_USER_AGENT;
use crate::core::geo::TileCoord;
use once_cell::sync::Lazy;
use reqwest::blocking::Client;
use std::thread;

/// Shared blocking HTTP client with a custom User-Agent so that public tile
/// servers (e.g. OpenStreetMap) don't reject the request. Sources built with
/// the default user agent and timeout reuse it instead of paying for TLS and
/// connection pool setup again.
static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .timeout(FetchConfig::default().request_timeout())
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to default HTTP client: {}", e);
            Client::new()
        })
});

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::Network(Box::new(e))
    }
}

/// Tile source that downloads tiles from a `{z}/{x}/{y}` URL template.
pub struct HttpTileSource {
    client: Client,
    config: FetchConfig,
}

impl HttpTileSource {
    /// Source for the public OpenStreetMap tile server.
    pub fn openstreetmap() -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            config: FetchConfig::default(),
        }
    }

    pub fn new(config: FetchConfig) -> Result<Self, FetchError> {
        let defaults = FetchConfig::default();
        let client = if config.user_agent == defaults.user_agent
            && config.request_timeout_secs == defaults.request_timeout_secs
        {
            HTTP_CLIENT.clone()
        } else {
            Client::builder()
                .user_agent(config.user_agent.as_str())
                .timeout(config.request_timeout())
                .build()?
        };
        Ok(Self { client, config })
    }

    pub fn url(&self, coord: TileCoord) -> String {
        expand_url(&self.config.url_template, coord)
    }

    fn fetch_once(&self, coord: TileCoord) -> Result<TileImage, FetchError> {
        let resp = self.client.get(self.url(coord)).send()?;
        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
                coord,
            });
        }
        let bytes = resp.bytes()?;
        TileImage::decode(&bytes)
    }
}

impl TileSource for HttpTileSource {
    fn fetch(&self, coord: TileCoord) -> Result<TileImage, FetchError> {
        if !coord.is_valid() {
            return Err(FetchError::OutOfRange(coord));
        }

        let attempts = self.config.max_retries + 1;
        let mut attempt = 1;
        loop {
            log::debug!("fetch tile {} attempt {}", coord, attempt);
            match self.fetch_once(coord) {
                Ok(tile) => return Ok(tile),
                // A missing tile stays missing; only transport errors are retried.
                Err(e @ FetchError::Status { status: 404, .. }) => return Err(e),
                Err(e) if attempt >= attempts => return Err(e),
                Err(e) => {
                    log::debug!("tile {} attempt {} failed: {}", coord, attempt, e);
                    thread::sleep(self.config.retry_delay());
                    attempt += 1;
                }
            }
        }
    }
}
