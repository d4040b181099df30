//! Clients for the account backend (stored session cookies, profile and bid
//! persistence) and for the bid-placement proxy.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::errors::TransportError;
use crate::models::bid::{BidProxyReply, BidRecord, BidSubmission, SaveBidReply};
use crate::models::credential::{CookieBundle, LinkedProfile, TokenBundle};

/// Session store and persistence endpoints owned by the account backend.
#[async_trait]
pub trait SessionBackend: Send + Sync {
    async fn fetch_tokens(&self) -> Result<TokenBundle, TransportError>;
    async fn fetch_cookies(&self) -> Result<CookieBundle, TransportError>;
    async fn save_profile(&self, profile: &LinkedProfile) -> Result<(), TransportError>;
    async fn save_bid(&self, record: &BidRecord) -> Result<SaveBidReply, TransportError>;
}

/// Forwards a fully assembled bid to the marketplace on the user's behalf.
#[async_trait]
pub trait BidProxy: Send + Sync {
    async fn place_bid(&self, submission: &BidSubmission) -> Result<BidProxyReply, TransportError>;
}

#[derive(Debug, Clone)]
struct BackendPaths {
    tokens: String,
    cookies: String,
    profile_save: String,
    bid_save: String,
}

#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    paths: BackendPaths,
}

impl HttpBackend {
    pub fn from_config(config: &Config) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(config.request_timeout)?,
            base_url: config.backend_base_url.clone(),
            paths: BackendPaths {
                tokens: config.backend_tokens_path.clone(),
                cookies: config.backend_cookies_path.clone(),
                profile_save: config.backend_profile_save_path.clone(),
                bid_save: config.backend_bid_save_path.clone(),
            },
        })
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl SessionBackend for HttpBackend {
    async fn fetch_tokens(&self) -> Result<TokenBundle, TransportError> {
        let response = self.client.get(self.url(&self.paths.tokens)).send().await?;
        read_json(response).await
    }

    async fn fetch_cookies(&self) -> Result<CookieBundle, TransportError> {
        let response = self
            .client
            .get(self.url(&self.paths.cookies))
            .header("content-type", "application/json")
            .send()
            .await?;
        read_json(response).await
    }

    async fn save_profile(&self, profile: &LinkedProfile) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.url(&self.paths.profile_save))
            .json(profile)
            .send()
            .await?;
        ensure_success(response).await.map(|_| ())
    }

    async fn save_bid(&self, record: &BidRecord) -> Result<SaveBidReply, TransportError> {
        let response = self
            .client
            .post(self.url(&self.paths.bid_save))
            .json(record)
            .send()
            .await?;
        read_json(response).await
    }
}

#[derive(Clone)]
pub struct HttpBidProxy {
    client: Client,
    url: String,
}

impl HttpBidProxy {
    pub fn new(url: String, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: build_client(timeout)?,
            url,
        })
    }
}

#[async_trait]
impl BidProxy for HttpBidProxy {
    async fn place_bid(&self, submission: &BidSubmission) -> Result<BidProxyReply, TransportError> {
        debug!("Placing bid for job {}", submission.jobref);
        let response = self.client.post(&self.url).json(submission).send().await?;
        read_json(response).await
    }
}

fn build_client(timeout: Duration) -> Result<Client, TransportError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

async fn ensure_success(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let body = ensure_success(response).await?.text().await?;
    Ok(serde_json::from_str(&body)?)
}
