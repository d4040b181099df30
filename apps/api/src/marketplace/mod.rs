//! Marketplace GraphQL client: every call to the remote profile, balance and
//! job search endpoints goes through `MarketplaceApi`.
//!
//! The endpoint signals errors two ways: a GraphQL `errors` array, or a bare
//! `{"message": "Authentication failed"}` body when the bearer token is dead.
//! `GraphqlEnvelope` keeps both visible so callers can tell them apart.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::errors::TransportError;

pub mod queries;

use queries::{
    BalanceData, JobSearchData, JobSearchRequest, JobSearchVariables, ProfileData, BALANCE_ALIAS,
    BALANCE_QUERY, JOB_SEARCH_ALIAS, JOB_SEARCH_QUERY, PROFILE_ALIAS, PROFILE_QUERY,
};

/// Message body the endpoint returns for an invalid or expired token.
pub const AUTH_FAILED_SENTINEL: &str = "Authentication failed";

#[derive(Debug, Serialize)]
struct GraphqlRequest<'a, V> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    variables: Option<V>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphqlErrorItem {
    #[serde(default)]
    pub message: Option<String>,
}

/// Raw reply of a GraphQL call, before it is classified.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound = "T: DeserializeOwned")]
pub struct GraphqlEnvelope<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlErrorItem>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Why a reply carried no usable data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphqlFailure {
    AuthFailed,
    Query(String),
}

impl<T> GraphqlEnvelope<T> {
    pub fn is_auth_failure(&self) -> bool {
        self.message.as_deref() == Some(AUTH_FAILED_SENTINEL)
    }

    /// Auth failure wins over an `errors` array; the first error's message
    /// is surfaced, or "GraphQL error" when it has none.
    pub fn into_data(self) -> Result<Option<T>, GraphqlFailure> {
        if self.is_auth_failure() {
            return Err(GraphqlFailure::AuthFailed);
        }
        if let Some(errors) = self.errors {
            let message = errors
                .into_iter()
                .next()
                .and_then(|e| e.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "GraphQL error".to_string());
            return Err(GraphqlFailure::Query(message));
        }
        Ok(self.data)
    }
}

#[cfg(test)]
impl<T> GraphqlEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            errors: None,
            message: None,
        }
    }

    pub fn auth_failed() -> Self {
        Self {
            data: None,
            errors: None,
            message: Some(AUTH_FAILED_SENTINEL.to_string()),
        }
    }

    pub fn with_errors(messages: &[&str]) -> Self {
        Self {
            data: None,
            errors: Some(
                messages
                    .iter()
                    .map(|m| GraphqlErrorItem {
                        message: Some(m.to_string()),
                    })
                    .collect(),
            ),
            message: None,
        }
    }
}

/// Remote marketplace operations, one per typed query.
#[async_trait]
pub trait MarketplaceApi: Send + Sync {
    async fn fetch_profile(
        &self,
        token: &str,
    ) -> Result<GraphqlEnvelope<ProfileData>, TransportError>;

    async fn fetch_connects_balance(
        &self,
        token: &str,
    ) -> Result<GraphqlEnvelope<BalanceData>, TransportError>;

    async fn search_jobs(
        &self,
        token: &str,
        request: &JobSearchRequest,
    ) -> Result<GraphqlEnvelope<JobSearchData>, TransportError>;
}

/// `MarketplaceApi` over HTTP. Bearer-authenticated POSTs to
/// `{endpoint}?alias={alias}`.
#[derive(Clone)]
pub struct HttpMarketplace {
    client: Client,
    endpoint: String,
}

impl HttpMarketplace {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, TransportError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint,
        })
    }

    async fn execute<V, T>(
        &self,
        alias: &str,
        token: &str,
        query: &str,
        variables: Option<V>,
    ) -> Result<GraphqlEnvelope<T>, TransportError>
    where
        V: Serialize + Send,
        T: DeserializeOwned + Send,
    {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("alias", alias)])
            .header("accept", "*/*")
            .header("authorization", format!("bearer {token}"))
            .json(&GraphqlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("GraphQL {alias} returned {status} ({} bytes)", body.len());

        // Auth failures come back as non-2xx with a JSON body; decode first
        // and only fall back to the status when the body is not an envelope.
        match serde_json::from_str::<GraphqlEnvelope<T>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(TransportError::Status {
                status: status.as_u16(),
                body,
            }),
            Err(e) => Err(TransportError::Parse(e)),
        }
    }
}

#[async_trait]
impl MarketplaceApi for HttpMarketplace {
    async fn fetch_profile(
        &self,
        token: &str,
    ) -> Result<GraphqlEnvelope<ProfileData>, TransportError> {
        self.execute::<(), _>(PROFILE_ALIAS, token, PROFILE_QUERY, None)
            .await
    }

    async fn fetch_connects_balance(
        &self,
        token: &str,
    ) -> Result<GraphqlEnvelope<BalanceData>, TransportError> {
        self.execute::<(), _>(BALANCE_ALIAS, token, BALANCE_QUERY, None)
            .await
    }

    async fn search_jobs(
        &self,
        token: &str,
        request: &JobSearchRequest,
    ) -> Result<GraphqlEnvelope<JobSearchData>, TransportError> {
        let variables = JobSearchVariables {
            request_variables: request.clone(),
        };
        self.execute(JOB_SEARCH_ALIAS, token, JOB_SEARCH_QUERY, Some(variables))
            .await
    }
}
