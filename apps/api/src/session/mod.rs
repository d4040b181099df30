//! Token acquisition: turns the stored session cookies into a validated
//! marketplace credential.
//!
//! Flow: fetch candidate tokens → probe each against the profile query in
//! order → on the first hit, fetch the connects balance (best effort), save
//! the linked profile (fire-and-forget) and stop.

pub mod handlers;

use serde::Serialize;
use tracing::{info, warn};

use crate::backend::SessionBackend;
use crate::errors::AppError;
use crate::marketplace::{GraphqlFailure, MarketplaceApi};
use crate::models::credential::{Credential, LinkedProfile, Profile};

/// State of the "link account" affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkState {
    /// Actionable.
    Idle,
    /// Disabled while candidates are probed.
    Linking,
    /// Terminal; the caller navigates away.
    Linked,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkedSession {
    pub credential: Credential,
    pub profile: Profile,
}

/// Probes candidate tokens in list order and returns the first that the
/// marketplace accepts. Later candidates are never tried.
pub async fn acquire_session(
    marketplace: &dyn MarketplaceApi,
    backend: &dyn SessionBackend,
) -> Result<LinkedSession, AppError> {
    let bundle = backend.fetch_tokens().await?;
    info!("Probing {} candidate tokens", bundle.candidate_tokens.len());

    for (index, candidate) in bundle.candidate_tokens.iter().enumerate() {
        let Some(token) = candidate.token() else {
            warn!("Candidate token {index} has no token value; skipping");
            continue;
        };

        let envelope = match marketplace.fetch_profile(token).await {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!("Profile probe for candidate {index} failed: {e}");
                continue;
            }
        };

        let personal_data = match envelope.into_data() {
            Ok(data) => data.and_then(|d| d.personal_data().cloned()),
            Err(GraphqlFailure::AuthFailed) => {
                info!("Candidate {index} rejected: authentication failed");
                continue;
            }
            Err(GraphqlFailure::Query(message)) => {
                info!("Candidate {index} rejected: {message}");
                continue;
            }
        };

        let Some(personal_data) = personal_data else {
            info!("Candidate {index} returned no profile data");
            continue;
        };

        let connects_balance = fetch_connects_balance(marketplace, token).await;
        let credential = bundle.credential_for(token);
        let profile = personal_data.to_profile(connects_balance);

        if let Err(e) = backend
            .save_profile(&LinkedProfile::new(&credential, &profile))
            .await
        {
            warn!("Failed to save profile to backend: {e}");
        }

        info!("Linked marketplace account using candidate {index}");
        return Ok(LinkedSession {
            credential,
            profile,
        });
    }

    Err(AppError::NoValidToken)
}

/// Best-effort balance lookup. Every failure is logged and becomes `None`.
pub async fn fetch_connects_balance(marketplace: &dyn MarketplaceApi, token: &str) -> Option<i64> {
    match marketplace.fetch_connects_balance(token).await {
        Ok(envelope) => match envelope.into_data() {
            Ok(data) => data.and_then(|d| d.connects_balance()),
            Err(failure) => {
                warn!("Connects balance unavailable: {failure:?}");
                None
            }
        },
        Err(e) => {
            warn!("Error fetching connects balance: {e}");
            None
        }
    }
}
