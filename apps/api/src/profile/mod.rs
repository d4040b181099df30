//! Profile display: re-fetches the linked freelancer's personal data and
//! connects balance for the header card.

pub mod handlers;

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::marketplace::{GraphqlFailure, MarketplaceApi};
use crate::models::credential::{Credential, Profile};
use crate::session::fetch_connects_balance;

const DEFAULT_TITLE: &str = "No title available";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub display_name: String,
    pub title: String,
    pub profile_url: Option<String>,
    pub portrait_url: Option<String>,
    pub connects_balance: Option<i64>,
}

impl From<&Profile> for ProfileView {
    fn from(profile: &Profile) -> Self {
        let display_name = format!(
            "{} {}",
            profile.first_name.as_deref().unwrap_or(""),
            profile.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string();

        Self {
            display_name,
            title: profile
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            profile_url: profile.profile_url.as_deref().map(canonical_profile_url),
            portrait_url: profile.portrait_url.clone(),
            connects_balance: profile.connects_balance,
        }
    }
}

/// Bare-domain profile links are rewritten to the `www` host.
fn canonical_profile_url(url: &str) -> String {
    url.replacen("https://upwork.com", "https://www.upwork.com", 1)
}

/// Single attempt, no retry. The balance is fetched afterwards and is best
/// effort; it never fails the load.
pub async fn load_profile(
    marketplace: &dyn MarketplaceApi,
    credential: &Credential,
) -> Result<ProfileView, AppError> {
    let envelope = marketplace.fetch_profile(&credential.token).await?;

    let data = match envelope.into_data() {
        Ok(data) => data,
        Err(GraphqlFailure::AuthFailed) => {
            warn!("Profile request rejected the token");
            return Err(AppError::AuthFailure);
        }
        Err(GraphqlFailure::Query(message)) => return Err(AppError::Query(message)),
    };

    let personal_data = data
        .as_ref()
        .and_then(|d| d.personal_data())
        .ok_or_else(|| AppError::Display("Invalid profile data received".to_string()))?;

    let connects_balance = fetch_connects_balance(marketplace, &credential.token).await;
    let profile = personal_data.to_profile(connects_balance);
    info!("Loaded profile (connects balance: {connects_balance:?})");

    Ok(ProfileView::from(&profile))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeMarketplace;

    fn credential(token: &str) -> Credential {
        Credential {
            token: token.to_string(),
            user_id: "uid-1".to_string(),
            console_user_id: "console-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_profile_view_is_derived() {
        let marketplace = FakeMarketplace::accepting(&["good"]);

        let view = load_profile(&marketplace, &credential("good")).await.unwrap();

        assert_eq!(view.display_name, "Ada Lovelace");
        assert_eq!(view.title, "Rust Engineer");
        assert_eq!(
            view.profile_url.as_deref(),
            Some("https://www.upwork.com/freelancers/~01ada")
        );
        assert_eq!(view.connects_balance, Some(FakeMarketplace::BALANCE));
    }

    #[tokio::test]
    async fn test_balance_failure_is_ignored() {
        let marketplace = FakeMarketplace::accepting(&["good"]).failing_balance();

        let view = load_profile(&marketplace, &credential("good")).await.unwrap();

        assert_eq!(view.connects_balance, None);
        assert_eq!(marketplace.balance_calls(), 1);
    }

    #[tokio::test]
    async fn test_auth_failure_is_not_retried() {
        let marketplace = FakeMarketplace::accepting(&[]);

        let result = load_profile(&marketplace, &credential("stale")).await;

        assert!(matches!(result, Err(AppError::AuthFailure)));
        assert_eq!(marketplace.profile_probes().len(), 1);
        assert_eq!(marketplace.balance_calls(), 0);
    }

    #[tokio::test]
    async fn test_graphql_error_and_missing_data() {
        let errors = FakeMarketplace::accepting(&["good"]).with_profile_error("Field not found");
        match load_profile(&errors, &credential("good")).await {
            Err(AppError::Query(message)) => assert_eq!(message, "Field not found"),
            other => panic!("expected query error, got {other:?}"),
        }

        let empty = FakeMarketplace::accepting(&["good"]).without_profile_data();
        assert!(matches!(
            load_profile(&empty, &credential("good")).await,
            Err(AppError::Display(_))
        ));
    }

    #[test]
    fn test_view_defaults() {
        let view = ProfileView::from(&Profile {
            first_name: Some("Ada".to_string()),
            profile_url: Some("https://www.upwork.com/freelancers/~01".to_string()),
            ..Profile::default()
        });
        assert_eq!(view.display_name, "Ada");
        assert_eq!(view.title, DEFAULT_TITLE);
        assert_eq!(
            view.profile_url.as_deref(),
            Some("https://www.upwork.com/freelancers/~01")
        );
    }
}
