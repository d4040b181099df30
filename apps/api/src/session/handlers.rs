use axum::{extract::State, Json};
use serde::Serialize;
use tracing::warn;

use crate::errors::AppError;
use crate::models::credential::Profile;
use crate::session::{acquire_session, LinkState};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub linked: bool,
    pub profile: Profile,
}

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub state: LinkState,
    pub linked: bool,
    pub profile: Option<Profile>,
}

/// POST /api/v1/session/link
///
/// Rejected with 409 while another link is running. A failed or abandoned
/// link puts the affordance back to `idle`.
pub async fn handle_link(State(state): State<AppState>) -> Result<Json<LinkResponse>, AppError> {
    let guard = state.store.begin_link()?;

    match acquire_session(state.marketplace.as_ref(), state.backend.as_ref()).await {
        Ok(session) => {
            guard.complete(session.credential, session.profile.clone());
            Ok(Json(LinkResponse {
                linked: true,
                profile: session.profile,
            }))
        }
        Err(e) => {
            warn!("Account linking failed: {e}");
            Err(e)
        }
    }
}

/// GET /api/v1/session
pub async fn handle_session_status(State(state): State<AppState>) -> Json<SessionStatus> {
    Json(SessionStatus {
        state: state.store.link_state(),
        linked: state.store.credential().is_ok(),
        profile: state.store.profile(),
    })
}
