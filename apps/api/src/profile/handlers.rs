use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::profile::{load_profile, ProfileView};
use crate::state::AppState;

/// GET /api/v1/profile
///
/// A rejected token clears the stored credential so the caller re-links.
pub async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<ProfileView>, AppError> {
    let credential = state.store.credential()?;

    match load_profile(state.marketplace.as_ref(), &credential).await {
        Ok(view) => Ok(Json(view)),
        Err(AppError::AuthFailure) => {
            state.store.invalidate_credential(&credential);
            Err(AppError::AuthFailure)
        }
        Err(e) => Err(e),
    }
}
