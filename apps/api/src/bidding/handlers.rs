//! Axum route handlers for the bid draft dialog.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bidding::{prepare_draft, submit_draft, Persona, PersonaOverride};
use crate::errors::AppError;
use crate::models::bid::{BidDraft, BidStatus};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct DraftRequest {
    pub job_id: String,
    #[serde(default)]
    pub persona: Option<PersonaOverride>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EditDraftRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub draft: BidDraft,
    pub notice: String,
}

/// POST /api/v1/bids/draft
///
/// Opens a draft for a job on the current page, replacing any open draft,
/// and returns it once the message and price are ready.
pub async fn handle_open_draft(
    State(state): State<AppState>,
    Json(request): Json<DraftRequest>,
) -> Result<Json<BidDraft>, AppError> {
    state.store.credential()?;

    let job = state.store.find_job(&request.job_id).ok_or_else(|| {
        AppError::NotFound(format!("Job {} is not on the current page", request.job_id))
    })?;
    if job.applied {
        return Err(AppError::Validation(
            "You have already applied to this job".to_string(),
        ));
    }

    let persona = Persona::resolve(&state.config.persona, request.persona.as_ref());
    let draft = prepare_draft(&state.store, state.generator.as_ref(), job, &persona).await?;
    Ok(Json(draft))
}

/// GET /api/v1/bids/draft
pub async fn handle_get_draft(State(state): State<AppState>) -> Result<Json<BidDraft>, AppError> {
    state
        .store
        .current_draft()
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No bid draft is open".to_string()))
}

/// PATCH /api/v1/bids/draft
pub async fn handle_edit_draft(
    State(state): State<AppState>,
    Json(request): Json<EditDraftRequest>,
) -> Result<Json<BidDraft>, AppError> {
    let draft = state
        .store
        .update_current_draft(|d| d.edit(request.message, request.price))?;
    Ok(Json(draft))
}

/// DELETE /api/v1/bids/draft
pub async fn handle_close_draft(State(state): State<AppState>) -> StatusCode {
    if let Some(draft) = state.store.close_draft() {
        info!("Closed bid draft {} for job {}", draft.id, draft.job.id);
    }
    StatusCode::NO_CONTENT
}

/// POST /api/v1/bids/draft/submit
pub async fn handle_submit_draft(
    State(state): State<AppState>,
    // Optional body: last-moment overrides from the dialog.
    body: Option<Json<EditDraftRequest>>,
) -> Result<Json<SubmitResponse>, AppError> {
    let credential = state.store.credential()?;

    if let Some(Json(edits)) = body {
        if edits.message.is_some() || edits.price.is_some() {
            state
                .store
                .update_current_draft(|d| d.edit(edits.message, edits.price))?;
        }
    }

    let draft = submit_draft(
        &state.store,
        state.backend.as_ref(),
        state.proxy.as_ref(),
        &credential,
    )
    .await?;

    let notice = match (&draft.status, &draft.failure) {
        (BidStatus::Failed, Some(message)) => format!("Error: {message}"),
        _ => "Bid submitted successfully!".to_string(),
    };
    Ok(Json(SubmitResponse { draft, notice }))
}
