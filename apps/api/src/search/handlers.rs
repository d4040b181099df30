//! Axum route handlers for job search and result navigation.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::models::settings::SearchSettings;
use crate::search::pagination::Navigation;
use crate::search::presentation::SearchView;
use crate::search::{search_jobs, SearchResultPage};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub keyword: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PageSizeRequest {
    pub page_size: u32,
}

/// GET /api/v1/settings
pub async fn handle_get_settings(State(state): State<AppState>) -> Json<SearchSettings> {
    Json(state.store.settings())
}

/// PUT /api/v1/settings
///
/// Replaces the saved filters and starts a new search session.
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(settings): Json<SearchSettings>,
) -> Json<SearchSettings> {
    state.store.replace_settings(settings.clone());
    Json(settings)
}

/// GET /api/v1/jobs
///
/// The last committed page, without calling the marketplace.
pub async fn handle_current_page(State(state): State<AppState>) -> Json<SearchView> {
    Json(SearchView::new(&current_or_empty(&state), Utc::now()))
}

/// POST /api/v1/jobs/search
pub async fn handle_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchView>, AppError> {
    navigate(
        &state,
        Navigation::Search {
            keyword: request.keyword,
        },
    )
    .await
}

/// POST /api/v1/jobs/next
pub async fn handle_next_page(
    State(state): State<AppState>,
) -> Result<Json<SearchView>, AppError> {
    navigate(&state, Navigation::Next).await
}

/// POST /api/v1/jobs/previous
pub async fn handle_previous_page(
    State(state): State<AppState>,
) -> Result<Json<SearchView>, AppError> {
    navigate(&state, Navigation::Previous).await
}

/// POST /api/v1/jobs/page/:n
pub async fn handle_goto_page(
    State(state): State<AppState>,
    Path(page): Path<u32>,
) -> Result<Json<SearchView>, AppError> {
    navigate(&state, Navigation::Goto(page)).await
}

/// PUT /api/v1/jobs/page-size
pub async fn handle_page_size(
    State(state): State<AppState>,
    Json(request): Json<PageSizeRequest>,
) -> Result<Json<SearchView>, AppError> {
    navigate(&state, Navigation::PageSize(request.page_size)).await
}

/// Resolves the navigation against the committed cursor, runs the search if
/// it is not a no-op and commits the page under a fresh ticket.
async fn navigate(state: &AppState, navigation: Navigation) -> Result<Json<SearchView>, AppError> {
    let credential = state.store.credential()?;
    let settings = state.store.settings();
    let cursor = state.store.search_cursor();

    let Some(query) = cursor.navigate(navigation, &settings.keyword)? else {
        debug!("Navigation is a no-op at page {}", cursor.page);
        return Ok(Json(SearchView::new(&current_or_empty(state), Utc::now())));
    };

    let ticket = state.store.issue_search_ticket();
    let page = match search_jobs(state.marketplace.as_ref(), &credential, &settings, &query).await
    {
        Ok(page) => page,
        Err(AppError::AuthFailure) => {
            state.store.invalidate_credential(&credential);
            return Err(AppError::AuthFailure);
        }
        Err(e) => return Err(e),
    };

    state.store.commit_search(ticket, &query, page.clone())?;
    Ok(Json(SearchView::new(&page, Utc::now())))
}

fn current_or_empty(state: &AppState) -> SearchResultPage {
    state
        .store
        .current_page()
        .unwrap_or_else(|| SearchResultPage::empty(state.store.search_cursor().page_size))
}
