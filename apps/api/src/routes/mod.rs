pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::bidding::handlers as bids;
use crate::profile::handlers as profile;
use crate::search::handlers as jobs;
use crate::session::handlers as session;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Account linking
        .route("/api/v1/session", get(session::handle_session_status))
        .route("/api/v1/session/link", post(session::handle_link))
        .route("/api/v1/profile", get(profile::handle_get_profile))
        // Search
        .route(
            "/api/v1/settings",
            get(jobs::handle_get_settings).put(jobs::handle_put_settings),
        )
        .route("/api/v1/jobs", get(jobs::handle_current_page))
        .route("/api/v1/jobs/search", post(jobs::handle_search))
        .route("/api/v1/jobs/next", post(jobs::handle_next_page))
        .route("/api/v1/jobs/previous", post(jobs::handle_previous_page))
        .route("/api/v1/jobs/page/:n", post(jobs::handle_goto_page))
        .route("/api/v1/jobs/page-size", put(jobs::handle_page_size))
        // Bid drafting
        .route(
            "/api/v1/bids/draft",
            post(bids::handle_open_draft)
                .get(bids::handle_get_draft)
                .patch(bids::handle_edit_draft)
                .delete(bids::handle_close_draft),
        )
        .route("/api/v1/bids/draft/submit", post(bids::handle_submit_draft))
        .with_state(state)
}
