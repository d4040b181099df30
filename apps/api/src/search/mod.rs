//! Job search: runs one page of the marketplace job search under the saved
//! settings and normalizes the results into `Job` snapshots.

pub mod handlers;
pub mod pagination;
pub mod presentation;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::marketplace::queries::JobSearchRequest;
use crate::marketplace::{GraphqlFailure, MarketplaceApi};
use crate::models::credential::Credential;
use crate::models::job::Job;
use crate::models::settings::SearchSettings;
use crate::search::pagination::{Pagination, SearchQuery};

/// One page of results. Rebuilt on every call, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultPage {
    pub jobs: Vec<Job>,
    pub total_count: u32,
    pub offset: u32,
    pub page_size: u32,
    pub page: u32,
}

impl SearchResultPage {
    pub fn empty(page_size: u32) -> Self {
        Self {
            jobs: Vec::new(),
            total_count: 0,
            offset: 0,
            page_size,
            page: 1,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size, self.total_count)
    }
}

/// Runs a single search. No retries: an auth failure is returned as
/// `AuthFailure` for the caller to re-link, a GraphQL error as `Query`.
pub async fn search_jobs(
    marketplace: &dyn MarketplaceApi,
    credential: &Credential,
    settings: &SearchSettings,
    query: &SearchQuery,
) -> Result<SearchResultPage, AppError> {
    let request = JobSearchRequest::new(settings, &query.keyword, query.offset(), query.page_size);

    let envelope = marketplace.search_jobs(&credential.token, &request).await?;

    let data = match envelope.into_data() {
        Ok(data) => data,
        Err(GraphqlFailure::AuthFailed) => {
            warn!("Job search rejected the token");
            return Err(AppError::AuthFailure);
        }
        Err(GraphqlFailure::Query(message)) => return Err(AppError::Query(message)),
    };

    let Some(results) = data.and_then(|d| d.into_results()) else {
        info!("Job search returned no result block for {:?}", query.keyword);
        return Ok(SearchResultPage {
            page: query.page,
            offset: query.offset(),
            ..SearchResultPage::empty(query.page_size)
        });
    };

    let total_count = results.total();
    let jobs: Vec<Job> = results.results.into_iter().map(Job::from).collect();
    info!(
        "Job search {:?} page {}: {} jobs of {}",
        query.keyword,
        query.page,
        jobs.len(),
        total_count
    );

    Ok(SearchResultPage {
        jobs,
        total_count,
        offset: query.offset(),
        page_size: query.page_size,
        page: query.page,
    })
}
