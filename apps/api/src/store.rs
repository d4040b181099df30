//! Owned container for the per-session workflow state: the linked
//! credential, saved search settings, the committed search page and the
//! single active bid draft.
//!
//! The lock is never held across an await. Long-running calls take a ticket
//! (search) or remember the draft id (bidding) before they start, and their
//! results are only applied if that ticket or id is still current.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use crate::errors::AppError;
use crate::models::bid::BidDraft;
use crate::models::credential::{Credential, Profile};
use crate::models::job::Job;
use crate::models::settings::SearchSettings;
use crate::search::pagination::{SearchCursor, SearchQuery};
use crate::search::SearchResultPage;
use crate::session::LinkState;

#[derive(Debug)]
struct WorkflowState {
    link_state: LinkState,
    credential: Option<Credential>,
    profile: Option<Profile>,
    settings: SearchSettings,
    cursor: SearchCursor,
    current_page: Option<SearchResultPage>,
    latest_search_ticket: u64,
    draft: Option<BidDraft>,
    last_draft_id: u64,
}

#[derive(Debug)]
pub struct WorkflowStore {
    inner: Mutex<WorkflowState>,
}

impl Default for WorkflowStore {
    fn default() -> Self {
        Self::new(SearchSettings::default())
    }
}

impl WorkflowStore {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            inner: Mutex::new(WorkflowState {
                link_state: LinkState::Idle,
                credential: None,
                profile: None,
                cursor: SearchCursor {
                    keyword: settings.keyword.clone(),
                    ..SearchCursor::default()
                },
                settings,
                current_page: None,
                latest_search_ticket: 0,
                draft: None,
                last_draft_id: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, WorkflowState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Linking ─────────────────────────────────────────────────────────────

    pub fn link_state(&self) -> LinkState {
        self.state().link_state
    }

    /// Disables the link affordance. Fails if a link is already running.
    ///
    /// The affordance comes back when the returned guard is dropped without
    /// [`LinkGuard::complete`], including when the caller's future is dropped.
    pub fn begin_link(&self) -> Result<LinkGuard<'_>, AppError> {
        let mut state = self.state();
        if state.link_state == LinkState::Linking {
            return Err(AppError::Conflict(
                "Account linking is already in progress".to_string(),
            ));
        }
        state.link_state = LinkState::Linking;
        Ok(LinkGuard {
            store: self,
            completed: false,
        })
    }

    pub fn complete_link(&self, credential: Credential, profile: Profile) {
        let mut state = self.state();
        state.link_state = LinkState::Linked;
        state.credential = Some(credential);
        state.profile = Some(profile);
    }

    pub fn credential(&self) -> Result<Credential, AppError> {
        self.state().credential.clone().ok_or(AppError::NotLinked)
    }

    pub fn profile(&self) -> Option<Profile> {
        self.state().profile.clone()
    }

    /// Drops the credential after the marketplace rejected it. A credential
    /// replaced by a newer link in the meantime is kept.
    pub fn invalidate_credential(&self, rejected: &Credential) {
        let mut state = self.state();
        if state.credential.as_ref() == Some(rejected) {
            info!("Marketplace rejected the stored token; re-link required");
            state.credential = None;
            state.profile = None;
            state.link_state = LinkState::Idle;
        }
    }

    // ── Settings ────────────────────────────────────────────────────────────

    pub fn settings(&self) -> SearchSettings {
        self.state().settings.clone()
    }

    /// Starts a new search session under the given settings.
    pub fn replace_settings(&self, settings: SearchSettings) {
        let mut state = self.state();
        state.cursor = SearchCursor {
            keyword: settings.keyword.clone(),
            page_size: state.cursor.page_size,
            ..SearchCursor::default()
        };
        state.settings = settings;
        state.current_page = None;
        // Anything in flight was issued under the old settings.
        state.latest_search_ticket += 1;
    }

    // ── Search ──────────────────────────────────────────────────────────────

    pub fn search_cursor(&self) -> SearchCursor {
        self.state().cursor.clone()
    }

    pub fn current_page(&self) -> Option<SearchResultPage> {
        self.state().current_page.clone()
    }

    pub fn issue_search_ticket(&self) -> u64 {
        let mut state = self.state();
        state.latest_search_ticket += 1;
        state.latest_search_ticket
    }

    /// Publishes a finished search. Results from a superseded ticket are
    /// discarded and nothing changes.
    pub fn commit_search(
        &self,
        ticket: u64,
        query: &SearchQuery,
        page: SearchResultPage,
    ) -> Result<(), AppError> {
        let mut state = self.state();
        if ticket != state.latest_search_ticket {
            debug!(
                "Discarding search ticket {ticket}; latest is {}",
                state.latest_search_ticket
            );
            return Err(AppError::Superseded);
        }
        state.cursor = SearchCursor {
            keyword: query.keyword.clone(),
            page: query.page,
            page_size: query.page_size,
            total: page.total_count,
        };
        state.current_page = Some(page);
        Ok(())
    }

    pub fn find_job(&self, job_id: &str) -> Option<Job> {
        self.state()
            .current_page
            .as_ref()?
            .jobs
            .iter()
            .find(|job| job.id == job_id)
            .cloned()
    }

    // ── Bid draft ───────────────────────────────────────────────────────────

    /// Replaces any existing draft with a fresh one for `job`.
    pub fn open_draft(&self, job: Job) -> BidDraft {
        let mut state = self.state();
        state.last_draft_id += 1;
        let draft = BidDraft::new(state.last_draft_id, job);
        state.draft = Some(draft.clone());
        draft
    }

    pub fn current_draft(&self) -> Option<BidDraft> {
        self.state().draft.clone()
    }

    pub fn close_draft(&self) -> Option<BidDraft> {
        self.state().draft.take()
    }

    /// Applies a transition to draft `id`. Fails with `Superseded` when that
    /// draft was closed or replaced; a failed transition leaves it unchanged.
    pub fn update_draft<F>(&self, id: u64, transition: F) -> Result<BidDraft, AppError>
    where
        F: FnOnce(BidDraft) -> Result<BidDraft, AppError>,
    {
        let mut state = self.state();
        let current = match state.draft.as_ref() {
            Some(draft) if draft.id == id => draft.clone(),
            _ => return Err(AppError::Superseded),
        };
        let next = transition(current)?;
        state.draft = Some(next.clone());
        Ok(next)
    }

    /// Applies a transition to whichever draft is open.
    pub fn update_current_draft<F>(&self, transition: F) -> Result<BidDraft, AppError>
    where
        F: FnOnce(BidDraft) -> Result<BidDraft, AppError>,
    {
        let id = self
            .current_draft()
            .map(|d| d.id)
            .ok_or_else(|| AppError::NotFound("No bid draft is open".to_string()))?;
        self.update_draft(id, transition)
    }
}

/// An in-flight link. Dropping it unfinished puts the link state back to
/// `Idle`; any earlier credential is left alone.
#[derive(Debug)]
pub struct LinkGuard<'a> {
    store: &'a WorkflowStore,
    completed: bool,
}

impl LinkGuard<'_> {
    pub fn complete(mut self, credential: Credential, profile: Profile) {
        self.store.complete_link(credential, profile);
        self.completed = true;
    }
}

impl Drop for LinkGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        let mut state = self.store.state();
        if state.link_state == LinkState::Linking {
            debug!("Link attempt ended without a credential");
            state.link_state = LinkState::Idle;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::bid::{BidStatus, PriceQuote};
    use crate::models::job::fixtures;

    fn credential(token: &str) -> Credential {
        Credential {
            token: token.to_string(),
            user_id: "uid".to_string(),
            console_user_id: "console".to_string(),
        }
    }

    fn page(ids: &[&str], total: u32) -> SearchResultPage {
        SearchResultPage {
            jobs: ids.iter().map(|id| fixtures::hourly_job(id, 10.0, 20.0)).collect(),
            total_count: total,
            offset: 0,
            page_size: 10,
            page: 1,
        }
    }

    fn query(page: u32) -> SearchQuery {
        SearchQuery {
            keyword: "rust".to_string(),
            page,
            page_size: 10,
        }
    }

    #[test]
    fn test_link_state_transitions() {
        let store = WorkflowStore::default();
        assert_eq!(store.link_state(), LinkState::Idle);

        let guard = store.begin_link().unwrap();
        assert_eq!(store.link_state(), LinkState::Linking);
        assert!(matches!(store.begin_link(), Err(AppError::Conflict(_))));

        drop(guard);
        assert_eq!(store.link_state(), LinkState::Idle);
        assert!(matches!(store.credential(), Err(AppError::NotLinked)));

        store
            .begin_link()
            .unwrap()
            .complete(credential("tok"), Profile::default());
        assert_eq!(store.link_state(), LinkState::Linked);
        assert_eq!(store.credential().unwrap().token, "tok");
    }

    #[test]
    fn test_unfinished_relink_keeps_existing_credential() {
        let store = WorkflowStore::default();
        store
            .begin_link()
            .unwrap()
            .complete(credential("tok"), Profile::default());

        drop(store.begin_link().unwrap());

        assert_eq!(store.link_state(), LinkState::Idle);
        assert_eq!(store.credential().unwrap().token, "tok");
    }

    #[test]
    fn test_invalidate_only_matching_credential() {
        let store = WorkflowStore::default();
        store.complete_link(credential("new"), Profile::default());

        store.invalidate_credential(&credential("old"));
        assert_eq!(store.credential().unwrap().token, "new");

        store.invalidate_credential(&credential("new"));
        assert!(store.credential().is_err());
        assert_eq!(store.link_state(), LinkState::Idle);
    }

    #[test]
    fn test_stale_search_ticket_is_discarded() {
        let store = WorkflowStore::default();
        let first = store.issue_search_ticket();
        let second = store.issue_search_ticket();

        store.commit_search(second, &query(2), page(&["b"], 23)).unwrap();
        let late = store.commit_search(first, &query(1), page(&["a"], 23));

        assert!(matches!(late, Err(AppError::Superseded)));
        let current = store.current_page().unwrap();
        assert_eq!(current.jobs[0].id, "b");
        assert_eq!(store.search_cursor().page, 2);
        assert_eq!(store.search_cursor().total, 23);
    }

    #[test]
    fn test_replacing_settings_resets_search_session() {
        let store = WorkflowStore::default();
        let ticket = store.issue_search_ticket();
        store.replace_settings(SearchSettings {
            keyword: "axum".to_string(),
            ..Default::default()
        });

        assert!(store.commit_search(ticket, &query(1), page(&["a"], 1)).is_err());
        assert!(store.current_page().is_none());
        assert_eq!(store.search_cursor().keyword, "axum");
        assert_eq!(store.search_cursor().page, 1);
    }

    #[test]
    fn test_find_job_in_current_page() {
        let store = WorkflowStore::default();
        let ticket = store.issue_search_ticket();
        store.commit_search(ticket, &query(1), page(&["a", "b"], 2)).unwrap();

        assert_eq!(store.find_job("b").unwrap().id, "b");
        assert!(store.find_job("zzz").is_none());
    }

    #[test]
    fn test_only_one_draft_is_active() {
        let store = WorkflowStore::default();
        let first = store.open_draft(fixtures::hourly_job("a", 10.0, 20.0));
        let second = store.open_draft(fixtures::hourly_job("b", 10.0, 20.0));
        assert_ne!(first.id, second.id);

        let late = store.update_draft(first.id, |d| d.start_generating());
        assert!(matches!(late, Err(AppError::Superseded)));
        assert_eq!(store.current_draft().unwrap().job.id, "b");
    }

    #[test]
    fn test_failed_transition_leaves_draft_unchanged() {
        let store = WorkflowStore::default();
        let draft = store.open_draft(fixtures::hourly_job("a", 10.0, 20.0));

        let result = store.update_draft(draft.id, |d| {
            d.ready(
                "too early".to_string(),
                PriceQuote {
                    amount: 10,
                    basis: String::new(),
                },
            )
        });
        assert!(matches!(result, Err(AppError::Conflict(_))));
        assert_eq!(store.current_draft().unwrap().status, BidStatus::Draft);

        store.close_draft();
        assert!(matches!(
            store.update_current_draft(|d| d.start_generating()),
            Err(AppError::NotFound(_))
        ));
    }
}
