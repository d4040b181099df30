//! In-memory collaborators for workflow and route tests. Each fake records
//! the calls it receives so tests can assert on call order and counts.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::backend::{BidProxy, SessionBackend};
use crate::errors::TransportError;
use crate::llm_client::{LlmError, TextGenerator};
use crate::marketplace::queries::{BalanceData, JobSearchData, JobSearchRequest, ProfileData};
use crate::marketplace::{GraphqlEnvelope, MarketplaceApi};
use crate::models::bid::{BidProxyReply, BidRecord, BidSubmission, SaveBidReply};
use crate::models::credential::{CookieBundle, LinkedProfile, TokenBundle};

fn unavailable() -> TransportError {
    TransportError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Marketplace
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub enum SearchBehavior {
    Jobs { total: u32, jobs: Vec<Value> },
    AuthFailed,
    Errors(String),
    Transport,
}

#[derive(Default)]
struct MarketplaceCalls {
    profile_probes: Vec<String>,
    balance_calls: usize,
    searches: Vec<JobSearchRequest>,
}

pub struct FakeMarketplace {
    accepted: HashSet<String>,
    balance_fails: bool,
    profile_without_data: bool,
    profile_error: Option<String>,
    search: Mutex<SearchBehavior>,
    calls: Mutex<MarketplaceCalls>,
}

impl FakeMarketplace {
    pub const BALANCE: i64 = 64;

    pub fn accepting(tokens: &[&str]) -> Self {
        Self {
            accepted: tokens.iter().map(|t| t.to_string()).collect(),
            balance_fails: false,
            profile_without_data: false,
            profile_error: None,
            search: Mutex::new(SearchBehavior::Jobs {
                total: 0,
                jobs: Vec::new(),
            }),
            calls: Mutex::new(MarketplaceCalls::default()),
        }
    }

    pub fn failing_balance(mut self) -> Self {
        self.balance_fails = true;
        self
    }

    pub fn without_profile_data(mut self) -> Self {
        self.profile_without_data = true;
        self
    }

    pub fn with_profile_error(mut self, message: &str) -> Self {
        self.profile_error = Some(message.to_string());
        self
    }

    pub fn with_search(self, behavior: SearchBehavior) -> Self {
        self.set_search(behavior);
        self
    }

    pub fn set_search(&self, behavior: SearchBehavior) {
        *self.search.lock().unwrap() = behavior;
    }

    pub fn profile_probes(&self) -> Vec<String> {
        self.calls.lock().unwrap().profile_probes.clone()
    }

    pub fn balance_calls(&self) -> usize {
        self.calls.lock().unwrap().balance_calls
    }

    pub fn searches(&self) -> Vec<JobSearchRequest> {
        self.calls.lock().unwrap().searches.clone()
    }
}

pub fn raw_job(id: &str, job_type: &str) -> Value {
    json!({
        "id": id,
        "title": format!("Job {id}"),
        "description": "Looking for an experienced Rust engineer.",
        "ontologySkills": [{ "prettyName": "Rust", "highlighted": true }],
        "applied": false,
        "upworkHistoryData": {
            "client": {
                "paymentVerificationStatus": "VERIFIED",
                "country": "Norway",
                "totalReviews": 3,
                "totalFeedback": 4.5,
                "totalSpent": { "isoCurrencyCode": "USD", "amount": 2500 }
            }
        },
        "jobTile": {
            "job": {
                "ciphertext": format!("~0{id}"),
                "jobType": job_type,
                "hourlyBudgetMin": 30,
                "hourlyBudgetMax": 50,
                "createTime": "2026-10-14T00:00:00Z",
                "totalApplicants": 4,
                "fixedPriceAmount": { "isoCurrencyCode": "USD", "amount": "437.0" }
            }
        }
    })
}

#[async_trait]
impl MarketplaceApi for FakeMarketplace {
    async fn fetch_profile(
        &self,
        token: &str,
    ) -> Result<GraphqlEnvelope<ProfileData>, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .profile_probes
            .push(token.to_string());

        if token == "unreachable" {
            return Err(unavailable());
        }
        if token == "stalled" {
            std::future::pending::<()>().await;
        }
        if !self.accepted.contains(token) {
            return Ok(GraphqlEnvelope::auth_failed());
        }
        if let Some(message) = &self.profile_error {
            return Ok(GraphqlEnvelope::with_errors(&[message.as_str()]));
        }
        if self.profile_without_data {
            return Ok(GraphqlEnvelope::ok(ProfileData::default()));
        }
        let data = serde_json::from_value(json!({
            "getFreelancerProfile": {
                "freelancerProfile": {
                    "personalData": {
                        "profileUrl": "https://upwork.com/freelancers/~01ada",
                        "portrait": { "portrait100": "https://img.example/ada.png" },
                        "firstName": "Ada",
                        "lastName": "Lovelace",
                        "title": "Rust Engineer"
                    }
                }
            }
        }))
        .unwrap();
        Ok(GraphqlEnvelope::ok(data))
    }

    async fn fetch_connects_balance(
        &self,
        _token: &str,
    ) -> Result<GraphqlEnvelope<BalanceData>, TransportError> {
        self.calls.lock().unwrap().balance_calls += 1;
        if self.balance_fails {
            return Err(unavailable());
        }
        let data = serde_json::from_value(json!({
            "organization": { "subscriptionPlan": { "connectsBalance": Self::BALANCE } }
        }))
        .unwrap();
        Ok(GraphqlEnvelope::ok(data))
    }

    async fn search_jobs(
        &self,
        _token: &str,
        request: &JobSearchRequest,
    ) -> Result<GraphqlEnvelope<JobSearchData>, TransportError> {
        self.calls.lock().unwrap().searches.push(request.clone());
        let behavior = self.search.lock().unwrap().clone();
        match behavior {
            SearchBehavior::Jobs { total, jobs } => {
                let data = serde_json::from_value(json!({
                    "search": {
                        "universalSearchNuxt": {
                            "userJobSearchV1": {
                                "paging": {
                                    "total": total,
                                    "offset": request.paging.offset,
                                    "count": request.paging.count
                                },
                                "results": jobs
                            }
                        }
                    }
                }))
                .unwrap();
                Ok(GraphqlEnvelope::ok(data))
            }
            SearchBehavior::AuthFailed => Ok(GraphqlEnvelope::auth_failed()),
            SearchBehavior::Errors(message) => Ok(GraphqlEnvelope::with_errors(&[message.as_str()])),
            SearchBehavior::Transport => Err(unavailable()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Account backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct BackendCalls {
    cookie_fetches: usize,
    saved_profiles: Vec<LinkedProfile>,
    saved_bids: Vec<BidRecord>,
}

pub struct FakeBackend {
    tokens: Vec<String>,
    tokens_fail: bool,
    saves_fail: bool,
    cookies_fail: bool,
    calls: Mutex<BackendCalls>,
}

impl FakeBackend {
    pub fn with_tokens(tokens: &[&str]) -> Self {
        Self {
            tokens: tokens.iter().map(|t| t.to_string()).collect(),
            tokens_fail: false,
            saves_fail: false,
            cookies_fail: false,
            calls: Mutex::new(BackendCalls::default()),
        }
    }

    pub fn failing_tokens(mut self) -> Self {
        self.tokens_fail = true;
        self
    }

    pub fn failing_saves(mut self) -> Self {
        self.saves_fail = true;
        self
    }

    pub fn failing_cookies(mut self) -> Self {
        self.cookies_fail = true;
        self
    }

    pub fn saved_profiles(&self) -> Vec<LinkedProfile> {
        self.calls.lock().unwrap().saved_profiles.clone()
    }

    pub fn saved_bids(&self) -> Vec<BidRecord> {
        self.calls.lock().unwrap().saved_bids.clone()
    }

    pub fn cookie_fetches(&self) -> usize {
        self.calls.lock().unwrap().cookie_fetches
    }
}

#[async_trait]
impl SessionBackend for FakeBackend {
    async fn fetch_tokens(&self) -> Result<TokenBundle, TransportError> {
        if self.tokens_fail {
            return Err(unavailable());
        }
        let candidates: Vec<Value> = self
            .tokens
            .iter()
            .map(|t| json!({ "oauth2_global_js_token": t }))
            .collect();
        Ok(serde_json::from_value(json!({
            "oauthCookies": candidates,
            "user_uid": "uid-1",
            "console_user": "console-1"
        }))
        .unwrap())
    }

    async fn fetch_cookies(&self) -> Result<CookieBundle, TransportError> {
        self.calls.lock().unwrap().cookie_fetches += 1;
        if self.cookies_fail {
            return Err(unavailable());
        }
        Ok(CookieBundle {
            cookies: vec![
                json!({ "name": "master_access_token", "value": "mat" }),
                json!({ "name": "XSRF-TOKEN", "value": "csrf-abc" }),
            ],
        })
    }

    async fn save_profile(&self, profile: &LinkedProfile) -> Result<(), TransportError> {
        self.calls
            .lock()
            .unwrap()
            .saved_profiles
            .push(profile.clone());
        if self.saves_fail {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn save_bid(&self, record: &BidRecord) -> Result<SaveBidReply, TransportError> {
        self.calls.lock().unwrap().saved_bids.push(record.clone());
        if self.saves_fail {
            return Err(unavailable());
        }
        Ok(SaveBidReply {
            status: "success".to_string(),
            message: None,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bid proxy
// ────────────────────────────────────────────────────────────────────────────

pub struct FakeProxy {
    reply: Option<Value>,
    submissions: Mutex<Vec<BidSubmission>>,
}

impl FakeProxy {
    /// Replies with `reply` decoded as a proxy response.
    pub fn replying(reply: Value) -> Self {
        Self {
            reply: Some(reply),
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn unreachable() -> Self {
        Self {
            reply: None,
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn submissions(&self) -> Vec<BidSubmission> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl BidProxy for FakeProxy {
    async fn place_bid(&self, submission: &BidSubmission) -> Result<BidProxyReply, TransportError> {
        self.submissions.lock().unwrap().push(submission.clone());
        match &self.reply {
            Some(reply) => Ok(serde_json::from_value(reply.clone())?),
            None => Err(unavailable()),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text generation
// ────────────────────────────────────────────────────────────────────────────

pub struct FakeGenerator {
    reply: Option<String>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl FakeGenerator {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.prompts
            .lock()
            .unwrap()
            .push((system.to_string(), prompt.to_string()));
        match &self.reply {
            Some(text) => Ok(text.clone()),
            None => Err(LlmError::Api {
                status: 500,
                message: "upstream exploded".to_string(),
            }),
        }
    }
}

/// Shared handles kept by route tests after the fakes move into `AppState`.
pub struct Fakes {
    pub marketplace: Arc<FakeMarketplace>,
    pub backend: Arc<FakeBackend>,
    pub proxy: Arc<FakeProxy>,
    pub generator: Arc<FakeGenerator>,
}
