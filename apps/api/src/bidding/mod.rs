//! Bid drafting and submission.
//!
//! Flow: select a job from the current page → open a draft → generate the
//! cover message (template fallback on any failure) → quote a price → Ready.
//! Submission fetches session cookies, posts to the bid proxy and records the
//! bid with the backend once the proxy confirms it.

pub mod handlers;
pub mod pricing;
pub mod prompts;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::backend::{BidProxy, SessionBackend};
use crate::config::PersonaDefaults;
use crate::errors::AppError;
use crate::llm_client::prompts::{FORMATTING_INSTRUCTION, NO_TEMPLATE_INSTRUCTION};
use crate::llm_client::TextGenerator;
use crate::models::bid::{BidDraft, BidRecord, BidSubmission};
use crate::models::credential::Credential;
use crate::models::job::Job;
use crate::store::WorkflowStore;
use prompts::{
    FALLBACK_PROPOSAL, MISSING_DESCRIPTION, PROPOSAL_PROMPT_TEMPLATE, PROPOSAL_SYSTEM_TEMPLATE,
};

/// Reported for any transport-level failure during submission.
pub const SUBMISSION_ERROR: &str = "An error occurred while submitting the bid.";

/// Voice the proposal is written in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Persona {
    pub name: String,
    pub target_words: u32,
    pub instruction: String,
}

/// Per-draft overrides supplied with the draft request. Blank values are
/// treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonaOverride {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "words")]
    pub target_words: Option<u32>,
    #[serde(default)]
    pub instruction: Option<String>,
}

impl Persona {
    pub fn resolve(defaults: &PersonaDefaults, overrides: Option<&PersonaOverride>) -> Self {
        let overrides = overrides.cloned().unwrap_or_default();
        Self {
            name: non_blank(overrides.name).unwrap_or_else(|| defaults.name.clone()),
            target_words: overrides
                .target_words
                .filter(|w| *w > 0)
                .unwrap_or(defaults.target_words),
            instruction: non_blank(overrides.instruction)
                .unwrap_or_else(|| defaults.instruction.clone()),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builds the (system, user) message pair for a proposal.
pub fn build_prompts(job: &Job, persona: &Persona) -> (String, String) {
    let words = persona.target_words.to_string();
    let description = if job.description.trim().is_empty() {
        MISSING_DESCRIPTION
    } else {
        job.description.as_str()
    };

    let system = PROPOSAL_SYSTEM_TEMPLATE
        .replace("{words}", &words)
        .replace("{instruction}", &persona.instruction)
        .replace("{name}", &persona.name);

    let prompt = PROPOSAL_PROMPT_TEMPLATE
        .replace("{formatting_instruction}", FORMATTING_INSTRUCTION)
        .replace("{no_template_instruction}", NO_TEMPLATE_INSTRUCTION)
        .replace("{name}", &persona.name)
        .replace("{instruction}", &persona.instruction)
        .replace("{words}", &words)
        .replace("{description}", description);

    (system, prompt)
}

/// Never fails: any generator error or blank reply yields the fixed template.
pub async fn generate_message(generator: &dyn TextGenerator, job: &Job, persona: &Persona) -> String {
    let (system, prompt) = build_prompts(job, persona);
    match generator.complete(&system, &prompt).await {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            warn!("Proposal generation for job {} returned no text; using template", job.id);
            FALLBACK_PROPOSAL.to_string()
        }
        Err(e) => {
            warn!("Proposal generation for job {} failed: {e}; using template", job.id);
            FALLBACK_PROPOSAL.to_string()
        }
    }
}

/// Opens a draft for `job` and drives it to `Ready`. Returns `Superseded` if
/// another draft replaced this one while the message was being generated.
pub async fn prepare_draft(
    store: &WorkflowStore,
    generator: &dyn TextGenerator,
    job: Job,
    persona: &Persona,
) -> Result<BidDraft, AppError> {
    let percentage = store.settings().price_percentage;
    let draft = store.open_draft(job);
    let draft = store.update_draft(draft.id, BidDraft::start_generating)?;

    let message = generate_message(generator, &draft.job, persona).await;
    let quote = pricing::quote(&draft.job, percentage);
    info!(
        "Draft {} for job {} ready at {} ({})",
        draft.id, draft.job.id, quote.amount, quote.basis
    );

    store.update_draft(draft.id, |d| d.ready(message, quote))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// `recorded` is true only when the backend confirmed the saved record.
    Submitted { pending: bool, recorded: bool },
    Failed { message: String },
}

/// Places the bid for a `Submitting` draft. Errors never escape: every
/// failure becomes `SubmissionOutcome::Failed`.
pub async fn submit_bid(
    backend: &dyn SessionBackend,
    proxy: &dyn BidProxy,
    credential: &Credential,
    draft: &BidDraft,
) -> SubmissionOutcome {
    let cookies = match backend.fetch_cookies().await {
        Ok(cookies) => cookies,
        Err(e) => {
            warn!("Failed to fetch session cookies: {e}");
            return failed(SUBMISSION_ERROR);
        }
    };

    let submission = BidSubmission::new(credential, cookies, draft);
    let reply = match proxy.place_bid(&submission).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!("Bid proxy unreachable for job {}: {e}", draft.job.id);
            return failed(SUBMISSION_ERROR);
        }
    };

    if let Some(error) = reply.error {
        let message = error.message();
        info!("Bid proxy rejected job {}: {message}", draft.job.id);
        return SubmissionOutcome::Failed { message };
    }

    if reply.pending != Some(false) {
        info!("Bid for job {} accepted as pending", draft.job.id);
        return SubmissionOutcome::Submitted {
            pending: true,
            recorded: false,
        };
    }

    let record = BidRecord::new(reply.new_uid, draft);
    let recorded = match backend.save_bid(&record).await {
        Ok(saved) if saved.status == "success" => true,
        Ok(saved) => {
            warn!(
                "Backend did not save bid for job {}: {}",
                draft.job.id,
                saved.message.as_deref().unwrap_or("no message")
            );
            false
        }
        Err(e) => {
            warn!("Error saving bid for job {}: {e}", draft.job.id);
            false
        }
    };

    SubmissionOutcome::Submitted {
        pending: false,
        recorded,
    }
}

fn failed(message: &str) -> SubmissionOutcome {
    SubmissionOutcome::Failed {
        message: message.to_string(),
    }
}

/// Moves the open draft through `Submitting` and applies the outcome.
/// A non-positive price is rejected before anything is sent.
pub async fn submit_draft(
    store: &WorkflowStore,
    backend: &dyn SessionBackend,
    proxy: &dyn BidProxy,
    credential: &Credential,
) -> Result<BidDraft, AppError> {
    let draft = store.update_current_draft(BidDraft::start_submitting)?;

    let outcome = submit_bid(backend, proxy, credential, &draft).await;

    store.update_draft(draft.id, |d| match outcome {
        SubmissionOutcome::Submitted { pending, recorded } => {
            info!("Draft {} submitted (pending: {pending}, recorded: {recorded})", d.id);
            d.submitted(pending)
        }
        SubmissionOutcome::Failed { message } => d.failed(message),
    })
}
