use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::models::credential::{CookieBundle, Credential};
use crate::models::job::{Job, JobType};

/// Characters of the job description kept on a stored bid record.
pub const RECORD_DESCRIPTION_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidStatus {
    Draft,
    Generating,
    Ready,
    Submitting,
    Submitted,
    Failed,
}

/// A computed bid price with the human-readable basis shown next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub amount: i64,
    pub basis: String,
}

/// The single in-progress proposal. Transitions consume the draft and return
/// the next state, so a stale copy can never be advanced by accident.
#[derive(Debug, Clone, Serialize)]
pub struct BidDraft {
    pub id: u64,
    pub job: Job,
    pub generated_message: String,
    pub price: Option<PriceQuote>,
    pub status: BidStatus,
    /// Proxy accepted the bid but has not confirmed it. Not reconciled later.
    pub pending: bool,
    pub failure: Option<String>,
}

impl BidDraft {
    pub fn new(id: u64, job: Job) -> Self {
        Self {
            id,
            job,
            generated_message: String::new(),
            price: None,
            status: BidStatus::Draft,
            pending: false,
            failure: None,
        }
    }

    pub fn start_generating(self) -> Result<Self, AppError> {
        self.expect_status(&[BidStatus::Draft])?;
        Ok(Self {
            status: BidStatus::Generating,
            ..self
        })
    }

    pub fn ready(self, message: String, price: PriceQuote) -> Result<Self, AppError> {
        self.expect_status(&[BidStatus::Generating])?;
        Ok(Self {
            generated_message: message,
            price: Some(price),
            status: BidStatus::Ready,
            ..self
        })
    }

    /// Applies user overrides. The only validation is a positive price.
    pub fn edit(self, message: Option<String>, price: Option<i64>) -> Result<Self, AppError> {
        self.expect_status(&[BidStatus::Ready, BidStatus::Failed])?;
        if let Some(amount) = price {
            validate_price(amount)?;
        }
        let price = match (price, self.price.clone()) {
            (Some(amount), Some(quote)) => Some(PriceQuote { amount, ..quote }),
            (Some(amount), None) => Some(PriceQuote {
                amount,
                basis: "Custom rate".to_string(),
            }),
            (None, existing) => existing,
        };
        Ok(Self {
            generated_message: message.unwrap_or(self.generated_message),
            price,
            ..self
        })
    }

    pub fn start_submitting(self) -> Result<Self, AppError> {
        self.expect_status(&[BidStatus::Ready, BidStatus::Failed])?;
        validate_price(self.amount())?;
        Ok(Self {
            status: BidStatus::Submitting,
            failure: None,
            ..self
        })
    }

    pub fn submitted(self, pending: bool) -> Result<Self, AppError> {
        self.expect_status(&[BidStatus::Submitting])?;
        Ok(Self {
            status: BidStatus::Submitted,
            pending,
            ..self
        })
    }

    pub fn failed(self, message: String) -> Result<Self, AppError> {
        self.expect_status(&[BidStatus::Submitting])?;
        Ok(Self {
            status: BidStatus::Failed,
            failure: Some(message),
            ..self
        })
    }

    pub fn amount(&self) -> i64 {
        self.price.as_ref().map(|p| p.amount).unwrap_or(0)
    }

    fn expect_status(&self, allowed: &[BidStatus]) -> Result<(), AppError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(AppError::Conflict(format!(
                "Bid draft is {:?}; expected one of {:?}",
                self.status, allowed
            )))
        }
    }
}

pub fn validate_price(amount: i64) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::Validation(
            "Please enter a valid bid amount".to_string(),
        ));
    }
    Ok(())
}

/// Body posted to the bid-placement proxy.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidSubmission {
    pub token: String,
    pub cipher: String,
    pub csrf: Option<String>,
    pub jobref: String,
    pub charged_amount: i64,
    pub cover: String,
    pub uid: String,
    pub odesk: String,
    pub cookies: Vec<Value>,
}

impl BidSubmission {
    pub fn new(credential: &Credential, cookies: CookieBundle, draft: &BidDraft) -> Self {
        Self {
            token: credential.token.clone(),
            cipher: draft.job.cipher.clone(),
            csrf: cookies.csrf_token(),
            jobref: draft.job.id.clone(),
            charged_amount: draft.amount(),
            cover: draft.generated_message.clone(),
            uid: credential.user_id.clone(),
            odesk: credential.console_user_id.clone(),
            cookies: cookies.cookies,
        }
    }
}

/// Proxy error field: either `{message}` or a bare string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProxyError {
    Detailed { message: String },
    Text(String),
    Other(Value),
}

impl ProxyError {
    pub fn message(&self) -> String {
        match self {
            ProxyError::Detailed { message } | ProxyError::Text(message) => message.clone(),
            ProxyError::Other(value) => value.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidProxyReply {
    #[serde(default)]
    pub error: Option<ProxyError>,
    #[serde(default)]
    pub pending: Option<bool>,
    #[serde(default, rename = "newUID")]
    pub new_uid: Option<Value>,
}

/// Row posted to the bid-save endpoint, in the backend's field names.
#[derive(Debug, Clone, Serialize)]
pub struct BidRecord {
    pub bid: Option<Value>,
    pub jcipher: String,
    pub jtitle: String,
    pub cover_letter: String,
    pub price: i64,
    pub jprice: String,
    pub client: Value,
    #[serde(rename = "jobType")]
    pub job_type: String,
    pub description: String,
    pub skills: Vec<String>,
}

impl BidRecord {
    pub fn new(bid_id: Option<Value>, draft: &BidDraft) -> Self {
        let job = &draft.job;
        Self {
            bid: bid_id,
            jcipher: job.cipher.clone(),
            jtitle: job.title.clone(),
            cover_letter: draft.generated_message.clone(),
            price: draft.amount(),
            jprice: job_price_label(job),
            client: if job.client.raw.is_null() {
                Value::Object(Default::default())
            } else {
                job.client.raw.clone()
            },
            job_type: job.job_type.as_wire().to_string(),
            description: job.description.chars().take(RECORD_DESCRIPTION_CHARS).collect(),
            skills: job.skill_names(),
        }
    }
}

/// Budget summary stored with the record, e.g. `Hourly: $10/hr - $25/hr`.
fn job_price_label(job: &Job) -> String {
    match job.job_type {
        JobType::Fixed => format!("Fixed: ${}", job.fixed_amount.unwrap_or(0.0)),
        JobType::Hourly => format!("Hourly: ${}/hr - ${}/hr", job.hourly_min, job.hourly_max),
        JobType::Other => String::new(),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SaveBidReply {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
