use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobType {
    Hourly,
    Fixed,
    #[serde(other)]
    Other,
}

impl JobType {
    pub fn from_wire(raw: Option<&str>) -> Self {
        match raw {
            Some("HOURLY") => JobType::Hourly,
            Some("FIXED") => JobType::Fixed,
            _ => JobType::Other,
        }
    }

    pub fn as_wire(&self) -> &'static str {
        match self {
            JobType::Hourly => "HOURLY",
            JobType::Fixed => "FIXED",
            JobType::Other => "",
        }
    }
}

/// Client reputation as reported on the job tile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientStats {
    pub payment_verified: bool,
    pub country: String,
    pub total_reviews: u32,
    /// Average feedback score, 0.0 – 5.0.
    pub rating: f64,
    pub total_spent: f64,
    pub currency: String,
    /// The client block exactly as received; stored with bid records.
    pub raw: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub name: String,
    pub highlighted: bool,
}

/// Normalized, immutable snapshot of a marketplace job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub title: String,
    pub description: String,
    pub cipher: String,
    pub job_type: JobType,
    pub hourly_min: f64,
    pub hourly_max: f64,
    pub fixed_amount: Option<f64>,
    pub contractor_tier: Option<String>,
    pub total_applicants: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub client: ClientStats,
    pub skills: Vec<Skill>,
    pub applied: bool,
}

impl Job {
    pub fn job_url(&self) -> String {
        format!(
            "https://www.upwork.com/jobs/{}/?referrer_url_path=%2Fnx%2Fsearch%2Fjobs%2F",
            self.cipher
        )
    }

    pub fn skill_names(&self) -> Vec<String> {
        self.skills.iter().map(|s| s.name.clone()).collect()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn hourly_job(id: &str, min: f64, max: f64) -> Job {
        Job {
            id: id.to_string(),
            title: format!("Hourly job {id}"),
            description: "Build a Rust service that talks to a GraphQL API.".to_string(),
            cipher: format!("~cipher{id}"),
            job_type: JobType::Hourly,
            hourly_min: min,
            hourly_max: max,
            fixed_amount: None,
            contractor_tier: Some("EXPERT".to_string()),
            total_applicants: 5,
            created_at: None,
            client: ClientStats {
                payment_verified: true,
                country: "Germany".to_string(),
                total_reviews: 12,
                rating: 4.6,
                total_spent: 12000.0,
                currency: "USD".to_string(),
                raw: serde_json::json!({ "country": "Germany" }),
            },
            skills: vec![
                Skill {
                    name: "Rust".to_string(),
                    highlighted: true,
                },
                Skill {
                    name: "GraphQL".to_string(),
                    highlighted: false,
                },
            ],
            applied: false,
        }
    }

    pub fn fixed_job(id: &str, amount: Option<f64>) -> Job {
        Job {
            job_type: JobType::Fixed,
            hourly_min: 0.0,
            hourly_max: 0.0,
            fixed_amount: amount,
            title: format!("Fixed job {id}"),
            ..hourly_job(id, 0.0, 0.0)
        }
    }
}
