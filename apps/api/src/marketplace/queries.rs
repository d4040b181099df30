//! Typed GraphQL operations against the marketplace endpoint.
//!
//! Each operation is a query document, an alias (sent as `?alias=`) and a
//! response struct. Every response field is optional: the endpoint omits
//! whole subtrees for private or partially filled postings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::credential::Profile;
use crate::models::job::{ClientStats, Job, JobType, Skill};
use crate::models::lenient;
use crate::models::settings::SearchSettings;

pub const PROFILE_ALIAS: &str = "purchased-invitation-badge-freelancer-profile-url";
pub const BALANCE_ALIAS: &str = "connectsBalance.retrieve";
pub const JOB_SEARCH_ALIAS: &str = "userJobSearch";

pub const PROFILE_QUERY: &str = r#"query getFreelancerProfile {
  getFreelancerProfile: user {
    freelancerProfile {
      personalData {
        profileUrl
        portrait { portrait100 }
        firstName
        lastName
        title
      }
    }
  }
}"#;

pub const BALANCE_QUERY: &str = r#"query {
  organization {
    subscriptionPlan(filter: {
      includeNextPayment: false
      checkVat: false
      includePromo: false
    }) {
      connectsBalance
    }
  }
}"#;

pub const JOB_SEARCH_QUERY: &str = r#"query UserJobSearch($requestVariables: UserJobSearchV1Request!) {
  search {
    universalSearchNuxt {
      userJobSearchV1(request: $requestVariables) {
        paging { total offset count }
        results {
          id
          title
          description
          ontologySkills { uid prefLabel prettyName: prefLabel highlighted }
          applied
          upworkHistoryData {
            client {
              paymentVerificationStatus
              country
              totalReviews
              totalFeedback
              hasFinancialPrivacy
              totalSpent { isoCurrencyCode amount }
            }
          }
          jobTile {
            job {
              id
              ciphertext: cipherText
              jobType
              hourlyBudgetMax
              hourlyBudgetMin
              contractorTier
              createTime
              publishTime
              totalApplicants
              fixedPriceAmount { isoCurrencyCode amount }
            }
          }
        }
      }
    }
  }
}"#;

// ────────────────────────────────────────────────────────────────────────────
// Profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileData {
    #[serde(rename = "getFreelancerProfile")]
    pub get_freelancer_profile: Option<ProfileUser>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUser {
    pub freelancer_profile: Option<FreelancerProfile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreelancerProfile {
    pub personal_data: Option<PersonalData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalData {
    pub profile_url: Option<String>,
    pub portrait: Option<Portrait>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Portrait {
    #[serde(rename = "portrait100")]
    pub portrait_100: Option<String>,
}

impl ProfileData {
    /// `getFreelancerProfile.freelancerProfile.personalData`, if the whole
    /// path is present.
    pub fn personal_data(&self) -> Option<&PersonalData> {
        self.get_freelancer_profile
            .as_ref()?
            .freelancer_profile
            .as_ref()?
            .personal_data
            .as_ref()
    }
}

impl PersonalData {
    pub fn to_profile(&self, connects_balance: Option<i64>) -> Profile {
        Profile {
            profile_url: self.profile_url.clone(),
            portrait_url: self.portrait.as_ref().and_then(|p| p.portrait_100.clone()),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            title: self.title.clone(),
            connects_balance,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Connects balance
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BalanceData {
    pub organization: Option<Organization>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub subscription_plan: Option<SubscriptionPlan>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPlan {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub connects_balance: Option<f64>,
}

impl BalanceData {
    pub fn connects_balance(&self) -> Option<i64> {
        self.organization
            .as_ref()?
            .subscription_plan
            .as_ref()?
            .connects_balance
            .map(|b| b as i64)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job search
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchVariables {
    pub request_variables: JobSearchRequest,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobSearchRequest {
    pub job_type: Vec<String>,
    pub contractor_tier: Vec<String>,
    pub workload: Vec<String>,
    #[serde(rename = "durationV3")]
    pub duration_v3: Vec<String>,
    pub location: Vec<String>,
    pub client_hires: Vec<String>,
    pub proposals: Vec<String>,
    pub budget: Vec<String>,
    pub verified_payment_only: bool,
    pub hourly_rate: String,
    pub sort: &'static str,
    pub highlight: bool,
    pub user_query: String,
    pub paging: Paging,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paging {
    pub offset: u32,
    pub count: u32,
}

impl JobSearchRequest {
    pub fn new(settings: &SearchSettings, keyword: &str, offset: u32, count: u32) -> Self {
        Self {
            job_type: settings.job_type.clone(),
            contractor_tier: settings.contractor_tier.clone(),
            workload: settings.workload.clone(),
            duration_v3: settings.duration.clone(),
            location: settings.location.clone(),
            client_hires: settings.client_hires.clone(),
            proposals: settings.proposals_range.clone(),
            budget: settings.budget_range.clone(),
            verified_payment_only: settings.verified_only,
            hourly_rate: settings.hourly_rate_range.clone(),
            sort: "recency",
            highlight: true,
            user_query: keyword.to_string(),
            paging: Paging { offset, count },
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSearchData {
    pub search: Option<SearchRoot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRoot {
    pub universal_search_nuxt: Option<UniversalSearch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UniversalSearch {
    #[serde(rename = "userJobSearchV1")]
    pub user_job_search_v1: Option<JobSearchResults>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobSearchResults {
    pub paging: Option<ResultPaging>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub results: Vec<RawJob>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResultPaging {
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub total: Option<f64>,
}

impl JobSearchData {
    pub fn into_results(self) -> Option<JobSearchResults> {
        self.search?.universal_search_nuxt?.user_job_search_v1
    }
}

impl JobSearchResults {
    pub fn total(&self) -> u32 {
        self.paging
            .as_ref()
            .and_then(|p| p.total)
            .map(|t| t.max(0.0) as u32)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawJob {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::null_as_default")]
    pub ontology_skills: Vec<RawSkill>,
    #[serde(default)]
    pub applied: Option<bool>,
    pub upwork_history_data: Option<RawHistory>,
    pub job_tile: Option<RawJobTile>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSkill {
    pub pretty_name: Option<String>,
    pub pref_label: Option<String>,
    #[serde(default)]
    pub highlighted: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHistory {
    pub client: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawJobTile {
    pub job: Option<RawTileJob>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTileJob {
    pub ciphertext: Option<String>,
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub hourly_budget_max: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub hourly_budget_min: Option<f64>,
    pub contractor_tier: Option<String>,
    pub create_time: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub total_applicants: Option<f64>,
    pub fixed_price_amount: Option<RawMoney>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMoney {
    pub iso_currency_code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
}

impl From<RawJob> for Job {
    fn from(raw: RawJob) -> Self {
        let tile = raw.job_tile.and_then(|t| t.job).unwrap_or_default();
        let client_raw = raw
            .upwork_history_data
            .and_then(|h| h.client)
            .unwrap_or(Value::Null);

        Job {
            id: raw.id.unwrap_or_default(),
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            cipher: tile.ciphertext.unwrap_or_default(),
            job_type: JobType::from_wire(tile.job_type.as_deref()),
            hourly_min: tile.hourly_budget_min.unwrap_or(0.0),
            hourly_max: tile.hourly_budget_max.unwrap_or(0.0),
            fixed_amount: tile.fixed_price_amount.and_then(|m| m.amount),
            contractor_tier: tile.contractor_tier.filter(|t| !t.is_empty()),
            total_applicants: tile.total_applicants.map(|n| n.max(0.0) as u32).unwrap_or(0),
            created_at: tile.create_time.as_deref().and_then(parse_timestamp),
            client: client_stats(client_raw),
            skills: raw
                .ontology_skills
                .into_iter()
                .filter_map(|s| {
                    let name = s.pretty_name.or(s.pref_label)?;
                    Some(Skill {
                        name,
                        highlighted: s.highlighted.unwrap_or(false),
                    })
                })
                .collect(),
            applied: raw.applied.unwrap_or(false),
        }
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
}

fn client_stats(raw: Value) -> ClientStats {
    let number = |key: &str| raw.get(key).and_then(lenient::value_to_f64);
    let spent = raw.get("totalSpent");

    ClientStats {
        payment_verified: raw.get("paymentVerificationStatus").and_then(Value::as_str)
            == Some("VERIFIED"),
        country: raw
            .get("country")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        total_reviews: number("totalReviews").map(|n| n.max(0.0) as u32).unwrap_or(0),
        rating: number("totalFeedback").unwrap_or(0.0),
        total_spent: spent
            .and_then(|s| s.get("amount"))
            .and_then(lenient::value_to_f64)
            .unwrap_or(0.0),
        currency: spent
            .and_then(|s| s.get("isoCurrencyCode"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        raw,
    }
}
