use serde::{Deserialize, Serialize};

use crate::models::lenient;

pub const DEFAULT_PRICE_PERCENTAGE: f64 = 90.0;
pub const DEFAULT_HOURLY_RATE_RANGE: &str = "0-100";

/// Saved search filters. Loaded once per session; only `keyword` is
/// overridden per search (page size lives on the search session).
///
/// Field aliases match the snake_case column names the settings backend
/// stores them under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default, alias = "search")]
    pub keyword: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub job_type: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub contractor_tier: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub workload: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub duration: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub location: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub client_hires: Vec<String>,
    #[serde(
        default,
        alias = "proposals",
        deserialize_with = "lenient::string_list"
    )]
    pub proposals_range: Vec<String>,
    #[serde(default, alias = "budget", deserialize_with = "lenient::string_list")]
    pub budget_range: Vec<String>,
    #[serde(
        default,
        alias = "verified_payment",
        deserialize_with = "lenient::flag"
    )]
    pub verified_only: bool,
    #[serde(
        default = "default_hourly_rate_range",
        alias = "hourly_rates",
        deserialize_with = "hourly_rate_range"
    )]
    pub hourly_rate_range: String,
    #[serde(default = "default_price_percentage", deserialize_with = "price_percentage")]
    pub price_percentage: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            job_type: Vec::new(),
            contractor_tier: Vec::new(),
            workload: Vec::new(),
            duration: Vec::new(),
            location: Vec::new(),
            client_hires: Vec::new(),
            proposals_range: Vec::new(),
            budget_range: Vec::new(),
            verified_only: false,
            hourly_rate_range: default_hourly_rate_range(),
            price_percentage: DEFAULT_PRICE_PERCENTAGE,
        }
    }
}

fn default_hourly_rate_range() -> String {
    DEFAULT_HOURLY_RATE_RANGE.to_string()
}

fn default_price_percentage() -> f64 {
    DEFAULT_PRICE_PERCENTAGE
}

fn hourly_rate_range<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|range| !range.trim().is_empty())
        .unwrap_or_else(default_hourly_rate_range))
}

/// Zero, missing or unparseable percentages fall back to the default.
fn price_percentage<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(lenient::opt_number(deserializer)?
        .filter(|pct| *pct > 0.0)
        .unwrap_or(DEFAULT_PRICE_PERCENTAGE))
}
