//! View model for the result list. Everything here is derived from the
//! `Job` snapshot and the clock; nothing calls out.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::job::{Job, JobType};
use crate::search::SearchResultPage;

const CARD_DESCRIPTION_CHARS: usize = 600;

/// Elapsed time bucketed to the coarsest unit it has reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recency {
    Seconds(i64),
    Minutes(i64),
    Hours(i64),
    Days(i64),
}

impl Recency {
    pub fn from_elapsed_secs(elapsed: i64) -> Self {
        let elapsed = elapsed.max(0);
        if elapsed < 60 {
            Recency::Seconds(elapsed)
        } else if elapsed < 3_600 {
            Recency::Minutes(elapsed / 60)
        } else if elapsed < 86_400 {
            Recency::Hours(elapsed / 3_600)
        } else {
            Recency::Days(elapsed / 86_400)
        }
    }

    pub fn label(&self) -> String {
        match self {
            Recency::Seconds(n) => format!("Posted {n} seconds ago"),
            Recency::Minutes(n) => format!("Posted {n} minutes ago"),
            Recency::Hours(n) => format!("Posted {n} hours ago"),
            Recency::Days(n) => format!("Posted {n} days ago"),
        }
    }
}

pub fn time_ago(created_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match created_at {
        Some(created) => Recency::from_elapsed_secs((now - created).num_seconds()).label(),
        None => "Time unknown".to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StarCell {
    Full,
    Half,
    Empty,
}

/// Five cells; cell `i` (1-based) is full at `rating >= i`, half at
/// `rating >= i - 0.5`.
pub fn star_cells(rating: f64) -> [StarCell; 5] {
    std::array::from_fn(|index| {
        let position = (index + 1) as f64;
        if rating >= position {
            StarCell::Full
        } else if rating >= position - 0.5 {
            StarCell::Half
        } else {
            StarCell::Empty
        }
    })
}

pub fn rate_label(job: &Job) -> Option<String> {
    match job.job_type {
        JobType::Hourly if job.hourly_max > 0.0 => Some(format!(
            "Hourly: ${}/hr - ${}/hr",
            job.hourly_min, job.hourly_max
        )),
        JobType::Fixed => Some(match job.fixed_amount {
            Some(amount) if amount > 0.0 => format!("Fixed: ${amount}"),
            _ => "Fixed: $Not specified".to_string(),
        }),
        _ => None,
    }
}

pub fn short_description(description: &str) -> String {
    if description.chars().count() > CARD_DESCRIPTION_CHARS {
        let head: String = description.chars().take(CARD_DESCRIPTION_CHARS).collect();
        format!("{head}...")
    } else {
        description.to_string()
    }
}

pub fn spent_label(total_spent: f64, currency: &str) -> String {
    if total_spent > 0.0 {
        format!("{} {currency} spent", group_thousands(total_spent))
    } else {
        "Nothing spent".to_string()
    }
}

/// `12500.5` → `12,500.5`
fn group_thousands(amount: f64) -> String {
    let rendered = format!("{amount}");
    let (whole, fraction) = match rendered.split_once('.') {
        Some((whole, fraction)) => (whole.to_string(), Some(fraction.to_string())),
        None => (rendered, None),
    };
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match fraction {
        Some(fraction) => format!("{grouped}.{fraction}"),
        None => grouped,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillTag {
    pub name: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JobCard {
    pub id: String,
    pub title: String,
    pub url: String,
    pub posted: String,
    pub payment_verified: bool,
    pub stars: [StarCell; 5],
    pub reviews: u32,
    pub country: String,
    pub spent: String,
    pub rate: Option<String>,
    pub contractor_tier: Option<String>,
    pub proposals: Option<u32>,
    pub description: String,
    pub skills: Vec<SkillTag>,
    pub applied: bool,
    /// Applied jobs expose no bid action.
    pub can_bid: bool,
}

impl JobCard {
    pub fn new(job: &Job, now: DateTime<Utc>) -> Self {
        Self {
            id: job.id.clone(),
            title: job.title.clone(),
            url: job.job_url(),
            posted: time_ago(job.created_at, now),
            payment_verified: job.client.payment_verified,
            stars: star_cells(job.client.rating),
            reviews: job.client.total_reviews,
            country: job.client.country.clone(),
            spent: spent_label(job.client.total_spent, &job.client.currency),
            rate: rate_label(job),
            contractor_tier: job.contractor_tier.clone(),
            proposals: (job.total_applicants > 0).then_some(job.total_applicants),
            description: short_description(&job.description),
            skills: job
                .skills
                .iter()
                .map(|s| SkillTag {
                    name: s.name.clone(),
                    highlighted: s.highlighted,
                })
                .collect(),
            applied: job.applied,
            can_bid: !job.applied,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PaginationView {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_previous: bool,
    pub has_next: bool,
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchView {
    pub total: u32,
    pub summary: String,
    pub empty_message: Option<String>,
    pub pagination: PaginationView,
    pub jobs: Vec<JobCard>,
}

impl SearchView {
    pub fn new(page: &SearchResultPage, now: DateTime<Utc>) -> Self {
        let pagination = page.pagination();
        let (first, last) = pagination.showing_range();

        Self {
            total: page.total_count,
            summary: format!(
                "Showing {first} to {last} of {} jobs",
                page.total_count
            ),
            empty_message: page.jobs.is_empty().then(|| {
                "No jobs found. Try adjusting your search criteria.".to_string()
            }),
            pagination: PaginationView {
                page: pagination.page,
                page_size: pagination.page_size,
                total_pages: pagination.total_pages(),
                has_previous: pagination.previous().is_some(),
                has_next: pagination.next().is_some(),
                visible: pagination.controls_visible(),
            },
            jobs: page.jobs.iter().map(|job| JobCard::new(job, now)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::fixtures;
    use chrono::Duration;

    #[test]
    fn test_recency_buckets() {
        assert_eq!(Recency::from_elapsed_secs(45), Recency::Seconds(45));
        assert_eq!(Recency::from_elapsed_secs(60), Recency::Minutes(1));
        assert_eq!(Recency::from_elapsed_secs(3_599), Recency::Minutes(59));
        assert_eq!(Recency::from_elapsed_secs(3_600), Recency::Hours(1));
        assert_eq!(Recency::from_elapsed_secs(86_399), Recency::Hours(23));
        assert_eq!(Recency::from_elapsed_secs(200_000), Recency::Days(2));
    }

    #[test]
    fn test_time_ago_labels() {
        let now = Utc::now();
        assert_eq!(
            time_ago(Some(now - Duration::seconds(45)), now),
            "Posted 45 seconds ago"
        );
        assert_eq!(
            time_ago(Some(now - Duration::seconds(200_000)), now),
            "Posted 2 days ago"
        );
        assert_eq!(time_ago(None, now), "Time unknown");
    }

    #[test]
    fn test_star_cells() {
        use StarCell::*;
        assert_eq!(star_cells(4.6), [Full, Full, Full, Full, Half]);
        assert_eq!(star_cells(3.0), [Full, Full, Full, Empty, Empty]);
        assert_eq!(star_cells(0.5), [Half, Empty, Empty, Empty, Empty]);
        assert_eq!(star_cells(0.0), [Empty; 5]);
        assert_eq!(star_cells(5.0), [Full; 5]);
    }

    #[test]
    fn test_rate_labels() {
        let hourly = fixtures::hourly_job("1", 30.0, 50.0);
        assert_eq!(rate_label(&hourly).as_deref(), Some("Hourly: $30/hr - $50/hr"));

        let no_max = fixtures::hourly_job("2", 30.0, 0.0);
        assert_eq!(rate_label(&no_max), None);

        let fixed = fixtures::fixed_job("3", Some(437.0));
        assert_eq!(rate_label(&fixed).as_deref(), Some("Fixed: $437"));

        let unpriced = fixtures::fixed_job("4", None);
        assert_eq!(rate_label(&unpriced).as_deref(), Some("Fixed: $Not specified"));
    }

    #[test]
    fn test_short_description_truncates() {
        let long = "a".repeat(700);
        let short = short_description(&long);
        assert_eq!(short.len(), 603);
        assert!(short.ends_with("..."));
        assert_eq!(short_description("brief"), "brief");
    }

    #[test]
    fn test_spent_label() {
        assert_eq!(spent_label(12_500.0, "USD"), "12,500 USD spent");
        assert_eq!(spent_label(999.5, "EUR"), "999.5 EUR spent");
        assert_eq!(spent_label(1_234_567.0, "USD"), "1,234,567 USD spent");
        assert_eq!(spent_label(0.0, "USD"), "Nothing spent");
    }

    #[test]
    fn test_search_view_summary_and_pagination() {
        let mut applied = fixtures::hourly_job("b", 10.0, 20.0);
        applied.applied = true;
        let page = SearchResultPage {
            jobs: vec![fixtures::hourly_job("a", 10.0, 20.0), applied],
            total_count: 23,
            offset: 20,
            page_size: 10,
            page: 3,
        };

        let view = SearchView::new(&page, Utc::now());

        assert_eq!(view.summary, "Showing 21 to 23 of 23 jobs");
        assert_eq!(view.pagination.total_pages, 3);
        assert!(view.pagination.has_previous);
        assert!(!view.pagination.has_next);
        assert!(view.pagination.visible);
        assert!(view.empty_message.is_none());
        assert!(view.jobs[0].can_bid);
        assert!(!view.jobs[1].can_bid);
    }

    #[test]
    fn test_empty_view() {
        let view = SearchView::new(&SearchResultPage::empty(10), Utc::now());
        assert!(view.empty_message.is_some());
        assert!(!view.pagination.visible);
        assert_eq!(view.summary, "Showing 0 to 0 of 0 jobs");
    }
}
