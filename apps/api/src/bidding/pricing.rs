//! Bid price rules. Pure: job snapshot + configured percentage in, quote out.

use crate::models::bid::PriceQuote;
use crate::models::job::{Job, JobType};

const HOURLY_FLOOR: i64 = 10;
const FIXED_FLOOR: i64 = 50;
const DEFAULT_RATE: i64 = 10;
const FIXED_STEP: f64 = 5.0;

pub fn quote(job: &Job, percentage: f64) -> PriceQuote {
    match job.job_type {
        JobType::Hourly => PriceQuote {
            amount: hourly_price(job.hourly_min, job.hourly_max, percentage),
            basis: format!(
                "Hourly rate ({percentage}% of max rate: ${}/hr)",
                job.hourly_max
            ),
        },
        JobType::Fixed => {
            let amount = job.fixed_amount.unwrap_or(0.0);
            PriceQuote {
                amount: fixed_price(amount, percentage),
                basis: format!("Fixed price ({percentage}% of {amount})"),
            }
        }
        JobType::Other => PriceQuote {
            amount: DEFAULT_RATE,
            basis: "Default rate".to_string(),
        },
    }
}

/// Percentage of the max rate, else of the min rate; floor of 10 when the
/// posting has no usable budget or the result rounds to zero.
pub fn hourly_price(min: f64, max: f64, percentage: f64) -> i64 {
    let price = if max > 0.0 {
        round_half_up(max * percentage / 100.0)
    } else if min > 0.0 {
        round_half_up(min * percentage / 100.0)
    } else {
        HOURLY_FLOOR
    };
    if price <= 0 {
        HOURLY_FLOOR
    } else {
        price
    }
}

/// Percentage of the fixed amount rounded to the nearest multiple of 5;
/// floor of 50.
pub fn fixed_price(amount: f64, percentage: f64) -> i64 {
    let price = round_half_up(amount * percentage / 100.0 / FIXED_STEP) * FIXED_STEP as i64;
    if price <= 0 {
        FIXED_FLOOR
    } else {
        price
    }
}

/// Halves round toward positive infinity.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
