//! Revenue series for the chart: backend mapping and deterministic
//! placeholder data.
//!
//! Placeholder revenue must be stable across re-renders without a backend,
//! so it comes from [`pseudo_random`], a pure function of its seed.

use chrono::{DateTime, NaiveDate};
use tracing::debug;

use crate::models::period::{Bucket, Granularity};
use crate::models::statistics::{ApiDataPoint, DataPoint};

/// Multiplier turning a synthesized series into its "previous period".
///
/// Demo-only: this is not a business rule and is never applied to backend
/// data.
pub const PREVIOUS_PERIOD_DEMO_FACTOR: f64 = 0.9;

/// Seeds of different granularities never collide below this many buckets.
const SEED_STRIDE: u64 = 1_000;

/// Deterministic value in `[0, 1)` derived from `seed`.
///
/// Formula (SplitMix64 finalizer):
///
/// ```text
/// z = seed + 0x9E3779B97F4A7C15
/// z = (z ^ (z >> 30)) * 0xBF58476D1CE4E5B9
/// z = (z ^ (z >> 27)) * 0x94D049BB133111EB
/// z = z ^ (z >> 31)
/// result = (z >> 11) / 2^53
/// ```
///
/// All arithmetic wraps modulo 2^64.
pub fn pseudo_random(seed: u64) -> f64 {
    let mut z = seed.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    (z >> 11) as f64 / (1u64 << 53) as f64
}

/// Typical revenue of one bucket, in whole currency units.
pub fn base_revenue(granularity: Granularity) -> f64 {
    match granularity {
        Granularity::Days => 150_000.0,
        Granularity::Weeks => 1_000_000.0,
        Granularity::Months => 4_500_000.0,
        Granularity::Quarters => 13_500_000.0,
        Granularity::Years => 54_000_000.0,
    }
}

/// Seed for bucket `index` of `granularity`: `(ordinal + 1) * 1000 + index`.
pub fn revenue_seed(granularity: Granularity, index: usize) -> u64 {
    (granularity.ordinal() + 1) * SEED_STRIDE + index as u64
}

/// Placeholder revenue: `round(base * (0.5 + pseudo_random(seed)))`, i.e.
/// between half and one and a half times the granularity's base.
pub fn synthesized_revenue(granularity: Granularity, index: usize) -> f64 {
    let r = pseudo_random(revenue_seed(granularity, index));
    (base_revenue(granularity) * (0.5 + r)).round()
}

/// One synthesized data point per bucket.
pub fn synthesize(granularity: Granularity, buckets: &[Bucket]) -> Vec<DataPoint> {
    buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| DataPoint {
            label: bucket.label.clone(),
            revenue: synthesized_revenue(granularity, index),
            date: bucket.start,
            index,
        })
        .collect()
}

/// Demo comparison series: labels and dates of the previous period's
/// buckets, revenue scaled by [`PREVIOUS_PERIOD_DEMO_FACTOR`].
pub fn synthesize_previous(granularity: Granularity, previous_buckets: &[Bucket]) -> Vec<DataPoint> {
    previous_buckets
        .iter()
        .enumerate()
        .map(|(index, bucket)| DataPoint {
            label: bucket.label.clone(),
            revenue: (synthesized_revenue(granularity, index) * PREVIOUS_PERIOD_DEMO_FACTOR)
                .round(),
            date: bucket.start,
            index,
        })
        .collect()
}

/// Map backend points straight into chart points.
///
/// Labels and order are trusted; indices are reassigned by position,
/// revenue is clamped to a finite non-negative value, and a date that does
/// not parse becomes 1970-01-01 so the point is still plotted.
pub fn map_api_points(points: &[ApiDataPoint]) -> Vec<DataPoint> {
    points
        .iter()
        .enumerate()
        .map(|(index, p)| DataPoint {
            label: p.label.clone(),
            revenue: sanitize_revenue(p.revenue),
            date: parse_api_date(&p.date).unwrap_or_else(|| {
                debug!(date = %p.date, index, "Unparseable backend date");
                NaiveDate::default()
            }),
            index,
        })
        .collect()
}

fn sanitize_revenue(revenue: f64) -> f64 {
    if revenue.is_finite() && revenue > 0.0 {
        revenue
    } else {
        0.0
    }
}

fn parse_api_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_rfc3339_dates() {
        let expected = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        assert_eq!(parse_api_date("2025-11-03"), Some(expected));
        assert_eq!(parse_api_date("2025-11-03T10:15:00Z"), Some(expected));
        assert_eq!(parse_api_date("03/11/2025"), None);
    }

    #[test]
    fn revenue_is_clamped() {
        assert_eq!(sanitize_revenue(-5.0), 0.0);
        assert_eq!(sanitize_revenue(f64::NAN), 0.0);
        assert_eq!(sanitize_revenue(f64::INFINITY), 0.0);
        assert_eq!(sanitize_revenue(1250.0), 1250.0);
    }
}
