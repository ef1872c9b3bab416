use chrono::{Datelike, Duration, NaiveDate};
use tracing::debug;

use crate::models::period::{Anchor, Bucket, Granularity};

/// Number of days in one week bucket.
const WEEK_LENGTH_DAYS: i64 = 7;

/// Turns a (granularity, anchor) selection into chart buckets.
///
/// Everything here is a pure function of its inputs: the same selection
/// always yields the same buckets, and an anchor that does not parse yields
/// an empty sequence instead of an error.
pub struct PeriodService;

impl PeriodService {
    pub fn new() -> Self {
        Self
    }

    /// Ordered buckets covering exactly one instance of the anchored period.
    ///
    /// - `days`: one bucket per calendar day of the anchor month
    /// - `weeks`: 7-day windows from the 1st, the last one clipped to month end
    /// - `months`, `quarters`, `years`: a single bucket for the anchor itself
    pub fn buckets(&self, granularity: Granularity, anchor: &str) -> Vec<Bucket> {
        let Some(parsed) = Anchor::parse(granularity, anchor) else {
            debug!(%granularity, anchor, "Unparseable anchor, no buckets");
            return Vec::new();
        };
        let (Some(start), Some(end)) = (parsed.start_date(), parsed.end_date()) else {
            return Vec::new();
        };

        match granularity {
            Granularity::Days => day_buckets(start, end),
            Granularity::Weeks => week_buckets(start, end),
            Granularity::Months | Granularity::Quarters | Granularity::Years => vec![Bucket {
                label: parsed.to_string(),
                start,
                end,
            }],
        }
    }

    /// The anchor to show right after switching to `granularity`: the
    /// period containing `today` (the latest bucket).
    pub fn default_anchor(&self, granularity: Granularity, today: NaiveDate) -> String {
        Anchor::containing(granularity, today).to_string()
    }

    /// The `count` most recent anchors for `granularity`, latest first.
    /// Stops early at the earliest representable period.
    pub fn anchor_options(
        &self,
        granularity: Granularity,
        today: NaiveDate,
        count: usize,
    ) -> Vec<String> {
        std::iter::successors(Some(Anchor::containing(granularity, today)), Anchor::previous)
            .take(count)
            .map(|anchor| anchor.to_string())
            .collect()
    }

    /// The period immediately preceding `anchor`, in the same label scheme.
    ///
    /// `"Q1 2025"` → `"Q4 2024"`, `"January 2025"` → `"December 2024"`.
    /// Returns `None` when `anchor` does not parse or is the first year.
    pub fn previous_period_value(&self, granularity: Granularity, anchor: &str) -> Option<String> {
        Anchor::parse(granularity, anchor)
            .and_then(|a| a.previous())
            .map(|a| a.to_string())
    }

    /// Canonical spelling of `anchor` (`"nov 2025"` → `"November 2025"`).
    pub fn normalize_anchor(&self, granularity: Granularity, anchor: &str) -> Option<String> {
        Anchor::parse(granularity, anchor).map(|a| a.to_string())
    }

    /// `true` when `anchor` matches the label scheme of `granularity`.
    pub fn is_valid_anchor(&self, granularity: Granularity, anchor: &str) -> bool {
        Anchor::parse(granularity, anchor).is_some()
    }
}

impl Default for PeriodService {
    fn default() -> Self {
        Self::new()
    }
}

fn day_buckets(start: NaiveDate, end: NaiveDate) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut current = start;
    while current <= end {
        buckets.push(Bucket {
            label: current.day().to_string(),
            start: current,
            end: current,
        });
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    buckets
}

fn week_buckets(start: NaiveDate, end: NaiveDate) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut week_start = start;
    let mut week_number = 1;
    while week_start <= end {
        let week_end = (week_start + Duration::days(WEEK_LENGTH_DAYS - 1)).min(end);
        buckets.push(Bucket {
            label: format!("Week {week_number}"),
            start: week_start,
            end: week_end,
        });
        week_number += 1;
        week_start = week_start + Duration::days(WEEK_LENGTH_DAYS);
    }
    buckets
}
