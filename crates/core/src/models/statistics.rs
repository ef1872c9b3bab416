use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::period::{Granularity, PeriodSelection};

/// A single revenue data point for chart rendering.
///
/// Sequences are chronological and `index` always equals the point's
/// position in its sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    /// Bucket label shown on the x-axis and in the tooltip
    pub label: String,

    /// Revenue for this bucket in the display currency (never negative)
    pub revenue: f64,

    /// First day of the bucket
    pub date: NaiveDate,

    /// Position in the sequence
    pub index: usize,
}

// ── Backend wire types ──────────────────────────────────────────────

/// Body of a statistics request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsRequest {
    pub period: Granularity,
    pub value: String,
    pub compare_previous: bool,
}

impl StatisticsRequest {
    pub fn from_selection(selection: &PeriodSelection, compare_previous: bool) -> Self {
        Self {
            period: selection.granularity,
            value: selection.anchor.clone(),
            compare_previous,
        }
    }
}

/// Statistics payload returned by the backend.
///
/// Every field is optional on the wire: a missing `dataPoints` is an empty
/// list, missing `totals` are all zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatisticsResponse {
    pub data_points: Vec<ApiDataPoint>,
    pub totals: Totals,
    /// Comparison series. Not supported yet: kept raw and ignored.
    pub previous_period: Option<serde_json::Value>,
}

/// A backend data point, trusted as-is apart from date parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiDataPoint {
    pub label: String,
    pub revenue: f64,
    /// `YYYY-MM-DD` or RFC 3339
    pub date: String,
}

/// Aggregate figures for the selected period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Totals {
    pub revenue: f64,
    pub transactions: u64,
    pub refunds: f64,
    pub chargebacks: f64,
}

// ── Derived view ────────────────────────────────────────────────────

/// Where the points of a [`StatisticsView`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Mapped from a backend response
    Backend,
    /// Deterministic placeholder data (no backend data available)
    Synthesized,
}

/// Everything the statistics page needs for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsView {
    pub selection: PeriodSelection,
    pub data_points: Vec<DataPoint>,
    /// Comparison series; empty when the toggle is off or unsupported
    pub previous_points: Vec<DataPoint>,
    pub totals: Totals,
    pub source: DataSource,
}

impl StatisticsView {
    /// `true` when there is nothing to plot ("no statistics" state).
    pub fn is_empty(&self) -> bool {
        self.data_points.is_empty()
    }
}
