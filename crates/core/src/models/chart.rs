use serde::{Deserialize, Serialize};

use super::statistics::DataPoint;

/// Logical canvas of the revenue chart.
///
/// The graph area is the canvas minus padding; all point coordinates are
/// relative to the graph area's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartGeometry {
    pub width: f64,
    pub height: f64,
    pub padding_top: f64,
    pub padding_right: f64,
    pub padding_bottom: f64,
    pub padding_left: f64,
}

impl Default for ChartGeometry {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 300.0,
            padding_top: 20.0,
            padding_right: 20.0,
            padding_bottom: 40.0,
            padding_left: 60.0,
        }
    }
}

impl ChartGeometry {
    /// Width available for plotting, never below 1.
    pub fn graph_width(&self) -> f64 {
        (self.width - self.padding_left - self.padding_right).max(1.0)
    }

    /// Height available for plotting, never below 1.
    pub fn graph_height(&self) -> f64 {
        (self.height - self.padding_top - self.padding_bottom).max(1.0)
    }
}

/// A data point placed in graph coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f64,
    pub y: f64,
    pub point: DataPoint,
}

/// Horizontal grid line / y-axis label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YTick {
    pub value: f64,
    pub y: f64,
}

/// Transparent pointer target associated with one data point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitRegion {
    pub index: usize,
    pub x: f64,
    pub width: f64,
}

/// Floating tooltip for the hovered point.
///
/// `left_pct` / `top_pct` are percentages of the full canvas, positioned so
/// the tooltip sits above the point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub label: String,
    pub revenue: f64,
    pub previous_revenue: Option<f64>,
    pub left_pct: f64,
    pub top_pct: f64,
}

/// Vertical guide line and emphasized marker drawn at the hovered point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoverMarker {
    pub x: f64,
    pub y: f64,
}

/// Which point, if any, the pointer is over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoverState {
    hovered_index: Option<usize>,
}

impl HoverState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered_index(&self) -> Option<usize> {
        self.hovered_index
    }

    /// Pointer entered the hit region of `index`. Indices outside
    /// `0..point_count` are ignored.
    pub fn enter(&mut self, index: usize, point_count: usize) {
        if index < point_count {
            self.hovered_index = Some(index);
        }
    }

    /// Pointer left the chart container.
    pub fn clear(&mut self) {
        self.hovered_index = None;
    }
}

/// Fully computed chart: everything a renderer needs, no further math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartModel {
    pub geometry: ChartGeometry,
    pub max_value: f64,
    pub points: Vec<ChartPoint>,
    pub previous_points: Vec<ChartPoint>,
    pub y_ticks: Vec<YTick>,
    pub line_path: String,
    pub area_path: String,
    pub previous_line_path: String,
    pub hit_regions: Vec<HitRegion>,
    pub hover: Option<HoverMarker>,
    pub tooltip: Option<Tooltip>,
}

impl ChartModel {
    /// `true` when there are no points ("no statistics" state).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
