use std::fmt::Write as _;

use crate::models::chart::{
    ChartGeometry, ChartModel, ChartPoint, HitRegion, HoverMarker, HoverState, Tooltip, YTick,
};
use crate::models::statistics::DataPoint;
use crate::services::currency_service::CurrencyFormatter;

/// The y-axis ceiling is rounded up to a multiple of this.
pub const MAX_VALUE_STEP: f64 = 10_000.0;

/// Y-axis ceiling used when there is no positive revenue to scale against.
pub const MAX_VALUE_FALLBACK: f64 = 100_000.0;

/// Number of horizontal grid intervals.
const Y_TICK_INTERVALS: usize = 5;

/// Distance in canvas units between the tooltip anchor and its point.
const TOOLTIP_OFFSET: f64 = 12.0;

/// At most this many x-axis labels are drawn; the rest are skipped evenly.
const MAX_X_LABELS: usize = 12;

/// Y-axis ceiling for the active datasets.
///
/// `ceil(max(revenue) / 10_000) * 10_000` over both series, or
/// [`MAX_VALUE_FALLBACK`] when every revenue is zero, absent or non-finite.
pub fn max_value(current: &[DataPoint], previous: &[DataPoint]) -> f64 {
    let max = current
        .iter()
        .chain(previous)
        .map(|p| p.revenue)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);

    if max > 0.0 {
        (max / MAX_VALUE_STEP).ceil() * MAX_VALUE_STEP
    } else {
        MAX_VALUE_FALLBACK
    }
}

/// Linear map `[0, max_value] → [graph_height, 0]` (screen y grows downward).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    max_value: f64,
    graph_height: f64,
}

impl LinearScale {
    /// A non-positive or non-finite `max_value` falls back to
    /// [`MAX_VALUE_FALLBACK`] so the scale never divides by zero.
    pub fn new(max_value: f64, graph_height: f64) -> Self {
        let max_value = if max_value.is_finite() && max_value > 0.0 {
            max_value
        } else {
            MAX_VALUE_FALLBACK
        };
        let graph_height = if graph_height.is_finite() && graph_height > 0.0 {
            graph_height
        } else {
            1.0
        };
        Self {
            max_value,
            graph_height,
        }
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    /// Screen y for `value`. Values outside `[0, max_value]` are clamped and
    /// non-finite values map to the baseline.
    pub fn y(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return self.graph_height;
        }
        let clamped = value.clamp(0.0, self.max_value);
        self.graph_height - (clamped / self.max_value) * self.graph_height
    }
}

/// Screen x of point `index` out of `count`, evenly spaced by index.
///
/// The spacing denominator is guarded to at least 1 so a single point sits
/// at x = 0.
pub fn x_position(index: usize, count: usize, graph_width: f64) -> f64 {
    let denominator = count.saturating_sub(1).max(1) as f64;
    index as f64 * graph_width / denominator
}

/// `"M x,y L x,y ..."` through every point, or `""` when there are none.
pub fn build_line_path(points: &[ChartPoint]) -> String {
    let mut path = String::new();
    for (i, p) in points.iter().enumerate() {
        let command = if i == 0 { "M" } else { " L" };
        let _ = write!(path, "{command} {:.2},{:.2}", p.x, p.y);
    }
    path
}

/// The line path closed down to the bottom edge and back to the origin,
/// for a filled-under-curve effect. `""` when there are no points.
pub fn build_area_path(points: &[ChartPoint], graph_height: f64) -> String {
    let Some(last) = points.last() else {
        return String::new();
    };
    let mut path = build_line_path(points);
    let _ = write!(
        path,
        " L {:.2},{graph_height:.2} L 0.00,{graph_height:.2} Z",
        last.x
    );
    path
}

/// One transparent hit region per point, `graph_width / count` wide,
/// tiling the graph left to right.
pub fn hit_regions(count: usize, graph_width: f64) -> Vec<HitRegion> {
    if count == 0 {
        return Vec::new();
    }
    let width = graph_width / count as f64;
    (0..count)
        .map(|index| HitRegion {
            index,
            x: index as f64 * width,
            width,
        })
        .collect()
}

/// Builds chart models from revenue series and renders them as SVG.
///
/// The service only does math and markup; it never fails. Empty input
/// produces an empty model (no points, fallback axis) that renders the
/// "no statistics" state.
pub struct ChartService {
    geometry: ChartGeometry,
}

impl ChartService {
    pub fn new(geometry: ChartGeometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &ChartGeometry {
        &self.geometry
    }

    /// Compute everything needed to draw the chart.
    ///
    /// `previous` is only plotted (and only counts toward the y-axis
    /// ceiling) when `compare_previous` is set. It is laid out on the
    /// current series' x positions, so point `i` of both series shares one
    /// x; previous points beyond the current series are not drawn.
    pub fn build(
        &self,
        current: &[DataPoint],
        previous: &[DataPoint],
        compare_previous: bool,
        hover: &HoverState,
    ) -> ChartModel {
        let previous: &[DataPoint] = if compare_previous {
            &previous[..previous.len().min(current.len())]
        } else {
            &[]
        };
        let graph_width = self.geometry.graph_width();
        let graph_height = self.geometry.graph_height();

        let scale = LinearScale::new(max_value(current, previous), graph_height);
        let points = self.place(current, current.len(), &scale);
        let previous_points = self.place(previous, current.len(), &scale);

        let y_ticks = (0..=Y_TICK_INTERVALS)
            .map(|i| {
                let value = scale.max_value() * i as f64 / Y_TICK_INTERVALS as f64;
                YTick {
                    value,
                    y: scale.y(value),
                }
            })
            .collect();

        let (hover_marker, tooltip) = match hover.hovered_index().and_then(|i| points.get(i)) {
            Some(hovered) => {
                let previous_revenue = previous_points
                    .get(hovered.point.index)
                    .map(|p| p.point.revenue);
                (
                    Some(HoverMarker {
                        x: hovered.x,
                        y: hovered.y,
                    }),
                    Some(self.tooltip(hovered, previous_revenue)),
                )
            }
            None => (None, None),
        };

        ChartModel {
            geometry: self.geometry,
            max_value: scale.max_value(),
            line_path: build_line_path(&points),
            area_path: build_area_path(&points, graph_height),
            previous_line_path: build_line_path(&previous_points),
            hit_regions: hit_regions(points.len(), graph_width),
            points,
            previous_points,
            y_ticks,
            hover: hover_marker,
            tooltip,
        }
    }

    /// Place `series` on a grid of `slots` evenly spaced x positions.
    fn place(&self, series: &[DataPoint], slots: usize, scale: &LinearScale) -> Vec<ChartPoint> {
        let graph_width = self.geometry.graph_width();
        series
            .iter()
            .enumerate()
            .map(|(i, point)| ChartPoint {
                x: x_position(i, slots, graph_width),
                y: scale.y(point.revenue),
                point: point.clone(),
            })
            .collect()
    }

    fn tooltip(&self, hovered: &ChartPoint, previous_revenue: Option<f64>) -> Tooltip {
        let g = &self.geometry;
        let left = g.padding_left + hovered.x;
        let top = (g.padding_top + hovered.y - TOOLTIP_OFFSET).max(0.0);
        Tooltip {
            label: hovered.point.label.clone(),
            revenue: hovered.point.revenue,
            previous_revenue,
            left_pct: left / g.width.max(1.0) * 100.0,
            top_pct: top / g.height.max(1.0) * 100.0,
        }
    }

    /// Standalone SVG document for `model`.
    ///
    /// Hit regions carry a `data-index` attribute for the host page's
    /// pointer handlers; the tooltip itself is left to the page (see
    /// [`ChartModel::tooltip`]).
    pub fn render_svg(&self, model: &ChartModel, formatter: &CurrencyFormatter) -> String {
        let g = &model.geometry;
        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" class="revenue-chart">"#,
            w = g.width,
            h = g.height
        );

        if model.is_empty() {
            let _ = write!(
                svg,
                r#"<text x="{:.2}" y="{:.2}" text-anchor="middle" class="chart-empty">No statistics for this period</text></svg>"#,
                g.width / 2.0,
                g.height / 2.0
            );
            return svg;
        }

        let graph_width = g.graph_width();
        let graph_height = g.graph_height();
        let _ = write!(
            svg,
            r#"<g transform="translate({},{})">"#,
            g.padding_left, g.padding_top
        );

        // Grid + y labels
        for tick in &model.y_ticks {
            let _ = write!(
                svg,
                r#"<line class="grid" x1="0" y1="{y:.2}" x2="{graph_width:.2}" y2="{y:.2}"/><text class="y-label" x="-8" y="{y:.2}" text-anchor="end">{label}</text>"#,
                y = tick.y,
                label = escape_xml(&formatter.format_compact(tick.value)),
            );
        }

        let _ = write!(svg, r#"<path class="area" d="{}"/>"#, model.area_path);
        if !model.previous_line_path.is_empty() {
            let _ = write!(
                svg,
                r#"<path class="line previous" d="{}" fill="none" stroke-dasharray="4,4"/>"#,
                model.previous_line_path
            );
        }
        let _ = write!(
            svg,
            r#"<path class="line" d="{}" fill="none"/>"#,
            model.line_path
        );

        // X labels, thinned out for long series
        let step = model.points.len().div_ceil(MAX_X_LABELS).max(1);
        for p in model.points.iter().step_by(step) {
            let _ = write!(
                svg,
                r#"<text class="x-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
                p.x,
                graph_height + 20.0,
                escape_xml(&p.point.label)
            );
        }

        for p in &model.points {
            let _ = write!(
                svg,
                r#"<circle class="point" cx="{:.2}" cy="{:.2}" r="3"/>"#,
                p.x, p.y
            );
        }

        if let Some(marker) = &model.hover {
            let _ = write!(
                svg,
                r#"<line class="guide" x1="{x:.2}" y1="0" x2="{x:.2}" y2="{graph_height:.2}"/><circle class="point active" cx="{x:.2}" cy="{y:.2}" r="6"/>"#,
                x = marker.x,
                y = marker.y,
            );
        }

        for region in &model.hit_regions {
            let _ = write!(
                svg,
                r#"<rect class="hit-region" data-index="{}" x="{:.2}" y="0" width="{:.2}" height="{graph_height:.2}" fill="transparent"/>"#,
                region.index, region.x, region.width
            );
        }

        svg.push_str("</g></svg>");
        svg
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new(ChartGeometry::default())
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml("Q1 <2025> & \"x\""), "Q1 &lt;2025&gt; &amp; &quot;x&quot;");
    }
}
