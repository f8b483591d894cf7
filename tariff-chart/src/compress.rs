//! Coordinate compression of per-group margin samples.
//!
//! Group price bands are far apart (a few hundred up to a quarter million), so
//! the x-axis concatenates each group's sampled range back to back instead of
//! spanning the whole price line. Each range gets width proportional to its
//! own length.

use serde::{Deserialize, Serialize};
use tariff_shared::money::round2;
use tariff_shared::{ChartPoint, ChartSeries, PricingParams, RawSampleSet, XSegment};

const EPS: f64 = 1e-6;
/// Free space kept above the highest point.
pub const TOP_PADDING: f64 = 20.0;

/// Margin interval mapped onto the chart's height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginWindow {
    pub y_min: f64,
    pub y_max: f64,
}

impl MarginWindow {
    /// `[floor, cap]`, or one unit above the floor when no cap is set.
    pub fn from_params(params: &PricingParams) -> Self {
        let y_min = params.margin_floor();
        let y_max = params.margin_cap().unwrap_or(y_min + 1.0);
        Self { y_min, y_max }
    }

    fn clamp(&self, margin: f64) -> f64 {
        margin.max(self.y_min).min(self.y_max)
    }

    fn contains(&self, margin: f64) -> bool {
        margin >= self.y_min - EPS && margin <= self.y_max + EPS
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartViewport {
    pub width: f64,
    pub height: f64,
}

impl Default for ChartViewport {
    fn default() -> Self {
        Self { width: 600.0, height: 180.0 }
    }
}

impl ChartViewport {
    fn y_for(&self, window: &MarginWindow, margin: f64) -> f64 {
        let span = (window.y_max - window.y_min).max(EPS);
        self.height - ((window.clamp(margin) - window.y_min) / span) * (self.height - TOP_PADDING)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedChart {
    pub series: Vec<ChartSeries>,
    pub segments: Vec<XSegment>,
    pub global_min: f64,
    pub global_max: f64,
}

impl CompressedChart {
    fn empty() -> Self {
        Self { series: Vec::new(), segments: Vec::new(), global_min: 0.0, global_max: 1.0 }
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Compressed x of a price, e.g. for a slider marker.
    ///
    /// Linear inside a segment; pinned to the first or last edge outside the
    /// union of segments. A price in a gap between two segments is
    /// interpolated between their facing edges, so the mapping never decreases.
    pub fn x_for_price(&self, price: f64) -> f64 {
        let (Some(first), Some(last)) = (self.segments.first(), self.segments.last()) else {
            return 0.0;
        };
        if price <= first.price_min {
            return first.x_min;
        }
        if price >= last.price_max {
            return last.x_max;
        }
        if let Some(seg) = self
            .segments
            .iter()
            .find(|s| price >= s.price_min && price <= s.price_max)
        {
            return lerp(price, (seg.price_min, seg.price_max), (seg.x_min, seg.x_max));
        }
        match self.segments.windows(2).find(|w| price > w[0].price_max && price < w[1].price_min) {
            Some(w) => lerp(price, (w[0].price_max, w[1].price_min), (w[0].x_max, w[1].x_min)),
            None => last.x_max,
        }
    }
}

fn lerp(price: f64, (p0, p1): (f64, f64), (x0, x1): (f64, f64)) -> f64 {
    x0 + (price - p0) / (p1 - p0).max(EPS) * (x1 - x0)
}

/// Lays the sampled groups out side by side on a shared x-axis.
///
/// Sets are ordered by range start. Interior samples outside `window` are
/// dropped; the first and last sample of a set are always kept, clamped into
/// the window. Sets with fewer than two remaining points produce no series.
pub fn compress(
    raw_sets: &[RawSampleSet],
    window: MarginWindow,
    viewport: ChartViewport,
) -> CompressedChart {
    if raw_sets.is_empty() {
        return CompressedChart::empty();
    }

    let mut sorted: Vec<&RawSampleSet> = raw_sets.iter().collect();
    sorted.sort_by(|a, b| a.range.min.total_cmp(&b.range.min));

    let lengths: Vec<f64> = sorted.iter().map(|s| (s.range.max - s.range.min).max(0.0)).collect();
    let total: f64 = lengths.iter().sum();
    let offsets: Vec<f64> = lengths
        .iter()
        .scan(0.0, |acc, len| {
            let offset = *acc;
            *acc += len;
            Some(offset)
        })
        .collect();
    let scale_x = |idx: usize, seg_min: f64, price: f64| {
        if total <= EPS {
            return 0.0;
        }
        (offsets[idx] + (price - seg_min).max(0.0)) / total * viewport.width
    };

    let mut series = Vec::new();
    let mut segments = Vec::new();
    for (idx, set) in sorted.iter().enumerate() {
        let (a, b) = (set.range.min, set.range.max);
        if b <= a {
            continue;
        }
        segments.push(XSegment {
            price_min: a,
            price_max: b,
            x_min: scale_x(idx, a, a),
            x_max: scale_x(idx, a, b),
            group: set.group,
        });

        let last = set.samples.len().saturating_sub(1);
        let points: Vec<ChartPoint> = set
            .samples
            .iter()
            .enumerate()
            .filter(|(i, s)| *i == 0 || *i == last || window.contains(s.margin))
            .map(|(_, s)| ChartPoint {
                x: scale_x(idx, a, s.price),
                y: viewport.y_for(&window, s.margin),
                price: s.price,
                margin: s.margin,
                group: set.group,
            })
            .collect();
        if points.len() >= 2 {
            series.push(ChartSeries { group: set.group, points });
        }
    }

    let global_min = sorted.iter().map(|s| s.range.min).fold(f64::INFINITY, f64::min);
    let global_max = sorted.iter().map(|s| s.range.max).fold(f64::NEG_INFINITY, f64::max);
    CompressedChart {
        series,
        segments,
        global_min: round2(global_min),
        global_max: round2(global_max),
    }
}
