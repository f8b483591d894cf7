pub mod compress;
pub mod demand;
pub mod sampler;

pub use compress::{compress, ChartViewport, CompressedChart, MarginWindow};
pub use demand::{sample_demand_lines, DemandModel};
pub use sampler::sample_chart;

pub const DEFAULT_CHART_SAMPLES: usize = 100;
pub const DEFAULT_DEMAND_SAMPLES: usize = 60;
pub const MIN_SAMPLES: usize = 10;
pub const MAX_SAMPLES: usize = 400;

/// Requested sample count clamped to `[MIN_SAMPLES, MAX_SAMPLES]`.
pub fn clamp_samples(requested: Option<usize>, default: usize) -> usize {
    requested.unwrap_or(default).clamp(MIN_SAMPLES, MAX_SAMPLES)
}
