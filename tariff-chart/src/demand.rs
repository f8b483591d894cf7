//! Demand and expected-profit overlays for the margin chart.

use tariff_catalog::Dataset;
use tariff_core::FeeModel;
use tariff_shared::money::round2;
use tariff_shared::{DemandCurve, DemandLines, DemandPoint, DemandSpec, SampleDemandRequest};

use crate::compress::TOP_PADDING;
use crate::{clamp_samples, DEFAULT_DEMAND_SAMPLES};

pub const DEFAULT_ELASTICITY: f64 = 1.8;
const DEFAULT_HEIGHT: f64 = 180.0;

/// A [`DemandCurve`] with every default filled in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DemandModel {
    ConstantElasticity { epsilon: f64, reference_price: f64 },
    Logistic { k: f64, midpoint: f64 },
}

impl DemandModel {
    pub fn from_spec(spec: &DemandSpec) -> Self {
        let (gmin, gmax) = (spec.global_min, spec.global_max);
        match spec.curve {
            DemandCurve::ConstantElasticity { epsilon, pref_price } => Self::ConstantElasticity {
                epsilon: epsilon.filter(|e| e.is_finite()).unwrap_or(DEFAULT_ELASTICITY).max(0.0),
                reference_price: pref_price
                    .filter(|p| p.is_finite() && *p > 0.0)
                    .unwrap_or_else(|| ((gmin + gmax) / 2.0).max(1.0)),
            },
            DemandCurve::Logistic { p10, p90 } => {
                let span = (gmax - gmin).max(0.0);
                let p10 = p10.filter(|p| p.is_finite()).unwrap_or(gmin + 0.1 * span);
                let p90 = p90.filter(|p| p.is_finite()).unwrap_or(gmin + 0.9 * span);
                Self::Logistic {
                    k: 2.0 * 9f64.ln() / (p90 - p10).max(1e-6),
                    midpoint: (p10 + p90) / 2.0,
                }
            }
        }
    }

    /// Relative demand at `price`.
    pub fn quantity(&self, price: f64) -> f64 {
        match *self {
            Self::ConstantElasticity { epsilon, reference_price } => {
                (price / reference_price).powf(-epsilon)
            }
            Self::Logistic { k, midpoint } => 1.0 / (1.0 + (k * (price - midpoint)).exp()),
        }
    }
}

struct Sample {
    x: f64,
    price: f64,
    q: f64,
    pi: f64,
}

/// Demand `q(P)` and expected profit `max(0, profit(P) * q(P))` along the
/// compressed segments, each normalized to the viewport height.
pub fn sample_demand_lines(request: &SampleDemandRequest, dataset: &Dataset) -> DemandLines {
    let height = request.height.unwrap_or(DEFAULT_HEIGHT).max(1.0);
    let n = clamp_samples(request.samples, DEFAULT_DEMAND_SAMPLES);
    let model = DemandModel::from_spec(&request.demand);

    let mut samples = Vec::with_capacity(request.segments.len() * (n + 1));
    for seg in &request.segments {
        let rate = dataset.rates.find_service(seg.group, &request.service);
        let fees = rate.map(|r| FeeModel::new(&request.params, &r.pricing));
        let price_span = (seg.price_max - seg.price_min).max(0.0);
        let x_span = (seg.x_max - seg.x_min).max(0.0);

        for i in 0..=n {
            let t = i as f64 / n as f64;
            let price = seg.price_min + t * price_span;
            if !(price.is_finite() && price > 0.0) {
                continue;
            }
            let profit = fees.map_or(0.0, |f| f.breakdown(round2(price)).profit);
            let q = model.quantity(price);
            samples.push(Sample {
                x: seg.x_min + t * x_span,
                price,
                q,
                pi: (profit * q).max(0.0),
            });
        }
    }

    DemandLines {
        q_pts: normalize(&samples, height, |s| s.q),
        pi_pts: normalize(&samples, height, |s| s.pi),
    }
}

fn normalize(samples: &[Sample], height: f64, value: impl Fn(&Sample) -> f64) -> Vec<DemandPoint> {
    let max = samples.iter().map(&value).fold(f64::NEG_INFINITY, f64::max);
    if max.is_nan() || max <= 0.0 {
        return Vec::new();
    }
    samples
        .iter()
        .map(|s| DemandPoint {
            x: s.x,
            y: height - (value(s) / max) * (height - TOP_PADDING),
            price: s.price,
        })
        .collect()
}
