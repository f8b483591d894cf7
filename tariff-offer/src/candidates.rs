//! Candidate sale prices probed for one (group, rate) pair.
//!
//! The margin curve is monotone and piecewise linear, so its interesting
//! points are few: the band edges, the prices where the group or the
//! last-mile regime changes, and the prices where the margin meets a bound.
//! Roots are also snapped to whole numbers, with a short run of integers below
//! each, since listings are usually priced in whole units.

use tariff_core::{bisect_in_bracket, InverseSolver};
use tariff_shared::money::round2;
use tariff_shared::Bounds;
use tariff_store::app_config::OptimizerConfig;

use crate::bounds::MarginBounds;

/// Upper limit on the integer neighbourhood probed below each root.
pub const MAX_NEIGHBORHOOD: usize = 30;

pub struct CandidateGenerator {
    /// Group band edges and round prices, shared by every group.
    breakpoints: Vec<f64>,
    radius: usize,
}

impl CandidateGenerator {
    pub fn new(config: &OptimizerConfig, band_breakpoints: Vec<f64>) -> Self {
        let mut breakpoints = band_breakpoints;
        breakpoints.extend(config.round_prices.iter().copied());
        Self {
            breakpoints,
            radius: config.neighborhood_radius.min(MAX_NEIGHBORHOOD),
        }
    }

    /// Sorted, cent-unique prices inside `band`.
    ///
    /// `solver` is `None` when the margin equation has no solution for these
    /// parameters; the structural points are still probed.
    pub fn prices(
        &self,
        band: &Bounds,
        solver: Option<&InverseSolver<'_>>,
        bounds: &MarginBounds,
    ) -> Vec<f64> {
        let mut out = vec![band.min, band.max, band.min + 1.0, band.max - 1.0];
        out.extend(self.breakpoints.iter().copied());

        if let Some(solver) = solver {
            if let Some((low_edge, high_edge)) = solver.regime_edges() {
                out.extend([low_edge, high_edge]);
            }
            let roots: Vec<f64> = bounds
                .targets()
                .flat_map(|target| roots_in_band(solver, band, target))
                .collect();
            for root in roots {
                for snapped in snap(root) {
                    out.push(snapped);
                    for k in 1..=self.radius {
                        let below = snapped - k as f64;
                        out.extend([round2(below), below.floor()]);
                    }
                }
            }
        }

        unique_in_band(out, band)
    }
}

/// Closed-form roots, plus a bracketed bisection in every regime of the band
/// the algebra left without one.
fn roots_in_band(solver: &InverseSolver<'_>, band: &Bounds, target: f64) -> Vec<f64> {
    let mut roots = solver.prices(target);
    for (lo, hi) in regime_brackets(solver, band) {
        let covered = roots.iter().any(|&p| p >= lo && p <= hi);
        if covered {
            continue;
        }
        if let Some(p) = bisect_in_bracket(solver.model(), target, lo, hi) {
            tracing::trace!(target, lo, hi, price = p, "Bracketed root");
            roots.push(p);
        }
    }
    roots
}

fn regime_brackets(solver: &InverseSolver<'_>, band: &Bounds) -> Vec<(f64, f64)> {
    let mut cuts = vec![band.min];
    if let Some((low_edge, high_edge)) = solver.regime_edges() {
        cuts.extend([low_edge, high_edge].into_iter().filter(|&e| e > band.min && e < band.max));
    }
    cuts.push(band.max);
    cuts.windows(2).map(|w| (w[0], w[1])).collect()
}

fn snap(root: f64) -> [f64; 4] {
    [round2(root), root.floor(), root.round(), root.ceil()]
}

fn unique_in_band(prices: Vec<f64>, band: &Bounds) -> Vec<f64> {
    let mut out: Vec<f64> = prices
        .into_iter()
        .filter(|p| p.is_finite())
        .map(round2)
        .filter(|&p| p >= band.min && p <= band.max)
        .collect();
    out.sort_by(f64::total_cmp);
    out.dedup();
    out
}
