//! Target margin -> sale price.
//!
//! Margin is piecewise linear in price: the last-mile fee is pinned at its
//! minimum, proportional, or pinned at its maximum. Each piece has a closed-form
//! solution; a piece whose slope vanishes is solved numerically instead.

use serde::{Deserialize, Serialize};
use tariff_shared::{FxBase, LastMileFee, LinearPricing, PricingParams};

use crate::fee::FeeModel;
use crate::{validate_solvable, CoreResult};

/// Tolerance when checking a root against its regime's edges.
pub const REGIME_TOLERANCE: f64 = 1e-9;
/// Denominators smaller than this are treated as a flat margin curve.
pub const DEGENERATE_DENOMINATOR: f64 = 1e-9;
pub const MAX_BRACKET_STEPS: usize = 60;
pub const MAX_BISECTION_STEPS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Last-mile fee at its minimum (or constant when its rate is zero).
    PinnedLow,
    /// Last-mile fee proportional to price.
    Linear,
    /// Last-mile fee at its maximum.
    PinnedHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginRoot {
    pub price: f64,
    pub regime: Regime,
}

#[derive(Debug, Clone, Copy)]
pub struct InverseSolver<'a> {
    model: FeeModel<'a>,
    /// `1 - commission - acquiring`
    s: f64,
    /// `1 - fx`
    t: f64,
    intl: f64,
    last_mile: LastMileFee,
    fx_base: FxBase,
}

impl<'a> InverseSolver<'a> {
    pub fn new(params: &'a PricingParams, pricing: &'a LinearPricing) -> CoreResult<Self> {
        validate_solvable(params)?;
        let model = FeeModel::new(params, pricing);
        Ok(Self {
            model,
            s: 1.0 - params.commission - params.acquiring,
            t: 1.0 - params.fx,
            intl: model.intl_logistics(),
            last_mile: params.last_mile,
            fx_base: params.fx_base,
        })
    }

    pub fn model(&self) -> &FeeModel<'a> {
        &self.model
    }

    /// Prices where the last-mile fee leaves its minimum and reaches its maximum.
    pub fn regime_edges(&self) -> Option<(f64, f64)> {
        let eta = self.last_mile.rate;
        (eta > 0.0).then(|| (self.last_mile.min / eta, self.last_mile.max / eta))
    }

    fn regimes(&self) -> &'static [Regime] {
        if self.regime_edges().is_some() {
            &[Regime::PinnedLow, Regime::Linear, Regime::PinnedHigh]
        } else {
            &[Regime::PinnedLow]
        }
    }

    /// `(numerator, denominator)` of the closed-form price for `regime`, where
    /// `k = (target + 1) * R * cost`.
    fn equation(&self, regime: Regime, k: f64) -> (f64, f64) {
        let (s, t, intl) = (self.s, self.t, self.intl);
        let eta = self.last_mile.rate;
        let pinned_fee = match regime {
            Regime::PinnedLow if eta > 0.0 => Some(self.last_mile.min),
            // zero rate: the clamp never leaves its floor
            Regime::PinnedLow => Some(self.last_mile.fee_at(0.0)),
            Regime::PinnedHigh => Some(self.last_mile.max),
            Regime::Linear => None,
        };
        match (self.fx_base, pinned_fee) {
            (FxBase::IncludeIntl, Some(lm)) => (lm + intl + k / t, s),
            (FxBase::IncludeIntl, None) => (intl + k / t, s - eta),
            (FxBase::ExcludeIntl, Some(lm)) => (t * lm + intl + k, t * s),
            (FxBase::ExcludeIntl, None) => (intl + k, t * (s - eta)),
        }
    }

    fn in_regime(&self, price: f64, regime: Regime) -> bool {
        if !(price.is_finite() && price > 0.0) {
            return false;
        }
        let Some((low_edge, high_edge)) = self.regime_edges() else {
            return true;
        };
        match regime {
            Regime::PinnedLow => price <= low_edge + REGIME_TOLERANCE,
            Regime::Linear => {
                price >= low_edge - REGIME_TOLERANCE && price <= high_edge + REGIME_TOLERANCE
            }
            Regime::PinnedHigh => price >= high_edge - REGIME_TOLERANCE,
        }
    }

    /// Every valid price reaching `target`, ascending, one per regime at most.
    pub fn roots(&self, target: f64) -> Vec<MarginRoot> {
        if !target.is_finite() {
            return Vec::new();
        }
        let params = self.model.params();
        let k = (target + 1.0) * params.exchange_rate * params.cost;

        let mut roots: Vec<MarginRoot> = Vec::with_capacity(3);
        for &regime in self.regimes() {
            let (numerator, denominator) = self.equation(regime, k);
            let price = if denominator.abs() > DEGENERATE_DENOMINATOR {
                numerator / denominator
            } else {
                tracing::debug!(?regime, target, denominator, "Flat margin regime, bisecting");
                match bisect_for_margin(&self.model, target) {
                    Some(price) => price,
                    None => continue,
                }
            };
            if self.in_regime(price, regime) {
                roots.push(MarginRoot { price, regime });
            }
        }

        roots.sort_by(|a, b| a.price.total_cmp(&b.price));
        roots.dedup_by(|a, b| (a.price - b.price).abs() <= REGIME_TOLERANCE * a.price.max(1.0));
        roots
    }

    pub fn prices(&self, target: f64) -> Vec<f64> {
        self.roots(target).into_iter().map(|r| r.price).collect()
    }
}

/// Prices at which `params` with tariff `pricing` yields exactly `target` margin.
/// Empty when the input is infeasible.
pub fn solve_for_target_margin(
    params: &PricingParams,
    pricing: &LinearPricing,
    target: f64,
) -> Vec<f64> {
    match InverseSolver::new(params, pricing) {
        Ok(solver) => solver.prices(target),
        Err(e) => {
            tracing::debug!(error = %e, "No margin solution");
            Vec::new()
        }
    }
}

/// Bisection on `margin(P) - target`, assuming margin is non-decreasing in price.
///
/// The bracket starts at 1, the upper end doubles and the lower end halves up
/// to [`MAX_BRACKET_STEPS`] times. Returns `None` when no sign change is found.
pub fn bisect_for_margin(model: &FeeModel<'_>, target: f64) -> Option<f64> {
    let f = |price: f64| model.margin_at(price) - target;

    let mut hi = 1.0_f64;
    for _ in 0..MAX_BRACKET_STEPS {
        if f(hi) >= 0.0 {
            break;
        }
        hi *= 2.0;
    }
    let mut lo = 1.0_f64;
    for _ in 0..MAX_BRACKET_STEPS {
        if f(lo) <= 0.0 {
            break;
        }
        lo /= 2.0;
    }
    bisect_in_bracket(model, target, lo, hi)
}

/// Bisection restricted to `[lo, hi]`. `None` unless the margin crosses
/// `target` inside the bracket.
pub fn bisect_in_bracket(model: &FeeModel<'_>, target: f64, lo: f64, hi: f64) -> Option<f64> {
    let f = |price: f64| model.margin_at(price) - target;
    let (mut lo, mut hi) = (lo, hi);
    if !(lo <= hi && f(hi) >= 0.0 && f(lo) <= 0.0) {
        return None;
    }

    for _ in 0..MAX_BISECTION_STEPS {
        let mid = lo + (hi - lo) / 2.0;
        if mid <= lo || mid >= hi {
            break;
        }
        let fm = f(mid);
        if fm == 0.0 {
            return Some(mid);
        }
        if fm < 0.0 {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    Some(lo + (hi - lo) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> PricingParams {
        PricingParams {
            weight_g: 100.0,
            cost: 5.0,
            commission: 0.12,
            acquiring: 0.019,
            fx: 0.012,
            last_mile: LastMileFee::new(0.02, 15.0, 200.0),
            exchange_rate: 11.83,
            ..Default::default()
        }
    }

    const RATE: LinearPricing = LinearPricing { base_fee: 2.0, per_gram_fee: 0.05 };

    fn assert_hits(params: &PricingParams, price: f64, target: f64) {
        let margin = FeeModel::new(params, &RATE).margin_at(price);
        assert!((margin - target).abs() < 1e-9, "margin {margin} at {price}, wanted {target}");
    }

    #[test]
    fn test_pinned_low_root() {
        let p = params();
        let roots = InverseSolver::new(&p, &RATE).unwrap().roots(0.1);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].regime, Regime::PinnedLow);
        // (15 + 82.81 + 1.1 * 59.15 / 0.988) / 0.861
        assert!((roots[0].price - 190.0874).abs() < 1e-3);
        assert_hits(&p, roots[0].price, 0.1);
    }

    #[test]
    fn test_linear_and_pinned_high_roots() {
        let p = params();
        let solver = InverseSolver::new(&p, &RATE).unwrap();

        // target reachable between 750 and 10000
        let linear = solver.roots(30.0);
        assert_eq!(linear.len(), 1);
        assert_eq!(linear[0].regime, Regime::Linear);
        assert_hits(&p, linear[0].price, 30.0);

        let high = solver.roots(200.0);
        assert_eq!(high.len(), 1);
        assert_eq!(high[0].regime, Regime::PinnedHigh);
        assert!(high[0].price >= 10_000.0);
        assert_hits(&p, high[0].price, 200.0);
    }

    #[test]
    fn test_exclude_intl_roots() {
        let mut p = params();
        p.fx_base = FxBase::ExcludeIntl;
        for target in [-0.5, 0.1, 0.35, 30.0, 200.0] {
            let prices = solve_for_target_margin(&p, &RATE, target);
            assert!(!prices.is_empty(), "no root for {target}");
            for price in prices {
                assert_hits(&p, price, target);
            }
        }
    }

    #[test]
    fn test_zero_last_mile_rate() {
        let mut p = params();
        p.last_mile = LastMileFee::new(0.0, 15.0, 200.0);
        let solver = InverseSolver::new(&p, &RATE).unwrap();
        assert!(solver.regime_edges().is_none());
        let roots = solver.roots(0.4);
        assert_eq!(roots.len(), 1);
        assert_hits(&p, roots[0].price, 0.4);
    }

    #[test]
    fn test_infeasible_inputs_have_no_roots() {
        let mut p = params();
        p.exchange_rate = -1.0;
        assert!(solve_for_target_margin(&p, &RATE, 0.1).is_empty());

        let mut p = params();
        p.cost = -1.0;
        assert!(solve_for_target_margin(&p, &RATE, 0.1).is_empty());

        let mut p = params();
        p.commission = 0.99;
        p.acquiring = 0.01;
        assert!(solve_for_target_margin(&p, &RATE, 0.1).is_empty());

        let mut p = params();
        p.fx = 1.5;
        assert!(solve_for_target_margin(&p, &RATE, 0.1).is_empty());

        assert!(solve_for_target_margin(&params(), &RATE, f64::NAN).is_empty());
    }

    #[test]
    fn test_bisection_matches_closed_form() {
        let p = params();
        let model = FeeModel::new(&p, &RATE);
        for target in [0.1, 1.0, 30.0] {
            let bisected = bisect_for_margin(&model, target).unwrap();
            let closed = solve_for_target_margin(&p, &RATE, target)[0];
            assert!((bisected - closed).abs() < 1e-6, "{bisected} vs {closed}");
        }
    }

    #[test]
    fn test_bisection_without_sign_change() {
        let mut p = params();
        p.commission = 0.9;
        p.acquiring = 0.1;
        // margin is flat and negative, never reaches the target
        let model = FeeModel::new(&p, &RATE);
        assert!(bisect_for_margin(&model, 0.1).is_none());
    }

    #[test]
    fn test_bracketed_bisection() {
        let p = params();
        let model = FeeModel::new(&p, &RATE);
        // floor root lies in the pinned-low regime below 750
        let root = bisect_in_bracket(&model, 0.1, 1.0, 750.0).unwrap();
        assert!((root - 190.0874).abs() < 1e-3);
        assert!(bisect_in_bracket(&model, 0.1, 750.0, 10_000.0).is_none());
        assert!(bisect_in_bracket(&model, 0.1, 750.0, 1.0).is_none());
    }
}
