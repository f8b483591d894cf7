use tariff_shared::money::round2;
use tariff_shared::{GroupRule, LinearPricing, PriceRange, PricingParams};

use crate::fee::FeeModel;
use crate::solver::{bisect_for_margin, InverseSolver};
use crate::validate_params;

/// Price interval over which the margin stays within the configured bounds.
///
/// The lower end is the smallest price reaching the margin floor, the upper end
/// the largest price still under the cap. Without a cap the upper end stays at
/// the group's band maximum. With `respect_group_bound` the result is also
/// intersected with the group's price band.
pub fn price_range_for_margin(
    params: &PricingParams,
    pricing: &LinearPricing,
    rule: &GroupRule,
    respect_group_bound: bool,
) -> PriceRange {
    let band = PriceRange { min: rule.price.min, max: rule.price.max };
    if let Err(e) = validate_params(params) {
        tracing::debug!(group = %rule.group, error = %e, "Falling back to group band");
        return band;
    }

    let model = FeeModel::new(params, pricing);
    let solver = InverseSolver::new(params, pricing).ok();
    let roots = |target: f64| solver.map(|s| s.prices(target)).unwrap_or_default();

    let mut lo = band.min;
    let mut hi = band.max;

    let floor = params.margin_floor();
    match roots(floor).into_iter().reduce(f64::min) {
        Some(p) => lo = p,
        None => {
            if let Some(p) = bisect_for_margin(&model, floor) {
                lo = p;
            }
        }
    }

    if let Some(cap) = params.margin_cap() {
        match roots(cap).into_iter().reduce(f64::max) {
            Some(p) => hi = p,
            None => {
                if let Some(p) = bisect_for_margin(&model, cap) {
                    hi = p;
                }
            }
        }
    }

    if respect_group_bound {
        lo = lo.max(band.min);
        hi = hi.min(band.max);
    }

    if !(lo.is_finite() && hi.is_finite()) {
        return band;
    }
    if lo > hi {
        std::mem::swap(&mut lo, &mut hi);
    }
    if respect_group_bound {
        // an empty intersection collapses onto the nearest band edge
        lo = lo.max(band.min).min(band.max);
        hi = hi.max(band.min).min(band.max);
    }
    PriceRange { min: round2(lo), max: round2(hi) }
}
