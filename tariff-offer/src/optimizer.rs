use tariff_catalog::{Dataset, GroupRuleExt};
use tariff_core::{validate_params, FeeModel, InverseSolver};
use tariff_shared::{GroupRule, PricingOutcome, PricingParams, RateEntry, ResultItem, SafeRange};
use tariff_store::app_config::OptimizerConfig;
use tracing::{debug, info, warn};

use crate::bounds::MarginBounds;
use crate::candidates::CandidateGenerator;
use crate::ranker::{closest_to_bounds, rank};

/// Searches the group bands for the sale prices with the best margin inside
/// the configured bounds.
pub struct PricingOptimizer {
    config: OptimizerConfig,
}

impl PricingOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn best_pricing(
        &self,
        params: &PricingParams,
        dataset: &Dataset,
        top_n: usize,
    ) -> PricingOutcome {
        if let Err(e) = validate_params(params) {
            warn!(error = %e, "Rejecting pricing request");
            return PricingOutcome::empty();
        }

        let feasible = self.feasible_groups(params, dataset);
        if feasible.is_empty() {
            debug!(weight_g = params.weight_g, "No feasible group");
            return PricingOutcome::empty();
        }

        let bounds = MarginBounds::from_params(params, self.config.margin_epsilon);
        let generator = CandidateGenerator::new(&self.config, dataset.groups.band_breakpoints());

        let mut candidates = Vec::new();
        for rule in feasible {
            for rate in dataset.rates.matching(rule.group, params) {
                candidates.extend(self.evaluate(params, rule, rate, &generator, &bounds));
            }
        }
        if candidates.is_empty() {
            debug!("No rate matches the request filters");
            return PricingOutcome::empty();
        }

        let mut pool: Vec<ResultItem> = candidates
            .iter()
            .filter(|item| bounds.admits(item.breakdown.margin))
            .cloned()
            .collect();

        if pool.is_empty() {
            let best = closest_to_bounds(&candidates, &bounds).map(|item| ResultItem {
                constraint_ok: false,
                note: Some(bounds.violation_note()),
                ..item.clone()
            });
            warn!(
                candidates = candidates.len(),
                floor = bounds.floor,
                cap = ?bounds.cap,
                "No candidate within margin bounds"
            );
            return PricingOutcome { best, top: Vec::new() };
        }

        rank(&mut pool);
        pool.truncate(top_n.max(1));
        info!(
            candidates = candidates.len(),
            price = pool[0].price,
            margin = pool[0].breakdown.margin,
            carrier = %pool[0].carrier,
            "Best price found"
        );
        PricingOutcome { best: pool.first().cloned(), top: pool }
    }

    fn feasible_groups<'d>(&self, params: &PricingParams, dataset: &'d Dataset) -> Vec<&'d GroupRule> {
        dataset
            .groups
            .feasible_by_weight(params.weight_g)
            .into_iter()
            .filter(|rule| !(self.config.enforce_dims_limit && rule.exceeds_dims(&params.dims_cm)))
            .collect()
    }

    fn evaluate(
        &self,
        params: &PricingParams,
        rule: &GroupRule,
        rate: &RateEntry,
        generator: &CandidateGenerator,
        bounds: &MarginBounds,
    ) -> Vec<ResultItem> {
        let model = FeeModel::new(params, &rate.pricing);
        let solver = InverseSolver::new(params, &rate.pricing).ok();
        let band = rule.price;

        generator
            .prices(&band, solver.as_ref(), bounds)
            .into_iter()
            .map(|price| ResultItem {
                safe_range: Some(SafeRange {
                    from: band.min.max(price - self.config.safe_range_width),
                    to: price,
                }),
                ..ResultItem::for_rate(rate, price, model.breakdown(price))
            })
            .collect()
    }
}

impl Default for PricingOptimizer {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}

/// [`PricingOptimizer::best_pricing`] with the default optimizer settings.
pub fn best_pricing(params: &PricingParams, dataset: &Dataset, top_n: usize) -> PricingOutcome {
    PricingOptimizer::default().best_pricing(params, dataset, top_n)
}
