use tariff_catalog::Dataset;
use tariff_core::{price_range_for_margin, FeeModel};
use tariff_shared::money::round2;
use tariff_shared::{GroupName, PriceRange, RawSample, RawSampleSet, SampleChartRequest};

use crate::{clamp_samples, DEFAULT_CHART_SAMPLES};

/// Uniform margin samples for the chart's service in every feasible group.
///
/// A group is sampled over the part of its price band where the margin is at
/// least the floor (and at most the cap, if set). Groups without a rate for
/// the service or with an empty range are skipped.
pub fn sample_chart(request: &SampleChartRequest, dataset: &Dataset) -> Vec<RawSampleSet> {
    let params = &request.params;
    let groups: Vec<GroupName> = match &request.feasible_groups {
        Some(groups) => groups.clone(),
        None => dataset
            .groups
            .feasible_by_weight(params.weight_g)
            .into_iter()
            .map(|r| r.group)
            .collect(),
    };
    let n = clamp_samples(request.samples, DEFAULT_CHART_SAMPLES);

    let mut sets = Vec::with_capacity(groups.len());
    for group in groups {
        let Some(rate) = dataset.rates.find_service(group, &request.service) else {
            tracing::trace!(%group, service = %request.service, "No rate for chart service");
            continue;
        };
        let rule = dataset.groups.rule_or_fallback(group);
        let raw = price_range_for_margin(params, &rate.pricing, &rule, false);
        let lo = raw.min.max(rule.price.min);
        let hi = raw.max.min(rule.price.max);
        if !(lo.is_finite() && hi.is_finite() && hi > lo) {
            continue;
        }

        let model = FeeModel::new(params, &rate.pricing);
        let samples = (0..=n)
            .map(|i| {
                let price = match i {
                    0 => lo,
                    i if i == n => hi,
                    i => round2(lo + (i as f64 / n as f64) * (hi - lo)),
                };
                RawSample { price, margin: model.breakdown(price).margin }
            })
            .collect();

        sets.push(RawSampleSet {
            group,
            range: PriceRange { min: round2(lo), max: round2(hi) },
            samples,
        });
    }
    tracing::debug!(sets = sets.len(), samples = n + 1, "Sampled chart");
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use tariff_catalog::{GroupTable, RateCatalog};
    use tariff_shared::{
        DeliveryMode, LastMileFee, LinearPricing, PricingParams, RateEntry, ServiceKey,
    };

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

    fn dataset() -> Dataset {
        let rate = |group| RateEntry {
            carrier: "ural".into(),
            tier: "Express".into(),
            delivery: DeliveryMode::Pickup,
            group,
            pricing: LinearPricing::new(2.0, 0.05),
            eta_days: None,
            battery_allowed: None,
        };
        Dataset::new(
            GroupTable::standard(),
            RateCatalog::new(vec![rate(GroupName::ExtraSmall), rate(GroupName::Small)]),
        )
    }

    fn request(samples: Option<usize>) -> SampleChartRequest {
        SampleChartRequest {
            params: params(),
            service: ServiceKey::new("ural", "Express", DeliveryMode::Pickup),
            feasible_groups: None,
            samples,
        }
    }

    #[test]
    fn test_samples_cover_margin_range() {
        let sets = sample_chart(&request(None), &dataset());
        // Premium Small is feasible by weight but has no rate
        assert_eq!(sets.len(), 2);

        let xs = &sets[0];
        assert_eq!(xs.group, GroupName::ExtraSmall);
        assert_eq!(xs.range, PriceRange { min: 190.09, max: 1500.0 });
        assert_eq!(xs.samples.len(), 101);
        assert_eq!(xs.samples[0].price, 190.09);
        assert_eq!(xs.samples[100].price, 1500.0);
        assert!((xs.samples[0].margin - 0.1).abs() < 1e-3);
        assert!(xs.samples.windows(2).all(|w| w[0].price < w[1].price));
        assert!(xs.samples.windows(2).all(|w| w[0].margin <= w[1].margin));

        let small = &sets[1];
        assert_eq!(small.range, PriceRange { min: 1501.0, max: 7000.0 });
    }

    #[test]
    fn test_sample_count_is_clamped() {
        let sets = sample_chart(&request(Some(2)), &dataset());
        assert_eq!(sets[0].samples.len(), 11);
    }

    #[test]
    fn test_empty_range_is_skipped() {
        let mut req = request(None);
        // floor above anything reachable below 1500
        req.params.min_margin = Some(100.0);
        req.feasible_groups = Some(vec![GroupName::ExtraSmall]);
        assert!(sample_chart(&req, &dataset()).is_empty());
    }
}
