use proptest::prelude::*;
use tariff_catalog::{Dataset, GroupTable, RateCatalog};
use tariff_chart::{compress, sample_chart, sample_demand_lines, ChartViewport, MarginWindow};
use tariff_shared::{
    DeliveryMode, DemandCurve, DemandSpec, GroupName, LastMileFee, LinearPricing, PricingParams,
    RateEntry, SampleChartRequest, SampleDemandRequest, ServiceKey,
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
        max_margin: Some(50.0),
        ..Default::default()
    }
}

fn service() -> ServiceKey {
    ServiceKey::new("ural", "Express", DeliveryMode::Door)
}

fn dataset() -> Dataset {
    let rate = |group| RateEntry {
        carrier: "ural".into(),
        tier: "Express".into(),
        delivery: DeliveryMode::Door,
        group,
        pricing: LinearPricing::new(2.0, 0.05),
        eta_days: None,
        battery_allowed: None,
    };
    Dataset::new(
        GroupTable::standard(),
        RateCatalog::new(vec![
            rate(GroupName::ExtraSmall),
            rate(GroupName::Small),
            rate(GroupName::PremiumSmall),
        ]),
    )
}

#[test]
fn sample_compress_and_overlay() {
    let data = dataset();
    let raw = sample_chart(
        &SampleChartRequest { params: params(), service: service(), feasible_groups: None, samples: Some(50) },
        &data,
    );
    // the 5000% cap is reached inside Small, so Premium Small has no range
    let groups: Vec<_> = raw.iter().map(|s| s.group).collect();
    assert_eq!(groups, vec![GroupName::ExtraSmall, GroupName::Small]);

    let chart = compress(&raw, MarginWindow::from_params(&params()), ChartViewport::default());
    assert_eq!(chart.series.len(), 2);
    assert_eq!(chart.segments[0].x_min, 0.0);
    assert!((chart.segments[1].x_max - 600.0).abs() < 1e-9);
    for series in &chart.series {
        assert!(series.points.windows(2).all(|w| w[0].x <= w[1].x));
        assert!(series.points.iter().all(|p| (20.0..=180.0).contains(&p.y)));
    }

    let lines = sample_demand_lines(
        &SampleDemandRequest {
            params: params(),
            service: service(),
            segments: chart.segments.clone(),
            demand: DemandSpec {
                curve: DemandCurve::ConstantElasticity { epsilon: None, pref_price: None },
                global_min: chart.global_min,
                global_max: chart.global_max,
            },
            height: None,
            samples: None,
        },
        &data,
    );
    assert_eq!(lines.q_pts.len(), 2 * 61);
    assert_eq!(lines.pi_pts.len(), 2 * 61);
    // demand falls with price, so the first sample is the tallest
    assert!((lines.q_pts[0].y - 20.0).abs() < 1e-9);
    assert!(lines.pi_pts.iter().any(|p| (p.y - 20.0).abs() < 1e-9));
    assert!(lines.pi_pts.iter().all(|p| (20.0..=180.0).contains(&p.y)));
}

#[test]
fn overlay_without_rate_has_no_profit_line() {
    let data = Dataset::new(GroupTable::standard(), RateCatalog::default());
    let lines = sample_demand_lines(
        &SampleDemandRequest {
            params: params(),
            service: service(),
            segments: vec![tariff_shared::XSegment {
                price_min: 100.0,
                price_max: 1500.0,
                x_min: 0.0,
                x_max: 600.0,
                group: GroupName::ExtraSmall,
            }],
            demand: DemandSpec {
                curve: DemandCurve::Logistic { p10: None, p90: None },
                global_min: 100.0,
                global_max: 1500.0,
            },
            height: Some(100.0),
            samples: Some(10),
        },
        &data,
    );
    assert_eq!(lines.q_pts.len(), 11);
    assert!(lines.pi_pts.is_empty());
    assert!(lines.q_pts.iter().all(|p| (20.0..=100.0).contains(&p.y)));
}

proptest! {
    #[test]
    fn x_for_price_is_monotone(p1 in 0.0..300_000.0f64, delta in 0.0..50_000.0f64) {
        let data = dataset();
        let raw = sample_chart(
            &SampleChartRequest { params: params(), service: service(), feasible_groups: None, samples: Some(10) },
            &data,
        );
        let chart = compress(&raw, MarginWindow::from_params(&params()), ChartViewport::default());
        let (x1, x2) = (chart.x_for_price(p1), chart.x_for_price(p1 + delta));
        prop_assert!(x1 <= x2 + 1e-9, "x({}) = {} > x({}) = {}", p1, x1, p1 + delta, x2);
        prop_assert!((0.0..=600.0 + 1e-9).contains(&x2));
    }
}
