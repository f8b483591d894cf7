use proptest::prelude::*;
use tariff_core::{
    bisect_for_margin, compute_profit_for_price, solve_for_target_margin, FeeModel, InverseSolver,
};
use tariff_shared::{FxBase, GroupName, LastMileFee, LinearPricing, PricingParams};

fn arb_params() -> impl Strategy<Value = (PricingParams, LinearPricing)> {
    (
        (1.0..30_000.0f64, 0.5..500.0f64, 11.0..13.0f64),
        (0.0..0.3f64, 0.0..0.05f64, 0.0..0.05f64),
        (0.0..0.05f64, 0.0..50.0f64, 50.0..500.0f64),
        (0.0..20.0f64, 0.0..0.1f64, any::<bool>()),
    )
        .prop_map(|((weight_g, cost, rate), (alpha, beta, gamma), (eta, lm_min, lm_max), (base, per_gram, include))| {
            let params = PricingParams {
                weight_g,
                cost,
                commission: alpha,
                acquiring: beta,
                fx: gamma,
                last_mile: LastMileFee::new(eta, lm_min, lm_max),
                exchange_rate: rate,
                fx_base: if include { FxBase::IncludeIntl } else { FxBase::ExcludeIntl },
                ..Default::default()
            };
            (params, LinearPricing::new(base, per_gram))
        })
}

proptest! {
    #[test]
    fn margin_is_non_decreasing_in_price(
        (params, pricing) in arb_params(),
        p1 in 1.0..250_000.0f64,
        delta in 0.0..50_000.0f64,
    ) {
        let model = FeeModel::new(&params, &pricing);
        let p2 = p1 + delta;
        let (m1, m2) = (model.margin_at(p1), model.margin_at(p2));
        prop_assert!(m1 <= m2 + 1e-9 * m1.abs().max(1.0), "{} at {} > {} at {}", m1, p1, m2, p2);
    }

    #[test]
    fn solved_price_reproduces_target_margin(
        (params, pricing) in arb_params(),
        target in -0.5..3.0f64,
    ) {
        for price in solve_for_target_margin(&params, &pricing, target) {
            let b = compute_profit_for_price(price, GroupName::Small, &pricing, &params);
            prop_assert!(
                (b.margin - target).abs() <= 1e-3,
                "price {} gives margin {}, wanted {}", price, b.margin, target
            );
        }
    }
}

/// Smallest price on a 0.001 grid whose margin reaches `target`.
fn brute_force_price(model: &FeeModel<'_>, target: f64, upper: f64) -> Option<f64> {
    let mut coarse = 1.0;
    while coarse <= upper && model.margin_at(coarse) < target {
        coarse += 1.0;
    }
    if coarse > upper {
        return None;
    }
    let mut fine = (coarse - 1.0).max(0.0);
    while model.margin_at(fine) < target {
        fine += 0.001;
    }
    Some(fine)
}

#[test]
fn degenerate_slope_falls_back_to_bisection() {
    // commission + acquiring + last-mile rate add up to 100%: the proportional
    // regime has a flat margin and no closed form
    let params = PricingParams {
        weight_g: 100.0,
        cost: 5.0,
        commission: 0.5,
        acquiring: 0.48,
        fx: 0.012,
        last_mile: LastMileFee::new(0.02, 15.0, 200.0),
        exchange_rate: 11.83,
        ..Default::default()
    };
    let pricing = LinearPricing::new(2.0, 0.05);
    let model = FeeModel::new(&params, &pricing);

    let brute = brute_force_price(&model, 0.1, 50_000.0).unwrap();
    let bisected = bisect_for_margin(&model, 0.1).unwrap();
    assert!((bisected - brute).abs() <= 0.01, "{bisected} vs {brute}");

    let solved = InverseSolver::new(&params, &pricing).unwrap().prices(0.1);
    assert_eq!(solved.len(), 1);
    assert!((solved[0] - brute).abs() <= 0.01, "{} vs {brute}", solved[0]);
}

#[test]
fn tiny_slope_is_solved_numerically() {
    // no proportional last-mile fee, and fees leave 2e-10 of each unit of price:
    // the only regime is below the closed-form threshold
    let params = PricingParams {
        weight_g: 100.0,
        cost: 5.0,
        commission: 0.5,
        acquiring: 0.5 - 2e-10,
        fx: 0.0,
        last_mile: LastMileFee::new(0.0, 0.0, 0.0),
        exchange_rate: 1.0,
        ..Default::default()
    };
    let pricing = LinearPricing::new(0.0, 0.0);
    let model = FeeModel::new(&params, &pricing);
    let slope = 1.0 - params.commission - params.acquiring;
    let expected = 1.1 * params.cost / slope;

    let solved = solve_for_target_margin(&params, &pricing, 0.1);
    assert_eq!(solved.len(), 1);
    assert!((solved[0] - expected).abs() <= expected * 1e-5);
    assert!((model.margin_at(solved[0]) - 0.1).abs() < 1e-6);
}
