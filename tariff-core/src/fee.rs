//! Sale price -> fee and profit breakdown.

use tariff_shared::money::{round2, round4};
use tariff_shared::{CalcBreakdown, FxBase, GroupName, LinearPricing, PricingParams};

use crate::validate_params;

/// Unrounded fee components at one price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeComponents {
    pub commission: f64,
    pub acquiring: f64,
    pub last_mile: f64,
    pub intl_logistics: f64,
    pub fx_fee: f64,
    pub receipt: f64,
    pub profit: f64,
    pub margin: f64,
}

impl FeeComponents {
    pub fn rounded(&self) -> CalcBreakdown {
        CalcBreakdown {
            receipt: round2(self.receipt),
            fx_fee: round2(self.fx_fee),
            commission: round2(self.commission),
            acquiring: round2(self.acquiring),
            intl_logistics: round2(self.intl_logistics),
            last_mile: round2(self.last_mile),
            profit: round2(self.profit),
            margin: round4(self.margin),
        }
    }
}

/// `profit / cost`; a zero cost gives an infinity carrying the profit's sign.
pub fn margin_ratio(profit: f64, cost: f64) -> f64 {
    if cost > 0.0 {
        profit / cost
    } else if profit > 0.0 {
        f64::INFINITY
    } else {
        f64::NEG_INFINITY
    }
}

/// Fee model bound to one parameter set and one carrier tariff.
#[derive(Debug, Clone, Copy)]
pub struct FeeModel<'a> {
    params: &'a PricingParams,
    pricing: &'a LinearPricing,
    valid: bool,
}

impl<'a> FeeModel<'a> {
    pub fn new(params: &'a PricingParams, pricing: &'a LinearPricing) -> Self {
        Self { params, pricing, valid: validate_params(params).is_ok() }
    }

    pub fn params(&self) -> &'a PricingParams {
        self.params
    }

    /// International logistics fee in the sale currency. Does not depend on price.
    pub fn intl_logistics(&self) -> f64 {
        self.pricing.fee_for_weight(self.params.weight_g) * self.params.exchange_rate
    }

    /// Full-precision evaluation. Callers are expected to pass validated input.
    pub fn components(&self, price: f64) -> FeeComponents {
        let p = self.params;
        let commission = price * p.commission;
        let acquiring = price * p.acquiring;
        let last_mile = p.last_mile.fee_at(price);
        let intl_logistics = self.intl_logistics();

        let (fx_fee, receipt) = match p.fx_base {
            FxBase::IncludeIntl => {
                let payout = price - commission - acquiring - last_mile - intl_logistics;
                let fx_fee = payout * p.fx;
                (fx_fee, payout - fx_fee)
            }
            FxBase::ExcludeIntl => {
                let base = price - commission - acquiring - last_mile;
                let fx_fee = base * p.fx;
                (fx_fee, base - fx_fee - intl_logistics)
            }
        };

        let profit = receipt / p.exchange_rate - p.cost;
        FeeComponents {
            commission,
            acquiring,
            last_mile,
            intl_logistics,
            fx_fee,
            receipt,
            profit,
            margin: margin_ratio(profit, p.cost),
        }
    }

    pub fn margin_at(&self, price: f64) -> f64 {
        self.components(price).margin
    }

    /// Rounded breakdown; unusable input yields [`CalcBreakdown::neutral`].
    pub fn breakdown(&self, price: f64) -> CalcBreakdown {
        if !self.valid || !price.is_finite() {
            return CalcBreakdown::neutral();
        }
        self.components(price).rounded()
    }
}

pub fn compute_profit_for_price(
    price: f64,
    group: GroupName,
    pricing: &LinearPricing,
    params: &PricingParams,
) -> CalcBreakdown {
    let breakdown = FeeModel::new(params, pricing).breakdown(price);
    tracing::trace!(%group, price, margin = breakdown.margin, "Evaluated sale price");
    breakdown
}

#[cfg(test)]
mod tests {
    use super::*;
    use tariff_shared::LastMileFee;

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

    #[test]
    fn test_breakdown_include_intl() {
        let b = compute_profit_for_price(500.0, GroupName::ExtraSmall, &RATE, &params());
        assert_eq!(b.commission, 60.0);
        assert_eq!(b.acquiring, 9.5);
        assert_eq!(b.last_mile, 15.0);
        assert_eq!(b.intl_logistics, 82.81);
        // payout = 500 - 60 - 9.5 - 15 - 82.81 = 332.69
        assert_eq!(b.fx_fee, 3.99);
        assert_eq!(b.receipt, 328.7);
        // 328.70/11.83 - 5 = 22.785
        assert_eq!(b.profit, 22.79);
        assert_eq!(b.margin, 4.557);
    }

    #[test]
    fn test_breakdown_exclude_intl() {
        let mut p = params();
        p.fx_base = FxBase::ExcludeIntl;
        let b = compute_profit_for_price(500.0, GroupName::ExtraSmall, &RATE, &p);
        // base = 415.5, fx = 4.986, receipt = 415.5 - 4.986 - 82.81
        assert_eq!(b.fx_fee, 4.99);
        assert_eq!(b.receipt, 327.7);
        assert!(b.margin < compute_profit_for_price(500.0, GroupName::ExtraSmall, &RATE, &params()).margin);
    }

    #[test]
    fn test_zero_cost_gives_signed_infinity() {
        let mut p = params();
        p.cost = 0.0;
        let high = compute_profit_for_price(5000.0, GroupName::Small, &RATE, &p);
        assert_eq!(high.margin, f64::INFINITY);
        let low = compute_profit_for_price(10.0, GroupName::Small, &RATE, &p);
        assert_eq!(low.margin, f64::NEG_INFINITY);
    }

    #[test]
    fn test_invalid_input_is_neutral() {
        let mut p = params();
        p.exchange_rate = 0.0;
        let b = compute_profit_for_price(500.0, GroupName::Small, &RATE, &p);
        assert_eq!(b, CalcBreakdown::neutral());

        let b = compute_profit_for_price(f64::NAN, GroupName::Small, &RATE, &params());
        assert_eq!(b, CalcBreakdown::neutral());
    }

    #[test]
    fn test_last_mile_regimes() {
        let p = params();
        let model = FeeModel::new(&p, &RATE);
        assert_eq!(model.components(100.0).last_mile, 15.0);
        assert!((model.components(5000.0).last_mile - 100.0).abs() < 1e-9);
        assert_eq!(model.components(20_000.0).last_mile, 200.0);
    }
}
