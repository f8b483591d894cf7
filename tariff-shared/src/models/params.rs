use serde::{Deserialize, Serialize};

use super::rates::{DeliveryMode, RateEntry};

/// Margin floor applied when the caller sets none.
pub const DEFAULT_MARGIN_FLOOR: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub l: f64,
    pub w: f64,
    pub h: f64,
}

impl Dimensions {
    pub fn new(l: f64, w: f64, h: f64) -> Self {
        Self { l, w, h }
    }

    pub fn sum(&self) -> f64 {
        self.l + self.w + self.h
    }

    pub fn longest(&self) -> f64 {
        self.l.max(self.w).max(self.h)
    }

    pub fn volume(&self) -> f64 {
        self.l * self.w * self.h
    }
}

/// Proportional last-mile fee clamped into `[min, max]` (sale currency).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LastMileFee {
    pub rate: f64,
    #[serde(alias = "min_rub")]
    pub min: f64,
    #[serde(alias = "max_rub")]
    pub max: f64,
}

impl LastMileFee {
    pub fn new(rate: f64, min: f64, max: f64) -> Self {
        Self { rate, min, max }
    }

    /// Never panics on an inverted `[min, max]`; the lower bound wins.
    pub fn fee_at(&self, price: f64) -> f64 {
        self.min.max(self.max.min(price * self.rate))
    }
}

/// Whether the currency-conversion fee is charged before or after the
/// international logistics fee is deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FxBase {
    #[default]
    IncludeIntl,
    ExcludeIntl,
}

/// Everything the fee model needs besides the sale price and the carrier tariff.
///
/// `cost` and carrier tariffs are in the cost currency; fees and prices are in
/// the sale currency; `exchange_rate` is sale-currency units per cost-currency
/// unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricingParams {
    pub weight_g: f64,
    #[serde(default)]
    pub dims_cm: Dimensions,
    #[serde(alias = "cost_cny")]
    pub cost: f64,
    pub commission: f64,
    pub acquiring: f64,
    pub fx: f64,
    pub last_mile: LastMileFee,
    #[serde(alias = "rub_per_cny")]
    pub exchange_rate: f64,
    #[serde(default)]
    pub fx_base: FxBase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<DeliveryMode>,
}

impl PricingParams {
    /// Lower margin bound. Negative floors are allowed.
    pub fn margin_floor(&self) -> f64 {
        self.min_margin
            .filter(|m| m.is_finite())
            .unwrap_or(DEFAULT_MARGIN_FLOOR)
    }

    /// Upper margin bound, enabled only when strictly positive.
    pub fn margin_cap(&self) -> Option<f64> {
        self.max_margin.filter(|m| m.is_finite() && *m > 0.0)
    }

    /// Applies the optional carrier/tier/delivery filters.
    pub fn accepts(&self, rate: &RateEntry) -> bool {
        self.carrier.as_deref().map_or(true, |c| rate.carrier == c)
            && self.tier.as_deref().map_or(true, |t| rate.tier == t)
            && self.delivery.map_or(true, |d| rate.delivery == d)
    }
}
