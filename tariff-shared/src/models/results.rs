use serde::{Deserialize, Serialize};

use super::groups::GroupName;
use super::rates::{DeliveryMode, LinearPricing, RateEntry};

/// Fee and profit breakdown at one sale price.
///
/// Fees are in the sale currency rounded to cents, `profit` is in the cost
/// currency, `margin` is `profit / cost` rounded to four places. A zero cost
/// gives an infinite margin, which serializes as JSON `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CalcBreakdown {
    pub receipt: f64,
    pub fx_fee: f64,
    pub commission: f64,
    pub acquiring: f64,
    pub intl_logistics: f64,
    pub last_mile: f64,
    pub profit: f64,
    pub margin: f64,
}

impl CalcBreakdown {
    /// All-zero breakdown returned for unusable input.
    pub fn neutral() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafeRange {
    pub from: f64,
    pub to: f64,
}

/// Price interval in the sale currency, 2-dp, `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub price: f64,
    pub group: GroupName,
    pub carrier: String,
    pub tier: String,
    pub delivery: DeliveryMode,
    pub breakdown: CalcBreakdown,
    pub safe_range: Option<SafeRange>,
    pub constraint_ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_allowed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<LinearPricing>,
}

impl ResultItem {
    pub fn for_rate(rate: &RateEntry, price: f64, breakdown: CalcBreakdown) -> Self {
        Self {
            price,
            group: rate.group,
            carrier: rate.carrier.clone(),
            tier: rate.tier.clone(),
            delivery: rate.delivery,
            breakdown,
            safe_range: None,
            constraint_ok: true,
            note: None,
            eta_days: rate.eta_days.clone(),
            battery_allowed: rate.battery_allowed,
            pricing: Some(rate.pricing),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PricingOutcome {
    pub best: Option<ResultItem>,
    pub top: Vec<ResultItem>,
}

impl PricingOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}
