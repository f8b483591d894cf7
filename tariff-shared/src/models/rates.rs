use serde::{Deserialize, Serialize};
use std::fmt;

use super::groups::GroupName;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Pickup,
    Door,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Pickup => "pickup",
            DeliveryMode::Door => "door",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Carrier tariff: `base_fee + per_gram_fee * weight_g`, in the cost currency.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearPricing {
    #[serde(alias = "base_cny")]
    pub base_fee: f64,
    #[serde(alias = "per_gram_cny")]
    pub per_gram_fee: f64,
}

impl LinearPricing {
    pub fn new(base_fee: f64, per_gram_fee: f64) -> Self {
        Self { base_fee, per_gram_fee }
    }

    pub fn fee_for_weight(&self, weight_g: f64) -> f64 {
        self.base_fee + self.per_gram_fee * weight_g
    }
}

/// One carrier/tier/delivery service priced for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateEntry {
    pub carrier: String,
    pub tier: String,
    pub delivery: DeliveryMode,
    pub group: GroupName,
    pub pricing: LinearPricing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eta_days: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub battery_allowed: Option<bool>,
}

impl RateEntry {
    pub fn service(&self) -> ServiceKey {
        ServiceKey {
            carrier: self.carrier.clone(),
            tier: self.tier.clone(),
            delivery: self.delivery,
        }
    }
}

/// A (carrier, tier, delivery) triple, independent of group.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceKey {
    pub carrier: String,
    pub tier: String,
    pub delivery: DeliveryMode,
}

impl ServiceKey {
    pub fn new(carrier: impl Into<String>, tier: impl Into<String>, delivery: DeliveryMode) -> Self {
        Self { carrier: carrier.into(), tier: tier.into(), delivery }
    }

    pub fn matches(&self, rate: &RateEntry) -> bool {
        rate.carrier == self.carrier && rate.tier == self.tier && rate.delivery == self.delivery
    }
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.carrier, self.tier, self.delivery)
    }
}

/// A carrier's published rate file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateSheet {
    #[serde(default)]
    pub carrier: Option<String>,
    #[serde(default)]
    pub data_date: Option<String>,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub details_url: Option<String>,
    pub rates: Vec<RateEntry>,
}
