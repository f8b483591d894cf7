use serde::{Deserialize, Serialize};
use std::fmt;

/// Marketplace shipment group. Serialized with the marketplace's display names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GroupName {
    #[serde(rename = "Extra Small")]
    ExtraSmall,
    #[serde(rename = "Budget")]
    Budget,
    #[serde(rename = "Small")]
    Small,
    #[serde(rename = "Big")]
    Big,
    #[serde(rename = "Premium Small")]
    PremiumSmall,
    #[serde(rename = "Premium Big")]
    PremiumBig,
}

impl GroupName {
    pub const ALL: [GroupName; 6] = [
        GroupName::ExtraSmall,
        GroupName::Budget,
        GroupName::Small,
        GroupName::Big,
        GroupName::PremiumSmall,
        GroupName::PremiumBig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GroupName::ExtraSmall => "Extra Small",
            GroupName::Budget => "Budget",
            GroupName::Small => "Small",
            GroupName::Big => "Big",
            GroupName::PremiumSmall => "Premium Small",
            GroupName::PremiumBig => "Premium Big",
        }
    }
}

impl fmt::Display for GroupName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimsLimit {
    pub sum_cm_max: f64,
    pub longest_cm_max: f64,
    #[serde(default)]
    pub allow_oversize: bool,
    /// Volumetric divisor in cm³/kg, only meaningful for dimensional billing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volumetric_divisor: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingMode {
    #[default]
    Physical,
    MaxOfPhysicalAndDimensional,
}

/// Price and weight band of one shipment group, plus its parcel size rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRule {
    pub group: GroupName,
    #[serde(alias = "priceRub")]
    pub price: Bounds,
    #[serde(alias = "weightG")]
    pub weight_g: Bounds,
    #[serde(default, alias = "dimsLimit", skip_serializing_if = "Option::is_none")]
    pub dims_limit: Option<DimsLimit>,
    #[serde(default)]
    pub billing: BillingMode,
}

/// Parcel size check of one group against the product's dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimsReport {
    pub group: GroupName,
    pub sum_cm: f64,
    pub longest_cm: f64,
    pub volumetric_kg: Option<f64>,
    pub billable_weight_g: f64,
    pub over_limit: bool,
}
