use tariff_shared::{
    BillingMode, Bounds, Dimensions, DimsLimit, DimsReport, GroupName, GroupRule,
};

use crate::CatalogError;

/// Divisor used when a dimensional-billing rule does not name one.
pub const DEFAULT_VOLUMETRIC_DIVISOR: f64 = 12_000.0;

/// Price span used when no rule is available for a group.
pub const FALLBACK_PRICE_BAND: Bounds = Bounds { min: 1.0, max: 250_000.0 };

const DIMS_TOLERANCE: f64 = 1e-9;

/// The marketplace's shipment groups, keyed by weight and price band.
#[derive(Debug, Clone)]
pub struct GroupTable {
    rules: Vec<GroupRule>,
}

impl GroupTable {
    pub fn new(rules: Vec<GroupRule>) -> Result<Self, CatalogError> {
        for rule in &rules {
            if !(rule.price.min <= rule.price.max && rule.weight_g.min <= rule.weight_g.max) {
                return Err(CatalogError::InvalidRule(rule.group.to_string()));
            }
        }
        Ok(Self { rules })
    }

    /// Default six-group table.
    pub fn standard() -> Self {
        let rule = |group, price: (f64, f64), weight: (f64, f64), sum, longest, divisor, billing| {
            GroupRule {
                group,
                price: Bounds::new(price.0, price.1),
                weight_g: Bounds::new(weight.0, weight.1),
                dims_limit: Some(DimsLimit {
                    sum_cm_max: sum,
                    longest_cm_max: longest,
                    allow_oversize: false,
                    volumetric_divisor: divisor,
                }),
                billing,
            }
        };
        use BillingMode::*;
        use GroupName::*;
        Self {
            rules: vec![
                rule(ExtraSmall, (1.0, 1500.0), (1.0, 500.0), 90.0, 60.0, None, Physical),
                rule(Budget, (1.0, 1500.0), (501.0, 30_000.0), 150.0, 60.0, None, Physical),
                rule(Small, (1501.0, 7000.0), (1.0, 2000.0), 150.0, 60.0, None, Physical),
                rule(
                    Big,
                    (1501.0, 7000.0),
                    (2001.0, 30_000.0),
                    250.0,
                    150.0,
                    Some(DEFAULT_VOLUMETRIC_DIVISOR),
                    MaxOfPhysicalAndDimensional,
                ),
                rule(PremiumSmall, (7001.0, 250_000.0), (1.0, 5000.0), 250.0, 150.0, None, Physical),
                rule(
                    PremiumBig,
                    (7001.0, 250_000.0),
                    (5001.0, 30_000.0),
                    310.0,
                    150.0,
                    Some(DEFAULT_VOLUMETRIC_DIVISOR),
                    MaxOfPhysicalAndDimensional,
                ),
            ],
        }
    }

    pub fn rules(&self) -> &[GroupRule] {
        &self.rules
    }

    pub fn rule(&self, group: GroupName) -> Option<&GroupRule> {
        self.rules.iter().find(|r| r.group == group)
    }

    /// Rule for `group`, or a synthetic rule spanning the fallback price band.
    pub fn rule_or_fallback(&self, group: GroupName) -> GroupRule {
        self.rule(group).cloned().unwrap_or(GroupRule {
            group,
            price: FALLBACK_PRICE_BAND,
            weight_g: Bounds::new(0.0, f64::INFINITY),
            dims_limit: None,
            billing: BillingMode::Physical,
        })
    }

    pub fn feasible_by_weight(&self, weight_g: f64) -> Vec<&GroupRule> {
        self.rules.iter().filter(|r| r.weight_g.contains(weight_g)).collect()
    }

    pub fn feasible_by_weight_and_price(&self, weight_g: f64, price: f64) -> Vec<&GroupRule> {
        self.rules
            .iter()
            .filter(|r| r.weight_g.contains(weight_g) && r.price.contains(price))
            .collect()
    }

    /// The group a listing at `price` falls into.
    pub fn group_for_price(&self, price: f64, weight_g: f64) -> Option<GroupName> {
        self.feasible_by_weight_and_price(weight_g, price)
            .first()
            .map(|r| r.group)
    }

    /// Every band edge and its ±1 neighbours; prices where the group changes.
    pub fn band_breakpoints(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.rules.len() * 6);
        for rule in &self.rules {
            for edge in [rule.price.min, rule.price.max] {
                out.extend([edge - 1.0, edge, edge + 1.0]);
            }
        }
        out
    }
}

impl Default for GroupTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// Volumetric weight in kilograms.
pub fn volumetric_weight_kg(dims: &Dimensions, divisor: f64) -> f64 {
    if divisor > 0.0 {
        dims.volume() / divisor
    } else {
        0.0
    }
}

pub trait GroupRuleExt {
    fn exceeds_dims(&self, dims: &Dimensions) -> bool;
    fn billable_weight_g(&self, weight_g: f64, dims: &Dimensions) -> f64;
    fn dims_report(&self, weight_g: f64, dims: &Dimensions) -> DimsReport;
}

impl GroupRuleExt for GroupRule {
    /// True when the parcel is larger than the group allows and oversize is off.
    fn exceeds_dims(&self, dims: &Dimensions) -> bool {
        match &self.dims_limit {
            Some(limit) if !limit.allow_oversize => {
                dims.sum() > limit.sum_cm_max + DIMS_TOLERANCE
                    || dims.longest() > limit.longest_cm_max + DIMS_TOLERANCE
            }
            _ => false,
        }
    }

    fn billable_weight_g(&self, weight_g: f64, dims: &Dimensions) -> f64 {
        match self.billing {
            BillingMode::Physical => weight_g,
            BillingMode::MaxOfPhysicalAndDimensional => {
                let divisor = self
                    .dims_limit
                    .and_then(|d| d.volumetric_divisor)
                    .unwrap_or(DEFAULT_VOLUMETRIC_DIVISOR);
                weight_g.max(volumetric_weight_kg(dims, divisor) * 1000.0)
            }
        }
    }

    fn dims_report(&self, weight_g: f64, dims: &Dimensions) -> DimsReport {
        let volumetric_kg = match self.billing {
            BillingMode::Physical => None,
            BillingMode::MaxOfPhysicalAndDimensional => Some(volumetric_weight_kg(
                dims,
                self.dims_limit
                    .and_then(|d| d.volumetric_divisor)
                    .unwrap_or(DEFAULT_VOLUMETRIC_DIVISOR),
            )),
        };
        DimsReport {
            group: self.group,
            sum_cm: dims.sum(),
            longest_cm: dims.longest(),
            volumetric_kg,
            billable_weight_g: self.billable_weight_g(weight_g, dims),
            over_limit: self.exceeds_dims(dims),
        }
    }
}
