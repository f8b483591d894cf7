use std::collections::BTreeSet;

use tariff_shared::{GroupName, PricingParams, RateEntry, RateSheet, ServiceKey};

use crate::CatalogError;

/// In-memory rate table across all carriers.
#[derive(Debug, Clone, Default)]
pub struct RateCatalog {
    rates: Vec<RateEntry>,
}

impl RateCatalog {
    pub fn new(rates: Vec<RateEntry>) -> Self {
        Self { rates }
    }

    pub fn from_sheets(sheets: impl IntoIterator<Item = RateSheet>) -> Self {
        let mut catalog = Self::default();
        for sheet in sheets {
            catalog.extend(sheet);
        }
        catalog
    }

    /// Parses either a rate sheet object (`{"rates": [...]}`) or a bare array.
    pub fn parse_json(raw: &str) -> Result<Vec<RateEntry>, CatalogError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let rates = if value.is_array() {
            serde_json::from_value(value)?
        } else {
            serde_json::from_value::<RateSheet>(value)?.rates
        };
        Ok(rates)
    }

    pub fn extend(&mut self, sheet: RateSheet) {
        tracing::debug!(
            carrier = sheet.carrier.as_deref().unwrap_or("-"),
            rows = sheet.rates.len(),
            "Loaded rate sheet"
        );
        self.rates.extend(sheet.rates);
    }

    pub fn all(&self) -> &[RateEntry] {
        &self.rates
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn for_group(&self, group: GroupName) -> impl Iterator<Item = &RateEntry> {
        self.rates.iter().filter(move |r| r.group == group)
    }

    /// Rates of `group` passing the carrier/tier/delivery filters in `params`.
    pub fn matching<'a>(
        &'a self,
        group: GroupName,
        params: &'a PricingParams,
    ) -> impl Iterator<Item = &'a RateEntry> + 'a {
        self.for_group(group).filter(move |r| params.accepts(r))
    }

    pub fn find_service(&self, group: GroupName, service: &ServiceKey) -> Option<&RateEntry> {
        self.for_group(group).find(|r| service.matches(r))
    }

    pub fn carriers(&self) -> BTreeSet<&str> {
        self.rates.iter().map(|r| r.carrier.as_str()).collect()
    }
}
