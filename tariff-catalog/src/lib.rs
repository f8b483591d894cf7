pub mod carriers;
pub mod groups;
pub mod rates;

pub use carriers::{carrier_name, KNOWN_CARRIERS};
pub use groups::{GroupRuleExt, GroupTable, FALLBACK_PRICE_BAND};
pub use rates::RateCatalog;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Invalid group rule: {0}")]
    InvalidRule(String),
    #[error("Malformed rate data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Group rules plus the rate rows priced against them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub groups: GroupTable,
    pub rates: RateCatalog,
}

impl Dataset {
    pub fn new(groups: GroupTable, rates: RateCatalog) -> Self {
        Self { groups, rates }
    }
}
