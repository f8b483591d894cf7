pub mod app_config;
pub mod cache;
pub mod catalog_repo;

pub use cache::{cache_key, SampleCache};
pub use catalog_repo::CatalogRepository;

use tariff_catalog::CatalogError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type StoreResult<T> = Result<T, StoreError>;
