use std::path::{Path, PathBuf};

use tariff_catalog::{Dataset, GroupTable, RateCatalog};
use tariff_shared::{GroupRule, RateSheet};
use tracing::{info, warn};

use crate::app_config::CatalogConfig;
use crate::{StoreError, StoreResult};

/// Loads group rules and rate sheets from the filesystem.
pub struct CatalogRepository {
    config: CatalogConfig,
}

impl CatalogRepository {
    pub fn new(config: CatalogConfig) -> Self {
        Self { config }
    }

    pub async fn load(&self) -> StoreResult<Dataset> {
        let groups = match &self.config.rules_path {
            Some(path) => load_rules(Path::new(path)).await?,
            None => GroupTable::standard(),
        };
        let rates = match &self.config.rates_path {
            Some(path) => load_rates(Path::new(path)).await?,
            None => {
                warn!("No rates_path configured, starting with an empty rate catalog");
                RateCatalog::default()
            }
        };
        info!(
            groups = groups.rules().len(),
            rates = rates.len(),
            carriers = rates.carriers().len(),
            "Catalog loaded"
        );
        Ok(Dataset::new(groups, rates))
    }
}

async fn read(path: &Path) -> StoreResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io { path: path.display().to_string(), source })
}

pub async fn load_rules(path: &Path) -> StoreResult<GroupTable> {
    let raw = read(path).await?;
    let rules: Vec<GroupRule> = serde_json::from_str(&raw)
        .map_err(|e| StoreError::Parse { path: path.display().to_string(), source: e })?;
    if rules.is_empty() {
        warn!(path = %path.display(), "Rules file is empty, using the standard group table");
        return Ok(GroupTable::standard());
    }
    Ok(GroupTable::new(rules)?)
}

/// Reads one sheet file, or every `*.json` file of a directory in name order.
pub async fn load_rates(path: &Path) -> StoreResult<RateCatalog> {
    let files = if tokio::fs::metadata(path)
        .await
        .map_err(|source| StoreError::Io { path: path.display().to_string(), source })?
        .is_dir()
    {
        json_files(path).await?
    } else {
        vec![path.to_path_buf()]
    };

    let mut sheets = Vec::with_capacity(files.len());
    for file in files {
        let raw = read(&file).await?;
        let rates = RateCatalog::parse_json(&raw)?;
        let carrier = file.file_stem().map(|s| s.to_string_lossy().into_owned());
        sheets.push(RateSheet { carrier, rates, ..Default::default() });
    }
    Ok(RateCatalog::from_sheets(sheets))
}

async fn json_files(dir: &Path) -> StoreResult<Vec<PathBuf>> {
    let io_err = |source| StoreError::Io { path: dir.display().to_string(), source };
    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
