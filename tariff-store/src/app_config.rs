use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub optimizer: OptimizerConfig,
    #[serde(default)]
    pub chart: ChartConfig,
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 { 3000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

/// Where the rate sheets and (optionally) a custom group table live.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct CatalogConfig {
    /// A rate sheet file, or a directory of `*.json` sheets.
    pub rates_path: Option<String>,
    /// JSON array of group rules; the standard table is used when unset.
    pub rules_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OptimizerConfig {
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_safe_range_width")]
    pub safe_range_width: f64,
    /// Slack on the margin bounds, absorbs output rounding.
    #[serde(default = "default_margin_epsilon")]
    pub margin_epsilon: f64,
    /// Integer prices probed below each solved price; capped at 30.
    #[serde(default = "default_neighborhood_radius")]
    pub neighborhood_radius: usize,
    #[serde(default = "default_round_prices")]
    pub round_prices: Vec<f64>,
    #[serde(default)]
    pub enforce_dims_limit: bool,
}

fn default_top_n() -> usize { 3 }
fn default_safe_range_width() -> f64 { 10.0 }
fn default_margin_epsilon() -> f64 { 1e-3 }
fn default_neighborhood_radius() -> usize { 30 }
fn default_round_prices() -> Vec<f64> { vec![750.0, 10_000.0] }

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            safe_range_width: default_safe_range_width(),
            margin_epsilon: default_margin_epsilon(),
            neighborhood_radius: default_neighborhood_radius(),
            round_prices: default_round_prices(),
            enforce_dims_limit: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    #[serde(default = "default_samples")]
    pub samples: usize,
    #[serde(default = "default_demand_samples")]
    pub demand_samples: usize,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

fn default_samples() -> usize { 100 }
fn default_demand_samples() -> usize { 60 }
fn default_width() -> f64 { 600.0 }
fn default_height() -> f64 { 180.0 }

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            samples: default_samples(),
            demand_samples: default_demand_samples(),
            width: default_width(),
            height: default_height(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_true() -> bool { true }
fn default_queue_capacity() -> usize { 64 }

impl Default for WorkerConfig {
    fn default() -> Self {
        Self { enabled: true, queue_capacity: default_queue_capacity() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // developer overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `TARIFF_OPTIMIZER__TOP_N=5`
            .add_source(config::Environment::with_prefix("TARIFF").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    pub fn from_toml(raw: &str) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.optimizer.top_n, 3);
        assert_eq!(config.optimizer.round_prices, vec![750.0, 10_000.0]);
        assert_eq!(config.chart.samples, 100);
        assert!(config.worker.enabled);
        assert!(config.catalog.rates_path.is_none());
    }

    #[test]
    fn test_partial_sections_override() {
        let config = Config::from_toml(
            r#"
            [optimizer]
            top_n = 5
            enforce_dims_limit = true

            [catalog]
            rates_path = "data/rates"
            "#,
        )
        .unwrap();
        assert_eq!(config.optimizer.top_n, 5);
        assert!(config.optimizer.enforce_dims_limit);
        assert_eq!(config.optimizer.safe_range_width, 10.0);
        assert_eq!(config.catalog.rates_path.as_deref(), Some("data/rates"));
    }
}
