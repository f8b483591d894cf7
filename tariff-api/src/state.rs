use std::sync::Arc;

use tariff_catalog::Dataset;
use tariff_offer::PricingOptimizer;
use tariff_store::app_config::Config;
use tariff_store::SampleCache;

use crate::client::{OffloadClient, OffloadExecutor, WorkerExecutor};
use crate::worker::spawn_pricing_worker;

#[derive(Clone)]
pub struct AppState {
    pub dataset: Arc<Dataset>,
    pub optimizer: Arc<PricingOptimizer>,
    pub offload: Arc<OffloadClient>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wires the optimizer and the offload client. Spawns the pricing worker
    /// when enabled, so this must run inside a Tokio runtime.
    pub fn new(config: Config, dataset: Dataset) -> Self {
        let dataset = Arc::new(dataset);

        let worker = config.worker.enabled.then(|| {
            let (handle, _task) = spawn_pricing_worker(Arc::clone(&dataset), config.worker.queue_capacity);
            Box::new(WorkerExecutor::new(handle)) as Box<dyn OffloadExecutor>
        });
        let cache = config.cache.enabled.then(|| Arc::new(SampleCache::new()));
        let offload = OffloadClient::new(Arc::clone(&dataset), worker, cache);

        Self {
            optimizer: Arc::new(PricingOptimizer::new(config.optimizer.clone())),
            offload: Arc::new(offload),
            dataset,
            config: Arc::new(config),
        }
    }
}
