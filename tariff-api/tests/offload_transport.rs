use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tariff_api::client::{OffloadClient, OffloadExecutor, WorkerExecutor};
use tariff_api::worker::{spawn_pricing_worker, TransportError};
use tariff_catalog::{Dataset, GroupTable, RateCatalog};
use tariff_shared::{
    ComputeListRequest, DeliveryMode, GroupName, LastMileFee, LinearPricing, OffloadRequest,
    OffloadResponse, PricingParams, RateEntry, SampleChartRequest, ServiceKey,
};
use tariff_store::SampleCache;
use uuid::Uuid;

fn params() -> PricingParams {
    PricingParams {
        weight_g: 100.0,
        cost: 5.0,
        commission: 0.12,
        acquiring: 0.019,
        fx: 0.012,
        last_mile: LastMileFee::new(0.02, 15.0, 200.0),
        exchange_rate: 11.83,
        ..Default::default()
    }
}

fn dataset() -> Arc<Dataset> {
    let rate = |carrier: &str, group| RateEntry {
        carrier: carrier.to_string(),
        tier: "Standard".to_string(),
        delivery: DeliveryMode::Pickup,
        group,
        pricing: LinearPricing::new(2.0, 0.05),
        eta_days: None,
        battery_allowed: None,
    };
    Arc::new(Dataset::new(
        GroupTable::standard(),
        RateCatalog::new(vec![
            rate("ural", GroupName::ExtraSmall),
            rate("zto", GroupName::ExtraSmall),
            rate("ural", GroupName::Small),
        ]),
    ))
}

fn compute_list() -> ComputeListRequest {
    ComputeListRequest { price: 500.0, group: GroupName::ExtraSmall, params: params() }
}

fn chart() -> OffloadRequest {
    OffloadRequest::SampleChart(SampleChartRequest {
        params: params(),
        service: ServiceKey::new("ural", "Standard", DeliveryMode::Pickup),
        feasible_groups: None,
        samples: Some(20),
    })
}

/// Fails every call and counts how often it was asked.
struct BrokenWorker {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl OffloadExecutor for BrokenWorker {
    async fn run(&self, _request: OffloadRequest) -> Result<OffloadResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(TransportError::CorrelationMismatch { expected: Uuid::new_v4(), got: Uuid::new_v4() })
    }
}

#[tokio::test]
async fn test_worker_and_inline_agree() {
    let data = dataset();
    let (handle, _task) = spawn_pricing_worker(Arc::clone(&data), 8);
    let via_worker =
        OffloadClient::new(Arc::clone(&data), Some(Box::new(WorkerExecutor::new(handle))), None);
    let inline = OffloadClient::inline_only(Arc::clone(&data));

    let a = via_worker.compute_list(compute_list()).await;
    let b = inline.compute_list(compute_list()).await;
    assert_eq!(a.len(), 2);
    assert_eq!(a, b);

    let a = via_worker.dispatch(chart()).await;
    let b = inline.dispatch(chart()).await;
    assert_eq!(a, b);
    assert_eq!(a.kind(), "sample_chart_done");
}

#[tokio::test]
async fn test_concurrent_requests_get_their_own_replies() {
    let data = dataset();
    let (handle, _task) = spawn_pricing_worker(Arc::clone(&data), 2);
    let client = Arc::new(OffloadClient::new(
        Arc::clone(&data),
        Some(Box::new(WorkerExecutor::new(handle))),
        None,
    ));

    let jobs: Vec<_> = [300.0, 500.0, 700.0, 900.0, 1100.0]
        .into_iter()
        .map(|price| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                let items = client
                    .compute_list(ComputeListRequest { price, ..compute_list() })
                    .await;
                (price, items)
            })
        })
        .collect();

    for job in jobs {
        let (price, items) = job.await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.price == price));
    }
}

#[tokio::test]
async fn test_cache_serves_repeated_requests() {
    let data = dataset();
    let cache = Arc::new(SampleCache::new());
    let client = OffloadClient::new(Arc::clone(&data), None, Some(Arc::clone(&cache)));

    let first = client.dispatch(chart()).await;
    let second = client.dispatch(chart()).await;
    assert!(Arc::ptr_eq(&first, &second));

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);

    // different params, different entry
    let mut other = compute_list();
    other.params.cost = 6.0;
    client.compute_list(other).await;
    assert_eq!(cache.stats().entries, 2);
}

#[tokio::test]
async fn test_failing_worker_falls_back_inline() {
    let data = dataset();
    let calls = Arc::new(AtomicUsize::new(0));
    let worker = BrokenWorker { calls: Arc::clone(&calls) };

    let client = OffloadClient::new(Arc::clone(&data), Some(Box::new(worker)), None);
    let items = client.compute_list(compute_list()).await;
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].breakdown.profit, 22.79);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_stopped_worker_falls_back_inline() {
    let data = dataset();
    let (handle, task) = spawn_pricing_worker(Arc::clone(&data), 4);
    task.abort();
    assert!(task.await.unwrap_err().is_cancelled());

    let client =
        OffloadClient::new(Arc::clone(&data), Some(Box::new(WorkerExecutor::new(handle))), None);
    let items = client.compute_list(compute_list()).await;
    assert_eq!(items.len(), 2);
}
