//! Background pricing worker.
//!
//! Heavy sampling runs off the request path: jobs are queued per message kind
//! and executed one at a time on the blocking pool. Replies travel back on a
//! oneshot channel inside an envelope carrying the request's id.

use std::sync::Arc;

use tariff_catalog::Dataset;
use tariff_chart::{sample_chart, sample_demand_lines};
use tariff_core::compute_profit_for_price;
use tariff_shared::{Envelope, OffloadRequest, OffloadResponse, ResultItem};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Pricing worker is not accepting {0} jobs")]
    WorkerClosed(&'static str),
    #[error("Pricing worker dropped job {0}")]
    ReplyDropped(Uuid),
    #[error("Reply {got} does not answer request {expected}")]
    CorrelationMismatch { expected: Uuid, got: Uuid },
    #[error("Reply of kind {got} does not answer a {expected} request")]
    UnexpectedReply { expected: &'static str, got: &'static str },
}

/// The one implementation of every offloaded message, shared by the worker
/// and the inline path.
pub fn execute(request: &OffloadRequest, dataset: &Dataset) -> OffloadResponse {
    match request {
        OffloadRequest::ComputeList(req) => {
            let items = dataset
                .rates
                .for_group(req.group)
                .map(|rate| {
                    let breakdown =
                        compute_profit_for_price(req.price, req.group, &rate.pricing, &req.params);
                    ResultItem::for_rate(rate, req.price, breakdown)
                })
                .collect();
            OffloadResponse::ComputeListDone { items }
        }
        OffloadRequest::SampleChart(req) => OffloadResponse::SampleChartDone {
            raw_sets: sample_chart(req, dataset),
        },
        OffloadRequest::SampleDemandLines(req) => {
            OffloadResponse::SampleDemandLinesDone(sample_demand_lines(req, dataset))
        }
    }
}

pub struct Job {
    pub envelope: Envelope<OffloadRequest>,
    pub reply: oneshot::Sender<Envelope<OffloadResponse>>,
}

/// Sending side of the worker's queues.
#[derive(Clone)]
pub struct WorkerHandle {
    compute_list: mpsc::Sender<Job>,
    sample_chart: mpsc::Sender<Job>,
    sample_demand_lines: mpsc::Sender<Job>,
}

impl WorkerHandle {
    /// Queues `envelope`; the receiver resolves once the worker has run it.
    pub async fn submit(
        &self,
        envelope: Envelope<OffloadRequest>,
    ) -> Result<oneshot::Receiver<Envelope<OffloadResponse>>, TransportError> {
        let kind = envelope.payload.kind();
        let queue = match envelope.payload {
            OffloadRequest::ComputeList(_) => &self.compute_list,
            OffloadRequest::SampleChart(_) => &self.sample_chart,
            OffloadRequest::SampleDemandLines(_) => &self.sample_demand_lines,
        };
        let (reply, rx) = oneshot::channel();
        queue
            .send(Job { envelope, reply })
            .await
            .map_err(|_| TransportError::WorkerClosed(kind))?;
        Ok(rx)
    }
}

pub fn spawn_pricing_worker(dataset: Arc<Dataset>, capacity: usize) -> (WorkerHandle, JoinHandle<()>) {
    let capacity = capacity.max(1);
    let (compute_tx, mut compute_rx) = mpsc::channel::<Job>(capacity);
    let (chart_tx, mut chart_rx) = mpsc::channel::<Job>(capacity);
    let (demand_tx, mut demand_rx) = mpsc::channel::<Job>(capacity);

    let task = tokio::spawn(async move {
        info!(capacity, "Pricing worker started");
        loop {
            let job = tokio::select! {
                Some(job) = compute_rx.recv() => job,
                Some(job) = chart_rx.recv() => job,
                Some(job) = demand_rx.recv() => job,
                else => break,
            };
            run_job(job, Arc::clone(&dataset)).await;
        }
        info!("Pricing worker stopped");
    });

    let handle = WorkerHandle {
        compute_list: compute_tx,
        sample_chart: chart_tx,
        sample_demand_lines: demand_tx,
    };
    (handle, task)
}

async fn run_job(job: Job, dataset: Arc<Dataset>) {
    let Job { envelope, reply } = job;
    let id = envelope.id;
    let kind = envelope.payload.kind();
    let started = std::time::Instant::now();

    let result = tokio::task::spawn_blocking(move || {
        let response = execute(&envelope.payload, &dataset);
        envelope.reply(response)
    })
    .await;

    match result {
        Ok(response) => {
            debug!(%id, kind, elapsed_ms = started.elapsed().as_millis() as u64, "Job done");
            // the client may have gone away; nothing to do then
            let _ = reply.send(response);
        }
        Err(e) => error!(%id, kind, error = %e, "Pricing job failed"),
    }
}
