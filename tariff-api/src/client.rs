use std::sync::Arc;

use async_trait::async_trait;
use tariff_catalog::Dataset;
use tariff_shared::{
    ComputeListRequest, DemandLines, Envelope, OffloadRequest, OffloadResponse, RawSampleSet,
    ResultItem, SampleChartRequest, SampleDemandRequest,
};
use tariff_store::{cache_key, SampleCache};
use tracing::{debug, warn};

use crate::worker::{execute, TransportError, WorkerHandle};

/// Something that can answer an offloaded pricing message.
#[async_trait]
pub trait OffloadExecutor: Send + Sync {
    async fn run(&self, request: OffloadRequest) -> Result<OffloadResponse, TransportError>;
}

/// Runs the message on the calling task.
pub struct InlineExecutor {
    dataset: Arc<Dataset>,
}

impl InlineExecutor {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self { dataset }
    }

    pub fn execute(&self, request: &OffloadRequest) -> OffloadResponse {
        execute(request, &self.dataset)
    }
}

#[async_trait]
impl OffloadExecutor for InlineExecutor {
    async fn run(&self, request: OffloadRequest) -> Result<OffloadResponse, TransportError> {
        Ok(self.execute(&request))
    }
}

/// Sends the message to the background worker and checks the reply.
pub struct WorkerExecutor {
    handle: WorkerHandle,
}

impl WorkerExecutor {
    pub fn new(handle: WorkerHandle) -> Self {
        Self { handle }
    }
}

#[async_trait]
impl OffloadExecutor for WorkerExecutor {
    async fn run(&self, request: OffloadRequest) -> Result<OffloadResponse, TransportError> {
        let envelope = Envelope::new(request);
        let id = envelope.id;
        let expected = envelope.payload.kind();
        let check = envelope.payload.clone();

        let reply = self
            .handle
            .submit(envelope)
            .await?
            .await
            .map_err(|_| TransportError::ReplyDropped(id))?;

        if reply.id != id {
            return Err(TransportError::CorrelationMismatch { expected: id, got: reply.id });
        }
        if !reply.payload.answers(&check) {
            return Err(TransportError::UnexpectedReply { expected, got: reply.payload.kind() });
        }
        Ok(reply.payload)
    }
}

/// Entry point for offloaded work: memo cache, then the worker, then inline.
pub struct OffloadClient {
    worker: Option<Box<dyn OffloadExecutor>>,
    inline: InlineExecutor,
    cache: Option<Arc<SampleCache>>,
}

impl OffloadClient {
    pub fn new(
        dataset: Arc<Dataset>,
        worker: Option<Box<dyn OffloadExecutor>>,
        cache: Option<Arc<SampleCache>>,
    ) -> Self {
        Self { worker, inline: InlineExecutor::new(dataset), cache }
    }

    /// Client without worker or cache.
    pub fn inline_only(dataset: Arc<Dataset>) -> Self {
        Self::new(dataset, None, None)
    }

    pub fn cache(&self) -> Option<&Arc<SampleCache>> {
        self.cache.as_ref()
    }

    pub async fn dispatch(&self, request: OffloadRequest) -> Arc<OffloadResponse> {
        let key = self.cache.as_ref().map(|_| cache_key(&request));
        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            if let Some(hit) = cache.get(key) {
                debug!(kind = request.kind(), "Offload cache hit");
                return hit;
            }
        }

        let response = match &self.worker {
            Some(worker) => match worker.run(request.clone()).await {
                Ok(response) => response,
                Err(e) => {
                    warn!(error = %e, kind = request.kind(), "Worker unavailable, running inline");
                    self.inline.execute(&request)
                }
            },
            None => self.inline.execute(&request),
        };

        match (&self.cache, key) {
            (Some(cache), Some(key)) => cache.insert(key, response),
            _ => Arc::new(response),
        }
    }

    pub async fn compute_list(&self, request: ComputeListRequest) -> Vec<ResultItem> {
        match &*self.dispatch(OffloadRequest::ComputeList(request)).await {
            OffloadResponse::ComputeListDone { items } => items.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn sample_chart(&self, request: SampleChartRequest) -> Vec<RawSampleSet> {
        match &*self.dispatch(OffloadRequest::SampleChart(request)).await {
            OffloadResponse::SampleChartDone { raw_sets } => raw_sets.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn sample_demand_lines(&self, request: SampleDemandRequest) -> DemandLines {
        match &*self.dispatch(OffloadRequest::SampleDemandLines(request)).await {
            OffloadResponse::SampleDemandLinesDone(lines) => lines.clone(),
            _ => DemandLines::default(),
        }
    }
}
