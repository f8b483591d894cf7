use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tariff_chart::{compress, ChartViewport, CompressedChart, MarginWindow};
use tariff_core::validate_params;
use tariff_shared::{
    DemandCurve, DemandLines, DemandSpec, OffloadRequest, OffloadResponse, SampleChartRequest,
    SampleDemandRequest,
};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/offload", post(offload))
        .route("/v1/chart", post(chart))
}

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    pub chart: SampleChartRequest,
    /// Adds demand and expected-profit overlays when set.
    pub demand: Option<DemandCurve>,
}

#[derive(Debug, Serialize)]
pub struct ChartResponse {
    pub chart: CompressedChart,
    pub demand: Option<DemandLines>,
}

/// POST /v1/offload
/// Raw message interface of the pricing worker.
async fn offload(
    State(state): State<AppState>,
    Json(req): Json<OffloadRequest>,
) -> Result<Json<OffloadResponse>, AppError> {
    let params = match &req {
        OffloadRequest::ComputeList(r) => &r.params,
        OffloadRequest::SampleChart(r) => &r.params,
        OffloadRequest::SampleDemandLines(r) => &r.params,
    };
    validate_params(params).map_err(AppError::invalid)?;

    let response = state.offload.dispatch(req).await;
    Ok(Json(response.as_ref().clone()))
}

/// POST /v1/chart
/// Samples the service's margin curve, compresses it onto the configured
/// viewport and optionally overlays demand.
async fn chart(
    State(state): State<AppState>,
    Json(mut req): Json<ChartRequest>,
) -> Result<Json<ChartResponse>, AppError> {
    validate_params(&req.chart.params).map_err(AppError::invalid)?;
    let chart_config = &state.config.chart;
    req.chart.samples.get_or_insert(chart_config.samples);

    let params = req.chart.params.clone();
    let service = req.chart.service.clone();
    let raw_sets = state.offload.sample_chart(req.chart).await;
    let viewport = ChartViewport { width: chart_config.width, height: chart_config.height };
    let chart = compress(&raw_sets, MarginWindow::from_params(&params), viewport);

    let demand = match req.demand {
        Some(curve) if !chart.is_empty() => {
            let lines = state
                .offload
                .sample_demand_lines(SampleDemandRequest {
                    params,
                    service,
                    segments: chart.segments.clone(),
                    demand: DemandSpec {
                        curve,
                        global_min: chart.global_min,
                        global_max: chart.global_max,
                    },
                    height: Some(viewport.height),
                    samples: Some(chart_config.demand_samples),
                })
                .await;
            Some(lines)
        }
        _ => None,
    };

    Ok(Json(ChartResponse { chart, demand }))
}
