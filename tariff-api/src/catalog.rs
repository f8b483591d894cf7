use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tariff_catalog::{carrier_name, GroupRuleExt};
use tariff_shared::{Dimensions, DimsReport, GroupRule};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/groups", get(list_groups))
        .route("/v1/groups/check", post(check_dims))
        .route("/v1/carriers", get(list_carriers))
}

#[derive(Debug, Deserialize)]
pub struct DimsCheckRequest {
    pub weight_g: f64,
    #[serde(default)]
    pub dims_cm: Dimensions,
}

#[derive(Debug, Serialize)]
pub struct CarrierInfo {
    pub id: String,
    pub name: String,
}

async fn list_groups(State(state): State<AppState>) -> Json<Vec<GroupRule>> {
    Json(state.dataset.groups.rules().to_vec())
}

/// Size and billable weight of the parcel against every group it may ship in.
async fn check_dims(
    State(state): State<AppState>,
    Json(req): Json<DimsCheckRequest>,
) -> Result<Json<Vec<DimsReport>>, AppError> {
    let dims = [req.weight_g, req.dims_cm.l, req.dims_cm.w, req.dims_cm.h];
    if dims.iter().any(|v| !v.is_finite() || *v < 0.0) {
        return Err(AppError::ValidationError(
            "weight and dimensions must be non-negative numbers".to_string(),
        ));
    }

    let reports = state
        .dataset
        .groups
        .feasible_by_weight(req.weight_g)
        .into_iter()
        .map(|rule| rule.dims_report(req.weight_g, &req.dims_cm))
        .collect();
    Ok(Json(reports))
}

async fn list_carriers(State(state): State<AppState>) -> Json<Vec<CarrierInfo>> {
    let carriers = state
        .dataset
        .rates
        .carriers()
        .into_iter()
        .map(|id| CarrierInfo { id: id.to_string(), name: carrier_name(id) })
        .collect();
    Json(carriers)
}
