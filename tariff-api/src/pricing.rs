use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tariff_core::{price_range_for_margin, validate_params, InverseSolver, MarginRoot};
use tariff_shared::{
    ComputeListRequest, GroupName, LinearPricing, PriceRange, PricingOutcome, PricingParams,
    ResultItem,
};

use crate::error::AppError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/pricing/best", post(best_pricing))
        .route("/v1/pricing/breakdown", post(breakdown))
        .route("/v1/pricing/range", post(price_range))
        .route("/v1/pricing/solve", post(solve))
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct BestPricingRequest {
    pub params: PricingParams,
    pub top_n: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    pub params: PricingParams,
    pub price: f64,
    /// Inferred from price and weight when absent.
    pub group: Option<GroupName>,
}

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    pub group: GroupName,
    pub items: Vec<ResultItem>,
}

#[derive(Debug, Deserialize)]
pub struct RangeRequest {
    pub params: PricingParams,
    pub pricing: LinearPricing,
    pub group: GroupName,
    #[serde(default = "default_true")]
    pub respect_group_bound: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct SolveRequest {
    pub params: PricingParams,
    pub pricing: LinearPricing,
    pub target: f64,
}

#[derive(Debug, Serialize)]
pub struct SolveResponse {
    pub target: f64,
    pub roots: Vec<MarginRoot>,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/pricing/best
async fn best_pricing(
    State(state): State<AppState>,
    Json(req): Json<BestPricingRequest>,
) -> Result<Json<PricingOutcome>, AppError> {
    validate_params(&req.params).map_err(AppError::invalid)?;
    let top_n = req.top_n.unwrap_or(state.config.optimizer.top_n);
    let optimizer = state.optimizer.clone();
    let dataset = state.dataset.clone();

    // candidate enumeration is CPU bound
    let outcome = tokio::task::spawn_blocking(move || {
        optimizer.best_pricing(&req.params, &dataset, top_n)
    })
    .await?;
    Ok(Json(outcome))
}

/// POST /v1/pricing/breakdown
/// Every service of the group at one price, filtered by the request's carrier/tier/delivery.
async fn breakdown(
    State(state): State<AppState>,
    Json(req): Json<BreakdownRequest>,
) -> Result<Json<BreakdownResponse>, AppError> {
    validate_params(&req.params).map_err(AppError::invalid)?;
    if !(req.price.is_finite() && req.price > 0.0) {
        return Err(AppError::ValidationError(format!("price must be positive, got {}", req.price)));
    }
    let group = match req.group {
        Some(group) => group,
        None => state
            .dataset
            .groups
            .group_for_price(req.price, req.params.weight_g)
            .ok_or_else(|| {
                AppError::NotFoundError(format!(
                    "No group accepts {} g at price {}",
                    req.params.weight_g, req.price
                ))
            })?,
    };

    let params = req.params.clone();
    let items = state
        .offload
        .compute_list(ComputeListRequest { price: req.price, group, params: req.params })
        .await
        .into_iter()
        .filter(|item| {
            params.carrier.as_deref().map_or(true, |c| item.carrier == c)
                && params.tier.as_deref().map_or(true, |t| item.tier == t)
                && params.delivery.map_or(true, |d| item.delivery == d)
        })
        .collect();
    Ok(Json(BreakdownResponse { group, items }))
}

/// POST /v1/pricing/range
async fn price_range(
    State(state): State<AppState>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<PriceRange>, AppError> {
    validate_params(&req.params).map_err(AppError::invalid)?;
    let rule = state.dataset.groups.rule_or_fallback(req.group);
    Ok(Json(price_range_for_margin(
        &req.params,
        &req.pricing,
        &rule,
        req.respect_group_bound,
    )))
}

/// POST /v1/pricing/solve
async fn solve(Json(req): Json<SolveRequest>) -> Result<Json<SolveResponse>, AppError> {
    if !req.target.is_finite() {
        return Err(AppError::ValidationError("target must be a finite number".to_string()));
    }
    let solver = InverseSolver::new(&req.params, &req.pricing).map_err(AppError::invalid)?;
    Ok(Json(SolveResponse { target: req.target, roots: solver.roots(req.target) }))
}
