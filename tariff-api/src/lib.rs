use axum::{extract::State, http::Method, routing::get, Json, Router};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod catalog;
pub mod charts;
pub mod client;
pub mod error;
pub mod pricing;
pub mod state;
pub mod worker;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::USER_AGENT]);

    Router::new()
        .route("/health", get(health))
        .merge(catalog::routes())
        .merge(pricing::routes())
        .merge(charts::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "groups": state.dataset.groups.rules().len(),
        "rates": state.dataset.rates.len(),
        "worker": state.config.worker.enabled,
        "time": chrono::Utc::now().to_rfc3339(),
    }))
}
