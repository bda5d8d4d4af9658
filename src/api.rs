//! HTTP API for the Pricing Engine.
//!
//! This module exposes the engine to the site's calculator components
//! using the [`axum`](https://crates.io/crates/axum) framework.  Input
//! is validated here, since the engine itself assumes well-formed
//! numbers.  Plan catalogs are loaded once at start-up and shared
//! through [`AppState`].

use crate::compare::PlanCatalog;
use crate::config::{load_catalogs_from_dir, AppConfig, DEFAULT_CATALOG};
use crate::engine::{PricingEngine, TierRow};
use crate::error::PricingError;
use crate::models::{PlanComparison, PricingRequest, PricingResult};
use anyhow::Result;
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Application state shared across requests.
pub struct AppState {
    pub engine: PricingEngine,
    pub catalogs: RwLock<HashMap<String, PlanCatalog>>,
}

impl AppState {
    pub fn new(engine: PricingEngine, catalogs: HashMap<String, PlanCatalog>) -> Self {
        Self {
            engine,
            catalogs: RwLock::new(catalogs),
        }
    }
}

/// Body of `POST /api/compare`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub annual_revenue: f64,
    pub location_count: u32,
    /// Catalog name; `standard` when omitted.
    #[serde(default)]
    pub catalog: Option<String>,
    /// Whether Launch is sold at all right now; defaults to true.
    #[serde(default)]
    pub is_launch_available: Option<bool>,
}

impl CompareRequest {
    fn validate(&self) -> Result<(), PricingError> {
        if !self.annual_revenue.is_finite() || self.annual_revenue < 0.0 {
            return Err(PricingError::InvalidInput(format!(
                "annual revenue must be a non-negative finite number, got {}",
                self.annual_revenue
            )));
        }
        if self.location_count == 0 {
            return Err(PricingError::InvalidInput(
                "location count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Build the API router around an existing state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/pricing", post(pricing_handler))
        .route("/api/pricing/batch", post(batch_handler))
        .route("/api/compare", post(compare_handler))
        .route("/api/tiers", get(tiers_handler))
        .route("/api/catalogs", get(catalogs_handler))
        .with_state(state)
}

/// Build the API router, loading rate tables and plan catalogs as the
/// configuration directs.  Returns the router and a handle to the
/// state.
pub fn build_router(config: &AppConfig) -> Result<(Router, Arc<AppState>)> {
    let engine = PricingEngine::new(config.pricing_config()?);
    let catalogs = load_catalogs_from_dir(&config.plan_dir)?;
    info!("{} plan catalog(s) available", catalogs.len());
    let state = Arc::new(AppState::new(engine, catalogs));
    Ok((router(state.clone()), state))
}

/// Handler for POST /api/pricing
async fn pricing_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<PricingRequest>,
) -> Result<Json<PricingResult>, PricingError> {
    request.revenues.validate()?;
    let result = app_state
        .engine
        .calculate_pricing(&request.revenues, &request.options);
    debug!(tier = result.tier, total = result.total, "priced request");
    Ok(Json(result))
}

/// Handler for POST /api/pricing/batch
async fn batch_handler(
    State(app_state): State<Arc<AppState>>,
    Json(requests): Json<Vec<PricingRequest>>,
) -> Result<Json<Vec<PricingResult>>, PricingError> {
    for (index, request) in requests.iter().enumerate() {
        request.revenues.validate().map_err(|err| {
            PricingError::InvalidInput(format!("request {}: {}", index, err))
        })?;
    }
    debug!(count = requests.len(), "pricing batch");
    // The rayon pool would otherwise occupy a runtime worker.
    let engine = app_state.engine;
    let results = tokio::task::spawn_blocking(move || engine.calculate_batch(requests))
        .await
        .map_err(|err| PricingError::Internal(format!("batch pricing task failed: {}", err)))?;
    Ok(Json(results))
}

/// Handler for POST /api/compare
async fn compare_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<CompareRequest>,
) -> Result<Json<PlanComparison>, PricingError> {
    request.validate()?;
    let name = request.catalog.as_deref().unwrap_or(DEFAULT_CATALOG);
    let catalogs = app_state.catalogs.read().await;
    let catalog = catalogs
        .get(name)
        .ok_or_else(|| PricingError::UnknownCatalog(name.to_string()))?;
    Ok(Json(catalog.compare(
        &app_state.engine,
        request.annual_revenue,
        request.location_count,
        request.is_launch_available.unwrap_or(true),
    )))
}

/// Handler for GET /api/tiers
async fn tiers_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<TierRow>> {
    Json(app_state.engine.tier_table())
}

/// Handler for GET /api/catalogs
async fn catalogs_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<String>> {
    let catalogs = app_state.catalogs.read().await;
    let mut names: Vec<String> = catalogs.keys().cloned().collect();
    names.sort();
    Json(names)
}

/// Launch the API server.  This function builds the router from the
/// configuration and binds to the configured address.  It blocks until
/// the server terminates.
pub async fn serve(config: AppConfig) -> Result<()> {
    let (router, _state) = build_router(&config)?;
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server listening on {}", config.bind_addr);
    axum::serve(listener, router).await?;
    Ok(())
}
