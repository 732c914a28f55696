use anyhow::Result;
use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Form, Json, Router};
use relevance_core::tokenizer::tokenize;
use relevance_core::{IndexStore, RankedDoc, SearchConfig, SearchEngine, SearchError, SledStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Upper bound on `k` accepted from clients.
const MAX_K: usize = 100;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub k: Option<usize>,
}

#[derive(Deserialize)]
pub struct QueryForm {
    pub user_input: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub tokens: Vec<String>,
    pub took_s: f64,
    pub total_hits: usize,
    pub results: Vec<RankedDoc>,
}

#[derive(Clone)]
pub struct AppState {
    pub engine: SearchEngine,
}

/// Opens the sled index at `db_path` and builds the router around it.
pub fn build_app(db_path: &str, config: SearchConfig) -> Result<Router> {
    let store = SledStore::open(db_path)?;
    tracing::info!(db_path, "opened index store");
    Ok(build_app_with_store(Arc::new(store), config))
}

pub fn build_app_with_store(store: Arc<dyn IndexStore>, config: SearchConfig) -> Router {
    let app_state = AppState { engine: SearchEngine::new(store, config) };

    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/query", post(query_handler))
        .with_state(app_state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn error_response(err: SearchError) -> (StatusCode, String) {
    let status = match err {
        SearchError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::DocumentNotFound(_) | SearchError::MalformedRecord { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::error!(error = %err, %status, "query failed");
    (status, err.to_string())
}

pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, (StatusCode, String)> {
    let start = std::time::Instant::now();
    let tokens = tokenize(&params.q);
    let k = params.k.unwrap_or(state.engine.config().top_k).clamp(1, MAX_K);
    let outcome = state.engine.query(&tokens, k).await.map_err(error_response)?;
    let took_s = start.elapsed().as_secs_f64();
    tracing::info!(query = %params.q, total_hits = outcome.total_hits, took_s, "search");
    Ok(Json(SearchResponse { query: params.q, tokens, took_s, total_hits: outcome.total_hits, results: outcome.results }))
}

/// Form-posted query returning `[docid, score]` pairs for the configured top-K.
pub async fn query_handler(
    State(state): State<AppState>,
    Form(form): Form<QueryForm>,
) -> Result<Json<Vec<(String, f64)>>, (StatusCode, String)> {
    let tokens = tokenize(form.user_input.trim());
    let ranked = state.engine.search_top(&tokens).await.map_err(error_response)?;
    Ok(Json(ranked.into_iter().map(|r| (r.docid, r.score)).collect()))
}
