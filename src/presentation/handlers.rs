// HTTP request handlers
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::json_mapper::{expansion_to_json, feature_to_json, snapshot_to_json};
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const LONG_POLL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
pub struct FeatureQuery {
    pub iri: String,
    pub stack: Option<String>,
}

#[derive(Deserialize)]
pub struct ExplorerQuery {
    pub after: Option<u64>,
}

#[derive(Deserialize)]
pub struct OpenRequest {
    pub iri: String,
    pub stack: Option<String>,
}

#[derive(Deserialize)]
pub struct ExpandRequest {
    /// Group names from the root of the current tree.
    #[serde(default)]
    pub path: Vec<String>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Fetch and transform one feature's metadata
pub async fn get_feature(
    Query(query): Query<FeatureQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let compress = accepts_brotli(&headers);

    let (status, body) = match state
        .feature_service
        .get_feature(&query.iri, query.stack.as_deref())
        .await
    {
        Ok(feature) => (StatusCode::OK, json!(feature_to_json(&feature))),
        Err(e) => {
            tracing::error!("Error fetching metadata for {}: {:#}", query.iri, e);
            (StatusCode::BAD_GATEWAY, json!({ "error": format!("{e:#}") }))
        }
    };

    match json_response(status, &body, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Current explorer tree and resolver state.
///
/// With `?after=N` the request waits until more than `N` fetches have settled.
pub async fn get_explorer(
    Query(query): Query<ExplorerQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let snapshot = match query.after {
        Some(after) => {
            let mut updates = state.explorer.subscribe();
            let settled = updates.wait_for(|s| s.revision > after);
            let waited = tokio::time::timeout(LONG_POLL_TIMEOUT, settled).await;
            match waited {
                Ok(Ok(snapshot)) => snapshot.clone(),
                _ => state.explorer.snapshot(),
            }
        }
        None => state.explorer.snapshot(),
    };

    let body = snapshot_to_json(&snapshot);
    match json_response(StatusCode::OK, &body, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

/// Load a root document into the explorer; poll `/explorer` for the result
pub async fn open_feature(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenRequest>,
) -> impl IntoResponse {
    match state.explorer.open(request.iri, request.stack).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            tracing::error!("Explorer unavailable: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Expand the group at `path` in the explorer's current tree
pub async fn expand_group(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExpandRequest>,
) -> impl IntoResponse {
    let snapshot = state.explorer.snapshot();
    let Some(group) = snapshot.tree.attributes.find_group(request.path.as_slice()) else {
        let body = json!({ "error": format!("No group at {}", request.path.join("/")) });
        return match json_response(StatusCode::NOT_FOUND, &body, false).await {
            Ok(response) => response,
            Err(status) => status.into_response(),
        };
    };

    match state.explorer.expand(group).await {
        Ok(expansion) => {
            let body = expansion_to_json(&expansion);
            match json_response(StatusCode::OK, &body, false).await {
                Ok(response) => response,
                Err(status) => status.into_response(),
            }
        }
        Err(e) => {
            tracing::error!("Explorer unavailable: {}", e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}
