// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::feature_service::FeatureService;
use crate::application::subquery_resolver::{ResolverMachine, SubqueryResolver};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::http_repository::HttpMetadataRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    expand_group, get_explorer, get_feature, health_check, open_feature,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let app_config = load_app_config()?;
    let options = app_config.extraction.to_options();
    let default_stack = app_config.agent.default_stack.clone();

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpMetadataRepository::new(
        app_config.stacks,
        app_config.agent.query_template,
        app_config.agent.token,
    ));

    // Create services (application layer)
    let feature_service =
        FeatureService::new(repository.clone(), options.clone(), default_stack.clone());
    let explorer =
        SubqueryResolver::spawn(repository, ResolverMachine::new(options, default_stack));

    // Create application state
    let state = Arc::new(AppState {
        feature_service,
        explorer,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/features", get(get_feature))
        .route("/explorer", get(get_explorer))
        .route("/explorer/open", post(open_feature))
        .route("/explorer/expand", post(expand_group))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config.server.bind.parse()?;
    tracing::info!("Starting feature-info service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
