//! HTTP API server with observability for the product catalog.
//!
//! Provides REST endpoints for product commands and queries, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use application::ProductService;
use axum::Router;
use axum::routing::{get, post};
use common::Clock;
use metrics_exporter_prometheus::PrometheusHandle;
use queries::ProductQueries;
use store::{OutboxReader, OutboxRepository, PlanApplier, ProductReadModel, ProductRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::products::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/products",
            post(routes::products::create).get(routes::products::list),
        )
        .route(
            "/products/{id}",
            get(routes::products::get).patch(routes::products::update),
        )
        .route("/products/{id}/activate", post(routes::products::activate))
        .route(
            "/products/{id}/deactivate",
            post(routes::products::deactivate),
        )
        .route("/products/{id}/archive", post(routes::products::archive))
        .route(
            "/products/{id}/discount",
            post(routes::products::apply_discount).delete(routes::products::remove_discount),
        )
        .route("/products/{id}/events", get(routes::products::events))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Wires the command service, query handlers and outbox reader over one store.
///
/// The same store backs every port, so commands and queries observe the same
/// tables.
pub fn build_state<S>(store: Arc<S>, clock: Arc<dyn Clock>) -> Arc<AppState>
where
    S: ProductRepository
        + OutboxRepository
        + PlanApplier
        + ProductReadModel
        + OutboxReader
        + 'static,
{
    let commands = ProductService::new(
        store.clone() as Arc<dyn ProductRepository>,
        store.clone() as Arc<dyn OutboxRepository>,
        store.clone() as Arc<dyn PlanApplier>,
        clock.clone(),
    );
    let queries = ProductQueries::new(store.clone() as Arc<dyn ProductReadModel>, clock);

    Arc::new(AppState {
        commands,
        queries,
        outbox: store as Arc<dyn OutboxReader>,
    })
}
