//! HTTP API server with observability for the shopping cart service.
//!
//! Provides REST endpoints for cart management, with structured logging
//! (tracing) and Prometheus metrics. Customer identity comes from the
//! `x-customer-id` header via the [`identity::CustomerIdentity`]
//! extractor.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use cart_store::CartStore;
use domain::CartService;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use routes::cart::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S: CartStore + 'static>(
    state: Arc<AppState<S>>,
    metrics_handle: PrometheusHandle,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/cart", get(routes::cart::get_cart::<S>))
        .route("/cart/items", post(routes::cart::add_item::<S>))
        .route(
            "/cart/items/{product_id}",
            put(routes::cart::update_item::<S>).delete(routes::cart::remove_item::<S>),
        )
        .route("/cart/voucher", post(routes::cart::apply_voucher::<S>))
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

/// Creates the default application state around the given store.
pub fn create_default_state<S: CartStore + 'static>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        cart_service: CartService::new(store),
    })
}
