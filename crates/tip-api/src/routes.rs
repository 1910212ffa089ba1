//! # Routes
//!
//! Axum router configuration for the donation API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - GET  /health - Health check
/// - POST /api/v1/checkout - Create a donation checkout session
/// - GET  /api/v1/donations - List the most recent donations
/// - POST /webhook/stripe - Stripe completion webhook (raw body)
pub fn create_router(state: AppState) -> Router {
    // The donation page is typically served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/checkout", post(handlers::create_checkout))
        .route("/donations", get(handlers::list_donations));

    // Webhook routes must receive the body untouched; no CORS needed since
    // the caller is the gateway, not a browser
    let webhook_routes = Router::new().route("/stripe", post(handlers::stripe_webhook));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .nest("/webhook", webhook_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
