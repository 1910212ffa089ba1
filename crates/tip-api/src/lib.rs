//! # tip-api
//!
//! HTTP API layer for tipjar-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Checkout initiation and donation listing endpoints
//! - The webhook settlement handler
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/checkout` | Create a donation checkout session |
//! | GET | `/api/v1/donations` | List recent donations |
//! | POST | `/webhook/stripe` | Stripe completion webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
