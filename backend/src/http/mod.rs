//! HTTP server module.
//!
//! Exposes the forecasting service as a small REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Query validation                                       │
//! │  - JSON serialization, error mapping                      │
//! │  - CORS, gzip compression, request tracing                │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Service Layer (services::ForecastService)                │
//! │  - Result cache                                           │
//! │  - Forecast pipelines on the blocking pool                │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Upstream (upstream::StarHistorySource)                   │
//! │  - Star-history provider over HTTP                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;

pub mod error;

pub mod handlers;

pub mod router;

pub mod state;

pub use router::create_router;

pub use state::AppState;
