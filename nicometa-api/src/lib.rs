//! nicometa HTTP API
//!
//! Exposes the video lookup pipeline as `GET /video/{id}`.

pub mod http;

pub use http::{create_router, AppState};
