//! # livehub-api
//!
//! HTTP API layer for LiveHub built on Axum.
//!
//! Exposes lesson meeting scheduling, availability lookups and license
//! pool administration as JSON endpoints under `/api`.

pub mod app;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_allocator, build_app, build_state, run_server, serve};
pub use state::AppState;
