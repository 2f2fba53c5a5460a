//! # livehub-core
//!
//! Core crate for LiveHub. Contains the collaborator traits (meeting
//! provider, clock), configuration schemas, typed identifiers, the
//! scheduling [`Window`](types::window::Window), meeting lifecycle events,
//! and the unified error system.
//!
//! This crate has **no** internal dependencies on other LiveHub crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
