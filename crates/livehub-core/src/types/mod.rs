//! Core type definitions used across the LiveHub workspace.

pub mod id;
pub mod window;

pub use id::*;
pub use window::{Interval, Window};
