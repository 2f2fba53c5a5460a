//! HTTP middleware layers.

pub mod compression;
pub mod cors;
pub mod logging;
