//! License pool entities.

pub mod model;

pub use model::{CreateLicense, License};
