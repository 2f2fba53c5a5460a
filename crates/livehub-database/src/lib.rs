//! # livehub-database
//!
//! PostgreSQL connection management, migrations, and concrete repository
//! implementations for licenses and bookings.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
