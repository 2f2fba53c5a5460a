//! # livehub-entity
//!
//! Domain entity models for LiveHub. Every struct in this crate represents
//! a database table row or a domain value object. Row types derive
//! `sqlx::FromRow` and carry plain values only: no navigation into the
//! lesson or course graph of the surrounding LMS.

pub mod booking;
pub mod license;
