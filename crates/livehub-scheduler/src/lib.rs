//! # livehub-scheduler
//!
//! Assigns meeting licenses to live-class bookings so that no license ever
//! hosts two overlapping meetings.
//!
//! - [`availability`] answers "which licenses are free for this window".
//! - [`allocator`] drives the booking lifecycle: validate, pick a license,
//!   bind it atomically, materialize the remote meeting, and tear it down.
//! - [`ledger`] is the persistent record of bookings the other two read
//!   and write through.

pub mod allocator;
pub mod availability;
pub mod ledger;

pub use allocator::{BookingResult, LicenseAllocator, ScheduleRequest};
pub use availability::{AvailabilityResolver, PoolUsage};
pub use ledger::{BookingLedger, LedgerDispatch, MemoryLedger, PgLedger};
