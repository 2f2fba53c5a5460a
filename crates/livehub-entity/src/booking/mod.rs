//! Booking ledger entities.

pub mod model;
pub mod reservation;
pub mod status;

pub use model::Booking;
pub use reservation::{Reservation, Reserved};
pub use status::BookingStatus;
