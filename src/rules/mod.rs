//! Booking business rules, independent of storage and HTTP

pub mod access;
pub mod booking;

pub use access::{authorize_booking_write, AccessViolation};
pub use booking::{current_holder, is_free, is_overdue, validate, Violation};
