//! Data models

pub mod audit;
pub mod booking;
pub mod claims;
pub mod device;
pub mod enums;
pub mod location;
pub mod person;

// Re-export commonly used types
pub use audit::{AuditEntry, NewAuditEntry};
pub use booking::{Booking, BookingCandidate, BookingDetails};
pub use claims::UserClaims;
pub use device::{Device, DeviceSummary};
pub use enums::{ActionFlag, ContentType, OsName, Role};
pub use location::Location;
pub use person::{Account, Person, PersonRef, PersonShort};

/// New value of a nullable text column under a partial update: omitted keeps
/// the stored value, an empty string clears it.
pub fn merge_nullable(update: &Option<String>, current: &Option<String>) -> Option<String> {
    match update.as_deref() {
        None => current.clone(),
        Some("") => None,
        Some(value) => Some(value.to_string()),
    }
}
