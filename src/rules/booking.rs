//! Booking validity rules and derived device/booking state
//!
//! Everything here is pure: callers load the device's bookings (inside the
//! write transaction that holds the device lock) and pass `today` in.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::booking::{Booking, BookingCandidate};

/// Why a booking cannot be saved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("End of booking must come after its start")]
    DateOrder,

    #[error("Conflicting booking #{conflicting_id} found on record ({date_from} --> {date_to})")]
    Overlap {
        conflicting_id: i32,
        date_from: NaiveDate,
        date_to: NaiveDate,
    },

    #[error("A device cannot be marked as returned before the end of the booking ({date_to})")]
    PrematureReturn { date_to: NaiveDate },
}

/// Inclusive range intersection: sharing a single day counts.
fn ranges_intersect(candidate: &BookingCandidate<'_>, other: &Booking) -> bool {
    candidate.date_from <= other.date_to && candidate.date_to >= other.date_from
}

/// Check a candidate against the bookings already on record.
///
/// Checks run in order and stop at the first failure: date order, overlap
/// with another booking of the same device, then premature return.
/// `existing` may contain the candidate itself (matched by id) and bookings
/// of other devices; both are ignored.
pub fn validate(
    candidate: &BookingCandidate<'_>,
    existing: &[Booking],
    today: NaiveDate,
) -> Result<(), Violation> {
    if candidate.date_from > candidate.date_to {
        return Err(Violation::DateOrder);
    }

    let conflict = existing.iter().find(|other| {
        other.device_id == candidate.device_id
            && Some(other.id) != candidate.id
            && ranges_intersect(candidate, other)
    });
    if let Some(other) = conflict {
        return Err(Violation::Overlap {
            conflicting_id: other.id,
            date_from: other.date_from,
            date_to: other.date_to,
        });
    }

    if candidate.returned && today < candidate.date_to {
        return Err(Violation::PrematureReturn {
            date_to: candidate.date_to,
        });
    }

    Ok(())
}

/// A device is free when none of its bookings is still out.
pub fn is_free(device_id: &str, bookings: &[Booking]) -> bool {
    !bookings
        .iter()
        .any(|b| b.device_id == device_id && !b.returned)
}

/// Person holding the device: the unreturned booking ending last wins.
pub fn current_holder(device_id: &str, bookings: &[Booking]) -> Option<i32> {
    bookings
        .iter()
        .filter(|b| b.device_id == device_id && !b.returned)
        .max_by_key(|b| (b.date_to, b.id))
        .map(|b| b.person_id)
}

pub fn is_overdue(booking: &Booking, today: NaiveDate) -> bool {
    !booking.returned && today >= booking.date_to
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn booking(id: i32, person_id: i32, device: &str, from: NaiveDate, to: NaiveDate) -> Booking {
        Booking {
            id,
            person_id,
            device_id: device.to_string(),
            date_from: from,
            date_to: to,
            returned: false,
            notes: None,
        }
    }

    fn candidate(device: &str, from: NaiveDate, to: NaiveDate) -> BookingCandidate<'_> {
        BookingCandidate {
            id: None,
            person_id: 2,
            device_id: device,
            date_from: from,
            date_to: to,
            returned: false,
        }
    }

    #[test]
    fn test_date_order() {
        let c = candidate("D001", day(2024, 2, 5), day(2024, 2, 1));
        assert_eq!(validate(&c, &[], day(2024, 1, 1)), Err(Violation::DateOrder));
    }

    #[test]
    fn test_date_order_wins_over_overlap_and_return() {
        let existing = vec![booking(1, 1, "D001", day(2024, 1, 1), day(2024, 12, 31))];
        let mut c = candidate("D001", day(2024, 2, 5), day(2024, 2, 1));
        c.returned = true;
        assert_eq!(validate(&c, &existing, day(2024, 1, 1)), Err(Violation::DateOrder));
    }

    #[test]
    fn test_single_day_booking_is_valid() {
        let c = candidate("D001", day(2024, 3, 1), day(2024, 3, 1));
        assert_eq!(validate(&c, &[], day(2024, 1, 1)), Ok(()));
    }

    #[test]
    fn test_shared_day_overlaps() {
        let existing = vec![booking(1, 1, "D001", day(2024, 1, 1), day(2024, 1, 10))];

        let c = candidate("D001", day(2024, 1, 10), day(2024, 1, 15));
        assert_eq!(
            validate(&c, &existing, day(2024, 1, 1)),
            Err(Violation::Overlap {
                conflicting_id: 1,
                date_from: day(2024, 1, 1),
                date_to: day(2024, 1, 10),
            })
        );

        let c = candidate("D001", day(2024, 1, 11), day(2024, 1, 15));
        assert_eq!(validate(&c, &existing, day(2024, 1, 1)), Ok(()));
    }

    #[test]
    fn test_overlap_ending_on_first_day() {
        let existing = vec![booking(1, 1, "D001", day(2024, 1, 10), day(2024, 1, 20))];
        let c = candidate("D001", day(2024, 1, 5), day(2024, 1, 10));
        assert!(matches!(
            validate(&c, &existing, day(2024, 1, 1)),
            Err(Violation::Overlap { conflicting_id: 1, .. })
        ));
    }

    #[test]
    fn test_enclosing_range_overlaps() {
        let existing = vec![booking(3, 1, "D001", day(2024, 1, 5), day(2024, 1, 6))];
        let c = candidate("D001", day(2024, 1, 1), day(2024, 1, 31));
        assert!(matches!(
            validate(&c, &existing, day(2024, 1, 1)),
            Err(Violation::Overlap { conflicting_id: 3, .. })
        ));
    }

    #[test]
    fn test_other_devices_are_ignored() {
        let existing = vec![booking(1, 1, "D002", day(2024, 1, 1), day(2024, 1, 10))];
        let c = candidate("D001", day(2024, 1, 1), day(2024, 1, 10));
        assert_eq!(validate(&c, &existing, day(2024, 1, 1)), Ok(()));
    }

    #[test]
    fn test_returned_bookings_still_block_their_dates() {
        let mut old = booking(1, 1, "D001", day(2024, 1, 1), day(2024, 1, 10));
        old.returned = true;
        let c = candidate("D001", day(2024, 1, 5), day(2024, 1, 8));
        assert!(matches!(
            validate(&c, &[old], day(2024, 2, 1)),
            Err(Violation::Overlap { .. })
        ));
    }

    #[test]
    fn test_booking_never_conflicts_with_itself() {
        let stored = booking(5, 1, "D001", day(2024, 1, 1), day(2024, 1, 10));
        let mut edited = stored.clone();
        edited.date_to = day(2024, 1, 12);
        let existing = vec![stored];
        assert_eq!(validate(&edited.as_candidate(), &existing, day(2024, 1, 1)), Ok(()));
    }

    #[test]
    fn test_edit_still_conflicts_with_others() {
        let existing = vec![
            booking(5, 1, "D001", day(2024, 1, 1), day(2024, 1, 10)),
            booking(6, 2, "D001", day(2024, 1, 15), day(2024, 1, 20)),
        ];
        let mut edited = existing[0].clone();
        edited.date_to = day(2024, 1, 15);
        assert!(matches!(
            validate(&edited.as_candidate(), &existing, day(2024, 1, 1)),
            Err(Violation::Overlap { conflicting_id: 6, .. })
        ));
    }

    #[test]
    fn test_premature_return() {
        let mut c = candidate("D001", day(2024, 1, 1), day(2024, 1, 10));
        c.returned = true;

        assert_eq!(
            validate(&c, &[], day(2024, 1, 9)),
            Err(Violation::PrematureReturn { date_to: day(2024, 1, 10) })
        );
        assert_eq!(validate(&c, &[], day(2024, 1, 10)), Ok(()));
        assert_eq!(validate(&c, &[], day(2024, 3, 1)), Ok(()));
    }

    #[test]
    fn test_overlap_checked_before_return() {
        let existing = vec![booking(1, 1, "D001", day(2024, 1, 1), day(2024, 1, 10))];
        let mut c = candidate("D001", day(2024, 1, 5), day(2024, 1, 20));
        c.returned = true;
        assert!(matches!(
            validate(&c, &existing, day(2024, 1, 2)),
            Err(Violation::Overlap { .. })
        ));
    }

    #[test]
    fn test_device_without_bookings_is_free() {
        assert!(is_free("D001", &[]));
        assert_eq!(current_holder("D001", &[]), None);
    }

    #[test]
    fn test_device_with_active_booking() {
        let mut returned = booking(1, 10, "D001", day(2024, 1, 1), day(2024, 1, 10));
        returned.returned = true;
        let active = booking(2, 20, "D001", day(2024, 1, 11), day(2024, 1, 20));
        let bookings = vec![returned, active];

        assert!(!is_free("D001", &bookings));
        assert_eq!(current_holder("D001", &bookings), Some(20));
        assert!(is_free("D002", &bookings));
    }

    #[test]
    fn test_holder_is_latest_unreturned() {
        let bookings = vec![
            booking(1, 10, "D001", day(2024, 3, 1), day(2024, 3, 31)),
            booking(2, 20, "D001", day(2024, 1, 1), day(2024, 1, 31)),
        ];
        assert_eq!(current_holder("D001", &bookings), Some(10));
    }

    #[test]
    fn test_overdue() {
        let mut b = booking(1, 1, "D001", day(2024, 1, 1), day(2024, 1, 10));
        assert!(!is_overdue(&b, day(2024, 1, 9)));
        assert!(is_overdue(&b, day(2024, 1, 10)));
        assert!(is_overdue(&b, day(2024, 2, 1)));

        b.returned = true;
        assert!(!is_overdue(&b, day(2024, 2, 1)));
    }
}
