//! Who may write which booking

use thiserror::Error;

use crate::models::{booking::BookingCandidate, claims::UserClaims};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessViolation {
    #[error("You cannot assign a booking to another consultant")]
    AssignOther,

    #[error("Only delivery managers are allowed to mark a device as returned")]
    ReturnNotAllowed,
}

/// Consultants may only book for themselves and never mark a return;
/// delivery managers and admins are unrestricted.
pub fn authorize_booking_write(
    actor: &UserClaims,
    candidate: &BookingCandidate<'_>,
) -> Result<(), AccessViolation> {
    if actor.is_privileged() {
        return Ok(());
    }
    if candidate.person_id != actor.person_id {
        return Err(AccessViolation::AssignOther);
    }
    if candidate.returned {
        return Err(AccessViolation::ReturnNotAllowed);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Role;
    use chrono::NaiveDate;

    fn actor(role: Role) -> UserClaims {
        UserClaims {
            sub: "consultant".to_string(),
            person_id: 3,
            role,
            is_admin: false,
            exp: 0,
            iat: 0,
        }
    }

    fn candidate(person_id: i32, returned: bool) -> BookingCandidate<'static> {
        BookingCandidate {
            id: None,
            person_id,
            device_id: "D001",
            date_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
            returned,
        }
    }

    #[test]
    fn test_consultant_books_for_self() {
        let sc = actor(Role::SecurityConsultant);
        assert_eq!(authorize_booking_write(&sc, &candidate(3, false)), Ok(()));
        assert_eq!(
            authorize_booking_write(&sc, &candidate(4, false)),
            Err(AccessViolation::AssignOther)
        );
    }

    #[test]
    fn test_consultant_cannot_return() {
        let sc = actor(Role::SecurityConsultant);
        assert_eq!(
            authorize_booking_write(&sc, &candidate(3, true)),
            Err(AccessViolation::ReturnNotAllowed)
        );
    }

    #[test]
    fn test_manager_and_admin_unrestricted() {
        let ec = actor(Role::DeliveryManager);
        assert_eq!(authorize_booking_write(&ec, &candidate(9, true)), Ok(()));

        let mut admin = actor(Role::SecurityConsultant);
        admin.is_admin = true;
        assert_eq!(authorize_booking_write(&admin, &candidate(9, true)), Ok(()));
    }
}
