//! Booking model and related types

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::OsName;
use super::person::PersonRef;

/// Reservation of one device by one person over an inclusive date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Booking {
    pub id: i32,
    pub person_id: i32,
    /// Asset number of the booked device
    pub device_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub returned: bool,
    pub notes: Option<String>,
}

impl Booking {
    /// Candidate view of a stored booking, used when it is re-validated
    pub fn as_candidate(&self) -> BookingCandidate<'_> {
        BookingCandidate {
            id: Some(self.id),
            person_id: self.person_id,
            device_id: &self.device_id,
            date_from: self.date_from,
            date_to: self.date_to,
            returned: self.returned,
        }
    }
}

/// A booking about to be written: new (`id` is `None`) or edited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingCandidate<'a> {
    pub id: Option<i32>,
    pub person_id: i32,
    pub device_id: &'a str,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub returned: bool,
}

/// Booking with person, device and overdue state for display
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookingDetails {
    pub id: i32,
    pub person: PersonRef,
    pub device_id: String,
    /// "[asset] brand model"
    pub device: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub returned: bool,
    pub overdue: bool,
    pub notes: Option<String>,
}

/// Row shape of the booking list query
#[derive(Debug, Clone, FromRow)]
pub struct BookingRow {
    #[sqlx(flatten)]
    pub booking: Booking,
    pub person_first_name: String,
    pub person_last_name: String,
    pub device_brand: String,
    pub device_model: String,
}

/// Booking query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookingQuery {
    /// OS of the booked device
    pub os_name: Option<OsName>,
    /// Office of the booked device
    pub office_id: Option<i32>,
    pub returned: Option<bool>,
    pub person_id: Option<i32>,
    pub device_id: Option<String>,
    /// date_from >= this day
    pub from_after: Option<NaiveDate>,
    /// date_from <= this day
    pub from_before: Option<NaiveDate>,
    /// date_to >= this day
    pub to_after: Option<NaiveDate>,
    /// date_to <= this day
    pub to_before: Option<NaiveDate>,
    /// Matches person last name, asset number or serial number
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create booking request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBooking {
    pub person_id: i32,
    #[validate(length(min = 1, max = 50))]
    pub device_id: String,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub returned: bool,
    pub notes: Option<String>,
}

/// Update booking request; omitted fields keep their stored value and an
/// empty `notes` clears it
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBooking {
    pub person_id: Option<i32>,
    #[validate(length(min = 1, max = 50))]
    pub device_id: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub returned: Option<bool>,
    pub notes: Option<String>,
}

impl UpdateBooking {
    /// Stored booking with this request's changes applied
    pub fn apply_to(&self, current: &Booking) -> Booking {
        Booking {
            id: current.id,
            person_id: self.person_id.unwrap_or(current.person_id),
            device_id: self.device_id.clone().unwrap_or_else(|| current.device_id.clone()),
            date_from: self.date_from.unwrap_or(current.date_from),
            date_to: self.date_to.unwrap_or(current.date_to),
            returned: self.returned.unwrap_or(current.returned),
            notes: super::merge_nullable(&self.notes, &current.notes),
        }
    }
}
