//! Bookings service

use chrono::NaiveDate;
use validator::Validate;

use crate::{
    error::AppResult,
    models::{
        booking::{BookingDetails, BookingQuery, BookingRow, CreateBooking, UpdateBooking},
        claims::UserClaims,
        person::PersonRef,
    },
    repository::Repository,
    rules,
};

use super::{today, trim, trim_opt};

#[derive(Clone)]
pub struct BookingsService {
    repository: Repository,
}

impl BookingsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &BookingQuery) -> AppResult<(Vec<BookingDetails>, i64)> {
        let (rows, total) = self.repository.bookings.list(query).await?;
        let today = today();
        Ok((rows.into_iter().map(|r| details(r, today)).collect(), total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookingDetails> {
        let row = self.repository.bookings.get_by_id(id).await?;
        Ok(details(row, today()))
    }

    /// Booking history of one device
    pub async fn for_device(&self, asset_num: &str) -> AppResult<Vec<BookingDetails>> {
        // 404 for unknown devices rather than an empty list
        self.repository.devices.get_by_id(asset_num).await?;
        let rows = self.repository.bookings.for_device(asset_num).await?;
        let today = today();
        Ok(rows.into_iter().map(|r| details(r, today)).collect())
    }

    pub async fn create(&self, actor: &UserClaims, mut data: CreateBooking) -> AppResult<BookingDetails> {
        trim(&mut data.device_id);
        data.validate()?;
        let booking = self.repository.bookings.create(actor, &data, today()).await?;
        self.get_by_id(booking.id).await
    }

    pub async fn update(
        &self,
        actor: &UserClaims,
        id: i32,
        mut data: UpdateBooking,
    ) -> AppResult<BookingDetails> {
        trim_opt(&mut data.device_id);
        data.validate()?;
        let booking = self.repository.bookings.update(actor, id, &data, today()).await?;
        self.get_by_id(booking.id).await
    }

    /// Mark a booking as returned
    pub async fn return_booking(&self, actor: &UserClaims, id: i32) -> AppResult<BookingDetails> {
        let booking = self.repository.bookings.mark_returned(actor, id, today()).await?;
        tracing::info!(booking_id = booking.id, device = %booking.device_id, "Device returned");
        self.get_by_id(booking.id).await
    }

    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        self.repository.bookings.delete(actor, id).await
    }
}

/// Display shape of a booking row
fn details(row: BookingRow, today: NaiveDate) -> BookingDetails {
    let overdue = rules::is_overdue(&row.booking, today);
    let booking = row.booking;
    BookingDetails {
        id: booking.id,
        person: PersonRef {
            id: booking.person_id,
            full_name: format!("{} {}", row.person_first_name, row.person_last_name),
        },
        device: format!("[{}] {} {}", booking.device_id, row.device_brand, row.device_model),
        device_id: booking.device_id,
        date_from: booking.date_from,
        date_to: booking.date_to,
        returned: booking.returned,
        overdue,
        notes: booking.notes,
    }
}
