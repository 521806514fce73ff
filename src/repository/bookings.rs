//! Bookings repository
//!
//! Writes run in one transaction: lock the device row, read the device's
//! bookings, apply the access policy and validity rules, write the booking
//! and its audit entry, commit.

use chrono::NaiveDate;
use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{
    audit::AuditRepository, change_message, devices::DevicesRepository, like_pattern, page_bounds,
    persons::PersonsRepository,
};
use crate::{
    error::{AppError, AppResult},
    models::{
        audit::NewAuditEntry,
        booking::{Booking, BookingCandidate, BookingQuery, BookingRow, CreateBooking, UpdateBooking},
        claims::UserClaims,
        enums::{ActionFlag, ContentType},
    },
    rules,
};

const BOOKING_ROW_SELECT: &str = r#"
    SELECT b.*,
           p.first_name AS person_first_name, p.last_name AS person_last_name,
           d.brand AS device_brand, d.model AS device_model
    FROM bookings b
    JOIN persons p ON p.id = b.person_id
    JOIN devices d ON d.asset_num = b.device_id
    WHERE 1=1
"#;

#[derive(Clone)]
pub struct BookingsRepository {
    pool: Pool<Postgres>,
}

impl BookingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List bookings with person and device columns, latest first
    pub async fn list(&self, query: &BookingQuery) -> AppResult<(Vec<BookingRow>, i64)> {
        let (limit, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new(
            r#"
            SELECT COUNT(*)
            FROM bookings b
            JOIN persons p ON p.id = b.person_id
            JOIN devices d ON d.asset_num = b.device_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(BOOKING_ROW_SELECT);
        push_filters(&mut select, query);
        select
            .push(" ORDER BY b.date_from DESC, b.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok((rows, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<BookingRow> {
        let mut select = QueryBuilder::<Postgres>::new(BOOKING_ROW_SELECT);
        select.push(" AND b.id = ").push_bind(id);

        select
            .build_query_as::<BookingRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))
    }

    /// Bookings of one device, in date order
    pub async fn for_device(&self, device_id: &str) -> AppResult<Vec<BookingRow>> {
        let mut select = QueryBuilder::<Postgres>::new(BOOKING_ROW_SELECT);
        select
            .push(" AND b.device_id = ")
            .push_bind(device_id.to_string())
            .push(" ORDER BY b.date_from, b.id");

        let rows = select
            .build_query_as::<BookingRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create(
        &self,
        actor: &UserClaims,
        data: &CreateBooking,
        today: NaiveDate,
    ) -> AppResult<Booking> {
        let candidate = BookingCandidate {
            id: None,
            person_id: data.person_id,
            device_id: &data.device_id,
            date_from: data.date_from,
            date_to: data.date_to,
            returned: data.returned,
        };
        rules::authorize_booking_write(actor, &candidate)?;

        let mut tx = self.pool.begin().await?;
        DevicesRepository::lock(&mut *tx, &data.device_id).await?;
        let person = PersonsRepository::ref_in(&mut *tx, data.person_id).await?;

        let existing = device_bookings(&mut *tx, &data.device_id).await?;
        check(&candidate, &existing, today)?;

        let row = sqlx::query_as::<_, Booking>(
            r#"
            INSERT INTO bookings (person_id, device_id, date_from, date_to, returned, notes)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(data.person_id)
        .bind(&data.device_id)
        .bind(data.date_from)
        .bind(data.date_to)
        .bind(data.returned)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await?;

        let audit = entry(&row, &person.full_name, ActionFlag::Addition, "Added.".to_string());
        AuditRepository::append(&mut *tx, actor, &audit).await?;
        tx.commit().await?;

        tracing::info!(
            booking_id = row.id,
            device = %row.device_id,
            person_id = row.person_id,
            "Booking created"
        );
        Ok(row)
    }

    pub async fn update(
        &self,
        actor: &UserClaims,
        id: i32,
        change: &UpdateBooking,
        today: NaiveDate,
    ) -> AppResult<Booking> {
        self.write_change(actor, id, change, today, false).await
    }

    /// Mark a booking returned; a booking already returned is a conflict,
    /// checked under the row lock so concurrent returns cannot both pass.
    pub async fn mark_returned(
        &self,
        actor: &UserClaims,
        id: i32,
        today: NaiveDate,
    ) -> AppResult<Booking> {
        let change = UpdateBooking {
            returned: Some(true),
            ..Default::default()
        };
        self.write_change(actor, id, &change, today, true).await
    }

    async fn write_change(
        &self,
        actor: &UserClaims,
        id: i32,
        change: &UpdateBooking,
        today: NaiveDate,
        returning: bool,
    ) -> AppResult<Booking> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;
        if returning {
            ensure_not_returned(&current)?;
        }

        let edited = change.apply_to(&current);
        // Consultants may neither take over nor hand off someone else's booking
        rules::authorize_booking_write(actor, &current.as_candidate())?;
        rules::authorize_booking_write(actor, &edited.as_candidate())?;

        DevicesRepository::lock(&mut *tx, &edited.device_id).await?;
        let person = PersonsRepository::ref_in(&mut *tx, edited.person_id).await?;

        let existing = device_bookings(&mut *tx, &edited.device_id).await?;
        check(&edited.as_candidate(), &existing, today)?;

        let row = sqlx::query_as::<_, Booking>(
            r#"
            UPDATE bookings SET
                person_id = $1, device_id = $2, date_from = $3, date_to = $4,
                returned = $5, notes = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(edited.person_id)
        .bind(&edited.device_id)
        .bind(edited.date_from)
        .bind(edited.date_to)
        .bind(edited.returned)
        .bind(&edited.notes)
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        let audit = entry(&row, &person.full_name, ActionFlag::Change, describe_change(&current, &row));
        AuditRepository::append(&mut *tx, actor, &audit).await?;
        tx.commit().await?;

        tracing::info!(booking_id = row.id, returned = row.returned, "Booking updated");
        Ok(row)
    }

    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Booking>("DELETE FROM bookings WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?;
        let person = PersonsRepository::ref_in(&mut *tx, row.person_id).await?;

        let audit = entry(&row, &person.full_name, ActionFlag::Deletion, String::new());
        AuditRepository::append(&mut *tx, actor, &audit).await?;
        tx.commit().await?;

        tracing::info!(booking_id = id, "Booking deleted");
        Ok(())
    }
}

fn ensure_not_returned(booking: &Booking) -> AppResult<()> {
    if booking.returned {
        Err(AppError::Conflict(format!("Booking {} is already returned", booking.id)))
    } else {
        Ok(())
    }
}

/// Every booking of a device, read on the transaction holding its lock
async fn device_bookings(conn: &mut PgConnection, device_id: &str) -> AppResult<Vec<Booking>> {
    let rows = sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE device_id = $1 ORDER BY date_from, id",
    )
    .bind(device_id)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}

fn check(candidate: &BookingCandidate<'_>, existing: &[Booking], today: NaiveDate) -> AppResult<()> {
    rules::validate(candidate, existing, today).map_err(|violation| {
        tracing::info!(
            device = candidate.device_id,
            booking_id = ?candidate.id,
            "Booking rejected: {}",
            violation
        );
        AppError::from(violation)
    })
}

fn describe_change(before: &Booking, after: &Booking) -> String {
    let mut changed = Vec::new();
    if before.person_id != after.person_id {
        changed.push("person");
    }
    if before.device_id != after.device_id {
        changed.push("device");
    }
    if before.date_from != after.date_from {
        changed.push("start date");
    }
    if before.date_to != after.date_to {
        changed.push("end date");
    }
    if before.returned != after.returned {
        changed.push("returned");
    }
    if before.notes != after.notes {
        changed.push("notes");
    }
    change_message(&changed)
}

/// "Full Name: ASSET [from --> to]"
fn booking_repr(booking: &Booking, person_name: &str) -> String {
    format!(
        "{}: {} [{} --> {}]",
        person_name, booking.device_id, booking.date_from, booking.date_to
    )
}

fn entry(booking: &Booking, person_name: &str, action_flag: ActionFlag, message: String) -> NewAuditEntry {
    NewAuditEntry {
        content_type: ContentType::Booking,
        object_id: booking.id.to_string(),
        object_repr: booking_repr(booking, person_name),
        action_flag,
        change_message: message,
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &BookingQuery) {
    if let Some(os_name) = query.os_name {
        qb.push(" AND d.os_name = ").push_bind(os_name);
    }
    if let Some(office_id) = query.office_id {
        qb.push(" AND d.office_id = ").push_bind(office_id);
    }
    if let Some(returned) = query.returned {
        qb.push(" AND b.returned = ").push_bind(returned);
    }
    if let Some(person_id) = query.person_id {
        qb.push(" AND b.person_id = ").push_bind(person_id);
    }
    if let Some(ref device_id) = query.device_id {
        qb.push(" AND b.device_id = ").push_bind(device_id.clone());
    }
    if let Some(day) = query.from_after {
        qb.push(" AND b.date_from >= ").push_bind(day);
    }
    if let Some(day) = query.from_before {
        qb.push(" AND b.date_from <= ").push_bind(day);
    }
    if let Some(day) = query.to_after {
        qb.push(" AND b.date_to >= ").push_bind(day);
    }
    if let Some(day) = query.to_before {
        qb.push(" AND b.date_to <= ").push_bind(day);
    }
    if let Some(ref search) = query.search {
        let pattern = like_pattern(search);
        qb.push(" AND (LOWER(p.last_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(d.asset_num) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(d.serial_num) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn booking() -> Booking {
        Booking {
            id: 3,
            person_id: 1,
            device_id: "D001".to_string(),
            date_from: day(1),
            date_to: day(10),
            returned: false,
            notes: None,
        }
    }

    #[test]
    fn test_booking_repr() {
        assert_eq!(
            booking_repr(&booking(), "Ada Lovelace"),
            "Ada Lovelace: D001 [2024-01-01 --> 2024-01-10]"
        );
    }

    #[test]
    fn test_return_of_returned_booking_conflicts() {
        let mut b = booking();
        assert!(ensure_not_returned(&b).is_ok());
        b.returned = true;
        assert!(matches!(ensure_not_returned(&b), Err(AppError::Conflict(_))));
    }

    #[test]
    fn test_long_booking_repr_fits_audit_column() {
        let person = format!("{} {}", "F".repeat(150), "L".repeat(150));
        let mut b = booking();
        b.device_id = "A".repeat(50);
        let audit = entry(&b, &person, ActionFlag::Addition, "Added.".to_string());
        assert!(audit.object_repr.chars().count() > 200);
        assert!(audit.stored_repr().chars().count() <= 200);
    }

    #[test]
    fn test_describe_change() {
        let before = booking();
        let mut after = before.clone();
        after.returned = true;
        after.date_to = day(12);
        assert_eq!(describe_change(&before, &after), "Changed end date, returned.");
        assert_eq!(describe_change(&before, &before), "No fields changed.");
    }
}
