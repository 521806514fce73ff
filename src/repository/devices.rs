//! Devices repository

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{audit::AuditRepository, change_message, ensure_location, like_pattern, page_bounds};
use crate::{
    error::{map_constraint, AppError, AppResult},
    models::{
        audit::NewAuditEntry,
        booking::Booking,
        claims::UserClaims,
        device::{CreateDevice, Device, DeviceQuery, DeviceRow, UpdateDevice},
        enums::{ActionFlag, ContentType},
        merge_nullable,
    },
};

const DEVICE_ROW_SELECT: &str = r#"
    SELECT d.*, l.name AS office,
           (SELECT COUNT(*) FROM bookings b WHERE b.device_id = d.asset_num) AS bookings_count
    FROM devices d
    JOIN locations l ON l.id = d.office_id
    WHERE 1=1
"#;

#[derive(Clone)]
pub struct DevicesRepository {
    pool: Pool<Postgres>,
}

impl DevicesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List devices with office name and booking count
    pub async fn list(&self, query: &DeviceQuery) -> AppResult<(Vec<DeviceRow>, i64)> {
        let (limit, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM devices d WHERE 1=1");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(DEVICE_ROW_SELECT);
        push_filters(&mut select, query);
        select
            .push(" ORDER BY d.asset_num LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<DeviceRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok((rows, total))
    }

    /// Every device matching the filters, unpaginated (CSV export)
    pub async fn list_all(&self, query: &DeviceQuery) -> AppResult<Vec<Device>> {
        let mut select = QueryBuilder::<Postgres>::new("SELECT d.* FROM devices d WHERE 1=1");
        push_filters(&mut select, query);
        select.push(" ORDER BY d.asset_num");

        let rows = select
            .build_query_as::<Device>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, asset_num: &str) -> AppResult<DeviceRow> {
        let mut select = QueryBuilder::<Postgres>::new(DEVICE_ROW_SELECT);
        select.push(" AND d.asset_num = ").push_bind(asset_num.to_string());

        select
            .build_query_as::<DeviceRow>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", asset_num)))
    }

    /// Lock a device row for the rest of the transaction.
    ///
    /// Booking writes take this lock before reading the device's bookings, so
    /// concurrent writers for one device run their overlap check one at a time.
    pub async fn lock(conn: &mut PgConnection, asset_num: &str) -> AppResult<Device> {
        sqlx::query_as::<_, Device>("SELECT * FROM devices WHERE asset_num = $1 FOR UPDATE")
            .bind(asset_num)
            .fetch_optional(conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", asset_num)))
    }

    /// Unreturned bookings of the given devices
    pub async fn active_bookings(&self, asset_nums: &[String]) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE returned = FALSE AND device_id = ANY($1)",
        )
        .bind(asset_nums)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn create(&self, actor: &UserClaims, data: &CreateDevice) -> AppResult<Device> {
        let mut tx = self.pool.begin().await?;
        ensure_location(&mut *tx, data.office_id).await?;

        let row = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (
                asset_num, serial_num, brand, model, os_name, os_version,
                office_id, rooted, passcode, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&data.asset_num)
        .bind(&data.serial_num)
        .bind(&data.brand)
        .bind(&data.model)
        .bind(data.os_name)
        .bind(&data.os_version)
        .bind(data.office_id)
        .bind(data.rooted)
        .bind(&data.passcode)
        .bind(&data.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "Asset number"))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Addition, "Added.".to_string())).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn update(&self, actor: &UserClaims, asset_num: &str, data: &UpdateDevice) -> AppResult<Device> {
        let mut tx = self.pool.begin().await?;
        let current = Self::lock(&mut *tx, asset_num).await?;

        if let Some(office_id) = data.office_id {
            ensure_location(&mut *tx, office_id).await?;
        }

        let mut changed = Vec::new();
        macro_rules! track {
            ($field:expr, $current:expr, $name:expr) => {
                if $field.as_ref().is_some_and(|v| v != &$current) {
                    changed.push($name);
                }
            };
        }
        track!(data.serial_num, current.serial_num, "serial number");
        track!(data.brand, current.brand, "brand");
        track!(data.model, current.model, "model");
        track!(data.os_name, current.os_name, "OS name");
        track!(data.os_version, current.os_version, "OS version");
        track!(data.office_id, current.office_id, "office");
        track!(data.rooted, current.rooted, "rooted");
        track!(data.passcode, current.passcode, "passcode");
        let notes = merge_nullable(&data.notes, &current.notes);
        if notes != current.notes {
            changed.push("notes");
        }

        let row = sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices SET
                serial_num = $1, brand = $2, model = $3, os_name = $4, os_version = $5,
                office_id = $6, rooted = $7, passcode = $8, notes = $9
            WHERE asset_num = $10
            RETURNING *
            "#,
        )
        .bind(data.serial_num.as_ref().unwrap_or(&current.serial_num))
        .bind(data.brand.as_ref().unwrap_or(&current.brand))
        .bind(data.model.as_ref().unwrap_or(&current.model))
        .bind(data.os_name.unwrap_or(current.os_name))
        .bind(data.os_version.as_ref().unwrap_or(&current.os_version))
        .bind(data.office_id.unwrap_or(current.office_id))
        .bind(data.rooted.unwrap_or(current.rooted))
        .bind(data.passcode.as_ref().unwrap_or(&current.passcode))
        .bind(&notes)
        .bind(asset_num)
        .fetch_one(&mut *tx)
        .await?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Change, change_message(&changed))).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Delete a device without bookings
    pub async fn delete(&self, actor: &UserClaims, asset_num: &str) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Device>("DELETE FROM devices WHERE asset_num = $1 RETURNING *")
            .bind(asset_num)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, "Device"))?
            .ok_or_else(|| AppError::NotFound(format!("Device {} not found", asset_num)))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Deletion, String::new())).await?;
        tx.commit().await?;
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &DeviceQuery) {
    if let Some(office_id) = query.office_id {
        qb.push(" AND d.office_id = ").push_bind(office_id);
    }
    if let Some(rooted) = query.rooted {
        qb.push(" AND d.rooted = ").push_bind(rooted);
    }
    if let Some(os_name) = query.os_name {
        qb.push(" AND d.os_name = ").push_bind(os_name);
    }
    if let Some(ref model) = query.model {
        qb.push(" AND d.model = ").push_bind(model.clone());
    }
    if let Some(ref search) = query.search {
        let pattern = like_pattern(search);
        qb.push(" AND (");
        let mut columns = qb.separated(" OR ");
        for column in ["d.model", "d.os_name", "d.os_version", "d.serial_num", "d.asset_num"] {
            columns
                .push(format!("LOWER({}) LIKE ", column))
                .push_bind_unseparated(pattern.clone());
        }
        qb.push(")");
    }
}

fn entry(device: &Device, action_flag: ActionFlag, message: String) -> NewAuditEntry {
    NewAuditEntry {
        content_type: ContentType::Device,
        object_id: device.asset_num.clone(),
        object_repr: device.label(),
        action_flag,
        change_message: message,
    }
}
