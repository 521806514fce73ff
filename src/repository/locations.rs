//! Locations repository

use sqlx::{Pool, Postgres};

use super::audit::AuditRepository;
use crate::{
    error::{map_constraint, AppError, AppResult},
    models::{
        audit::NewAuditEntry,
        claims::UserClaims,
        enums::{ActionFlag, ContentType},
        location::Location,
    },
};

#[derive(Clone)]
pub struct LocationsRepository {
    pool: Pool<Postgres>,
}

impl LocationsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> AppResult<Vec<Location>> {
        let rows = sqlx::query_as::<_, Location>("SELECT * FROM locations ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Location> {
        sqlx::query_as::<_, Location>("SELECT * FROM locations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))
    }

    pub async fn create(&self, actor: &UserClaims, name: &str) -> AppResult<Location> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Location>(
            "INSERT INTO locations (name) VALUES ($1) RETURNING *",
        )
        .bind(name)
        .fetch_one(&mut *tx)
        .await?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Addition, "Added.")).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn rename(&self, actor: &UserClaims, id: i32, name: &str) -> AppResult<Location> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Location>(
            "UPDATE locations SET name = $1 WHERE id = $2 RETURNING *",
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Change, "Changed name.")).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Delete a location no person or device refers to
    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Location>("DELETE FROM locations WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| map_constraint(e, "Location"))?
            .ok_or_else(|| AppError::NotFound(format!("Location {} not found", id)))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Deletion, "")).await?;
        tx.commit().await?;
        Ok(())
    }
}

fn entry(location: &Location, action_flag: ActionFlag, message: &str) -> NewAuditEntry {
    NewAuditEntry {
        content_type: ContentType::Location,
        object_id: location.id.to_string(),
        object_repr: location.name.clone(),
        action_flag,
        change_message: message.to_string(),
    }
}
