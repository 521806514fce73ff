//! Repository layer for database operations

pub mod audit;
pub mod bookings;
pub mod devices;
pub mod locations;
pub mod persons;

use sqlx::{PgConnection, Pool, Postgres};

use crate::error::{AppError, AppResult};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub locations: locations::LocationsRepository,
    pub persons: persons::PersonsRepository,
    pub devices: devices::DevicesRepository,
    pub bookings: bookings::BookingsRepository,
    pub audit: audit::AuditRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            locations: locations::LocationsRepository::new(pool.clone()),
            persons: persons::PersonsRepository::new(pool.clone()),
            devices: devices::DevicesRepository::new(pool.clone()),
            bookings: bookings::BookingsRepository::new(pool.clone()),
            audit: audit::AuditRepository::new(pool.clone()),
            pool,
        }
    }

    /// Round-trip to the database (readiness probe)
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// (limit, offset) from 1-based page parameters
pub(crate) fn page_bounds(page: Option<i64>, per_page: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(50).clamp(1, 500);
    (per_page, (page - 1) * per_page)
}

/// `%term%` pattern for case-insensitive LIKE searches
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped.to_lowercase())
}

/// Office references must point at an existing location
pub(crate) async fn ensure_location(conn: &mut PgConnection, id: i32) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM locations WHERE id = $1)")
        .bind(id)
        .fetch_one(conn)
        .await?;
    if exists {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Office {} does not exist", id)))
    }
}

/// "Changed office, role." in the style of an admin change log
pub(crate) fn change_message(changed: &[&str]) -> String {
    if changed.is_empty() {
        "No fields changed.".to_string()
    } else {
        format!("Changed {}.", changed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_bounds() {
        assert_eq!(page_bounds(None, None), (50, 0));
        assert_eq!(page_bounds(Some(3), Some(20)), (20, 40));
        assert_eq!(page_bounds(Some(0), Some(0)), (1, 0));
        assert_eq!(page_bounds(Some(1), Some(10_000)), (500, 0));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" Pixel "), "%pixel%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn test_change_message() {
        assert_eq!(change_message(&[]), "No fields changed.");
        assert_eq!(change_message(&["office", "role"]), "Changed office, role.");
    }
}
