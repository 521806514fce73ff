//! Persons repository

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{audit::AuditRepository, change_message, ensure_location, like_pattern, page_bounds};
use crate::{
    error::{map_constraint, AppError, AppResult},
    models::{
        audit::NewAuditEntry,
        claims::UserClaims,
        enums::{ActionFlag, ContentType},
        merge_nullable,
        person::{CreatePerson, Person, PersonQuery, PersonRef, PersonShort, UpdatePerson},
    },
};

const PERSON_COLUMNS: &str =
    "id, username, first_name, last_name, email, is_active, office_id, role, date_joined";

#[derive(Clone)]
pub struct PersonsRepository {
    pool: Pool<Postgres>,
}

impl PersonsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List persons with their office, filtered and paginated
    pub async fn list(&self, query: &PersonQuery) -> AppResult<(Vec<PersonShort>, i64)> {
        let (limit, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM persons p WHERE 1=1");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(
            r#"
            SELECT p.id, p.first_name || ' ' || p.last_name AS full_name,
                   l.name AS office, p.role
            FROM persons p
            JOIN locations l ON l.id = p.office_id
            WHERE 1=1
            "#,
        );
        push_filters(&mut select, query);
        select
            .push(" ORDER BY p.last_name, p.first_name LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<PersonShort>()
            .fetch_all(&self.pool)
            .await?;
        Ok((rows, total))
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Person> {
        sqlx::query_as::<_, Person>(&format!("SELECT {} FROM persons WHERE id = $1", PERSON_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Person {} not found", id)))
    }

    /// Names for a set of person ids
    pub async fn refs(&self, ids: &[i32]) -> AppResult<Vec<PersonRef>> {
        let rows = sqlx::query_as::<_, PersonRef>(
            "SELECT id, first_name || ' ' || last_name AS full_name FROM persons WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Person reference read on an open transaction
    pub async fn ref_in(conn: &mut PgConnection, id: i32) -> AppResult<PersonRef> {
        sqlx::query_as::<_, PersonRef>(
            "SELECT id, first_name || ' ' || last_name AS full_name FROM persons WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Person {} not found", id)))
    }

    pub async fn create(&self, actor: &UserClaims, data: &CreatePerson) -> AppResult<Person> {
        let mut tx = self.pool.begin().await?;
        ensure_location(&mut *tx, data.office_id).await?;

        let row = sqlx::query_as::<_, Person>(&format!(
            r#"
            INSERT INTO persons (username, first_name, last_name, email, is_active, office_id, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(data.is_active.unwrap_or(true))
        .bind(data.office_id)
        .bind(data.role)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "Username"))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Addition, "Added.".to_string())).await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn update(&self, actor: &UserClaims, id: i32, data: &UpdatePerson) -> AppResult<Person> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Person>(&format!(
            "SELECT {} FROM persons WHERE id = $1 FOR UPDATE",
            PERSON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Person {} not found", id)))?;

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
        track!(data.username, current.account.username, "username");
        track!(data.first_name, current.account.first_name, "first name");
        track!(data.last_name, current.account.last_name, "last name");
        let email = merge_nullable(&data.email, &current.account.email);
        if email != current.account.email {
            changed.push("email");
        }
        track!(data.office_id, current.office_id, "office");
        track!(data.role, current.role, "role");
        track!(data.is_active, current.is_active, "active");

        let row = sqlx::query_as::<_, Person>(&format!(
            r#"
            UPDATE persons SET
                username = $1, first_name = $2, last_name = $3, email = $4,
                is_active = $5, office_id = $6, role = $7
            WHERE id = $8
            RETURNING {}
            "#,
            PERSON_COLUMNS
        ))
        .bind(data.username.as_ref().unwrap_or(&current.account.username))
        .bind(data.first_name.as_ref().unwrap_or(&current.account.first_name))
        .bind(data.last_name.as_ref().unwrap_or(&current.account.last_name))
        .bind(&email)
        .bind(data.is_active.unwrap_or(current.is_active))
        .bind(data.office_id.unwrap_or(current.office_id))
        .bind(data.role.unwrap_or(current.role))
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "Username"))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Change, change_message(&changed))).await?;
        tx.commit().await?;
        Ok(row)
    }

    /// Delete a person without bookings
    pub async fn delete(&self, actor: &UserClaims, id: i32) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, Person>(&format!(
            "DELETE FROM persons WHERE id = $1 RETURNING {}",
            PERSON_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_constraint(e, "Person"))?
        .ok_or_else(|| AppError::NotFound(format!("Person {} not found", id)))?;

        AuditRepository::append(&mut *tx, actor, &entry(&row, ActionFlag::Deletion, String::new())).await?;
        tx.commit().await?;
        Ok(())
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &PersonQuery) {
    if let Some(office_id) = query.office_id {
        qb.push(" AND p.office_id = ").push_bind(office_id);
    }
    if let Some(role) = query.role {
        qb.push(" AND p.role = ").push_bind(role);
    }
    if let Some(ref search) = query.search {
        let pattern = like_pattern(search);
        qb.push(" AND (LOWER(p.first_name) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(p.last_name) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

fn entry(person: &Person, action_flag: ActionFlag, message: String) -> NewAuditEntry {
    NewAuditEntry {
        content_type: ContentType::Person,
        object_id: person.id.to_string(),
        object_repr: person.full_name(),
        action_flag,
        change_message: message,
    }
}
