//! Audit log repository

use sqlx::{PgConnection, Pool, Postgres, QueryBuilder};

use super::{like_pattern, page_bounds};
use crate::{
    error::{AppError, AppResult},
    models::{
        audit::{AuditEntry, AuditQuery, NewAuditEntry},
        claims::UserClaims,
    },
};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append an entry on the caller's transaction so it commits, or rolls
    /// back, with the change it describes. Long reprs are cut to the column
    /// width rather than failing the write.
    pub async fn append(
        conn: &mut PgConnection,
        actor: &UserClaims,
        entry: &NewAuditEntry,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_log (
                actor_id, actor_username, content_type, object_id,
                object_repr, action_flag, change_message
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(actor.person_id)
        .bind(&actor.sub)
        .bind(entry.content_type)
        .bind(&entry.object_id)
        .bind(entry.stored_repr())
        .bind(entry.action_flag)
        .bind(&entry.change_message)
        .execute(conn)
        .await?;
        Ok(())
    }

    /// List entries, newest first
    pub async fn list(&self, query: &AuditQuery) -> AppResult<(Vec<AuditEntry>, i64)> {
        let (limit, offset) = page_bounds(query.page, query.per_page);

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM audit_log WHERE 1=1");
        push_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new("SELECT * FROM audit_log WHERE 1=1");
        push_filters(&mut select, query);
        select
            .push(" ORDER BY action_time DESC, id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = select
            .build_query_as::<AuditEntry>()
            .fetch_all(&self.pool)
            .await?;
        Ok((rows, total))
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<AuditEntry> {
        sqlx::query_as::<_, AuditEntry>("SELECT * FROM audit_log WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Audit entry {} not found", id)))
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &AuditQuery) {
    if let Some(actor_id) = query.actor_id {
        qb.push(" AND actor_id = ").push_bind(actor_id);
    }
    if let Some(content_type) = query.content_type {
        qb.push(" AND content_type = ").push_bind(content_type);
    }
    if let Some(flag) = query.action_flag {
        qb.push(" AND action_flag = ").push_bind(flag);
    }
    if let Some(ref search) = query.search {
        let pattern = like_pattern(search);
        qb.push(" AND (LOWER(object_repr) LIKE ")
            .push_bind(pattern.clone())
            .push(" OR LOWER(change_message) LIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(since) = query.since {
        qb.push(" AND action_time >= ").push_bind(since);
    }
    if let Some(until) = query.until {
        qb.push(" AND action_time <= ").push_bind(until);
    }
}
