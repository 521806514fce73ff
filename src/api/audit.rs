//! Audit log API endpoints (administrators only)

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::audit::{AuditEntry, AuditQuery},
};

use super::{AuditPage, AuthenticatedUser, PaginatedResponse};

/// List audit entries, newest first
#[utoipa::path(
    get,
    path = "/audit",
    tag = "audit",
    security(("bearer_auth" = [])),
    params(AuditQuery),
    responses(
        (status = 200, description = "Audit entries", body = AuditPage),
        (status = 403, description = "Administrator privileges required")
    )
)]
pub async fn list_audit(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AuditQuery>,
) -> AppResult<Json<PaginatedResponse<AuditEntry>>> {
    claims.require_admin()?;
    let (entries, total) = state.services.audit.list(&query).await?;
    Ok(Json(PaginatedResponse::new(entries, total, query.page, query.per_page)))
}

/// Get one audit entry
#[utoipa::path(
    get,
    path = "/audit/{id}",
    tag = "audit",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Audit entry ID")),
    responses(
        (status = 200, description = "Audit entry", body = AuditEntry),
        (status = 403, description = "Administrator privileges required"),
        (status = 404, description = "Entry not found")
    )
)]
pub async fn get_audit_entry(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AuditEntry>> {
    claims.require_admin()?;
    let entry = state.services.audit.get_by_id(id).await?;
    Ok(Json(entry))
}
