//! Audit log entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::{ActionFlag, ContentType};

/// Append-only record of who changed what, and when
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditEntry {
    pub id: i64,
    pub action_time: DateTime<Utc>,
    pub actor_id: Option<i32>,
    pub actor_username: String,
    pub content_type: ContentType,
    pub object_id: String,
    pub object_repr: String,
    pub action_flag: ActionFlag,
    pub change_message: String,
}

/// Entry to append; the database stamps id and action_time
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub content_type: ContentType,
    pub object_id: String,
    pub object_repr: String,
    pub action_flag: ActionFlag,
    pub change_message: String,
}

/// Width of the `audit_log.object_repr` column, in characters
pub const OBJECT_REPR_MAX: usize = 200;

impl NewAuditEntry {
    /// `object_repr` cut to the column width on a char boundary
    pub fn stored_repr(&self) -> &str {
        match self.object_repr.char_indices().nth(OBJECT_REPR_MAX) {
            Some((end, _)) => &self.object_repr[..end],
            None => &self.object_repr,
        }
    }
}

/// Audit log query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    pub actor_id: Option<i32>,
    pub content_type: Option<ContentType>,
    pub action_flag: Option<ActionFlag>,
    /// Matches object_repr or change_message
    pub search: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
