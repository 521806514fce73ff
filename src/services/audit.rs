//! Audit log service (read side; entries are written by the repositories)

use crate::{
    error::AppResult,
    models::audit::{AuditEntry, AuditQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuditService {
    repository: Repository,
}

impl AuditService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self, query: &AuditQuery) -> AppResult<(Vec<AuditEntry>, i64)> {
        self.repository.audit.list(query).await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<AuditEntry> {
        self.repository.audit.get_by_id(id).await
    }
}
