//! Location (office / site) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// A named site that people and devices belong to
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Location {
    pub id: i32,
    pub name: String,
}

/// Create or rename a location
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LocationPayload {
    #[validate(length(min = 1, max = 50, message = "Location name must be 1-50 characters"))]
    pub name: String,
}
