//! Person model: an account plus office and role

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidateEmail, ValidationError};

use super::enums::Role;

/// Login-level identity shared by every person
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl Account {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Person who may borrow devices
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Person {
    pub id: i32,
    #[sqlx(flatten)]
    pub account: Account,
    pub is_active: bool,
    /// Base office
    pub office_id: i32,
    pub role: Role,
    pub date_joined: DateTime<Utc>,
}

impl Person {
    pub fn full_name(&self) -> String {
        self.account.full_name()
    }
}

/// Minimal reference to a person, embedded in device and booking rows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PersonRef {
    pub id: i32,
    pub full_name: String,
}

/// Person row joined with its office, for lists
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PersonShort {
    pub id: i32,
    pub full_name: String,
    pub office: String,
    pub role: Role,
}

/// Person query parameters
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct PersonQuery {
    pub office_id: Option<i32>,
    pub role: Option<Role>,
    /// Matches first or last name
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create person request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePerson {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,
    #[validate(length(max = 150))]
    pub first_name: String,
    #[validate(length(max = 150))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub office_id: i32,
    pub role: Role,
    pub is_active: Option<bool>,
}

/// Update person request; an empty `email` clears it
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePerson {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: Option<String>,
    #[validate(length(max = 150))]
    pub first_name: Option<String>,
    #[validate(length(max = 150))]
    pub last_name: Option<String>,
    #[validate(custom(function = "email_or_blank"))]
    pub email: Option<String>,
    pub office_id: Option<i32>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

fn email_or_blank(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        let mut error = ValidationError::new("email");
        error.message = Some("Invalid email format".into());
        Err(error)
    }
}
