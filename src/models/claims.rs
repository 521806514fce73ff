//! Bearer token claims identifying the acting person

use serde::{Deserialize, Serialize};

use super::enums::Role;
use crate::error::AppError;

/// JWT claims of the caller. Passed explicitly to services and rules as
/// the actor of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// Username
    pub sub: String,
    pub person_id: i32,
    pub role: Role,
    #[serde(default)]
    pub is_admin: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    /// Delivery managers and admins may manage records and mark returns
    pub fn is_privileged(&self) -> bool {
        self.is_admin || self.role == Role::DeliveryManager
    }

    pub fn require_privileged(&self) -> Result<(), AppError> {
        if self.is_privileged() {
            Ok(())
        } else {
            Err(AppError::Authorization("Delivery manager privileges required".to_string()))
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }
}
