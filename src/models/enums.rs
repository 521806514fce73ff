//! Shared domain enums
//!
//! Text enums are stored by their short code (`SC`, `ANDROID`, ...) in
//! VARCHAR columns and serialized with the same code over JSON.

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements the sqlx text conversion for an enum with `as_str` / `FromStr`.
macro_rules! text_column {
    ($ty:ty) => {
        impl sqlx::Type<Postgres> for $ty {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }

            fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
                <String as sqlx::Type<Postgres>>::compatible(ty)
            }
        }

        impl<'r> Decode<'r, Postgres> for $ty {
            fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $ty {
            fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
                <&str as Encode<Postgres>>::encode(self.as_str(), buf)
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Person role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum Role {
    #[serde(rename = "SC")]
    SecurityConsultant,
    #[serde(rename = "EC")]
    DeliveryManager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SecurityConsultant => "SC",
            Role::DeliveryManager => "EC",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SC" => Ok(Role::SecurityConsultant),
            "EC" => Ok(Role::DeliveryManager),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

text_column!(Role);

// ---------------------------------------------------------------------------
// OsName
// ---------------------------------------------------------------------------

/// Operating system family of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum OsName {
    Android,
    #[serde(rename = "IOS")]
    Ios,
    #[serde(rename = "WIN")]
    WindowsPhone,
    #[serde(rename = "BB")]
    BlackBerry,
    #[serde(rename = "OSX")]
    Osx,
    Other,
}

impl OsName {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsName::Android => "ANDROID",
            OsName::Ios => "IOS",
            OsName::WindowsPhone => "WIN",
            OsName::BlackBerry => "BB",
            OsName::Osx => "OSX",
            OsName::Other => "OTHER",
        }
    }
}

impl std::str::FromStr for OsName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ANDROID" => Ok(OsName::Android),
            "IOS" => Ok(OsName::Ios),
            "WIN" => Ok(OsName::WindowsPhone),
            "BB" => Ok(OsName::BlackBerry),
            "OSX" => Ok(OsName::Osx),
            "OTHER" => Ok(OsName::Other),
            _ => Err(format!("Invalid OS name: {}", s)),
        }
    }
}

text_column!(OsName);

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// Kind of record an audit entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Location,
    Person,
    Device,
    Booking,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Location => "location",
            ContentType::Person => "person",
            ContentType::Device => "device",
            ContentType::Booking => "booking",
        }
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "location" => Ok(ContentType::Location),
            "person" => Ok(ContentType::Person),
            "device" => Ok(ContentType::Device),
            "booking" => Ok(ContentType::Booking),
            _ => Err(format!("Invalid content type: {}", s)),
        }
    }
}

text_column!(ContentType);

// ---------------------------------------------------------------------------
// ActionFlag
// ---------------------------------------------------------------------------

/// Audit action codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum ActionFlag {
    Addition = 1,
    Change = 2,
    Deletion = 3,
}

impl TryFrom<i16> for ActionFlag {
    type Error = String;

    fn try_from(v: i16) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(ActionFlag::Addition),
            2 => Ok(ActionFlag::Change),
            3 => Ok(ActionFlag::Deletion),
            other => Err(format!("Invalid action flag: {}", other)),
        }
    }
}

impl From<ActionFlag> for i16 {
    fn from(a: ActionFlag) -> Self {
        a as i16
    }
}

impl sqlx::Type<Postgres> for ActionFlag {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i16 as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for ActionFlag {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let v: i16 = Decode::<Postgres>::decode(value)?;
        ActionFlag::try_from(v).map_err(|e| e.into())
    }
}

impl Encode<'_, Postgres> for ActionFlag {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <i16 as Encode<Postgres>>::encode(*self as i16, buf)
    }
}

impl std::fmt::Display for ActionFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ActionFlag::Addition => "Addition",
            ActionFlag::Change => "Change",
            ActionFlag::Deletion => "Deletion",
        };
        write!(f, "{}", label)
    }
}
