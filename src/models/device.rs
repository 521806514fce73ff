//! Device (phone / tablet) model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::OsName;
use super::person::PersonRef;

/// Physical asset identified by its asset number
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Device {
    /// Asset number, immutable once assigned
    pub asset_num: String,
    pub serial_num: String,
    pub brand: String,
    pub model: String,
    pub os_name: OsName,
    pub os_version: String,
    pub office_id: i32,
    pub rooted: bool,
    pub passcode: String,
    pub notes: Option<String>,
}

impl Device {
    /// "brand model"
    pub fn hardware_info(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// "ANDROID 14"
    pub fn software_info(&self) -> String {
        format!("{} {}", self.os_name, self.os_version)
    }

    /// "[asset] brand model"
    pub fn label(&self) -> String {
        format!("[{}] {} {}", self.asset_num, self.brand, self.model)
    }
}

/// Device list row with its derived availability
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeviceSummary {
    #[serde(flatten)]
    pub device: Device,
    pub office: String,
    pub hardware_info: String,
    pub software_info: String,
    /// No unreturned booking exists for the device
    pub free: bool,
    /// Holder of the latest unreturned booking
    pub used_by: Option<PersonRef>,
    pub bookings_count: i64,
}

/// Row shape of the device list query
#[derive(Debug, Clone, FromRow)]
pub struct DeviceRow {
    #[sqlx(flatten)]
    pub device: Device,
    pub office: String,
    pub bookings_count: i64,
}

/// Device query parameters (also used by the CSV export)
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct DeviceQuery {
    pub office_id: Option<i32>,
    pub rooted: Option<bool>,
    pub os_name: Option<OsName>,
    pub model: Option<String>,
    /// Matches model, OS name/version, serial or asset number
    pub search: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Create device request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDevice {
    #[validate(length(min = 1, max = 50, message = "Asset number must be 1-50 characters"))]
    pub asset_num: String,
    #[validate(length(min = 1, max = 50))]
    pub serial_num: String,
    #[validate(length(min = 1, max = 50))]
    pub brand: String,
    #[validate(length(min = 1, max = 50))]
    pub model: String,
    pub os_name: OsName,
    #[validate(length(max = 50))]
    pub os_version: String,
    pub office_id: i32,
    #[serde(default)]
    pub rooted: bool,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub passcode: String,
    pub notes: Option<String>,
}

/// Update device request; the asset number cannot change
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateDevice {
    #[validate(length(min = 1, max = 50))]
    pub serial_num: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub brand: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub model: Option<String>,
    pub os_name: Option<OsName>,
    #[validate(length(max = 50))]
    pub os_version: Option<String>,
    pub office_id: Option<i32>,
    pub rooted: Option<bool>,
    #[validate(length(max = 50))]
    pub passcode: Option<String>,
    pub notes: Option<String>,
}
