//! Business logic services

pub mod audit;
pub mod bookings;
pub mod devices;
pub mod export;
pub mod locations;
pub mod persons;

use crate::{error::AppResult, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub locations: locations::LocationsService,
    pub persons: persons::PersonsService,
    pub devices: devices::DevicesService,
    pub bookings: bookings::BookingsService,
    pub audit: audit::AuditService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            locations: locations::LocationsService::new(repository.clone()),
            persons: persons::PersonsService::new(repository.clone()),
            devices: devices::DevicesService::new(repository.clone()),
            bookings: bookings::BookingsService::new(repository.clone()),
            audit: audit::AuditService::new(repository.clone()),
            repository,
        }
    }

    /// Database round-trip for the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}

/// Today's date on the server clock, used for return and overdue checks
pub fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// Trim a required text field in place
pub(crate) fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Trim an optional text field
pub(crate) fn trim_opt(value: &mut Option<String>) {
    if let Some(v) = value.as_mut() {
        trim(v);
    }
}
