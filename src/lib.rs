//! Asset booking server
//!
//! REST JSON API for a fleet of test devices: offices, people, devices and
//! the date-range bookings that lend devices to people. Booking writes are
//! checked against date order, overlap and return rules before they commit.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod rules;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
