//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{audit, bookings, devices, health, locations, persons};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Asset Booking API",
        version = "1.0.0",
        description = "Device inventory and booking REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Locations
        locations::list_locations,
        locations::get_location,
        locations::create_location,
        locations::update_location,
        locations::delete_location,
        // Persons
        persons::list_persons,
        persons::get_person,
        persons::create_person,
        persons::update_person,
        persons::delete_person,
        // Devices
        devices::list_devices,
        devices::export_devices,
        devices::get_device,
        devices::get_device_bookings,
        devices::create_device,
        devices::update_device,
        devices::delete_device,
        // Bookings
        bookings::list_bookings,
        bookings::get_booking,
        bookings::create_booking,
        bookings::update_booking,
        bookings::return_booking,
        bookings::delete_booking,
        // Audit
        audit::list_audit,
        audit::get_audit_entry,
    ),
    components(
        schemas(
            // Shared
            crate::models::enums::Role,
            crate::models::enums::OsName,
            crate::models::enums::ContentType,
            crate::models::enums::ActionFlag,
            crate::models::person::PersonRef,
            // Locations
            crate::models::location::Location,
            crate::models::location::LocationPayload,
            // Persons
            crate::models::person::Person,
            crate::models::person::Account,
            crate::models::person::PersonShort,
            crate::models::person::CreatePerson,
            crate::models::person::UpdatePerson,
            super::PersonPage,
            // Devices
            crate::models::device::Device,
            crate::models::device::DeviceSummary,
            crate::models::device::CreateDevice,
            crate::models::device::UpdateDevice,
            super::DevicePage,
            // Bookings
            crate::models::booking::Booking,
            crate::models::booking::BookingDetails,
            crate::models::booking::CreateBooking,
            crate::models::booking::UpdateBooking,
            super::BookingPage,
            // Audit
            crate::models::audit::AuditEntry,
            super::AuditPage,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "locations", description = "Office management"),
        (name = "persons", description = "Person management"),
        (name = "devices", description = "Device inventory"),
        (name = "bookings", description = "Device bookings"),
        (name = "audit", description = "Change history")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the paths
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
