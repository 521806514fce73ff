//! Device API endpoints

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::{
    error::AppResult,
    models::{
        booking::BookingDetails,
        device::{CreateDevice, Device, DeviceQuery, DeviceSummary, UpdateDevice},
    },
    services::export::EXPORT_FILENAME,
};

use super::{AuthenticatedUser, DevicePage, PaginatedResponse};

/// List devices with availability
#[utoipa::path(
    get,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(DeviceQuery),
    responses(
        (status = 200, description = "List of devices", body = DevicePage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_devices(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<DeviceQuery>,
) -> AppResult<Json<PaginatedResponse<DeviceSummary>>> {
    let (devices, total) = state.services.devices.list(&query).await?;
    Ok(Json(PaginatedResponse::new(devices, total, query.page, query.per_page)))
}

/// Export matching devices as CSV
#[utoipa::path(
    get,
    path = "/devices/export",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(DeviceQuery),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv", body = String)
    )
)]
pub async fn export_devices(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<DeviceQuery>,
) -> AppResult<impl IntoResponse> {
    let body = state.services.devices.export(&query).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", EXPORT_FILENAME),
            ),
        ],
        body,
    ))
}

/// Get device by asset number
#[utoipa::path(
    get,
    path = "/devices/{asset_num}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("asset_num" = String, Path, description = "Asset number")),
    responses(
        (status = 200, description = "Device details", body = DeviceSummary),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(asset_num): Path<String>,
) -> AppResult<Json<DeviceSummary>> {
    let device = state.services.devices.get_by_id(&asset_num).await?;
    Ok(Json(device))
}

/// Booking history of a device
#[utoipa::path(
    get,
    path = "/devices/{asset_num}/bookings",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("asset_num" = String, Path, description = "Asset number")),
    responses(
        (status = 200, description = "Bookings of the device", body = Vec<BookingDetails>),
        (status = 404, description = "Device not found")
    )
)]
pub async fn get_device_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(asset_num): Path<String>,
) -> AppResult<Json<Vec<BookingDetails>>> {
    let bookings = state.services.bookings.for_device(&asset_num).await?;
    Ok(Json(bookings))
}

/// Register a device
#[utoipa::path(
    post,
    path = "/devices",
    tag = "devices",
    security(("bearer_auth" = [])),
    request_body = CreateDevice,
    responses(
        (status = 201, description = "Device created", body = Device),
        (status = 400, description = "Invalid input or unknown office"),
        (status = 409, description = "Asset number already exists")
    )
)]
pub async fn create_device(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateDevice>,
) -> AppResult<(StatusCode, Json<Device>)> {
    claims.require_privileged()?;
    let device = state.services.devices.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

/// Update a device (the asset number is immutable)
#[utoipa::path(
    put,
    path = "/devices/{asset_num}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("asset_num" = String, Path, description = "Asset number")),
    request_body = UpdateDevice,
    responses(
        (status = 200, description = "Device updated", body = Device),
        (status = 404, description = "Device not found")
    )
)]
pub async fn update_device(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(asset_num): Path<String>,
    Json(data): Json<UpdateDevice>,
) -> AppResult<Json<Device>> {
    claims.require_privileged()?;
    let device = state.services.devices.update(&claims, &asset_num, data).await?;
    Ok(Json(device))
}

/// Delete a device
#[utoipa::path(
    delete,
    path = "/devices/{asset_num}",
    tag = "devices",
    security(("bearer_auth" = [])),
    params(("asset_num" = String, Path, description = "Asset number")),
    responses(
        (status = 204, description = "Device deleted"),
        (status = 404, description = "Device not found"),
        (status = 409, description = "Device still has bookings")
    )
)]
pub async fn delete_device(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(asset_num): Path<String>,
) -> AppResult<StatusCode> {
    claims.require_privileged()?;
    state.services.devices.delete(&claims, &asset_num).await?;
    Ok(StatusCode::NO_CONTENT)
}
