//! Location API endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::location::{Location, LocationPayload},
};

use super::AuthenticatedUser;

/// List all locations
#[utoipa::path(
    get,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Location list", body = Vec<Location>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_locations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<Location>>> {
    let locations = state.services.locations.list().await?;
    Ok(Json(locations))
}

/// Get location by ID
#[utoipa::path(
    get,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 200, description = "Location details", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn get_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Location>> {
    let location = state.services.locations.get_by_id(id).await?;
    Ok(Json(location))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/locations",
    tag = "locations",
    security(("bearer_auth" = [])),
    request_body = LocationPayload,
    responses(
        (status = 201, description = "Location created", body = Location),
        (status = 400, description = "Invalid name"),
        (status = 403, description = "Delivery manager privileges required")
    )
)]
pub async fn create_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<LocationPayload>,
) -> AppResult<(StatusCode, Json<Location>)> {
    claims.require_privileged()?;
    let location = state.services.locations.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

/// Rename a location
#[utoipa::path(
    put,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    request_body = LocationPayload,
    responses(
        (status = 200, description = "Location updated", body = Location),
        (status = 404, description = "Location not found")
    )
)]
pub async fn update_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<LocationPayload>,
) -> AppResult<Json<Location>> {
    claims.require_privileged()?;
    let location = state.services.locations.rename(&claims, id, data).await?;
    Ok(Json(location))
}

/// Delete a location
#[utoipa::path(
    delete,
    path = "/locations/{id}",
    tag = "locations",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Location ID")),
    responses(
        (status = 204, description = "Location deleted"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Location still referenced by persons or devices")
    )
)]
pub async fn delete_location(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_privileged()?;
    state.services.locations.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
