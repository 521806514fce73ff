//! Booking API endpoints
//!
//! Consultants may create and edit their own bookings; marking a return and
//! acting for someone else needs a delivery manager.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::booking::{BookingDetails, BookingQuery, CreateBooking, UpdateBooking},
};

use super::{AuthenticatedUser, BookingPage, PaginatedResponse};

/// List bookings with filters and pagination
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "List of bookings", body = BookingPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_bookings(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<PaginatedResponse<BookingDetails>>> {
    let (bookings, total) = state.services.bookings.list(&query).await?;
    Ok(Json(PaginatedResponse::new(bookings, total, query.page, query.per_page)))
}

/// Get booking by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking details", body = BookingDetails),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn get_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.get_by_id(id).await?;
    Ok(Json(booking))
}

/// Book a device
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "bookings",
    security(("bearer_auth" = [])),
    request_body = CreateBooking,
    responses(
        (status = 201, description = "Booking created", body = BookingDetails),
        (status = 400, description = "End date before start date", body = crate::error::ErrorResponse),
        (status = 403, description = "Booking for another person or marking a return", body = crate::error::ErrorResponse),
        (status = 404, description = "Unknown device or person"),
        (status = 409, description = "Overlaps an existing booking", body = crate::error::ErrorResponse),
        (status = 422, description = "Returned before the end date", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateBooking>,
) -> AppResult<(StatusCode, Json<BookingDetails>)> {
    let booking = state.services.bookings.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// Edit a booking
#[utoipa::path(
    put,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    request_body = UpdateBooking,
    responses(
        (status = 200, description = "Booking updated", body = BookingDetails),
        (status = 400, description = "End date before start date", body = crate::error::ErrorResponse),
        (status = 403, description = "Not allowed for this booking", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Overlaps an existing booking", body = crate::error::ErrorResponse),
        (status = 422, description = "Returned before the end date", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateBooking>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.update(&claims, id, data).await?;
    Ok(Json(booking))
}

/// Mark a booking as returned
#[utoipa::path(
    post,
    path = "/bookings/{id}/return",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Device returned", body = BookingDetails),
        (status = 403, description = "Delivery manager privileges required", body = crate::error::ErrorResponse),
        (status = 404, description = "Booking not found"),
        (status = 409, description = "Already returned", body = crate::error::ErrorResponse),
        (status = 422, description = "Booking has not ended yet", body = crate::error::ErrorResponse)
    )
)]
pub async fn return_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<BookingDetails>> {
    let booking = state.services.bookings.return_booking(&claims, id).await?;
    Ok(Json(booking))
}

/// Delete a booking
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "bookings",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Booking ID")),
    responses(
        (status = 204, description = "Booking deleted"),
        (status = 403, description = "Delivery manager privileges required"),
        (status = 404, description = "Booking not found")
    )
)]
pub async fn delete_booking(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_privileged()?;
    state.services.bookings.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
