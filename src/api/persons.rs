//! Person API endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::person::{CreatePerson, Person, PersonQuery, PersonShort, UpdatePerson},
};

use super::{AuthenticatedUser, PaginatedResponse, PersonPage};

/// List persons with filters and pagination
#[utoipa::path(
    get,
    path = "/persons",
    tag = "persons",
    security(("bearer_auth" = [])),
    params(PersonQuery),
    responses(
        (status = 200, description = "List of persons", body = PersonPage),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_persons(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<PersonQuery>,
) -> AppResult<Json<PaginatedResponse<PersonShort>>> {
    let (persons, total) = state.services.persons.list(&query).await?;
    Ok(Json(PaginatedResponse::new(persons, total, query.page, query.per_page)))
}

/// Get person by ID
#[utoipa::path(
    get,
    path = "/persons/{id}",
    tag = "persons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Person ID")),
    responses(
        (status = 200, description = "Person details", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn get_person(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Person>> {
    let person = state.services.persons.get_by_id(id).await?;
    Ok(Json(person))
}

/// Create a person
#[utoipa::path(
    post,
    path = "/persons",
    tag = "persons",
    security(("bearer_auth" = [])),
    request_body = CreatePerson,
    responses(
        (status = 201, description = "Person created", body = Person),
        (status = 400, description = "Invalid input or unknown office"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn create_person(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreatePerson>,
) -> AppResult<(StatusCode, Json<Person>)> {
    claims.require_privileged()?;
    let person = state.services.persons.create(&claims, data).await?;
    Ok((StatusCode::CREATED, Json(person)))
}

/// Update a person
#[utoipa::path(
    put,
    path = "/persons/{id}",
    tag = "persons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Person ID")),
    request_body = UpdatePerson,
    responses(
        (status = 200, description = "Person updated", body = Person),
        (status = 404, description = "Person not found")
    )
)]
pub async fn update_person(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdatePerson>,
) -> AppResult<Json<Person>> {
    claims.require_privileged()?;
    let person = state.services.persons.update(&claims, id, data).await?;
    Ok(Json(person))
}

/// Delete a person
#[utoipa::path(
    delete,
    path = "/persons/{id}",
    tag = "persons",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Person ID")),
    responses(
        (status = 204, description = "Person deleted"),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Person still has bookings")
    )
)]
pub async fn delete_person(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    claims.require_privileged()?;
    state.services.persons.delete(&claims, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
