//! Unit and suite API handlers
//!
//! Units and suites live under their property; reads follow the property's
//! visibility and writes need the manage-properties capability.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use propdesk_access::Capability;
use propdesk_auth::AuthUser;
use propdesk_common::{Error, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::properties::load_visible_property;
use crate::api::middleware::PropertiesState;
use crate::domain::entities::{Suite, Unit};

#[derive(Debug, Deserialize, Validate)]
pub struct UnitRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub floor: Option<i32>,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i32>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SuiteRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(range(min = 1))]
    pub square_feet: Option<i32>,
    #[validate(length(max = 200))]
    pub occupant: Option<String>,
}

fn unit_not_found() -> Error {
    Error::NotFound("Unit not found".to_string())
}

fn suite_not_found() -> Error {
    Error::NotFound("Suite not found".to_string())
}

/// **GET /v1/properties/{id}/units**
pub async fn list_units(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<Unit>>> {
    let property = load_visible_property(&state, &ctx, property_id).await?;
    let units = state.repos.units.list_by_property(property.id).await?;
    Ok(Json(units))
}

/// **GET /v1/properties/{id}/units/{unit_id}**
pub async fn get_unit(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, unit_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Unit>> {
    ctx.require_property(property_id)?;
    let unit = state
        .repos
        .units
        .find(property_id, unit_id)
        .await?
        .ok_or_else(unit_not_found)?;
    Ok(Json(unit))
}

/// **POST /v1/properties/{id}/units**
pub async fn create_unit(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UnitRequest>,
) -> Result<(StatusCode, Json<Unit>)> {
    ctx.require(Capability::ManageProperties, "manage properties")?;
    let property = load_visible_property(&state, &ctx, property_id).await?;

    let unit = Unit::new(
        property.id,
        request.name,
        request.floor,
        request.bedrooms,
        request.notes,
    )?;
    let created = state.repos.units.create(&unit).await?;

    tracing::info!(unit_id = %created.id, property_id = %property.id, "Unit created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/properties/{id}/units/{unit_id}**
pub async fn update_unit(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, unit_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<UnitRequest>,
) -> Result<Json<Unit>> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    let existing = state
        .repos
        .units
        .find(property_id, unit_id)
        .await?
        .ok_or_else(unit_not_found)?;

    // Re-run entity validation, then keep identity and creation time
    let mut unit = Unit::new(
        property_id,
        request.name,
        request.floor,
        request.bedrooms,
        request.notes,
    )?;
    unit.id = existing.id;
    unit.created_at = existing.created_at;

    Ok(Json(state.repos.units.update(&unit).await?))
}

/// **DELETE /v1/properties/{id}/units/{unit_id}**
pub async fn delete_unit(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, unit_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    if !state.repos.units.delete(property_id, unit_id).await? {
        return Err(unit_not_found());
    }
    tracing::info!(unit_id = %unit_id, property_id = %property_id, "Unit deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// **GET /v1/properties/{id}/suites**
pub async fn list_suites(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Vec<Suite>>> {
    let property = load_visible_property(&state, &ctx, property_id).await?;
    let suites = state.repos.suites.list_by_property(property.id).await?;
    Ok(Json(suites))
}

/// **GET /v1/properties/{id}/suites/{suite_id}**
pub async fn get_suite(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, suite_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Suite>> {
    ctx.require_property(property_id)?;
    let suite = state
        .repos
        .suites
        .find(property_id, suite_id)
        .await?
        .ok_or_else(suite_not_found)?;
    Ok(Json(suite))
}

/// **POST /v1/properties/{id}/suites**
pub async fn create_suite(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<SuiteRequest>,
) -> Result<(StatusCode, Json<Suite>)> {
    ctx.require(Capability::ManageProperties, "manage properties")?;
    let property = load_visible_property(&state, &ctx, property_id).await?;

    let suite = Suite::new(
        property.id,
        request.name,
        request.square_feet,
        request.occupant,
    )?;
    let created = state.repos.suites.create(&suite).await?;

    tracing::info!(suite_id = %created.id, property_id = %property.id, "Suite created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/properties/{id}/suites/{suite_id}**
pub async fn update_suite(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, suite_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(request): ValidatedJson<SuiteRequest>,
) -> Result<Json<Suite>> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    let existing = state
        .repos
        .suites
        .find(property_id, suite_id)
        .await?
        .ok_or_else(suite_not_found)?;

    let mut suite = Suite::new(
        property_id,
        request.name,
        request.square_feet,
        request.occupant,
    )?;
    suite.id = existing.id;
    suite.created_at = existing.created_at;

    Ok(Json(state.repos.suites.update(&suite).await?))
}

/// **DELETE /v1/properties/{id}/suites/{suite_id}**
pub async fn delete_suite(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path((property_id, suite_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    if !state.repos.suites.delete(property_id, suite_id).await? {
        return Err(suite_not_found());
    }
    tracing::info!(suite_id = %suite_id, property_id = %property_id, "Suite deleted");
    Ok(StatusCode::NO_CONTENT)
}
