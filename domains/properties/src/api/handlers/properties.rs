//! Property API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use propdesk_access::Capability;
use propdesk_auth::{AuthContext, AuthUser};
use propdesk_common::{Error, Pagination, Result, ValidatedJson};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::PropertiesState;
use crate::domain::entities::{unique_slug, Property, MAX_TITLE_LEN};
use crate::domain::image::InlineImage;

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePropertyRequest {
    pub group_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// `data:image/...;base64,` URL
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePropertyRequest {
    pub group_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub address: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    /// New image; an empty string removes the current one
    pub image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PropertyFilter {
    pub group_id: Option<Uuid>,
}

/// Load a property the caller may see, reporting hidden ones as missing
pub(crate) async fn load_visible_property(
    state: &PropertiesState,
    ctx: &AuthContext,
    id: Uuid,
) -> Result<Property> {
    let property = state
        .repos
        .properties
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))?;
    ctx.require_property(property.id)?;
    Ok(property)
}

async fn ensure_group_exists(state: &PropertiesState, group_id: Option<Uuid>) -> Result<()> {
    if let Some(group_id) = group_id {
        if state.repos.groups.find(group_id).await?.is_none() {
            return Err(Error::Validation(format!(
                "Property group {} does not exist",
                group_id
            )));
        }
    }
    Ok(())
}

async fn free_slug(state: &PropertiesState, base: &str, exclude: Option<Uuid>) -> Result<String> {
    let taken = state.repos.properties.slugs_like(base, exclude).await?;
    Ok(unique_slug(base, &taken))
}

/// List properties visible to the caller
///
/// **GET /v1/properties**
pub async fn list_properties(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Query(filter): Query<PropertyFilter>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Property>>> {
    let properties = state.repos.properties.list(filter.group_id).await?;
    let visible = ctx.scope().filter(properties);
    Ok(Json(page.apply(visible)))
}

/// **GET /v1/properties/{id}**
pub async fn get_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Property>> {
    Ok(Json(load_visible_property(&state, &ctx, id).await?))
}

/// **GET /v1/properties/by-slug/{slug}**
pub async fn get_property_by_slug(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(slug): Path<String>,
) -> Result<Json<Property>> {
    let property = state
        .repos
        .properties
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))?;
    ctx.require_property(property.id)?;
    Ok(Json(property))
}

/// Create a property
///
/// **POST /v1/properties**
///
/// The slug is derived from the title; collisions get a numeric suffix.
pub async fn create_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    ValidatedJson(request): ValidatedJson<CreatePropertyRequest>,
) -> Result<(StatusCode, Json<Property>)> {
    ctx.require(Capability::ManageProperties, "manage properties")?;
    ensure_group_exists(&state, request.group_id).await?;

    let image = request.image.as_deref().map(InlineImage::parse).transpose()?;

    let mut property = Property::new(
        request.group_id,
        request.title,
        request.address,
        request.description,
        image,
        ctx.user.id,
    )?;
    property.slug = free_slug(&state, &property.slug, None).await?;

    let created = state.repos.properties.create(&property).await?;

    tracing::info!(
        property_id = %created.id,
        slug = %created.slug,
        user_id = %ctx.user.id,
        "Property created"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// **PATCH /v1/properties/{id}**
pub async fn update_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdatePropertyRequest>,
) -> Result<Json<Property>> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    let mut property = state
        .repos
        .properties
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Property not found".to_string()))?;

    if request.group_id.is_some() {
        ensure_group_exists(&state, request.group_id).await?;
        property.group_id = request.group_id;
    }

    if let Some(title) = request.title.as_deref() {
        let base = property.retitle(title)?;
        property.slug = free_slug(&state, &base, Some(property.id)).await?;
    }

    if let Some(address) = request.address {
        property.address = Some(address);
    }
    if let Some(description) = request.description {
        property.description = Some(description);
    }
    match request.image.as_deref() {
        Some("") => property.image = None,
        Some(raw) => property.image = Some(InlineImage::parse(raw)?.into_data_url()),
        None => {}
    }

    let updated = state.repos.properties.update(&property).await?;
    Ok(Json(updated))
}

/// Delete a property with its units, suites and tasks
///
/// **DELETE /v1/properties/{id}**
pub async fn delete_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    ctx.require(Capability::ManageProperties, "manage properties")?;

    if !state.repos.properties.delete(id).await? {
        return Err(Error::NotFound("Property not found".to_string()));
    }
    tracing::info!(property_id = %id, user_id = %ctx.user.id, "Property deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_validation() {
        let request = CreatePropertyRequest {
            group_id: None,
            title: "Downtown Apartments".to_string(),
            address: Some("1 Main St".to_string()),
            description: None,
            image: None,
        };
        assert!(request.validate().is_ok());

        let request = CreatePropertyRequest {
            group_id: None,
            title: "x".repeat(MAX_TITLE_LEN + 1),
            address: None,
            description: None,
            image: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_filter_deserializes_from_query() {
        let id = Uuid::new_v4();
        let filter: PropertyFilter =
            serde_json::from_value(serde_json::json!({ "group_id": id })).unwrap();
        assert_eq!(filter.group_id, Some(id));
    }
}
