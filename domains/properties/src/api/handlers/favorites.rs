//! Favorite property handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use propdesk_auth::AuthUser;
use propdesk_common::{Error, Result};
use uuid::Uuid;

use super::properties::load_visible_property;
use crate::api::middleware::PropertiesState;
use crate::domain::entities::{Favorite, Property};

/// List the caller's favorite properties.
///
/// **GET /v1/favorites**
///
/// Favorites pointing at properties the caller can no longer see are skipped.
pub async fn list_favorites(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
) -> Result<Json<Vec<Property>>> {
    let favorites = ctx
        .scope()
        .filter(state.repos.favorites.list_for_user(ctx.user.id).await?);
    let ids: Vec<Uuid> = favorites.iter().map(|f| f.property_id).collect();
    let properties = state.repos.properties.list_by_ids(&ids).await?;
    Ok(Json(properties))
}

/// **PUT /v1/favorites/{property_id}**
pub async fn add_favorite(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
) -> Result<Json<Favorite>> {
    let property = load_visible_property(&state, &ctx, property_id).await?;
    let favorite = state.repos.favorites.add(ctx.user.id, property.id).await?;
    Ok(Json(favorite))
}

/// **DELETE /v1/favorites/{property_id}**
pub async fn remove_favorite(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
    Path(property_id): Path<Uuid>,
) -> Result<StatusCode> {
    if !state.repos.favorites.remove(ctx.user.id, property_id).await? {
        return Err(Error::NotFound("Favorite not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}
