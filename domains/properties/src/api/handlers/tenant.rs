//! Tenant landing handler

use axum::{extract::State, Json};
use propdesk_access::{is_tenant, tenant_property_slug};
use propdesk_auth::AuthUser;
use propdesk_common::{Error, Result};
use serde::Serialize;

use crate::api::middleware::PropertiesState;
use crate::domain::entities::Property;

#[derive(Debug, Serialize)]
pub struct TenantPropertyResponse {
    pub slug: String,
    pub property: Property,
}

/// Resolve the property a tenant is assigned to.
///
/// **GET /v1/tenant/property**
///
/// 403 for non-tenants; 404 when there is no assignment or the assigned
/// property no longer exists.
pub async fn get_tenant_property(
    AuthUser(ctx): AuthUser,
    State(state): State<PropertiesState>,
) -> Result<Json<TenantPropertyResponse>> {
    if !is_tenant(Some(ctx.role())) {
        return Err(Error::forbidden("view the tenant property page"));
    }

    let not_assigned = || Error::NotFound("No property is assigned to this tenant".to_string());
    let assigned = ctx.user.assigned_property_id.ok_or_else(not_assigned)?;

    let properties: Vec<Property> = state
        .repos
        .properties
        .find(assigned)
        .await?
        .into_iter()
        .collect();
    let slug = tenant_property_slug(Some(assigned), &properties).ok_or_else(not_assigned)?;
    let property = properties.into_iter().next().ok_or_else(not_assigned)?;

    Ok(Json(TenantPropertyResponse { slug, property }))
}
