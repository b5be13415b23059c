//! Route definitions for the properties domain API

use axum::{
    routing::{get, put},
    Router,
};

use super::handlers::{favorites, groups, properties, tenant, units};
use super::middleware::PropertiesState;

fn group_routes() -> Router<PropertiesState> {
    Router::new()
        .route(
            "/v1/property-groups",
            get(groups::list_groups).post(groups::create_group),
        )
        .route(
            "/v1/property-groups/{id}",
            get(groups::get_group)
                .patch(groups::update_group)
                .delete(groups::delete_group),
        )
}

fn property_routes() -> Router<PropertiesState> {
    Router::new()
        .route(
            "/v1/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/v1/properties/{id}",
            get(properties::get_property)
                .patch(properties::update_property)
                .delete(properties::delete_property),
        )
        .route(
            "/v1/properties/by-slug/{slug}",
            get(properties::get_property_by_slug),
        )
}

fn unit_routes() -> Router<PropertiesState> {
    Router::new()
        .route(
            "/v1/properties/{id}/units",
            get(units::list_units).post(units::create_unit),
        )
        .route(
            "/v1/properties/{id}/units/{unit_id}",
            get(units::get_unit)
                .patch(units::update_unit)
                .delete(units::delete_unit),
        )
        .route(
            "/v1/properties/{id}/suites",
            get(units::list_suites).post(units::create_suite),
        )
        .route(
            "/v1/properties/{id}/suites/{suite_id}",
            get(units::get_suite)
                .patch(units::update_suite)
                .delete(units::delete_suite),
        )
}

fn favorite_routes() -> Router<PropertiesState> {
    Router::new()
        .route("/v1/favorites", get(favorites::list_favorites))
        .route(
            "/v1/favorites/{property_id}",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
}

/// Create all properties domain API routes
pub fn routes() -> Router<PropertiesState> {
    Router::new()
        .merge(group_routes())
        .merge(property_routes())
        .merge(unit_routes())
        .merge(favorite_routes())
        .route("/v1/tenant/property", get(tenant::get_tenant_property))
}
