//! Properties domain: property groups, properties, units, suites, favorites

pub mod api;
pub mod domain;
pub mod repository;

pub use domain::entities::*;
pub use domain::image::{InlineImage, MAX_INLINE_IMAGE_BYTES};

pub use repository::{
    FavoriteRepository, PropertiesRepositories, PropertyGroupRepository, PropertyRepository,
    SuiteRepository, UnitRepository,
};

pub use api::routes;
pub use api::PropertiesState;
