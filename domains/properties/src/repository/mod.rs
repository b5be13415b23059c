//! Repository implementations for the properties domain

pub mod favorites;
pub mod groups;
pub mod properties;
pub mod suites;
pub mod units;

use sqlx::PgPool;

pub use favorites::FavoriteRepository;
pub use groups::PropertyGroupRepository;
pub use properties::PropertyRepository;
pub use suites::SuiteRepository;
pub use units::UnitRepository;

/// Combined repository access for the properties domain
#[derive(Clone)]
pub struct PropertiesRepositories {
    pool: PgPool,
    pub groups: PropertyGroupRepository,
    pub properties: PropertyRepository,
    pub units: UnitRepository,
    pub suites: SuiteRepository,
    pub favorites: FavoriteRepository,
}

impl PropertiesRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            groups: PropertyGroupRepository::new(pool.clone()),
            properties: PropertyRepository::new(pool.clone()),
            units: UnitRepository::new(pool.clone()),
            suites: SuiteRepository::new(pool.clone()),
            favorites: FavoriteRepository::new(pool.clone()),
            pool,
        }
    }

    /// Underlying pool, for cross-domain reads
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique-constraint violation to `AlreadyExists`
pub(crate) fn map_unique(e: sqlx::Error) -> propdesk_common::RepositoryError {
    match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            propdesk_common::RepositoryError::AlreadyExists
        }
        _ => propdesk_common::RepositoryError::from(e),
    }
}
