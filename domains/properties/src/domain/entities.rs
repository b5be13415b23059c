//! Domain entities for the properties domain
//!
//! Properties belong to an optional group and own their units and suites.
//! Everything here is property-scoped, so role filtering applies uniformly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use propdesk_access::{PropertyScoped, TenantProperty};
use propdesk_common::{slugify, Error, Result};

use crate::domain::image::InlineImage;

/// Longest accepted property title
pub const MAX_TITLE_LEN: usize = 200;

/// Named collection of properties (a portfolio, a neighborhood)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PropertyGroup {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PropertyGroup {
    pub fn new(name: String, description: Option<String>, created_by: Uuid) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("Group name is required".to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            description,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Property entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Property {
    pub id: Uuid,
    pub group_id: Option<Uuid>,
    pub title: String,
    /// URL segment derived from the title, unique across properties
    pub slug: String,
    pub address: Option<String>,
    pub description: Option<String>,
    /// Inline `data:` URL image
    pub image: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Create a property, deriving its base slug from the title.
    ///
    /// The slug may still collide with an existing one; callers resolve that
    /// with [`unique_slug`] before inserting.
    pub fn new(
        group_id: Option<Uuid>,
        title: String,
        address: Option<String>,
        description: Option<String>,
        image: Option<InlineImage>,
        created_by: Uuid,
    ) -> Result<Self> {
        let title = Self::validate_title(&title)?;
        let slug = Self::base_slug(&title)?;
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4(),
            group_id,
            title,
            slug,
            address,
            description,
            image: image.map(InlineImage::into_data_url),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Trimmed title, or a validation error
    pub fn validate_title(title: &str) -> Result<String> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("Property title is required".to_string()));
        }
        if title.chars().count() > MAX_TITLE_LEN {
            return Err(Error::Validation(format!(
                "Property title must be at most {} characters",
                MAX_TITLE_LEN
            )));
        }
        Ok(title.to_string())
    }

    pub fn base_slug(title: &str) -> Result<String> {
        slugify(title).ok_or_else(|| {
            Error::Validation("Property title must contain a letter or digit".to_string())
        })
    }

    /// Rename, returning the new base slug
    pub fn retitle(&mut self, title: &str) -> Result<String> {
        self.title = Self::validate_title(title)?;
        Self::base_slug(&self.title)
    }
}

impl PropertyScoped for Property {
    fn scope_property_id(&self) -> Uuid {
        self.id
    }
}

impl TenantProperty for Property {
    fn property_id(&self) -> Uuid {
        self.id
    }

    fn property_slug(&self) -> &str {
        &self.slug
    }
}

/// Pick a slug not in `taken`: the base itself, else `base-2`, `base-3`, ...
pub fn unique_slug(base: &str, taken: &[String]) -> String {
    if !taken.iter().any(|s| s == base) {
        return base.to_string();
    }
    (2..)
        .map(|n| format!("{}-{}", base, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| base.to_string())
}

/// Residential unit inside a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Unit {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub floor: Option<i32>,
    pub bedrooms: Option<i32>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(
        property_id: Uuid,
        name: String,
        floor: Option<i32>,
        bedrooms: Option<i32>,
        notes: Option<String>,
    ) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("Unit name is required".to_string()));
        }
        if bedrooms.is_some_and(|b| b < 0) {
            return Err(Error::Validation(
                "Bedrooms cannot be negative".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            property_id,
            name,
            floor,
            bedrooms,
            notes,
            created_at: now,
            updated_at: now,
        })
    }
}

impl PropertyScoped for Unit {
    fn scope_property_id(&self) -> Uuid {
        self.property_id
    }
}

/// Commercial suite inside a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Suite {
    pub id: Uuid,
    pub property_id: Uuid,
    pub name: String,
    pub square_feet: Option<i32>,
    /// Business currently leasing the suite
    pub occupant: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Suite {
    pub fn new(
        property_id: Uuid,
        name: String,
        square_feet: Option<i32>,
        occupant: Option<String>,
    ) -> Result<Self> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(Error::Validation("Suite name is required".to_string()));
        }
        if square_feet.is_some_and(|sf| sf <= 0) {
            return Err(Error::Validation(
                "Square footage must be positive".to_string(),
            ));
        }
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            property_id,
            name,
            square_feet,
            occupant,
            created_at: now,
            updated_at: now,
        })
    }
}

impl PropertyScoped for Suite {
    fn scope_property_id(&self) -> Uuid {
        self.property_id
    }
}

/// A user's bookmark on a property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Favorite {
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl PropertyScoped for Favorite {
    fn scope_property_id(&self) -> Uuid {
        self.property_id
    }
}
