//! Tenant property resolution

use uuid::Uuid;

/// A property as far as tenant routing is concerned
pub trait TenantProperty {
    fn property_id(&self) -> Uuid;
    fn property_slug(&self) -> &str;
}

/// Slug of the property a tenant is assigned to.
///
/// `None` when the tenant has no assignment or the assigned property is not
/// among `properties` (deleted, or not loaded by the caller).
pub fn tenant_property_slug<P: TenantProperty>(
    assigned_property_id: Option<Uuid>,
    properties: &[P],
) -> Option<String> {
    let assigned = assigned_property_id?;
    properties
        .iter()
        .find(|p| p.property_id() == assigned)
        .map(|p| p.property_slug().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Listing {
        id: Uuid,
        slug: String,
    }

    impl TenantProperty for Listing {
        fn property_id(&self) -> Uuid {
            self.id
        }
        fn property_slug(&self) -> &str {
            &self.slug
        }
    }

    fn listings() -> Vec<Listing> {
        vec![
            Listing {
                id: Uuid::from_u128(1),
                slug: "downtown-apartments".to_string(),
            },
            Listing {
                id: Uuid::from_u128(2),
                slug: "riverside-lofts".to_string(),
            },
        ]
    }

    #[test]
    fn test_known_assignment_resolves_slug() {
        assert_eq!(
            tenant_property_slug(Some(Uuid::from_u128(1)), &listings()).as_deref(),
            Some("downtown-apartments")
        );
    }

    #[test]
    fn test_unknown_assignment_is_none() {
        assert_eq!(tenant_property_slug(Some(Uuid::from_u128(999)), &listings()), None);
    }

    #[test]
    fn test_missing_assignment_is_none() {
        assert_eq!(tenant_property_slug(None, &listings()), None);
        assert_eq!(tenant_property_slug::<Listing>(None, &[]), None);
    }
}
