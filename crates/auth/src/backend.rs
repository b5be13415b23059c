//! Concrete authentication backend
//!
//! Wraps `PgPool` + `AuthConfig` and owns auth-specific SQL queries.
//! Runtime `sqlx::query_as` keeps the read models independent of the
//! domain crates that own `users` and `team_members`.

use sqlx::PgPool;
use uuid::Uuid;

use propdesk_access::MemberLink;

use crate::claims::AccessClaims;
use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::types::AuthIdentity;

/// Concrete authentication backend.
///
/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub(crate) async fn find_user(&self, id: Uuid) -> Result<Option<AuthIdentity>, AuthError> {
        sqlx::query_as::<_, AuthIdentity>(
            r#"
            SELECT id, email, name, role, assigned_property_id,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %id, "Failed to load user");
            AuthError::UserLoadError
        })
    }

    /// The caller's team-member record.
    ///
    /// A record bound to the account wins; otherwise an unbound record with
    /// the same email (an invitee who has not signed in before).
    pub(crate) async fn find_member_link(
        &self,
        user: &AuthIdentity,
    ) -> Result<Option<MemberLink>, AuthError> {
        sqlx::query_as::<_, MemberLink>(
            r#"
            SELECT id, user_id, email, linked_properties
            FROM team_members
            WHERE user_id = $1
               OR (user_id IS NULL AND lower(email) = lower($2))
            ORDER BY (user_id IS NULL) ASC, created_at ASC
            LIMIT 1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = %user.id, "Failed to load team member link");
            AuthError::MemberLoadError
        })
    }

    /// Provision a new user from JWT claims (JIT user provisioning).
    ///
    /// New accounts start as tenants; staff roles arrive through invitations.
    /// `ON CONFLICT DO NOTHING` covers concurrent first requests. An email
    /// already held by another account (in any case) is a 409.
    async fn provision_user_from_jwt(
        &self,
        user_id: Uuid,
        claims: &AccessClaims,
    ) -> Result<AuthIdentity, AuthError> {
        let email = claims.email.as_deref().ok_or(AuthError::MissingEmail)?;

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, role, created_at, updated_at)
            VALUES ($1, $2, $3, 'tenant', NOW(), NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(email)
        .bind(claims.name.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                tracing::warn!(user_id = %user_id, "Token email already belongs to another user");
                AuthError::EmailInUse
            }
            e => {
                tracing::error!(error = %e, user_id = %user_id, "Failed to provision user");
                AuthError::UserProvisionFailed
            }
        })?;

        tracing::info!(user_id = %user_id, email = %email, "JIT user provisioned");

        self.find_user(user_id).await?.ok_or_else(|| {
            tracing::error!(user_id = %user_id, "User not found after provisioning");
            AuthError::UserProvisionFailed
        })
    }

    pub(crate) async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let user = match self.find_user(user_id).await? {
            Some(user) => user,
            None => self.provision_user_from_jwt(user_id, &claims).await?,
        };

        let member = self.find_member_link(&user).await?;

        Ok(AuthContext::new(user, member))
    }
}
