//! JWT validation and token extraction helpers

use axum::http::HeaderValue;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::claims::AccessClaims;
use crate::config::AuthConfig;
use crate::error::AuthError;

/// Validate an HS256 access token
pub(crate) fn validate_jwt_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);

    if let Some(aud) = &config.audience {
        validation.set_audience(&[aud]);
    } else {
        validation.validate_aud = false;
    }

    if let Some(iss) = &config.issuer {
        validation.set_issuer(&[iss]);
    }

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_ref());

    let token_data = decode::<AccessClaims>(token, &decoding_key, &validation).map_err(|e| {
        tracing::debug!(error = %e, "JWT validation failed");
        AuthError::InvalidToken
    })?;

    Ok(token_data.claims)
}

/// Sign claims with the configured secret.
///
/// Production tokens come from the identity provider; this exists for local
/// tooling and tests.
pub fn issue_token(
    claims: &AccessClaims,
    config: &AuthConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let key = EncodingKey::from_secret(config.jwt_secret.as_ref());
    encode(&Header::new(Algorithm::HS256), claims, &key)
}

/// Extract bearer token from Authorization header
pub(crate) fn extract_bearer_token(header: &HeaderValue) -> Result<String, AuthError> {
    let header_str = header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthorizationFormat)?;

    match header_str.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidAuthorizationFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(issuer: Option<&str>, audience: Option<&str>) -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-key".to_string(),
            issuer: issuer.map(str::to_string),
            audience: audience.map(str::to_string),
        }
    }

    fn claims(aud: &str, iss: Option<&str>) -> AccessClaims {
        let now = chrono::Utc::now().timestamp() as u64;
        AccessClaims {
            sub: uuid::Uuid::new_v4().to_string(),
            email: Some("manager@example.com".to_string()),
            name: None,
            iat: now,
            exp: now + 3600,
            aud: aud.to_string(),
            iss: iss.map(str::to_string),
        }
    }

    #[test]
    fn test_extract_bearer_token() {
        let header = HeaderValue::from_static("Bearer abc123");
        assert_eq!(extract_bearer_token(&header).unwrap(), "abc123");

        let header = HeaderValue::from_static("abc123");
        assert!(extract_bearer_token(&header).is_err());

        let header = HeaderValue::from_static("Basic abc123");
        assert!(extract_bearer_token(&header).is_err());

        let header = HeaderValue::from_static("Bearer ");
        assert!(extract_bearer_token(&header).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let result = validate_jwt_token("invalid_token", &config(None, None));
        assert!(matches!(result, Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_roundtrip_without_issuer_or_audience() {
        let config = config(None, None);
        let original = claims("authenticated", None);
        let token = issue_token(&original, &config).unwrap();

        let decoded = validate_jwt_token(&token, &config).unwrap();
        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.email, original.email);
    }

    #[test]
    fn test_audience_and_issuer_enforced() {
        let config = config(Some("https://auth.propdesk.test"), Some("propdesk"));

        let good = issue_token(
            &claims("propdesk", Some("https://auth.propdesk.test")),
            &config,
        )
        .unwrap();
        assert!(validate_jwt_token(&good, &config).is_ok());

        let wrong_aud = issue_token(
            &claims("someone-else", Some("https://auth.propdesk.test")),
            &config,
        )
        .unwrap();
        assert!(validate_jwt_token(&wrong_aud, &config).is_err());

        let wrong_iss = issue_token(&claims("propdesk", Some("https://evil.test")), &config)
            .unwrap();
        assert!(validate_jwt_token(&wrong_iss, &config).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = issue_token(&claims("authenticated", None), &config(None, None)).unwrap();
        let other = AuthConfig {
            jwt_secret: "different-secret".to_string(),
            issuer: None,
            audience: None,
        };
        assert!(validate_jwt_token(&token, &other).is_err());
    }
}
