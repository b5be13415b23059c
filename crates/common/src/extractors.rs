//! Custom axum extractors for PropDesk

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

use crate::Error;

/// Default page size for list endpoints
const DEFAULT_LIMIT: i64 = 50;

/// Maximum page size for list endpoints
const MAX_LIMIT: i64 = 200;

/// Pagination query parameters for list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

impl Pagination {
    /// Offset, defaulting to 0
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Limit, defaulting to 50, capped at 200
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Page an already-filtered collection.
    ///
    /// Role filtering happens after the rows are loaded, so list endpoints
    /// page the visible subset rather than pushing OFFSET/LIMIT into SQL.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset() as usize)
            .take(self.limit() as usize)
            .collect()
    }
}

/// JSON extractor that validates the deserialized value.
///
/// All input errors (deserialization and validation) return 400.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

/// Rejection type for `ValidatedJson`
#[derive(Debug)]
pub enum ValidatedJsonRejection {
    Json(JsonRejection),
    Validation(Error),
}

impl IntoResponse for ValidatedJsonRejection {
    fn into_response(self) -> Response {
        match self {
            ValidatedJsonRejection::Json(e) => Error::Validation(e.body_text()).into_response(),
            ValidatedJsonRejection::Validation(e) => e.into_response(),
        }
    }
}

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ValidatedJsonRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(ValidatedJsonRejection::Json)?;
        value.validate().map_err(|e| {
            ValidatedJsonRejection::Validation(Error::Validation(format!(
                "Validation failed: {}",
                e
            )))
        })?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{self, Request as HttpRequest, StatusCode};

    #[derive(Debug, Deserialize, Validate)]
    struct UnitPayload {
        #[validate(length(min = 1, max = 10))]
        label: String,
    }

    fn json_request(body: &str) -> HttpRequest<axum::body::Body> {
        HttpRequest::builder()
            .method(http::Method::POST)
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_validated_json_valid_input() {
        let req = json_request(r#"{"label": "4B"}"#);
        let result = ValidatedJson::<UnitPayload>::from_request(req, &()).await;
        assert_eq!(result.unwrap().0.label, "4B");
    }

    #[tokio::test]
    async fn test_validated_json_malformed_body_is_400() {
        let req = json_request("not json");
        let err = ValidatedJson::<UnitPayload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validated_json_rule_violation_is_400() {
        let req = json_request(r#"{"label": ""}"#);
        let err = ValidatedJson::<UnitPayload>::from_request(req, &())
            .await
            .unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_pagination_defaults_and_clamping() {
        let p = Pagination::default();
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 50);

        let p = Pagination {
            offset: Some(-5),
            limit: Some(5000),
        };
        assert_eq!(p.offset(), 0);
        assert_eq!(p.limit(), 200);

        let p = Pagination {
            offset: None,
            limit: Some(0),
        };
        assert_eq!(p.limit(), 1);
    }

    #[test]
    fn test_pagination_apply_pages_filtered_items() {
        let items: Vec<i32> = (0..10).collect();
        let p = Pagination {
            offset: Some(3),
            limit: Some(4),
        };
        assert_eq!(p.apply(items), vec![3, 4, 5, 6]);

        let p = Pagination {
            offset: Some(20),
            limit: None,
        };
        assert!(p.apply((0..10).collect::<Vec<i32>>()).is_empty());
    }
}
