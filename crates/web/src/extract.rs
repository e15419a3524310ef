use axum::{
    Json, async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;

use crate::error::WebError;

/// A JSON body that may be left out entirely.
///
/// An empty (or all-whitespace) body yields `None`. Anything else must be
/// declared as JSON and parse into `T`, or the request is rejected with 400.
#[derive(Debug)]
pub struct OptionalJson<T>(pub Option<T>);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = WebError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let declared_json = has_json_content_type(req.headers());

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|e| WebError::BadRequest(e.body_text()))?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self(None));
        }

        if !declared_json {
            return Err(WebError::BadRequest(
                "Expected request with `Content-Type: application/json`".to_string(),
            ));
        }

        let Json(value) =
            Json::<T>::from_bytes(&body).map_err(|e| WebError::BadRequest(e.body_text()))?;

        Ok(Self(Some(value)))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use storage::dto::delta::CalculateDeltasRequest;

    use super::*;

    async fn extract(
        content_type: Option<&str>,
        body: &'static str,
    ) -> Result<Option<CalculateDeltasRequest>, WebError> {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();

        OptionalJson::<CalculateDeltasRequest>::from_request(request, &())
            .await
            .map(|OptionalJson(value)| value)
    }

    #[tokio::test]
    async fn test_missing_body_is_none() {
        assert!(extract(None, "").await.unwrap().is_none());
        assert!(extract(Some("application/json"), "  \n").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_json_body_is_parsed() {
        let request = extract(Some("application/json"), r#"{"force": true}"#)
            .await
            .unwrap()
            .unwrap();
        assert!(request.force);

        let request = extract(Some("application/json; charset=utf-8"), "{}")
            .await
            .unwrap()
            .unwrap();
        assert!(!request.force);
    }

    #[tokio::test]
    async fn test_body_without_json_content_type_is_rejected() {
        let result = extract(None, r#"{"force": true}"#).await;
        assert!(matches!(result, Err(WebError::BadRequest(_))));

        let result = extract(Some("text/plain"), r#"{"force": true}"#).await;
        assert!(matches!(result, Err(WebError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_rejected() {
        let result = extract(Some("application/json"), r#"{"force": "yes"}"#).await;
        assert!(matches!(result, Err(WebError::BadRequest(_))));

        let result = extract(Some("application/json"), "{force").await;
        assert!(matches!(result, Err(WebError::BadRequest(_))));
    }
}
