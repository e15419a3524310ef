use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::fmt;
use storage::dto::delta::UsersWithoutRankingsResponse;
use storage::error::StorageError;
use storage::services::delta_computation::DeltaError;
use validator::ValidationErrors;

/// Web layer errors
#[derive(Debug)]
pub enum WebError {
    Storage(StorageError),
    Delta(DeltaError),
    Validation(ValidationErrors),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    NotFound(&'static str),
}

impl WebError {
    /// Maps `StorageError::NotFound` to a 404 carrying `message`.
    pub fn not_found(message: &'static str) -> impl FnOnce(StorageError) -> WebError {
        move |error| match error {
            StorageError::NotFound => WebError::NotFound(message),
            other => WebError::Storage(other),
        }
    }

    fn status_and_body(&self) -> (StatusCode, Value) {
        match self {
            Self::Storage(StorageError::NotFound) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Resource not found" }),
            ),
            Self::Storage(StorageError::ConstraintViolation(msg)) => {
                (StatusCode::CONFLICT, json!({ "error": msg }))
            }
            Self::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                internal_error()
            }
            Self::Delta(DeltaError::EpisodeNotFound(_)) => (
                StatusCode::NOT_FOUND,
                json!({ "message": "Episode not found" }),
            ),
            Self::Delta(DeltaError::UsersWithoutRankings(users)) => (
                StatusCode::BAD_REQUEST,
                json!(UsersWithoutRankingsResponse::new(users.clone())),
            ),
            Self::Delta(e @ (DeltaError::Split(_) | DeltaError::InvalidOdds(_))) => {
                tracing::error!("Delta calculation aborted: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "CONFIGURATION_ERROR",
                        "message": e.to_string()
                    }),
                )
            }
            Self::Delta(DeltaError::Storage(e)) => {
                tracing::error!("Storage error during delta calculation: {:?}", e);
                internal_error()
            }
            Self::Validation(errors) => {
                let field_errors: Vec<String> = errors
                    .field_errors()
                    .iter()
                    .flat_map(|(field, errors)| {
                        errors.iter().map(move |e| {
                            format!(
                                "{}: {}",
                                field,
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string())
                            )
                        })
                    })
                    .collect();

                (
                    StatusCode::BAD_REQUEST,
                    json!({
                        "error": "Validation failed",
                        "details": field_errors
                    }),
                )
            }
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": "Unauthorized" })),
            Self::Forbidden(msg) => (StatusCode::FORBIDDEN, json!({ "error": msg })),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
        }
    }
}

fn internal_error() -> (StatusCode, Value) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "error": "An internal error occurred" }),
    )
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {}", e),
            Self::Delta(e) => write!(f, "Delta calculation error: {}", e),
            Self::Validation(e) => write!(f, "Validation error: {}", e),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::Unauthorized => write!(f, "Unauthorized"),
            Self::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            Self::NotFound(msg) => write!(f, "{}", msg),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status_code, body) = self.status_and_body();
        (status_code, Json(body)).into_response()
    }
}

impl From<StorageError> for WebError {
    fn from(error: StorageError) -> Self {
        Self::Storage(error)
    }
}

impl From<DeltaError> for WebError {
    fn from(error: DeltaError) -> Self {
        Self::Delta(error)
    }
}

impl From<ValidationErrors> for WebError {
    fn from(error: ValidationErrors) -> Self {
        Self::Validation(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::dto::delta::UserSummary;
    use storage::models::SplitError;
    use uuid::Uuid;

    #[test]
    fn test_missing_episode_is_404_with_message() {
        let (status, body) = WebError::Delta(DeltaError::EpisodeNotFound(4)).status_and_body();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "message": "Episode not found" }));
    }

    #[test]
    fn test_users_without_rankings_is_400_with_users() {
        let user_id = Uuid::new_v4();
        let error = WebError::Delta(DeltaError::UsersWithoutRankings(vec![UserSummary {
            id: user_id,
            name: "Prue Leith".to_string(),
        }]));

        let (status, body) = error.status_and_body();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "USERS_WITHOUT_RANKINGS");
        assert_eq!(body["usersWithoutRankings"][0]["id"], user_id.to_string());
        assert_eq!(body["usersWithoutRankings"][0]["name"], "Prue Leith");
    }

    #[test]
    fn test_missing_split_is_500_and_named() {
        let error = WebError::Delta(DeltaError::Split(SplitError::Missing(11)));
        let (status, body) = error.status_and_body();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "CONFIGURATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("episode 11"));
    }

    #[test]
    fn test_not_found_mapper_keeps_other_errors() {
        let mapped = WebError::not_found("Bet not found")(StorageError::NotFound);
        assert!(matches!(mapped, WebError::NotFound("Bet not found")));

        let mapped = WebError::not_found("Bet not found")(StorageError::ConstraintViolation(
            "duplicate".to_string(),
        ));
        assert_eq!(mapped.status_and_body().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_forbidden_carries_message() {
        let (status, body) =
            WebError::Forbidden("User is not eligible for this bet".to_string()).status_and_body();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "User is not eligible for this bet");
    }

    #[test]
    fn test_unauthorized_response() {
        let response = WebError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
