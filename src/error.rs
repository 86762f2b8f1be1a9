use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Challenge sent in `WWW-Authenticate` with every 401.
pub const AUTH_CHALLENGE: &str = "Basic realm=\"portfolio-api\"";

/// RepositoryError
///
/// Failures raised by the data-access layer.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// An update targeted a row that no longer exists.
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    /// Anything the database driver reports (connectivity, constraint violations, ...).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// ApiError
///
/// Errors a request handler or the access policy can surface to the client.
/// Each variant maps to exactly one HTTP status in `IntoResponse`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{kind} with id {id} not found")]
    NotFound { kind: &'static str, id: i64 },

    #[error("authentication required")]
    Unauthorized,

    /// Store-level failure. The client only sees a generic message.
    #[error("internal server error")]
    Repository(#[source] RepositoryError),
}

impl ApiError {
    pub fn not_found(kind: &'static str, id: i64) -> Self {
        ApiError::NotFound { kind, id }
    }
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { kind, id } => ApiError::NotFound { kind, id },
            other => ApiError::Repository(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Repository(source) => {
                tracing::error!(error = %source, "repository failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();

        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(AUTH_CHALLENGE),
            );
        }

        response
    }
}
