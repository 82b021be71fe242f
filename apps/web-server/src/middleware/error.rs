//! Error handling - every failure becomes an HTML page.

use actix_web::{HttpResponse, ResponseError, http::StatusCode, http::header::ContentType};

use yatube_core::error::{DomainError, RepoError};
use yatube_core::ports::AuthError;

use crate::templates;

/// Application-level error type rendered through `core/404.html` or `core/error.html`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn public_message(&self) -> &str {
        match self {
            AppError::NotFound(_) => "The page you requested does not exist.",
            AppError::BadRequest(detail) => detail,
            AppError::Template(_) | AppError::Internal(_) => "Something went wrong on our side.",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Template(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        match self {
            AppError::NotFound(what) => tracing::debug!(%what, "Not found"),
            AppError::BadRequest(detail) => tracing::debug!(%detail, "Bad request"),
            AppError::Template(detail) => tracing::error!(%detail, "Template error"),
            AppError::Internal(detail) => tracing::error!(%detail, "Internal error"),
        }

        let template = if status == StatusCode::NOT_FOUND {
            "core/404.html"
        } else {
            "core/error.html"
        };
        let mut context = templates::base_context(None);
        context.insert("status", &status.as_u16());
        context.insert("reason", &status.canonical_reason().unwrap_or("Error"));
        context.insert("message", self.public_message());

        let body = templates::render(template, &context).unwrap_or_else(|e| {
            tracing::error!(error = %e, template, "Failed to render error page");
            format!("{} {}", status.as_u16(), self.public_message())
        });

        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, key } => {
                AppError::NotFound(format!("{entity_type} {key}"))
            }
            DomainError::Repo(err) => err.into(),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound("Resource not found".to_string()),
            RepoError::Constraint(msg) => AppError::BadRequest(msg),
            RepoError::Connection(msg) => AppError::Internal(format!("Database connection: {msg}")),
            RepoError::Query(msg) => AppError::Internal(format!("Database query: {msg}")),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::from(DomainError::not_found("Group", "missing")).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(RepoError::Constraint("fk".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(RepoError::Query("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::from(AuthError::HashingError("salt".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_not_found_renders_html() {
        let response = AppError::NotFound("post 5".into()).error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body = std::str::from_utf8(&body).unwrap();
        assert!(body.contains("<html"));
        assert!(body.contains("404"));
    }

    #[actix_web::test]
    async fn test_internal_error_hides_detail() {
        let response = AppError::Internal("password=hunter2".into()).error_response();
        let body = to_bytes(response.into_body()).await.unwrap();
        let body = std::str::from_utf8(&body).unwrap();
        assert!(!body.contains("hunter2"));
    }
}
