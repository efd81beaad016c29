use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Service-wide error taxonomy. Every handler returns
/// `Result<HttpResponse, ApiError>` and lets `?` propagate into the
/// `ResponseError` rendering below.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invariant-violating input; rendered as a field-keyed 400 body.
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    PermissionDenied(&'static str),

    #[error("authentication required")]
    Unauthorized,

    #[error("database error: {0}")]
    Database(#[from] DbErr),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Validation { field, message } => json!({ *field: [message] }),
            ApiError::NotFound(_) | ApiError::Conflict(_) | ApiError::PermissionDenied(_) => {
                json!({ "detail": self.to_string() })
            }
            ApiError::Unauthorized => json!({ "detail": self.to_string() }),
            // Opaque body; the cause goes to the log, not the caller.
            ApiError::Database(_) | ApiError::Internal(_) => {
                json!({ "detail": "internal server error" })
            }
        }
    }
}

impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Database(err) => log::error!("database error: {:?}", err),
            ApiError::Internal(err) => log::error!("internal error: {:?}", err),
            _ => {}
        }
        HttpResponse::build(self.status_code()).json(self.body())
    }
}

/// Insert races on unique keys surface as `DbErr`; toggle handlers translate
/// them into `Conflict` instead of a 5xx.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_renders_field_keyed_body() {
        let err = ApiError::validation("cooking_time", "must be at least 1");
        assert_eq!(
            err.body(),
            json!({ "cooking_time": ["must be at least 1"] })
        );
    }

    #[test]
    fn statuses_follow_taxonomy() {
        use actix_web::ResponseError;

        assert_eq!(
            ApiError::validation("tags", "x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("recipe").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::conflict("already there").status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::PermissionDenied("not the author").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::Unauthorized.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn database_errors_stay_opaque() {
        let err = ApiError::Database(DbErr::Custom("connection lost".into()));
        assert_eq!(err.body(), json!({ "detail": "internal server error" }));
    }

    #[test]
    fn not_found_names_the_entity() {
        let err = ApiError::NotFound("recipe");
        assert_eq!(err.body(), json!({ "detail": "recipe not found" }));
    }
}
