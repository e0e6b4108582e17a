use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;
use tracing::error;

/// Business-rule violations surfaced verbatim to the caller; storage
/// failures stay opaque (logged server-side, generic message out).
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{} not found: {}", entity, id)]
    NotFound { entity: &'static str, id: String },

    #[display(fmt = "Salary already credited for {}/{}", month, year)]
    AlreadyCredited { month: u16, year: u16 },

    #[display(fmt = "{}", _0)]
    Conflict(String),

    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "{}", _0)]
    Forbidden(&'static str),

    #[display(fmt = "Internal Server Error")]
    Database(sqlx::Error),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        ApiError::NotFound {
            entity,
            id: id.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Database(e)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::AlreadyCredited { .. } | ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let ApiError::Database(e) = self {
            error!(error = %e, "Database error");
        }
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::not_found("Employee", "abc").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::AlreadyCredited {
                month: 2,
                year: 2025
            }
            .status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Conflict("applied".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::validation("bad month").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Forbidden("Admin only").status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn already_credited_names_the_period() {
        let e = ApiError::AlreadyCredited {
            month: 2,
            year: 2025,
        };
        assert_eq!(e.to_string(), "Salary already credited for 2/2025");
    }
}
