use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;
use utoipa::ToSchema;
use crate::models::auth::ErrorResponse;

#[derive(Debug, Serialize, ToSchema)]
pub enum ServiceError {
    Unauthorized(String),
    Forbidden(String),
    NotFound(String),
    InternalError(String),
    DatabaseError(String),
    ValidationError(String),
    AuthenticationError(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ServiceError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            ServiceError::InternalError(msg) => write!(f, "Internal Error: {}", msg),
            ServiceError::DatabaseError(msg) => write!(f, "Database Error: {}", msg),
            ServiceError::ValidationError(msg) => write!(f, "Validation Error: {}", msg),
            ServiceError::AuthenticationError(msg) => write!(f, "Authentication Error: {}", msg),
        }
    }
}

impl ResponseError for ServiceError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ServiceError::Unauthorized(msg) => {
                log::warn!("Unauthorized: {}", msg);
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: msg.clone(),
                    message: None,
                })
            }
            ServiceError::Forbidden(msg) => {
                log::warn!("Forbidden: {}", msg);
                HttpResponse::Forbidden().json(ErrorResponse {
                    error: msg.clone(),
                    message: None,
                })
            }
            ServiceError::NotFound(msg) => {
                log::warn!("Not Found: {}", msg);
                HttpResponse::NotFound().json(ErrorResponse {
                    error: msg.clone(),
                    message: None,
                })
            }
            ServiceError::InternalError(msg) => {
                log::error!("Internal Error: {}", msg);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(), // Don't expose internal details
                    message: None,
                })
            }
            ServiceError::DatabaseError(msg) => {
                log::error!("Database Error: {}", msg);
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Internal server error".to_string(), // Don't expose database details
                    message: None,
                })
            }
            ServiceError::ValidationError(msg) => {
                log::warn!("Validation Error: {}", msg);
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: msg.clone(),
                    message: None,
                })
            }
            ServiceError::AuthenticationError(msg) => {
                log::warn!("Authentication Error: {}", msg);
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "Invalid token".to_string(),
                    message: Some(msg.clone()),
                })
            }
        }
    }
}

// Convert sqlx errors to ServiceError
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ServiceError::NotFound("Record not found".to_string()),
            _ => ServiceError::DatabaseError(err.to_string()),
        }
    }
}

// Convert bcrypt errors to ServiceError
impl From<bcrypt::BcryptError> for ServiceError {
    fn from(err: bcrypt::BcryptError) -> Self {
        ServiceError::InternalError(format!("Password hashing error: {}", err))
    }
}

// Convert JWT errors to ServiceError
impl From<jsonwebtoken::errors::Error> for ServiceError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        ServiceError::AuthenticationError(format!("JWT error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn status_codes_match_error_categories() {
        let cases = [
            (
                ServiceError::ValidationError("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                ServiceError::Unauthorized("no token".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::AuthenticationError("bad signature".into()),
                StatusCode::UNAUTHORIZED,
            ),
            (
                ServiceError::Forbidden("Unauthorized".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                ServiceError::NotFound("missing".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                ServiceError::InternalError("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ServiceError::DatabaseError("down".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.error_response().status(), expected);
        }
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: ServiceError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
