use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{Request, Response};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::response::OpenApiResponderInner;
use serde::Serialize;
use std::io::Cursor;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error")]
    Db {
        message: String,
        #[source]
        source: sqlx::error::Error,
    },
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Session expired")]
    SessionExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Internal server error")]
    PasswordHash { message: String },
    #[error("Internal server error")]
    TokenIssue {
        message: String,
        #[source]
        source: jsonwebtoken::errors::Error,
    },
    #[error("Internal server error")]
    Export {
        message: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
    #[error("Internal server error")]
    Internal { message: String },
    #[error("Username {0} already exists")]
    UserAlreadyExists(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),
}

/// Body of every JSON error answered by the API surface.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    pub fn db(message: impl Into<String>, source: sqlx::error::Error) -> Self {
        Self::Db {
            message: message.into(),
            source,
        }
    }

    pub fn password_hash(message: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::PasswordHash {
            message: format!("{}: {}", message.into(), source),
        }
    }

    pub fn token_issue(message: impl Into<String>, source: jsonwebtoken::errors::Error) -> Self {
        Self::TokenIssue {
            message: message.into(),
            source,
        }
    }

    pub fn export(message: impl Into<String>, source: rust_xlsxwriter::XlsxError) -> Self {
        Self::Export {
            message: message.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    pub fn is_internal(&self) -> bool {
        Status::from(self).class().is_server_error()
    }
}

impl From<password_hash::Error> for AppError {
    fn from(e: password_hash::Error) -> Self {
        AppError::password_hash("Password hashing failed", e)
    }
}

impl From<&AppError> for Status {
    fn from(e: &AppError) -> Self {
        match e {
            AppError::Db { .. } => Status::InternalServerError,
            AppError::Unauthorized => Status::Unauthorized,
            AppError::InvalidCredentials => Status::Unauthorized,
            AppError::SessionExpired => Status::Unauthorized,
            AppError::InvalidToken => Status::Unauthorized,
            AppError::PasswordHash { .. } => Status::InternalServerError,
            AppError::TokenIssue { .. } => Status::InternalServerError,
            AppError::Export { .. } => Status::InternalServerError,
            AppError::Internal { .. } => Status::InternalServerError,
            AppError::UserAlreadyExists(_) => Status::Conflict,
            AppError::BadRequest(_) => Status::BadRequest,
            AppError::NotFound(_) => Status::NotFound,
            AppError::ValidationError(_) => Status::BadRequest,
        }
    }
}

/// Log the failure with whatever request context is available.
pub(crate) fn log_request_failure(error: &AppError, req: &Request<'_>) {
    let request_id = crate::middleware::RequestId::of(req).unwrap_or_else(|| "unknown".to_string());

    let user_id = req
        .local_cache(|| None::<crate::auth::Identity>)
        .as_ref()
        .map(|u| u.user_id.to_string())
        .unwrap_or_else(|| "anonymous".to_string());

    error!(
        error = ?error,
        request_id = %request_id,
        user_id = %user_id,
        method = %req.method(),
        uri = %req.uri(),
        "request failed"
    );
}

impl<'r> Responder<'r, 'static> for AppError {
    fn respond_to(self, req: &Request<'_>) -> rocket::response::Result<'static> {
        log_request_failure(&self, req);

        let status = Status::from(&self);
        let body = serde_json::to_string(&ErrorBody { error: self.to_string() }).unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        Response::build()
            .status(status)
            .header(ContentType::JSON)
            .sized_body(body.len(), Cursor::new(body))
            .ok()
    }
}

impl OpenApiResponderInner for AppError {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        for (code, description) in [
            ("400", "Bad Request"),
            ("401", "Unauthorized"),
            ("404", "Not Found"),
            ("409", "Conflict"),
            ("500", "Internal Server Error"),
        ] {
            responses.responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }
        Ok(responses)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        // Missing rows are expressed as `Option` by the repositories, never as errors.
        AppError::db("Database error", e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_http_status() {
        assert_eq!(Status::from(&AppError::BadRequest("x".into())), Status::BadRequest);
        assert_eq!(Status::from(&AppError::InvalidCredentials), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::SessionExpired), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::InvalidToken), Status::Unauthorized);
        assert_eq!(Status::from(&AppError::NotFound("entry".into())), Status::NotFound);
        assert_eq!(Status::from(&AppError::UserAlreadyExists("ann".into())), Status::Conflict);
        assert_eq!(Status::from(&AppError::internal("boom")), Status::InternalServerError);
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        let err = AppError::internal("connection refused on 10.0.0.3");
        assert_eq!(err.to_string(), "Internal server error");
        assert!(err.is_internal());

        let err = AppError::password_hash("Password hashing failed", "salt too short");
        assert_eq!(err.to_string(), "Internal server error");
    }

    #[test]
    fn database_errors_are_internal() {
        let err = AppError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Db { .. }));
        assert!(err.is_internal());
        assert_eq!(Status::from(&err), Status::InternalServerError);
        assert_eq!(err.to_string(), "Internal server error");
    }
}
