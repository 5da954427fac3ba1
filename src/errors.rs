//! # Error Handling
//!
//! Every handler returns `Result<_, ApiError>`. An `ApiError` knows its HTTP
//! status, renders the service's error envelope and logs itself when turned
//! into a response:
//!
//! ```json
//! { "ok": false, "data": null, "message": "Invalid request data", "details": [...] }
//! ```
//!
//! Client errors (4xx) are logged at `warn`, server errors (5xx) at `error`
//! together with the internal cause. Internal causes such as database errors
//! never reach the response body.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
#[cfg(feature = "sqlite")]
use sea_orm::RuntimeErr;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;
use std::fmt;

use crate::validation::ValidationErrors;

/// API error type with automatic logging and sanitized responses
#[derive(Debug)]
pub enum ApiError {
    /// 404 Not Found - Resource doesn't exist
    NotFound {
        /// Resource type (e.g., "Puerto")
        resource: String,
        /// Optional ID that wasn't found
        id: Option<String>,
    },

    /// 400 Bad Request - Invalid input from user
    BadRequest { message: String },

    /// 400 Bad Request - Query or body failed validation
    ValidationFailed {
        message: String,
        errors: ValidationErrors,
    },

    /// 409 Conflict - Unique or foreign key constraint violated
    Conflict { message: String },

    /// 500 Internal Server Error - Database error (details logged, not exposed)
    Database { message: String, internal: DbErr },

    /// 500 Internal Server Error - Generic internal error
    Internal {
        message: String,
        internal: Option<String>,
    },

    /// Custom error with specific status code
    Custom {
        status: StatusCode,
        message: String,
        internal: Option<String>,
    },
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>, id: Option<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a 400 error carrying field-level details
    ///
    /// # Example
    /// ```rust,ignore
    /// let clean = schema.validate(&params).map_err(|errors| {
    ///     ApiError::validation_failed("Invalid query parameters", errors)
    /// })?;
    /// ```
    pub fn validation_failed(message: impl Into<String>, errors: ValidationErrors) -> Self {
        Self::ValidationFailed {
            message: message.into(),
            errors,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create a 500 Internal Server Error from a database error
    ///
    /// The database error details are logged but NOT sent to the user.
    pub fn database(err: DbErr) -> Self {
        Self::Database {
            message: "A database error occurred".to_string(),
            internal: err,
        }
    }

    pub fn internal(message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Internal {
            message: message.into(),
            internal,
        }
    }

    pub fn custom(status: StatusCode, message: impl Into<String>, internal: Option<String>) -> Self {
        Self::Custom {
            status,
            message: message.into(),
            internal,
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::BadRequest { .. } | Self::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::Database { .. } | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Custom { status, .. } => *status,
        }
    }

    /// Get the user-facing error message (sanitized)
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { resource, id } => match id {
                Some(id) => format!("{resource} with ID '{id}' not found"),
                None => format!("{resource} not found"),
            },
            Self::BadRequest { message }
            | Self::ValidationFailed { message, .. }
            | Self::Conflict { message }
            | Self::Database { message, .. }
            | Self::Internal { message, .. }
            | Self::Custom { message, .. } => message.clone(),
        }
    }

    fn log(&self) {
        let status = self.status_code();

        match self {
            Self::Database { internal, .. } => {
                tracing::error!(status = %status, error = ?internal, "Database error occurred");
            }
            Self::Internal {
                internal: Some(details),
                ..
            }
            | Self::Custom {
                internal: Some(details),
                ..
            } if status.is_server_error() => {
                tracing::error!(status = %status, details = %details, "Internal error occurred");
            }
            Self::ValidationFailed { errors, .. } => {
                tracing::warn!(status = %status, violations = %errors, "Request rejected");
            }
            _ if status.is_server_error() => {
                tracing::error!(status = %status, error = %self.user_message(), "Request failed");
            }
            _ => {
                tracing::warn!(status = %status, error = %self.user_message(), "Request rejected");
            }
        }
    }
}

/// Error envelope sent to users (sanitized)
#[derive(Serialize)]
struct ErrorBody<'a> {
    ok: bool,
    data: Option<()>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a ValidationErrors>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let details = match &self {
            Self::ValidationFailed { errors, .. } => Some(errors),
            _ => None,
        };
        let body = ErrorBody {
            ok: false,
            data: None,
            message: self.user_message(),
            details,
        };

        (self.status_code(), Json(body)).into_response()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user_message())
    }
}

impl std::error::Error for ApiError {}

/// Convert SeaORM `DbErr` to `ApiError`
///
/// - `DbErr::RecordNotFound` → 404, resource taken from the first word of
///   the message
/// - unique / foreign key violations → 409
/// - everything else → 500, logged internally
impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        if let DbErr::RecordNotFound(msg) = &err {
            let resource = msg.split_whitespace().next().unwrap_or("Resource");
            return Self::not_found(resource, None);
        }

        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::debug!(detail = %detail, "unique constraint violated");
                Self::conflict("Resource already exists")
            }
            Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
                tracing::debug!(detail = %detail, "foreign key constraint violated");
                Self::conflict(FOREIGN_KEY_CONFLICT)
            }
            _ if is_restrict_violation(&err) => {
                tracing::debug!(error = %err, "restricting foreign key action fired");
                Self::conflict(FOREIGN_KEY_CONFLICT)
            }
            _ => Self::database(err),
        }
    }
}

const FOREIGN_KEY_CONFLICT: &str = "Referenced resource does not exist or is still in use";

/// SQLite reports `ON DELETE RESTRICT` / `ON UPDATE RESTRICT` as
/// `SQLITE_CONSTRAINT_TRIGGER` (1811), which `DbErr::sql_err` leaves
/// unclassified.
#[cfg(feature = "sqlite")]
fn is_restrict_violation(err: &DbErr) -> bool {
    const SQLITE_CONSTRAINT_TRIGGER: &str = "1811";

    let (DbErr::Exec(RuntimeErr::SqlxError(sqlx_err)) | DbErr::Query(RuntimeErr::SqlxError(sqlx_err))) = err
    else {
        return false;
    };

    sqlx_err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .is_some_and(|code| code == SQLITE_CONSTRAINT_TRIGGER)
}

#[cfg(not(feature = "sqlite"))]
fn is_restrict_violation(_err: &DbErr) -> bool {
    false
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::validation_failed("Invalid request data", errors)
    }
}
