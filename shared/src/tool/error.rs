//! gRPC Error Management System
//!
//! Defines the closed error taxonomy shared by the SSO and listings
//! servers, converts business errors to gRPC Status and applies the
//! logging policy: expected outcomes at info, internal failures at error.

use thiserror::Error;
use tonic::Status;
use tracing::{error, info};

/// Common application error definition.
///
/// Every failure a service operation can surface to its RPC boundary is one
/// of these variants. Each variant converts to a fixed gRPC Status code;
/// only `Internal` hides its detail from the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Input validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Identity
    #[error("user with such email already exists")]
    UserExists,

    #[error("user not found")]
    UserNotFound,

    #[error("app not found")]
    AppNotFound,

    #[error("invalid email or password")]
    InvalidCredentials,

    // Tokens
    #[error("token is expired")]
    TokenExpired,

    #[error("token is invalid")]
    TokenInvalid,

    // Listings
    #[error("listing not found")]
    ListingNotFound,

    #[error("user is not authorized for this action")]
    NotEnoughPermissions,

    // Unexpected collaborator failure; detail is logged, never returned
    #[error("internal error")]
    Internal(String),
}

impl AppError {
    /// True for the benign, expected outcomes of normal operation.
    pub fn is_expected(&self) -> bool {
        !matches!(self, AppError::Internal(_))
    }

    /// Logs the error under the propagation policy: expected kinds at
    /// info level, internal failures at error level with full detail.
    pub fn log(&self, context: &str) {
        match self {
            AppError::Internal(detail) => {
                error!("{}: internal error: {}", context, detail);
            }
            expected => {
                info!("{}: {}", context, expected);
            }
        }
    }

    /// Converts to gRPC Status, logging on the way out.
    pub fn to_status(&self, context: &str) -> Status {
        self.log(context);
        self.clone().into()
    }
}

impl From<AppError> for Status {
    fn from(e: AppError) -> Self {
        match e {
            // Absent resources
            AppError::UserNotFound | AppError::ListingNotFound | AppError::AppNotFound => {
                Status::not_found(e.to_string())
            }

            // Ownership violations
            AppError::NotEnoughPermissions => Status::permission_denied(e.to_string()),

            // Token problems are classified as client input errors, the
            // same bucket as malformed fields
            AppError::TokenExpired | AppError::TokenInvalid => {
                Status::invalid_argument(e.to_string())
            }

            // Client-supplied field problems
            AppError::InvalidInput(_)
            | AppError::UserExists
            | AppError::InvalidCredentials => Status::invalid_argument(e.to_string()),

            // Detail stays in the log
            AppError::Internal(_) => Status::internal("internal error"),
        }
    }
}

// SQLite constraint codes surfaced through sqlx. 2067 is a UNIQUE
// violation, 787 a FOREIGN KEY violation; the storage layers translate
// those to their domain meaning themselves and only fall through here
// for everything unexpected.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::Internal("database record not found".into()),
            sqlx::Error::Database(db_err) => {
                AppError::Internal(format!("database query failed: {db_err}"))
            }
            sqlx::Error::PoolTimedOut => {
                AppError::Internal("database connection pool timeout".into())
            }
            sqlx::Error::PoolClosed => AppError::Internal("database pool is closed".into()),
            other => AppError::Internal(format!("database error: {other}")),
        }
    }
}
