//! Typed errors and HTTP mapping.

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Realm advertised in `WWW-Authenticate` on 401 responses.
pub const BASIC_REALM: &str = "Basic realm=\"animes\"";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("invalid dev user entry: {0}")]
    DevUser(String),
    #[error("password hashing: {0}")]
    Hash(#[from] bcrypt::BcryptError),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    AuthenticationFailed(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("internal: {0}")]
    Internal(String),
}

/// Error classification. The only place a kind becomes an HTTP status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    InvalidArgument,
    AuthenticationFailed,
    Forbidden,
    Unclassified,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorKind::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unclassified => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable text for `developerMessage`; never carries error internals.
    pub fn developer_message(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "A NotFound error happened",
            ErrorKind::InvalidArgument => "An InvalidArgument error happened",
            ErrorKind::AuthenticationFailed => "An AuthenticationFailed error happened",
            ErrorKind::Forbidden => "A Forbidden error happened",
            ErrorKind::Unclassified => "An unexpected error happened",
        }
    }

    /// Classify an error response the framework produced without an [`AppError`].
    pub fn from_status(status: StatusCode) -> Option<ErrorKind> {
        match status {
            StatusCode::NOT_FOUND => Some(ErrorKind::NotFound),
            StatusCode::BAD_REQUEST
            | StatusCode::UNPROCESSABLE_ENTITY
            | StatusCode::UNSUPPORTED_MEDIA_TYPE
            | StatusCode::PAYLOAD_TOO_LARGE => Some(ErrorKind::InvalidArgument),
            StatusCode::UNAUTHORIZED => Some(ErrorKind::AuthenticationFailed),
            StatusCode::FORBIDDEN => Some(ErrorKind::Forbidden),
            StatusCode::INTERNAL_SERVER_ERROR => Some(ErrorKind::Unclassified),
            _ => None,
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            AppError::AuthenticationFailed(_) => ErrorKind::AuthenticationFailed,
            AppError::Forbidden(_) => ErrorKind::Forbidden,
            AppError::Config(_) | AppError::Db(_) | AppError::Internal(_) => {
                ErrorKind::Unclassified
            }
        }
    }

    /// Protected route reached without any credentials.
    pub fn authentication_required() -> Self {
        AppError::AuthenticationFailed(
            "Full authentication is required to access this resource".into(),
        )
    }

    /// Message safe to show to clients. Store and config failures are hidden.
    pub fn public_message(&self) -> String {
        match self.kind() {
            ErrorKind::Unclassified => "Internal server error".into(),
            _ => self.to_string(),
        }
    }
}

/// Attached to error responses; consumed by [`crate::response::translate_errors`].
#[derive(Clone, Debug)]
pub struct ErrorReport {
    pub kind: ErrorKind,
    pub message: String,
    pub detail: String,
}

impl ErrorReport {
    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::InvalidArgument(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let report = ErrorReport {
            kind,
            message: self.public_message(),
            detail: format!("{:?}", self),
        };
        let mut response = kind.status().into_response();
        if kind == ErrorKind::AuthenticationFailed {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_REALM));
        }
        response.extensions_mut().insert(report);
        response
    }
}
