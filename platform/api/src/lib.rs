use std::sync::Arc;

use async_graphql::{Error, ErrorExtensions};
use platform_authz::{AuthzError, ErrorInfo};
use thiserror::Error;

/// Shared result type of caller-facing surfaces.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// Denial message with protected fields already redacted.
    #[error("{0}")]
    Forbidden(String),
    #[error("bad request")]
    InvalidInput(Vec<ErrorInfo>),
    #[error("resource not found: {0}")]
    NotFound(String),
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::InvalidInput(_) => "BAD_REQUEST",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            ApiError::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ApiError::Forbidden(_) => 403,
            ApiError::InvalidInput(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::Internal(_) => 500,
        }
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

impl From<AuthzError> for ApiError {
    fn from(value: AuthzError) -> Self {
        match value {
            AuthzError::Forbidden(message) => ApiError::Forbidden(message),
            AuthzError::BadRequest(errors) => ApiError::InvalidInput(errors),
            AuthzError::UnknownService(path) => ApiError::NotFound(path),
            AuthzError::MethodNotAllowed { service, method } => {
                ApiError::MethodNotAllowed(format!("{service}.{method}"))
            }
            AuthzError::Fault(err) => {
                tracing::error!(error = %err, "protected call failed");
                ApiError::internal(err)
            }
        }
    }
}

impl ErrorExtensions for ApiError {
    fn extend(&self) -> Error {
        let mut err = Error::new(self.to_string());
        err = err.extend_with(|_err, e| {
            e.set("code", self.code());
        });
        if let ApiError::InvalidInput(errors) = self {
            match serde_json::to_value(errors).map(async_graphql::Value::from_json) {
                Ok(Ok(value)) => {
                    err = err.extend_with(|_err, e| {
                        e.set("errors", value);
                    });
                }
                _ => tracing::warn!("validation errors could not be attached"),
            }
        }
        err
    }
}

/// Convert an authorization outcome into a GraphQL error payload. Faults are
/// masked; their details only reach the logs.
pub fn authz_error(err: AuthzError) -> Error {
    ApiError::from(err).extend()
}

/// Convert any error into a GraphQL error payload while hiding internals.
pub fn internal_error(err: impl Into<anyhow::Error>) -> Error {
    ApiError::internal(err.into()).extend()
}
