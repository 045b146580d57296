use thiserror::Error;

use crate::rules::ErrorInfo;

/// Error surfaced by a protected call.
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No rule granted access. The message carries redacted call details.
    #[error("{0}")]
    Forbidden(String),
    /// A rule rejected the caller's input. Carries the first rejection batch.
    #[error("request failed validation")]
    BadRequest(Vec<ErrorInfo>),
    #[error("service `{0}` is not registered")]
    UnknownService(String),
    #[error("method `{method}` is not provided by service `{service}`")]
    MethodNotAllowed { service: String, method: String },
    /// Raised by a rule, hook or handler. Passed through untouched.
    #[error(transparent)]
    Fault(#[from] anyhow::Error),
}

impl AuthzError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthzError::Forbidden(_) => "FORBIDDEN",
            AuthzError::BadRequest(_) => "BAD_REQUEST",
            AuthzError::UnknownService(_) => "NOT_FOUND",
            AuthzError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            AuthzError::Fault(_) => "INTERNAL",
        }
    }

    /// HTTP-equivalent status class.
    pub fn status(&self) -> u16 {
        match self {
            AuthzError::Forbidden(_) => 403,
            AuthzError::BadRequest(_) => 400,
            AuthzError::UnknownService(_) => 404,
            AuthzError::MethodNotAllowed { .. } => 405,
            AuthzError::Fault(_) => 500,
        }
    }

    /// Validation batch of a `BadRequest`.
    pub fn errors(&self) -> Option<&[ErrorInfo]> {
        match self {
            AuthzError::BadRequest(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, AuthzError::Forbidden(_))
    }

    pub fn is_bad_request(&self) -> bool {
        matches!(self, AuthzError::BadRequest(_))
    }
}

/// Rule key rejected while building a rule table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuleKeyError {
    #[error("rule key must not be empty")]
    Empty,
    #[error(
        "rule key `{key}` has no verb for letter `{letter}`; declare custom verbs with RuleTable::method"
    )]
    UnmappedShorthand { key: String, letter: char },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("protect word must not be empty")]
    EmptyProtectWord,
    #[error("protected field path `{0}` has an empty segment")]
    InvalidFieldPath(String),
}
