//! Error types for base path resolution, configuration, and HTTP replies.

use serde::{Deserialize, Serialize};

use crate::request::RequestId;

/// Failure of [`BasePath::set`](crate::BasePath::set).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BasePathError {
    /// The request already carries a request-scoped base path.
    #[error("Request basePath was previously set. Setting multiple times is not supported. (request {request_id})")]
    AlreadySet { request_id: RequestId },
}

/// Invalid HTTP configuration, reported before the server starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("[basePath]: must start with a slash, don't end with one (got {0:?})")]
    InvalidBasePath(String),

    #[error("cannot use [rewriteBasePath] when [basePath] is not specified")]
    RewriteWithoutBasePath,

    #[error("[defaultRoute]: must start with a slash (got {0:?})")]
    InvalidDefaultRoute(String),
}

/// HTTP error body, serialized as `{ statusCode, error, message }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpError {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

impl HttpError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            error: reason_phrase(status_code).into(),
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(400, message)
    }

    pub fn not_found() -> Self {
        Self::new(404, "Not Found")
    }

    pub fn method_not_allowed(method: &str) -> Self {
        Self::new(405, format!("Method {method} is not allowed"))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(500, message)
    }

    pub fn not_initialized() -> Self {
        Self::new(503, "Server is not initialized")
    }

    pub fn shutting_down() -> Self {
        Self::new(503, "Server is shutting down")
    }

    pub fn overloaded() -> Self {
        Self::new(503, "Too many requests in flight")
    }
}

impl From<BasePathError> for HttpError {
    fn from(err: BasePathError) -> Self {
        Self::internal(err.to_string())
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} {}: {}", self.status_code, self.error, self.message)
    }
}

impl std::error::Error for HttpError {}

fn reason_phrase(status_code: u16) -> &'static str {
    match status_code {
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Error",
    }
}
