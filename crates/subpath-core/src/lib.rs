//! Subpath core types.
//!
//! Base path resolution for servers deployed behind a URL prefix, plus the
//! request identity, configuration, and request/reply types shared by the
//! transport and server crates.

pub mod base_path;
pub mod config;
pub mod error;
pub mod exchange;
pub mod modify_url;
pub mod request;

pub use base_path::BasePath;
pub use config::{HttpConfig, DEFAULT_ROUTE};
pub use error::{BasePathError, ConfigError, HttpError};
pub use exchange::{HandlerResult, InboundRequest, Reply};
pub use modify_url::{modify_url, UrlParts};
pub use request::{RequestHandle, RequestId};
