//! Subpath Transport Layer
//!
//! Serves HTTP with axum and hands every request to a [`RequestHandler`].
//! The transport handles:
//! - Binding, serving, and graceful shutdown
//! - Opening one request handle per inbound request and dropping it once
//!   the response is built
//! - In-flight request limiting and optional CORS
//! - Mapping replies and errors to HTTP responses
//!
//! Routing and base path semantics live behind the `RequestHandler` trait.

pub mod server;

pub use server::{RequestHandler, TransportConfig, TransportError, TransportServer, build_router};
