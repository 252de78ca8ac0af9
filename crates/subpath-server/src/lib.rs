//! Subpath Server — routes requests through interceptors to endpoints.
//!
//! The server owns the [`BasePath`](subpath_core::BasePath) resolver, the
//! interceptor chain, and the registered endpoints, and provides the
//! `RequestHandler` implementation for the transport layer.

pub mod access_log;
pub mod endpoint;
pub mod interceptor;
pub mod rewrite;
pub mod router;
pub mod spaces;

pub use interceptor::{Interception, Interceptor, InterceptorChain};
pub use router::{BasePathServer, ServerOptions};
