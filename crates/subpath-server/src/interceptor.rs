//! Interceptor chain for request processing.
//!
//! Interceptors inspect requests before routing and may rewrite the URL or
//! reject the request. After routing they see the final result. They run in
//! priority order.

use std::future::Future;
use std::pin::Pin;

use subpath_core::{BasePath, HandlerResult, HttpError, InboundRequest};
use tracing::debug;

/// What an interceptor decided for a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// Pass the request on unchanged.
    Continue,
    /// Replace the request URL and continue.
    Rewrite(String),
    /// Stop and answer with this error.
    Reject(HttpError),
}

/// Trait for request interceptors.
pub trait Interceptor: Send + Sync {
    /// Inspect a request before it is routed.
    fn on_request(
        &self,
        request: &InboundRequest,
        base_path: &BasePath,
    ) -> impl Future<Output = Interception> + Send;

    /// Observe the result after routing (optional).
    fn after(
        &self,
        _request: &InboundRequest,
        _result: &HandlerResult,
    ) -> impl Future<Output = ()> + Send {
        async {}
    }

    /// Interceptor name for debugging.
    fn name(&self) -> &str;

    /// Priority (lower runs first).
    fn priority(&self) -> i32 {
        0
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Object-safe version of Interceptor — all refs share lifetime `'a`.
trait InterceptorDyn: Send + Sync {
    fn on_request_dyn<'a>(
        &'a self,
        request: &'a InboundRequest,
        base_path: &'a BasePath,
    ) -> BoxFuture<'a, Interception>;

    fn after_dyn<'a>(
        &'a self,
        request: &'a InboundRequest,
        result: &'a HandlerResult,
    ) -> BoxFuture<'a, ()>;

    fn name_dyn(&self) -> &str;
    fn priority_dyn(&self) -> i32;
}

impl<T: Interceptor> InterceptorDyn for T {
    fn on_request_dyn<'a>(
        &'a self,
        request: &'a InboundRequest,
        base_path: &'a BasePath,
    ) -> BoxFuture<'a, Interception> {
        Box::pin(self.on_request(request, base_path))
    }

    fn after_dyn<'a>(
        &'a self,
        request: &'a InboundRequest,
        result: &'a HandlerResult,
    ) -> BoxFuture<'a, ()> {
        Box::pin(self.after(request, result))
    }

    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn priority_dyn(&self) -> i32 {
        self.priority()
    }
}

/// A chain of interceptors executed in priority order.
pub struct InterceptorChain {
    interceptors: Vec<Box<dyn InterceptorDyn>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self {
            interceptors: Vec::new(),
        }
    }

    /// Add an interceptor. Equal priorities keep insertion order.
    pub fn add<I: Interceptor + 'static>(&mut self, interceptor: I) {
        self.interceptors.push(Box::new(interceptor));
        self.interceptors.sort_by_key(|i| i.priority_dyn());
    }

    /// Run the request hooks, applying rewrites to `request.url`.
    pub async fn run_before(
        &self,
        request: &mut InboundRequest,
        base_path: &BasePath,
    ) -> Result<(), HttpError> {
        for interceptor in &self.interceptors {
            let outcome = interceptor.on_request_dyn(request, base_path).await;
            match outcome {
                Interception::Continue => {}
                Interception::Rewrite(url) => {
                    debug!("{} rewrote {} -> {url}", interceptor.name_dyn(), request.url);
                    request.url = url;
                }
                Interception::Reject(err) => {
                    debug!("{} rejected {}: {err}", interceptor.name_dyn(), request.url);
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Run the after hooks.
    pub async fn run_after(&self, request: &InboundRequest, result: &HandlerResult) {
        for interceptor in &self.interceptors {
            interceptor.after_dyn(request, result).await;
        }
    }

    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name_dyn()).collect()
    }
}

impl Default for InterceptorChain {
    fn default() -> Self {
        Self::new()
    }
}
