//! Base path server — runs interceptors and dispatches to endpoints.

use std::future::Future;
use std::pin::Pin;

use parking_lot::RwLock;
use subpath_core::{BasePath, HandlerResult, HttpConfig, HttpError, InboundRequest, RequestHandle};
use subpath_transport::RequestHandler;
use tracing::info;

use crate::access_log::AccessLog;
use crate::endpoint::{Endpoint, PrependEndpoint, RemoveEndpoint, RootRedirect, StatusEndpoint};
use crate::interceptor::{Interceptor, InterceptorChain};
use crate::rewrite::BasePathRewrite;
use crate::spaces::SpaceSelector;

/// Which optional parts of the server to enable.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Reported by `/api/status`
    pub name: String,
    /// Select spaces from `/s/<id>` URLs
    pub enable_spaces: bool,
    /// Log every request at info level
    pub access_log: bool,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            name: "subpath".into(),
            enable_spaces: true,
            access_log: true,
        }
    }
}

/// The server — owns the resolver, interceptors and endpoints.
pub struct BasePathServer {
    base_path: BasePath,
    /// Registered endpoints (boxed for object safety)
    endpoints: Vec<Box<dyn EndpointDyn>>,
    interceptors: InterceptorChain,
    state: RwLock<ServerState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServerState {
    Uninitialized,
    Running,
    Shutdown,
}

/// Object-safe wrapper for the Endpoint trait.
trait EndpointDyn: Send + Sync {
    fn path_dyn(&self) -> &str;
    fn handle_dyn<'a>(
        &'a self,
        request: &'a InboundRequest,
        base_path: &'a BasePath,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;
}

impl<T: Endpoint> EndpointDyn for T {
    fn path_dyn(&self) -> &str {
        self.path()
    }
    fn handle_dyn<'a>(
        &'a self,
        request: &'a InboundRequest,
        base_path: &'a BasePath,
    ) -> Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>> {
        Box::pin(self.handle(request, base_path))
    }
}

impl BasePathServer {
    pub fn new(base_path: BasePath) -> Self {
        Self {
            base_path,
            endpoints: Vec::new(),
            interceptors: InterceptorChain::new(),
            state: RwLock::new(ServerState::Uninitialized),
        }
    }

    /// Build a server with the built-in interceptors and endpoints for a
    /// validated configuration.
    pub fn from_config(config: &HttpConfig, options: &ServerOptions) -> Self {
        let mut server = Self::new(BasePath::new(config.base_path.clone()));

        if config.rewrite_base_path {
            server.add_interceptor(BasePathRewrite);
        }
        if options.enable_spaces {
            server.add_interceptor(SpaceSelector);
        }
        if options.access_log {
            server.add_interceptor(AccessLog);
        }

        server.register_endpoint(RootRedirect {
            default_route: config.default_route.clone(),
        });
        server.register_endpoint(StatusEndpoint {
            name: options.name.clone(),
        });
        server.register_endpoint(PrependEndpoint);
        server.register_endpoint(RemoveEndpoint);
        server
    }

    pub fn base_path(&self) -> &BasePath {
        &self.base_path
    }

    pub fn add_interceptor<I: Interceptor + 'static>(&mut self, interceptor: I) {
        info!("Adding interceptor: {}", interceptor.name());
        self.interceptors.add(interceptor);
    }

    /// Register an endpoint. A later registration for the same path wins.
    pub fn register_endpoint<E: Endpoint + 'static>(&mut self, endpoint: E) {
        info!("Registering endpoint: {}", endpoint.path());
        self.endpoints.retain(|existing| existing.path_dyn() != endpoint.path());
        self.endpoints.push(Box::new(endpoint));
    }

    pub fn initialize(&self) {
        *self.state.write() = ServerState::Running;
        info!(
            "Server initialized (base path {:?}, {} endpoints, interceptors: {})",
            self.base_path.server_base_path().unwrap_or(""),
            self.endpoints.len(),
            self.interceptors.names().join(", ")
        );
    }

    pub fn shutdown(&self) {
        let mut state = self.state.write();
        if *state == ServerState::Shutdown {
            return;
        }
        *state = ServerState::Shutdown;
        info!("Server shutdown complete");
    }

    /// Route an intercepted request to its endpoint.
    async fn route_request(&self, request: &InboundRequest) -> HandlerResult {
        let path = request.path();
        let Some(endpoint) = self.endpoints.iter().find(|e| e.path_dyn() == path) else {
            return Err(HttpError::not_found());
        };

        if !matches!(request.method.as_str(), "GET" | "HEAD") {
            return Err(HttpError::method_not_allowed(&request.method));
        }

        endpoint.handle_dyn(request, &self.base_path).await
    }
}

impl RequestHandler for BasePathServer {
    fn open_request(&self) -> RequestHandle {
        self.base_path.open_request()
    }

    async fn handle_request(&self, mut request: InboundRequest) -> HandlerResult {
        // Copy out so the lock is not held across an await
        let state = *self.state.read();
        match state {
            ServerState::Shutdown => return Err(HttpError::shutting_down()),
            ServerState::Uninitialized => return Err(HttpError::not_initialized()),
            ServerState::Running => {}
        }

        let result = match self.interceptors.run_before(&mut request, &self.base_path).await {
            Ok(()) => self.route_request(&request).await,
            Err(err) => Err(err),
        };

        self.interceptors.run_after(&request, &result).await;
        result
    }
}
