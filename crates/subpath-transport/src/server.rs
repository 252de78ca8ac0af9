//! HTTP transport server using Axum.
//!
//! Every request other than `/health` is turned into an [`InboundRequest`]
//! carrying a fresh [`RequestHandle`] and routed to the handler. The handle
//! is dropped before the response leaves, which releases any request-scoped
//! state attached to it.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, Uri, header},
    response::{IntoResponse, Json, Response},
    routing::get,
};
use serde_json::json;
use subpath_core::{HandlerResult, HttpError, InboundRequest, Reply, RequestHandle};
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tracing::{debug, info, warn};

/// Trait implemented by the server to handle incoming requests.
/// The transport calls this once per dispatched HTTP request.
pub trait RequestHandler: Send + Sync + 'static {
    /// Mint the identity for a new inbound request.
    fn open_request(&self) -> RequestHandle;

    /// Handle a request and return a reply or an HTTP error.
    fn handle_request(
        &self,
        request: InboundRequest,
    ) -> impl std::future::Future<Output = HandlerResult> + Send;
}

/// Transport server configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    /// Enable permissive CORS
    pub enable_cors: bool,
    /// Maximum concurrently dispatched requests (`None` = unlimited)
    pub max_in_flight: Option<usize>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: 5601,
            hostname: "127.0.0.1".into(),
            enable_cors: false,
            max_in_flight: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

/// Shared state for the transport server.
struct AppState<H: RequestHandler> {
    handler: Arc<H>,
    config: TransportConfig,
    in_flight: AtomicUsize,
}

/// Decrements the in-flight counter when the request finishes, however it
/// finishes.
struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

/// The transport server — owns the listener task.
pub struct TransportServer {
    /// Shutdown signal
    shutdown_tx: Option<mpsc::Sender<()>>,
    /// Server task handle
    handle: Option<tokio::task::JoinHandle<()>>,
    /// Actual bound port
    port: u16,
}

impl TransportServer {
    /// Start the transport server with the given request handler.
    pub async fn start<H: RequestHandler>(
        config: TransportConfig,
        handler: H,
    ) -> Result<Self, TransportError> {
        Self::start_shared(config, Arc::new(handler)).await
    }

    /// Start the transport server with a handler shared with the caller.
    pub async fn start_shared<H: RequestHandler>(
        config: TransportConfig,
        handler: Arc<H>,
    ) -> Result<Self, TransportError> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let addr = format!("{}:{}", config.hostname, config.port);
        let bind_err = |source| TransportError::Bind { addr: addr.clone(), source };
        let listener = tokio::net::TcpListener::bind((config.hostname.as_str(), config.port))
            .await
            .map_err(bind_err)?;
        let actual_port = listener.local_addr().map_err(bind_err)?.port();

        info!("HTTP transport listening on http://{}:{}", config.hostname, actual_port);

        let app = build_router(handler, config);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            port: actual_port,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gracefully stop the server.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("HTTP transport server stopped");
    }
}

/// Build the axum router for `handler`. Exposed so the routing can be
/// driven without a socket.
pub fn build_router<H: RequestHandler>(handler: Arc<H>, config: TransportConfig) -> Router {
    let enable_cors = config.enable_cors;
    let state = Arc::new(AppState {
        handler,
        config,
        in_flight: AtomicUsize::new(0),
    });

    let router = Router::new()
        .route("/health", get(health_handler::<H>))
        .fallback(dispatch_handler::<H>)
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn health_handler<H: RequestHandler>(
    State(state): State<Arc<AppState<H>>>,
) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "inFlight": state.in_flight.load(Ordering::Relaxed),
    }))
}

async fn dispatch_handler<H: RequestHandler>(
    State(state): State<Arc<AppState<H>>>,
    method: Method,
    uri: Uri,
) -> Response {
    let current = state.in_flight.fetch_add(1, Ordering::Relaxed);
    let _guard = InFlightGuard(&state.in_flight);

    if let Some(max) = state.config.max_in_flight {
        if current >= max {
            warn!("Request rejected: max in-flight requests reached ({max})");
            return error_response(HttpError::overloaded());
        }
    }

    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".into());

    let handle = state.handler.open_request();
    let request_id = handle.id();
    let request = InboundRequest::new(handle, method.as_str(), url.clone());

    debug!("{request_id} {method} {url}");

    into_response(state.handler.handle_request(request).await)
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn into_response(result: HandlerResult) -> Response {
    match result {
        Ok(Reply::Json(body)) => (StatusCode::OK, Json(body)).into_response(),
        Ok(Reply::Redirect(location)) => match HeaderValue::from_str(&location) {
            Ok(value) => (StatusCode::FOUND, [(header::LOCATION, value)]).into_response(),
            Err(_) => error_response(HttpError::internal(format!(
                "Invalid redirect location: {location:?}"
            ))),
        },
        Err(err) => error_response(err),
    }
}

fn error_response(err: HttpError) -> Response {
    let status = StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(err)).into_response()
}
