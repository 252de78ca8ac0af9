//! Per-request access logging.

use subpath_core::{BasePath, HandlerResult, InboundRequest};
use tracing::info;

use crate::interceptor::{Interception, Interceptor};

pub struct AccessLog;

impl Interceptor for AccessLog {
    async fn on_request(&self, _request: &InboundRequest, _base_path: &BasePath) -> Interception {
        Interception::Continue
    }

    async fn after(&self, request: &InboundRequest, result: &HandlerResult) {
        let status = match result {
            Ok(reply) => reply.status_code(),
            Err(err) => err.status_code,
        };
        info!(
            request_id = %request.handle.id(),
            method = %request.method,
            url = %request.original_url,
            routed = %request.url,
            status,
            elapsed_ms = request.received_at.elapsed().as_millis() as u64,
            "request handled"
        );
    }

    fn name(&self) -> &str {
        "access-log"
    }

    fn priority(&self) -> i32 {
        100
    }
}
