//! Endpoints served after interception.
//!
//! Each endpoint owns one exact pathname. Pathnames are matched against the
//! request URL after interceptors have rewritten it, so they never include
//! the server base path or a space prefix.

use std::future::Future;

use serde_json::json;
use subpath_core::{BasePath, HandlerResult, HttpError, InboundRequest, Reply};

/// Trait implemented by all endpoints.
pub trait Endpoint: Send + Sync {
    /// Pathname this endpoint answers (e.g. "/api/status").
    fn path(&self) -> &str;

    /// Handle a request routed to this endpoint.
    fn handle(
        &self,
        request: &InboundRequest,
        base_path: &BasePath,
    ) -> impl Future<Output = HandlerResult> + Send;
}

/// `/` redirects to the default route inside the caller's base path.
pub struct RootRedirect {
    pub default_route: String,
}

impl Endpoint for RootRedirect {
    fn path(&self) -> &str {
        "/"
    }

    async fn handle(&self, request: &InboundRequest, base_path: &BasePath) -> HandlerResult {
        Ok(Reply::Redirect(format!(
            "{}{}",
            base_path.get(&request.handle),
            self.default_route
        )))
    }
}

/// `/api/status` reports the server's base path view of this request.
pub struct StatusEndpoint {
    pub name: String,
}

impl Endpoint for StatusEndpoint {
    fn path(&self) -> &str {
        "/api/status"
    }

    async fn handle(&self, request: &InboundRequest, base_path: &BasePath) -> HandlerResult {
        Ok(Reply::Json(json!({
            "name": self.name,
            "version": env!("CARGO_PKG_VERSION"),
            "serverBasePath": base_path.server_base_path().unwrap_or(""),
            "basePath": base_path.get(&request.handle),
            "scopedRequests": base_path.active_associations(),
        })))
    }
}

/// `/api/base_path/prepend?path=...`
pub struct PrependEndpoint;

impl Endpoint for PrependEndpoint {
    fn path(&self) -> &str {
        "/api/base_path/prepend"
    }

    async fn handle(&self, request: &InboundRequest, base_path: &BasePath) -> HandlerResult {
        let path = required_path(request)?;
        Ok(Reply::Json(json!({ "path": base_path.prepend(&path) })))
    }
}

/// `/api/base_path/remove?path=...`
pub struct RemoveEndpoint;

impl Endpoint for RemoveEndpoint {
    fn path(&self) -> &str {
        "/api/base_path/remove"
    }

    async fn handle(&self, request: &InboundRequest, base_path: &BasePath) -> HandlerResult {
        let path = required_path(request)?;
        Ok(Reply::Json(json!({ "path": base_path.remove(&path) })))
    }
}

fn required_path(request: &InboundRequest) -> Result<String, HttpError> {
    request
        .query_param("path")
        .ok_or_else(|| HttpError::bad_request("[request query.path]: expected value of type [string]"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(url: &str) -> (BasePath, InboundRequest) {
        let base_path = BasePath::new(Some("/kbn".into()));
        let request = InboundRequest::new(base_path.open_request(), "GET", url);
        (base_path, request)
    }

    #[tokio::test]
    async fn root_redirect_includes_request_base_path() {
        let (base_path, request) = setup("/");
        base_path.set(&request.handle, "/s/ops").unwrap();
        let endpoint = RootRedirect { default_route: "/app/home".into() };
        assert_eq!(
            endpoint.handle(&request, &base_path).await.unwrap(),
            Reply::Redirect("/kbn/s/ops/app/home".into())
        );
    }

    #[tokio::test]
    async fn status_reports_paths() {
        let (base_path, request) = setup("/api/status");
        base_path.set(&request.handle, "/s/ops").unwrap();
        let endpoint = StatusEndpoint { name: "test".into() };
        let Reply::Json(body) = endpoint.handle(&request, &base_path).await.unwrap() else {
            panic!("expected JSON");
        };
        assert_eq!(body["name"], "test");
        assert_eq!(body["serverBasePath"], "/kbn");
        assert_eq!(body["basePath"], "/kbn/s/ops");
        assert_eq!(body["scopedRequests"], 1);
    }

    #[tokio::test]
    async fn prepend_and_remove() {
        let (base_path, request) = setup("/api/base_path/prepend?path=%2Fapp%2Fhome");
        let reply = PrependEndpoint.handle(&request, &base_path).await.unwrap();
        assert_eq!(reply, Reply::Json(json!({ "path": "/kbn/app/home" })));

        let (base_path, request) = setup("/api/base_path/remove?path=/kbn/app/home");
        let reply = RemoveEndpoint.handle(&request, &base_path).await.unwrap();
        assert_eq!(reply, Reply::Json(json!({ "path": "/app/home" })));
    }

    #[tokio::test]
    async fn missing_path_is_bad_request() {
        let (base_path, request) = setup("/api/base_path/prepend");
        let err = PrependEndpoint.handle(&request, &base_path).await.unwrap_err();
        assert_eq!(err.status_code, 400);
    }
}
