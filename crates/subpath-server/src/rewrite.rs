//! Server-side base path rewriting.
//!
//! When the server is configured to strip its own base path, every request
//! must arrive under it. Requests outside the base path are answered with
//! 404 before any other interceptor or endpoint sees them.

use subpath_core::{BasePath, HttpError, InboundRequest};

use crate::interceptor::{Interception, Interceptor};

pub struct BasePathRewrite;

impl Interceptor for BasePathRewrite {
    async fn on_request(&self, request: &InboundRequest, base_path: &BasePath) -> Interception {
        let rewritten = base_path.remove(&request.url);
        if rewritten != request.url {
            Interception::Rewrite(rewritten)
        } else {
            Interception::Reject(HttpError::not_found())
        }
    }

    fn name(&self) -> &str {
        "base-path-rewrite"
    }

    fn priority(&self) -> i32 {
        -100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn intercept(base_path: &BasePath, url: &str) -> Interception {
        let request = InboundRequest::new(base_path.open_request(), "GET", url);
        BasePathRewrite.on_request(&request, base_path).await
    }

    #[tokio::test]
    async fn strips_base_path() {
        let base_path = BasePath::new(Some("/kbn".into()));
        assert_eq!(
            intercept(&base_path, "/kbn/app/home?x=1").await,
            Interception::Rewrite("/app/home?x=1".into())
        );
        assert_eq!(intercept(&base_path, "/kbn").await, Interception::Rewrite("/".into()));
    }

    #[tokio::test]
    async fn rejects_paths_outside_base_path() {
        let base_path = BasePath::new(Some("/kbn".into()));
        for url in ["/", "/app/home", "/kbnx/app", "/kbn?x=1"] {
            assert_eq!(
                intercept(&base_path, url).await,
                Interception::Reject(HttpError::not_found()),
                "{url}"
            );
        }
    }
}
