//! Request and reply types passed between the transport and the server.

use std::time::Instant;

use serde_json::Value;

use crate::error::HttpError;
use crate::request::RequestHandle;

/// Result of handling one request.
pub type HandlerResult = Result<Reply, HttpError>;

/// An inbound HTTP request as seen by interceptors and endpoints.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub handle: RequestHandle,
    pub method: String,
    /// Path plus query. Interceptors may rewrite it.
    pub url: String,
    /// `url` as it arrived, before any rewrite.
    pub original_url: String,
    pub received_at: Instant,
}

impl InboundRequest {
    pub fn new(handle: RequestHandle, method: impl Into<String>, url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            handle,
            method: method.into(),
            original_url: url.clone(),
            url,
            received_at: Instant::now(),
        }
    }

    /// URL without query or fragment.
    pub fn path(&self) -> &str {
        let end = self.url.find(['?', '#']).unwrap_or(self.url.len());
        &self.url[..end]
    }

    /// Raw query string, if any.
    pub fn query(&self) -> Option<&str> {
        let before_fragment = self.url.split_once('#').map_or(self.url.as_str(), |(head, _)| head);
        before_fragment.split_once('?').map(|(_, query)| query)
    }

    /// First value of a query parameter, percent-decoded.
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query()?.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }
}

/// Successful reply produced by an endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// 200 with a JSON body.
    Json(Value),
    /// 302 to the given location.
    Redirect(String),
}

impl Reply {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Json(_) => 200,
            Self::Redirect(_) => 302,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BasePath;

    fn request(url: &str) -> InboundRequest {
        InboundRequest::new(BasePath::default().open_request(), "GET", url)
    }

    #[test]
    fn path_strips_query_and_fragment() {
        assert_eq!(request("/a/b?c=d#e").path(), "/a/b");
        assert_eq!(request("/a/b#e?x").path(), "/a/b");
        assert_eq!(request("/a/b").path(), "/a/b");
    }

    #[test]
    fn query_excludes_fragment() {
        assert_eq!(request("/a?x=1#frag").query(), Some("x=1"));
        assert_eq!(request("/a").query(), None);
    }

    #[test]
    fn query_param_is_decoded() {
        let req = request("/api?path=%2Fapp%2Fhome%3Fx%3D1&other=2");
        assert_eq!(req.query_param("path").as_deref(), Some("/app/home?x=1"));
        assert_eq!(req.query_param("other").as_deref(), Some("2"));
        assert_eq!(req.query_param("missing"), None);
    }

    #[test]
    fn reply_status_codes() {
        assert_eq!(Reply::Json(Value::Null).status_code(), 200);
        assert_eq!(Reply::Redirect("/".into()).status_code(), 302);
    }
}
