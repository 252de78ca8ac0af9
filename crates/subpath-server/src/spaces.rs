//! Space selection from the URL.
//!
//! A request for `/s/<space-id>/rest` is served as `/rest` with the
//! request-scoped base path set to `/s/<space-id>`, so links built with
//! [`BasePath::get`] stay inside the space. The default space has no prefix.

use subpath_core::{BasePath, InboundRequest, modify_url};
use tracing::debug;

use crate::interceptor::{Interception, Interceptor};

pub const DEFAULT_SPACE_ID: &str = "default";

/// Space id encoded at the start of `path`, if any.
///
/// Ids are made of `[a-z0-9_-]` and must fill a whole path segment.
pub fn space_id_from_path(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/s/")?;
    let id = rest.split('/').next().unwrap_or("");
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_' || b == b'-');
    valid.then_some(id)
}

pub struct SpaceSelector;

impl Interceptor for SpaceSelector {
    async fn on_request(&self, request: &InboundRequest, base_path: &BasePath) -> Interception {
        let path = request.path();
        let Some(space_id) = space_id_from_path(path) else {
            return Interception::Continue;
        };
        if space_id == DEFAULT_SPACE_ID {
            return Interception::Continue;
        }

        let space_base_path = format!("/s/{space_id}");
        let remainder = match &path[space_base_path.len()..] {
            "" => "/",
            rest => rest,
        };

        if let Err(err) = base_path.set(&request.handle, space_base_path) {
            return Interception::Reject(err.into());
        }
        debug!("request {} selected space {space_id}", request.handle.id());

        Interception::Rewrite(modify_url(&request.url, |parts| {
            parts.pathname = remainder.to_string();
        }))
    }

    fn name(&self) -> &str {
        "space-selector"
    }

    fn priority(&self) -> i32 {
        -50
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_space_id() {
        assert_eq!(space_id_from_path("/s/marketing"), Some("marketing"));
        assert_eq!(space_id_from_path("/s/marketing/app/home"), Some("marketing"));
        assert_eq!(space_id_from_path("/s/a_b-9/"), Some("a_b-9"));
    }

    #[test]
    fn rejects_non_space_paths() {
        assert_eq!(space_id_from_path("/"), None);
        assert_eq!(space_id_from_path("/s/"), None);
        assert_eq!(space_id_from_path("/s"), None);
        assert_eq!(space_id_from_path("/sx/foo"), None);
        assert_eq!(space_id_from_path("/app/s/foo"), None);
        assert_eq!(space_id_from_path("/s/Upper"), None);
        assert_eq!(space_id_from_path("/s/a.b/app"), None);
    }

    #[tokio::test]
    async fn selects_space_and_rewrites() {
        let base_path = BasePath::new(Some("/kbn".into()));
        let request = InboundRequest::new(base_path.open_request(), "GET", "/s/sales/app/home?x=1#top");

        let outcome = SpaceSelector.on_request(&request, &base_path).await;
        assert_eq!(outcome, Interception::Rewrite("/app/home?x=1#top".into()));
        assert_eq!(base_path.get(&request.handle), "/kbn/s/sales");
    }

    #[tokio::test]
    async fn bare_space_root_becomes_slash() {
        let base_path = BasePath::default();
        let request = InboundRequest::new(base_path.open_request(), "GET", "/s/sales?x=1");

        let outcome = SpaceSelector.on_request(&request, &base_path).await;
        assert_eq!(outcome, Interception::Rewrite("/?x=1".into()));
        assert_eq!(base_path.get(&request.handle), "/s/sales");
    }

    #[tokio::test]
    async fn default_space_is_untouched() {
        let base_path = BasePath::default();
        let request = InboundRequest::new(base_path.open_request(), "GET", "/s/default/app");

        assert_eq!(SpaceSelector.on_request(&request, &base_path).await, Interception::Continue);
        assert_eq!(base_path.get(&request.handle), "");
    }

    #[tokio::test]
    async fn already_scoped_request_is_rejected() {
        let base_path = BasePath::default();
        let request = InboundRequest::new(base_path.open_request(), "GET", "/s/sales/app");
        base_path.set(&request.handle, "/s/other").unwrap();

        match SpaceSelector.on_request(&request, &base_path).await {
            Interception::Reject(err) => assert_eq!(err.status_code, 500),
            other => panic!("expected rejection, got {other:?}"),
        }
    }
}
