//! Request identity — the per-request handle threaded through request handling.
//!
//! The transport opens one [`RequestHandle`] per inbound HTTP request via
//! [`BasePath::open_request`](crate::BasePath::open_request) and passes it
//! through the interceptor chain and endpoints. The handle holds only a weak
//! reference to the resolver's association table; when its last clone is
//! dropped the request-scoped base path for that request is released.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

/// Request-scoped base paths keyed by request identity.
pub(crate) type ScopeTable = DashMap<RequestId, String>;

/// Opaque identity of one inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(uuid::Uuid);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Handle for one inbound request, valid for that request's lifetime.
///
/// Clones share the same identity. The association stored for the request
/// is removed when the last clone goes away.
#[derive(Debug, Clone)]
pub struct RequestHandle {
    inner: Arc<HandleInner>,
}

#[derive(Debug)]
struct HandleInner {
    id: RequestId,
    table: Weak<ScopeTable>,
}

impl RequestHandle {
    pub(crate) fn bound_to(table: &Arc<ScopeTable>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                id: RequestId::new(),
                table: Arc::downgrade(table),
            }),
        }
    }

    pub fn id(&self) -> RequestId {
        self.inner.id
    }
}

impl Drop for HandleInner {
    fn drop(&mut self) {
        if let Some(table) = self.table.upgrade() {
            table.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn clones_share_identity() {
        let table = Arc::new(ScopeTable::new());
        let handle = RequestHandle::bound_to(&table);
        assert_eq!(handle.id(), handle.clone().id());
    }

    #[test]
    fn last_drop_releases_entry() {
        let table = Arc::new(ScopeTable::new());
        let handle = RequestHandle::bound_to(&table);
        table.insert(handle.id(), "/s/one".into());

        let clone = handle.clone();
        drop(handle);
        assert_eq!(table.len(), 1);

        drop(clone);
        assert!(table.is_empty());
    }

    #[test]
    fn outlived_table_is_ignored() {
        let table = Arc::new(ScopeTable::new());
        let handle = RequestHandle::bound_to(&table);
        drop(table);
        drop(handle);
    }
}
