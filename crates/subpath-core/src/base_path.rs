//! Base path resolution.
//!
//! A [`BasePath`] combines a process-wide server base path (fixed at
//! construction) with an optional per-request prefix stored in a side-table
//! keyed by [`RequestId`]. Entries live exactly as long as the request's
//! [`RequestHandle`].

use std::sync::Arc;

use dashmap::mapref::entry::Entry;

use crate::error::BasePathError;
use crate::modify_url::modify_url;
use crate::request::{RequestHandle, ScopeTable};

/// Resolves and rewrites base paths. Cheap to clone; clones share the
/// request-scoped association table.
#[derive(Debug, Clone, Default)]
pub struct BasePath {
    server_base_path: Option<String>,
    scopes: Arc<ScopeTable>,
}

impl BasePath {
    /// An empty server base path is the same as none.
    pub fn new(server_base_path: Option<String>) -> Self {
        Self {
            server_base_path: server_base_path.filter(|path| !path.is_empty()),
            scopes: Arc::new(ScopeTable::new()),
        }
    }

    pub fn server_base_path(&self) -> Option<&str> {
        self.server_base_path.as_deref()
    }

    /// Mint a handle for a new inbound request.
    pub fn open_request(&self) -> RequestHandle {
        RequestHandle::bound_to(&self.scopes)
    }

    /// Server base path followed by the request-scoped base path.
    pub fn get(&self, request: &RequestHandle) -> String {
        let server = self.server_base_path.as_deref().unwrap_or("");
        match self.scopes.get(&request.id()) {
            Some(scoped) => format!("{server}{}", scoped.value()),
            None => server.to_string(),
        }
    }

    /// Attach a request-scoped base path. Write-once per request.
    pub fn set(
        &self,
        request: &RequestHandle,
        request_base_path: impl Into<String>,
    ) -> Result<(), BasePathError> {
        match self.scopes.entry(request.id()) {
            Entry::Occupied(_) => Err(BasePathError::AlreadySet {
                request_id: request.id(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(request_base_path.into());
                Ok(())
            }
        }
    }

    /// Prefix host-less absolute paths with the server base path.
    pub fn prepend(&self, path: &str) -> String {
        let Some(server) = self.server_base_path.as_deref() else {
            return path.to_string();
        };

        modify_url(path, |parts| {
            if parts.hostname().is_none() && parts.pathname.starts_with('/') {
                parts.pathname = format!("{server}{}", parts.pathname);
            }
        })
    }

    /// Strip the server base path from `path` if it is under it.
    pub fn remove(&self, path: &str) -> String {
        let Some(server) = self.server_base_path.as_deref() else {
            return path.to_string();
        };

        if path == server {
            return "/".to_string();
        }

        match path.strip_prefix(server) {
            Some(rest) if rest.starts_with('/') => rest.to_string(),
            _ => path.to_string(),
        }
    }

    /// Number of requests currently holding a request-scoped base path.
    pub fn active_associations(&self) -> usize {
        self.scopes.len()
    }
}
