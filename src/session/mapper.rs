//! Bidirectional mapping between host session ids and worker session ids.
//!
//! Forward and reverse maps are updated together inside each mutation, so each
//! host id maps to at most one remote id and vice versa.

use std::collections::HashMap;

use tracing::debug;

#[derive(Debug, Default)]
pub struct SessionMapper {
    forward: HashMap<String, i64>,
    reverse: HashMap<i64, String>,
}

impl SessionMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install or overwrite the mapping for `host_id`.
    ///
    /// Overwriting retires the previous remote id's reverse entry. If `remote_id`
    /// was held by a different host id, that host's forward entry is retired too.
    pub fn map(&mut self, host_id: &str, remote_id: i64) {
        if let Some(old_remote) = self.forward.insert(host_id.to_string(), remote_id) {
            if old_remote != remote_id {
                self.reverse.remove(&old_remote);
            }
        }
        if let Some(old_host) = self.reverse.insert(remote_id, host_id.to_string()) {
            if old_host != host_id {
                self.forward.remove(&old_host);
            }
        }
        debug!(host_id, remote_id, "session mapped");
    }

    pub fn resolve(&self, host_id: &str) -> Option<i64> {
        self.forward.get(host_id).copied()
    }

    pub fn resolve_reverse(&self, remote_id: i64) -> Option<&str> {
        self.reverse.get(&remote_id).map(String::as_str)
    }

    pub fn contains(&self, host_id: &str) -> bool {
        self.forward.contains_key(host_id)
    }

    /// Remove both directions. Unknown ids are a no-op.
    pub fn unmap(&mut self, host_id: &str) {
        if let Some(remote_id) = self.forward.remove(host_id) {
            self.reverse.remove(&remote_id);
            debug!(host_id, remote_id, "session unmapped");
        }
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn clear(&mut self) {
        self.forward.clear();
        self.reverse.clear();
        debug!("all session mappings cleared");
    }

    /// Point-in-time copy of every forward mapping.
    pub fn all(&self) -> HashMap<String, i64> {
        self.forward.clone()
    }
}
