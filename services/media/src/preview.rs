//! Playback handles for captured payloads
//!
//! A handle stands in for a browser object URL: it resolves to the captured
//! blob until it is revoked. Capture sessions revoke their handle on every
//! exit path, so a live handle always belongs to a live payload.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use uuid::Uuid;

use crate::models::MediaBlob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(Uuid);

/// Registry of live preview handles, shared by the capture sessions of a client
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    entries: Arc<Mutex<HashMap<Uuid, Arc<MediaBlob>>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<Uuid, Arc<MediaBlob>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Issue a handle for `blob`
    pub fn create(&self, blob: Arc<MediaBlob>) -> PreviewHandle {
        let id = Uuid::new_v4();
        self.entries().insert(id, blob);
        PreviewHandle(id)
    }

    /// The blob behind a live handle
    pub fn resolve(&self, handle: PreviewHandle) -> Option<Arc<MediaBlob>> {
        self.entries().get(&handle.0).cloned()
    }

    /// Invalidate a handle; revoking twice is harmless
    pub fn revoke(&self, handle: PreviewHandle) -> bool {
        let removed = self.entries().remove(&handle.0).is_some();
        if !removed {
            debug!("Preview handle {} was already revoked", handle.0);
        }
        removed
    }

    pub fn is_live(&self, handle: PreviewHandle) -> bool {
        self.entries().contains_key(&handle.0)
    }

    pub fn live_count(&self) -> usize {
        self.entries().len()
    }
}
