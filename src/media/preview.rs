//! Transient local references for media previews.
//!
//! Uploaded files, fetched remote images, and narration clips are held in a
//! shared [`PreviewStore`] and addressed by a [`PreviewHandle`]. A handle is
//! the only owner of its entry: dropping it releases the bytes, so replacing a
//! handle or tearing down its owner can never leak a preview.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use url::Url;
use uuid::Uuid;

/// Route prefix under which live previews are served.
pub const PREVIEW_ROUTE_PREFIX: &str = "/previews";

#[derive(Clone)]
struct PreviewEntry {
    data: Bytes,
    mime_type: String,
}

/// Shared store of live preview blobs.
#[derive(Clone, Default)]
pub struct PreviewStore {
    entries: Arc<Mutex<HashMap<Uuid, PreviewEntry>>>,
}

impl PreviewStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, PreviewEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Store bytes and hand back the owning handle.
    pub fn acquire(&self, data: impl Into<Bytes>, mime_type: impl Into<String>) -> PreviewHandle {
        let id = Uuid::new_v4();
        let data = data.into();
        let mime_type = mime_type.into();
        tracing::debug!(%id, bytes = data.len(), %mime_type, "Acquired preview");
        self.lock().insert(
            id,
            PreviewEntry {
                data,
                mime_type,
            },
        );
        PreviewHandle {
            id,
            store: self.clone(),
        }
    }

    /// Look up a live preview's bytes and MIME type.
    pub fn get(&self, id: Uuid) -> Option<(Bytes, String)> {
        self.lock()
            .get(&id)
            .map(|e| (e.data.clone(), e.mime_type.clone()))
    }

    /// Number of previews currently held.
    pub fn active_count(&self) -> usize {
        self.lock().len()
    }

    /// Total bytes currently held.
    pub fn total_bytes(&self) -> usize {
        self.lock().values().map(|e| e.data.len()).sum()
    }

    fn release(&self, id: Uuid) {
        if self.lock().remove(&id).is_some() {
            tracing::debug!(%id, "Released preview");
        }
    }
}

/// Owning handle to one preview. Not `Clone`; the entry lives exactly as long
/// as the handle.
pub struct PreviewHandle {
    id: Uuid,
    store: PreviewStore,
}

impl PreviewHandle {
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Local path the page uses to render this preview.
    pub fn href(&self) -> String {
        format!("{}/{}", PREVIEW_ROUTE_PREFIX, self.id)
    }

    /// Current bytes and MIME type.
    pub fn contents(&self) -> Option<(Bytes, String)> {
        self.store.get(self.id)
    }
}

impl std::fmt::Debug for PreviewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewHandle").field("id", &self.id).finish()
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.store.release(self.id);
    }
}

/// Where a piece of image/video content is rendered from.
#[derive(Debug)]
pub enum MediaSource {
    /// Bytes held locally behind a transient reference.
    Local(PreviewHandle),
    /// A remote URL used directly.
    Remote(Url),
}

impl MediaSource {
    /// Value for an `src` attribute.
    pub fn href(&self) -> String {
        match self {
            Self::Local(handle) => handle.href(),
            Self::Remote(url) => url.to_string(),
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}
