//! Item handles
//!
//! An [`ItemHandle`] is the opaque owned resource backing one playable item.
//! Whoever holds the handle owns the resource; releasing it fires an optional
//! release hook exactly once. Dropping an unreleased handle fires the hook as
//! well, so the release-exactly-once guarantee holds on every path (eviction,
//! reset, dispose, or plain drop).

use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

/// Hook invoked exactly once when the handle's resource is released
pub type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Opaque owned resource representing one playable item
pub struct ItemHandle {
    item_id: Uuid,
    source: PathBuf,
    release_hook: Option<ReleaseHook>,
}

impl ItemHandle {
    /// Create a handle with no release hook
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            source: source.into(),
            release_hook: None,
        }
    }

    /// Create a handle whose hook fires when the resource is released
    pub fn with_release(source: impl Into<PathBuf>, hook: impl FnOnce() + Send + 'static) -> Self {
        Self {
            item_id: Uuid::new_v4(),
            source: source.into(),
            release_hook: Some(Box::new(hook)),
        }
    }

    /// Item UUID, assigned at construction
    pub fn item_id(&self) -> Uuid {
        self.item_id
    }

    /// Opaque payload: the locator the playback engine will open
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Read-only projection for the engine-facing window snapshot
    pub fn info(&self) -> ItemInfo {
        ItemInfo {
            item_id: self.item_id,
            source: self.source.clone(),
        }
    }

    /// Release the underlying resource
    ///
    /// Consumes the handle, so a second release is unrepresentable.
    pub fn release(mut self) {
        self.fire_hook();
    }

    fn fire_hook(&mut self) {
        if let Some(hook) = self.release_hook.take() {
            debug!("releasing item {}", self.item_id);
            hook();
        }
    }
}

impl Drop for ItemHandle {
    fn drop(&mut self) {
        // Backstop for handles dropped without an explicit release
        self.fire_hook();
    }
}

impl fmt::Debug for ItemHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemHandle")
            .field("item_id", &self.item_id)
            .field("source", &self.source)
            .finish()
    }
}

/// Cloneable read-only view of a resident item
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ItemInfo {
    /// Item UUID
    pub item_id: Uuid,

    /// Item locator
    pub source: PathBuf,
}
