//! Playback window
//!
//! Bounded ordered sequence of at most [`WINDOW_CAPACITY`] resident item
//! handles plus a current-position indicator. The window enforces capacity
//! and ownership transfer only; it is not internally synchronized. The
//! adapter wraps it in a single mutex so no external actor ever observes a
//! partially-applied mutation, and the adapter alone decides what the
//! position means after an eviction shifts the remaining slot down.

use crate::error::{Error, Result};
use crate::item::{ItemHandle, ItemInfo};
use tracing::debug;

/// Maximum number of resident items: the current item plus one look-ahead
pub const WINDOW_CAPACITY: usize = 2;

/// Bounded ordered window of resident item handles
#[derive(Debug, Default)]
pub struct PlaybackWindow {
    slots: Vec<ItemHandle>,
    position: Option<usize>,
}

impl PlaybackWindow {
    /// Create an empty window
    pub fn new() -> Self {
        Self {
            slots: Vec::with_capacity(WINDOW_CAPACITY),
            position: None,
        }
    }

    /// Number of resident items (0, 1, or 2)
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no items are resident
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Current position, if one is tracked
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Set the current position
    ///
    /// `Some(index)` must refer to a resident slot.
    pub fn set_position(&mut self, position: Option<usize>) -> Result<()> {
        if let Some(index) = position {
            if index >= self.slots.len() {
                return Err(Error::InvalidIndex(index));
            }
        }
        self.position = position;
        Ok(())
    }

    /// Append a handle at the end of the window
    ///
    /// Position is unchanged. Fails with [`Error::WindowFull`] when two items
    /// are already resident.
    pub fn insert(&mut self, handle: ItemHandle) -> Result<()> {
        if self.slots.len() >= WINDOW_CAPACITY {
            return Err(Error::WindowFull);
        }
        debug!("window insert: item {} at slot {}", handle.item_id(), self.slots.len());
        self.slots.push(handle);
        Ok(())
    }

    /// Remove and return the handle at index 0
    ///
    /// The remaining slot shifts down physically; the stored position is left
    /// as-is for the caller to reinterpret.
    pub fn evict_first(&mut self) -> Result<ItemHandle> {
        if self.slots.is_empty() {
            return Err(Error::WindowEmpty);
        }
        let evicted = self.slots.remove(0);
        debug!("window evict: item {}", evicted.item_id());
        Ok(evicted)
    }

    /// Atomically swap the window contents
    ///
    /// Installs `items` (one or two handles) with position reset to slot 0 and
    /// returns the previous residents for the caller to release. On error the
    /// window is untouched.
    pub fn replace_all(&mut self, items: Vec<ItemHandle>) -> Result<Vec<ItemHandle>> {
        if items.is_empty() {
            return Err(Error::EmptyReset);
        }
        if items.len() > WINDOW_CAPACITY {
            return Err(Error::WindowFull);
        }
        let old = std::mem::replace(&mut self.slots, items);
        self.position = Some(0);
        debug!("window replaced: {} items out, {} in", old.len(), self.slots.len());
        Ok(old)
    }

    /// Remove and return every resident handle; position becomes `None`
    pub fn clear(&mut self) -> Vec<ItemHandle> {
        self.position = None;
        std::mem::take(&mut self.slots)
    }

    /// Ordered read-only snapshot of the resident items
    pub fn items(&self) -> Vec<ItemInfo> {
        self.slots.iter().map(ItemHandle::info).collect()
    }
}
