//! Queue adapter
//!
//! Root coordinator for the two-slot look-ahead window. It owns the window
//! and the fetch broker, reacts to the playback engine's "item became
//! active" notifications, drives refills, and exposes advance/reset/dispose
//! to callers plus a read-only window snapshot to the engine.
//!
//! Concurrency: one `tokio::sync::Mutex` per adapter is the single exclusion
//! domain for every window mutation, on the notification path and the caller
//! path alike. Fetches are issued while that mutex is held, so a refill and
//! an explicit advance can never interleave their evict/append sequences,
//! and `dispose` naturally waits out any in-progress operation (and its
//! outstanding fetch) before tearing the window down. The fetch broker's
//! single-flight flag is a secondary guard that only trips on misuse of the
//! broker from outside the adapter.

use crate::error::{Error, Result};
use crate::events::QueueEvent;
use crate::fetch::{FetchOutcome, ItemFetcher, ItemRequest};
use crate::item::{ItemHandle, ItemInfo};
use crate::window::{PlaybackWindow, WINDOW_CAPACITY};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, info, warn};

/// Capacity of the event broadcast bus
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Adapter state, derived from window length and position
///
/// No separate state variable is stored; this is a projection of the window.
/// `Advancing` corresponds to the engine having reported it started the
/// look-ahead slot; the adapter rotates the window inside the same critical
/// section that consumes the notification, so observers effectively only see
/// `Priming`, `Steady`, or `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterState {
    Empty,
    Priming,
    Steady,
    Advancing,
    Disposed,
}

impl std::fmt::Display for AdapterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdapterState::Empty => write!(f, "empty"),
            AdapterState::Priming => write!(f, "priming"),
            AdapterState::Steady => write!(f, "steady"),
            AdapterState::Advancing => write!(f, "advancing"),
            AdapterState::Disposed => write!(f, "disposed"),
        }
    }
}

/// Notification from the playback engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineNotification {
    /// The engine began playing the item at the given window slot
    ItemBecameActive { window_index: usize },
}

struct AdapterInner {
    window: PlaybackWindow,
    disposed: bool,
}

/// Queue adapter: owns the window and the fetch broker
///
/// Cheaply cloneable; clones share the same window, broker, and event bus.
#[derive(Clone)]
pub struct QueueAdapter {
    inner: Arc<Mutex<AdapterInner>>,
    fetcher: Arc<ItemFetcher>,
    events: broadcast::Sender<QueueEvent>,
}

impl QueueAdapter {
    /// Create an adapter with one initial item (state: priming)
    ///
    /// Returns the adapter and the item-request stream the provider must
    /// service.
    pub fn new(item: ItemHandle) -> (Self, mpsc::UnboundedReceiver<ItemRequest>) {
        Self::build(item, None)
    }

    /// Create an adapter with an initial item and its look-ahead (state: steady)
    pub fn with_lookahead(
        item: ItemHandle,
        lookahead: ItemHandle,
    ) -> (Self, mpsc::UnboundedReceiver<ItemRequest>) {
        Self::build(item, Some(lookahead))
    }

    fn build(
        item: ItemHandle,
        lookahead: Option<ItemHandle>,
    ) -> (Self, mpsc::UnboundedReceiver<ItemRequest>) {
        let mut window = PlaybackWindow::new();
        // Capacity 2 and an empty window: these inserts cannot fail
        let _ = window.insert(item);
        if let Some(lookahead) = lookahead {
            let _ = window.insert(lookahead);
        }
        let _ = window.set_position(Some(0));

        let (fetcher, requests) = ItemFetcher::channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        info!("queue adapter created with {} resident item(s)", window.len());
        (
            Self {
                inner: Arc::new(Mutex::new(AdapterInner {
                    window,
                    disposed: false,
                })),
                fetcher: Arc::new(fetcher),
                events,
            },
            requests,
        )
    }

    /// Subscribe to window events
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }

    /// Current derived state
    pub async fn state(&self) -> AdapterState {
        let inner = self.inner.lock().await;
        if inner.disposed {
            return AdapterState::Disposed;
        }
        match (inner.window.len(), inner.window.position()) {
            (0, _) => AdapterState::Empty,
            (1, _) => AdapterState::Priming,
            (2, Some(1)) => AdapterState::Advancing,
            _ => AdapterState::Steady,
        }
    }

    /// Ordered read-only snapshot of the resident items, for the engine
    pub async fn items(&self) -> Result<Vec<ItemInfo>> {
        let inner = self.inner.lock().await;
        if inner.disposed {
            return Err(Error::Disposed);
        }
        Ok(inner.window.items())
    }

    /// React to the engine's `ItemBecameActive(window_index)` notification
    ///
    /// - Window not yet full: fetch one more item and append it (priming to
    ///   steady); end-of-sequence leaves the window short with no error.
    /// - Window full and the engine moved to slot 1: evict and release the
    ///   stale head, reinterpret the position as slot 0, then fetch a
    ///   replacement tail.
    /// - Window full and the engine reports slot 0: already primed, no-op.
    pub async fn notify_item_active(&self, window_index: usize) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return Err(Error::Disposed);
        }
        if window_index >= inner.window.len() {
            warn!("engine reported active index {} beyond window", window_index);
            return Err(Error::InvalidIndex(window_index));
        }

        debug!("engine active at window index {}", window_index);
        if inner.window.len() < WINDOW_CAPACITY {
            self.fill_tail(&mut inner).await?;
        } else if window_index == 1 {
            self.rotate(&mut inner)?;
            self.fill_tail(&mut inner).await?;
        }
        Ok(())
    }

    /// Spawn an actor-style inbox that drains engine notifications
    ///
    /// The task ends when the sender side is dropped or the adapter is
    /// disposed. Delivering notifications through this inbox (instead of a
    /// raw callback) keeps the engine off the adapter's critical sections.
    pub fn run_notifications(
        &self,
        mut notifications: mpsc::UnboundedReceiver<EngineNotification>,
    ) -> tokio::task::JoinHandle<()> {
        let adapter = self.clone();
        tokio::spawn(async move {
            while let Some(EngineNotification::ItemBecameActive { window_index }) =
                notifications.recv().await
            {
                match adapter.notify_item_active(window_index).await {
                    Ok(()) => {}
                    Err(Error::Disposed) => {
                        debug!("notification inbox stopping: adapter disposed");
                        break;
                    }
                    Err(e) => warn!("engine notification rejected: {}", e),
                }
            }
        })
    }

    /// Advance to the next item, suspending until the window is rebuilt
    ///
    /// With a full window: evict and release the current head, then fetch a
    /// new look-ahead tail. With a half-filled window (an earlier fetch hit
    /// end-of-sequence): first try to obtain the successor; if the provider
    /// again reports end-of-sequence there is nothing to advance to and the
    /// window is left unchanged.
    pub async fn move_to_next_item(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return Err(Error::Disposed);
        }

        match inner.window.len() {
            WINDOW_CAPACITY => {
                self.rotate(&mut inner)?;
                self.fill_tail(&mut inner).await?;
            }
            1 => {
                match self.fetcher.request_next().await? {
                    FetchOutcome::Item(handle) => {
                        debug!("late-primed look-ahead: item {}", handle.item_id());
                        inner.window.insert(handle)?;
                        self.emit_window_changed(&inner);
                        self.rotate(&mut inner)?;
                        self.fill_tail(&mut inner).await?;
                    }
                    FetchOutcome::EndOfSequence => {
                        debug!("no successor: advance is a no-op at end of sequence");
                        self.emit(QueueEvent::EndOfSequence {
                            timestamp: chrono::Utc::now(),
                        });
                    }
                }
            }
            _ => return Err(Error::WindowEmpty),
        }
        Ok(())
    }

    /// Replace the whole window with `items` (one or two handles)
    ///
    /// Every previously resident item is released after the swap. This is
    /// also the "skip to a previous item" path: pass the previous item as
    /// the new current, optionally followed by its gapless successor.
    pub async fn reset(&self, items: Vec<ItemHandle>) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return Err(Error::Disposed);
        }
        if items.is_empty() {
            return Err(Error::EmptyReset);
        }

        let old = inner.window.replace_all(items)?;
        info!("window reset: {} item(s) replaced", old.len());
        for handle in old {
            self.emit(QueueEvent::ItemEvicted {
                item_id: handle.item_id(),
                timestamp: chrono::Utc::now(),
            });
            handle.release();
        }
        if let Some(head) = inner.window.items().first() {
            self.emit(QueueEvent::ItemActivated {
                item_id: head.item_id,
                timestamp: chrono::Utc::now(),
            });
        }
        self.emit_window_changed(&inner);
        Ok(())
    }

    /// Release every resident item and shut the adapter down
    ///
    /// Terminal: every subsequent operation (including a second `dispose`)
    /// fails with [`Error::Disposed`]. Because all fetches run under the
    /// adapter's mutex, this call waits for any in-progress operation and
    /// its outstanding fetch before releasing resources.
    pub async fn dispose(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        if inner.disposed {
            return Err(Error::Disposed);
        }

        let removed = inner.window.clear();
        info!("disposing queue adapter: releasing {} item(s)", removed.len());
        for handle in removed {
            self.emit(QueueEvent::ItemEvicted {
                item_id: handle.item_id(),
                timestamp: chrono::Utc::now(),
            });
            handle.release();
        }
        inner.disposed = true;
        self.emit_window_changed(&inner);
        Ok(())
    }

    /// Evict and release the stale head; the remaining item becomes slot 0
    fn rotate(&self, inner: &mut AdapterInner) -> Result<()> {
        let stale = inner.window.evict_first()?;
        let stale_id = stale.item_id();
        stale.release();
        // Physical shift happened in the window; the adapter decides the
        // surviving item is now the current one.
        inner.window.set_position(Some(0))?;

        self.emit(QueueEvent::ItemEvicted {
            item_id: stale_id,
            timestamp: chrono::Utc::now(),
        });
        if let Some(head) = inner.window.items().first() {
            self.emit(QueueEvent::ItemActivated {
                item_id: head.item_id,
                timestamp: chrono::Utc::now(),
            });
        }
        Ok(())
    }

    /// Fetch the next item and append it as the look-ahead tail
    ///
    /// End-of-sequence leaves the window short by one slot; no further fetch
    /// is attempted for that slot until the next advance or notification.
    async fn fill_tail(&self, inner: &mut AdapterInner) -> Result<()> {
        match self.fetcher.request_next().await? {
            FetchOutcome::Item(handle) => {
                debug!("appending look-ahead item {}", handle.item_id());
                inner.window.insert(handle)?;
                self.emit_window_changed(inner);
            }
            FetchOutcome::EndOfSequence => {
                debug!("provider reports end of sequence; window stays at length {}", inner.window.len());
                self.emit(QueueEvent::EndOfSequence {
                    timestamp: chrono::Utc::now(),
                });
            }
        }
        Ok(())
    }

    fn emit_window_changed(&self, inner: &AdapterInner) {
        self.emit(QueueEvent::WindowChanged {
            items: inner.window.items().iter().map(|i| i.item_id).collect(),
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit(&self, event: QueueEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
