//! Item fetch broker
//!
//! Bridges the adapter to the external item-resolution provider. A fetch
//! publishes an [`ItemRequest`] record to the registered handler (whoever
//! holds the request receiver) and suspends until the handler resolves it
//! through the request's oneshot responder, with either an item or an
//! explicit end-of-sequence value.
//!
//! Single-flight: at most one request may be outstanding per fetcher. A
//! second request while one is pending fails with [`Error::FetchInFlight`]
//! rather than queueing, because the provider protocol assumes one open
//! question at a time.
//!
//! There is deliberately no timeout and no cancellation: if the provider
//! never resolves a request, the fetch stays suspended. Bounded latency is
//! the caller's policy to impose.

use crate::error::{Error, Result};
use crate::item::ItemHandle;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

/// Logical direction of an item request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchDirection {
    Next,
    Previous,
}

impl std::fmt::Display for FetchDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchDirection::Next => write!(f, "next"),
            FetchDirection::Previous => write!(f, "previous"),
        }
    }
}

/// Provider's answer to an item request
#[derive(Debug)]
pub enum FetchOutcome {
    /// The item in the requested direction
    Item(ItemHandle),

    /// No more items in that direction; a normal outcome, not an error
    EndOfSequence,
}

/// Request record published to the registered provider
///
/// The provider resolves it exactly once by sending a [`FetchOutcome`]
/// through `responder`.
#[derive(Debug)]
pub struct ItemRequest {
    /// Requested direction
    pub direction: FetchDirection,

    /// Channel the provider answers on
    pub responder: oneshot::Sender<FetchOutcome>,
}

/// Single-flight asynchronous fetch broker
#[derive(Debug)]
pub struct ItemFetcher {
    requests: mpsc::UnboundedSender<ItemRequest>,
    in_flight: AtomicBool,
}

/// Clears the single-flight flag when a request resolves (or its future is
/// dropped before resolving)
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ItemFetcher {
    /// Create a fetcher and the request stream its provider must service
    ///
    /// Holding the receiver is the provider registration. If nobody services
    /// it, requests never resolve.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ItemRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                requests: tx,
                in_flight: AtomicBool::new(false),
            },
            rx,
        )
    }

    /// Request the next item in the sequence
    pub async fn request_next(&self) -> Result<FetchOutcome> {
        self.request(FetchDirection::Next).await
    }

    /// Request the previous item in the sequence
    pub async fn request_previous(&self) -> Result<FetchOutcome> {
        self.request(FetchDirection::Previous).await
    }

    async fn request(&self, direction: FetchDirection) -> Result<FetchOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::FetchInFlight);
        }
        let _guard = InFlightGuard(&self.in_flight);

        let (responder, answer) = oneshot::channel();
        debug!("publishing {} item request", direction);

        if self.requests.send(ItemRequest { direction, responder }).is_err() {
            // Provider registration was dropped. The contract is that an
            // unserviced request never resolves, so park rather than invent
            // an outcome.
            warn!("no item provider registered; {} request will never resolve", direction);
            return std::future::pending().await;
        }

        match answer.await {
            Ok(outcome) => {
                debug!("{} request resolved", direction);
                Ok(outcome)
            }
            Err(_) => {
                // Provider consumed the request record but dropped the
                // responder without answering.
                warn!("item provider abandoned {} request without resolving", direction);
                std::future::pending().await
            }
        }
    }
}
