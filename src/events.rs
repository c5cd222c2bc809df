//! Event types for the queue adapter's broadcast bus
//!
//! Observability only: subscribers (UI, logging, tests) watch window changes;
//! no control flow depends on delivery. Lagging receivers drop events, as is
//! usual for a broadcast bus.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Queue adapter event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QueueEvent {
    /// A new item became the current (head) item
    ItemActivated {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// An item left the window and its resource was released
    ItemEvicted {
        item_id: Uuid,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The resident set changed (append, reset, or dispose)
    WindowChanged {
        items: Vec<Uuid>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The provider reported no more items in the requested direction
    EndOfSequence {
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}
