//! # Gapless Queue
//!
//! Bounded two-slot look-ahead window over a logical sequence of playable
//! media items, so a playback engine can advance from one item to the next
//! without an audible gap while never holding more than two decoded-item
//! resources at once.
//!
//! **Purpose:** coordinate (a) asynchronous, externally-fulfilled fetches of
//! "the next item", (b) the engine's now-playing notifications, and (c) the
//! release-exactly-once lifecycle of every resident item resource.
//!
//! **Architecture:** a [`QueueAdapter`] owns a [`PlaybackWindow`] (at most
//! two [`ItemHandle`]s) and a single-flight [`ItemFetcher`]. Item resolution
//! is an external collaborator: the fetcher publishes [`ItemRequest`] records
//! to a provider task, which answers each with an item or end-of-sequence.
//! Decoding, rendering, and item-selection policy live outside this crate.

pub mod adapter;
pub mod error;
pub mod events;
pub mod fetch;
pub mod item;
pub mod window;

pub use adapter::{AdapterState, EngineNotification, QueueAdapter};
pub use error::{Error, Result};
pub use events::QueueEvent;
pub use fetch::{FetchDirection, FetchOutcome, ItemFetcher, ItemRequest};
pub use item::{ItemHandle, ItemInfo};
pub use window::{PlaybackWindow, WINDOW_CAPACITY};
