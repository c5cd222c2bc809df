//! Error types for gapless-queue
//!
//! Defines module-specific error types using thiserror for clear error propagation.
//! Every variant is a local contract violation surfaced to the immediate caller;
//! none of them are retried. The provider running out of items is a normal
//! outcome, not an error (see [`crate::fetch::FetchOutcome::EndOfSequence`]).

use thiserror::Error;

/// Main error type for gapless-queue
#[derive(Error, Debug)]
pub enum Error {
    /// Window already holds two items on insert
    ///
    /// A well-formed caller never sees this: the adapter only fetches a
    /// replacement after evicting the stale head.
    #[error("window full: at most 2 items may be resident")]
    WindowFull,

    /// Eviction attempted on an empty window
    #[error("window empty: nothing to evict")]
    WindowEmpty,

    /// Reset or replace-all given no items
    #[error("reset requires at least one item")]
    EmptyReset,

    /// Second fetch issued while one is outstanding
    #[error("a fetch request is already in flight")]
    FetchInFlight,

    /// Operation invoked after dispose
    #[error("queue adapter has been disposed")]
    Disposed,

    /// Playback engine reported a window index with no resident item
    #[error("no resident item at window index {0}")]
    InvalidIndex(usize),
}

/// Convenience Result type using gapless-queue Error
pub type Result<T> = std::result::Result<T, Error>;
