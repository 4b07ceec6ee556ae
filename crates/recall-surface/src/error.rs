//! Surface error types.

use thiserror::Error;

/// Errors from playback-surface operations.
///
/// None of these propagate past the dispatcher: every failure degrades to a
/// diagnostic log line.
#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The DevTools session is unavailable or a protocol call failed.
    #[error("page session error: {0}")]
    Session(String),

    /// In-page evaluation raised an exception.
    #[error("evaluation failed: {0}")]
    Evaluate(String),

    /// A protocol call did not complete in time.
    #[error("timed out after {timeout_ms}ms: {context}")]
    Timeout {
        /// How long we waited.
        timeout_ms: u64,
        /// What we were waiting for.
        context: String,
    },

    /// The playback surface disappeared between resolution and use.
    #[error("playback surface detached")]
    Detached,
}
