//! Capability traits for the playback surface.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::SurfaceError;

/// A single media-playback element under remote control.
///
/// Implementations hold a non-owning reference: the element belongs to the
/// hosting document and may be mutated externally (e.g. a viewer manually
/// pausing) at any time. Callers must treat state read here as a snapshot.
#[async_trait]
pub trait PlaybackSurface: Send + Sync {
    /// Resume playback.
    async fn play(&self) -> Result<(), SurfaceError>;

    /// Suspend playback.
    async fn pause(&self) -> Result<(), SurfaceError>;

    /// Current playback position in seconds.
    async fn position(&self) -> Result<f64, SurfaceError>;

    /// Move the playback position to `seconds`.
    async fn seek(&self, seconds: f64) -> Result<(), SurfaceError>;

    /// Request fullscreen presentation of the surface.
    async fn request_fullscreen(&self) -> Result<(), SurfaceError>;
}

/// Resolves the playback surface fresh for every command.
///
/// The surface may not exist at startup or may be replaced by document
/// mutation, so it is re-queried at the moment of handling rather than held.
#[async_trait]
pub trait SurfaceProvider: Send + Sync {
    /// The current playback surface, or `None` if no surface is present.
    async fn resolve(&self) -> Option<Arc<dyn PlaybackSurface>>;

    /// Exit fullscreen presentation.
    ///
    /// Surface-independent: attempted even when no surface exists, and
    /// idempotent when nothing is fullscreen.
    async fn exit_fullscreen(&self) -> Result<(), SurfaceError>;
}
