//! # recall-surface
//!
//! The playback-surface capability interface and its CDP-backed
//! implementation.
//!
//! The agent never owns the media element. Every command re-resolves it
//! through [`SurfaceProvider::resolve`] at the moment of handling, so a
//! surface that is absent at startup, or replaced by document mutation, is
//! tolerated as a silent no-op rather than an error.

#![deny(unsafe_code)]

mod cdp;
mod error;
mod page;
pub mod testing;
mod traits;

pub use cdp::PageSession;
pub use error::SurfaceError;
pub use page::PageSurfaceProvider;
pub use traits::{PlaybackSurface, SurfaceProvider};
