//! # recall-client
//!
//! Reconnecting control-channel transport and command dispatch.
//!
//! Two components composed in a strict pipeline:
//!
//! - [`ConnectionManager`] owns the socket lifecycle: connect, detect
//!   closure or error, schedule reconnection after a fixed delay, forever.
//! - [`CommandDispatcher`] decodes each inbound payload and applies at most
//!   one playback effect against the surface resolved fresh per command.
//!
//! The manager forwards each frame's payload to the dispatcher; the
//! dispatcher never touches the socket. All failures — transport, decode,
//! surface — degrade to a diagnostic log line and never abort the process.

#![deny(unsafe_code)]

mod config;
mod connection;
mod dispatch;

pub use config::{CONTROL_PATH, ClientConfig};
pub use connection::{ClientHandle, ConnectionManager, ConnectionState};
pub use dispatch::CommandDispatcher;
