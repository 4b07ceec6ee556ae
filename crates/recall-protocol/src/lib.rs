//! # recall-protocol
//!
//! Wire schema for the recall control channel.
//!
//! The controller drives playback by sending JSON text frames of the form
//! `{"type": "<kind>", ...}`. This crate owns the command schema, the
//! decode/encode entry points with their error taxonomy, and the legacy
//! handshake frame sent right after connection open.

#![deny(unsafe_code)]

mod commands;
mod handshake;

pub use commands::{Command, ControlAction, DecodeError, decode};
pub use handshake::{HELLO_PAYLOAD, handshake_frame};
