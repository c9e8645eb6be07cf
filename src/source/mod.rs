//! Transport abstraction for the helmet's line-oriented device stream.
//!
//! This module provides a trait-based abstraction over the connection to the
//! device, with implementations for live TCP streams and scripted in-memory
//! replays.

mod script;
mod tcp;

pub use script::ScriptTransport;
pub use tcp::TcpTransport;

use std::fmt::Debug;

use crate::error::MonitorError;

/// Non-blocking line transport to the helmet.
///
/// The engine only calls [`read_line`](Transport::read_line) after
/// [`has_data`](Transport::has_data) reports a complete line, so a tick never
/// waits on the device. Implementations own connect/disconnect of the
/// underlying channel.
pub trait Transport: Send + Debug {
    /// Whether the underlying channel is currently open.
    fn is_open(&self) -> bool;

    /// Non-blocking poll: is a complete line ready to read?
    fn has_data(&mut self) -> bool;

    /// Read one newline-terminated line, without the terminator.
    ///
    /// Fails with [`MonitorError::Connection`] on I/O failure or when no
    /// complete line is buffered.
    fn read_line(&mut self) -> Result<String, MonitorError>;

    /// Release the channel. Safe to call more than once.
    fn close(&mut self);

    /// Human-readable description of the endpoint.
    fn description(&self) -> &str;
}
