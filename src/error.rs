//! Error types for the monitoring core.

use thiserror::Error;

/// Errors surfaced by the monitoring core.
///
/// None of these terminate the process: every variant is reported to the
/// caller, who decides whether and how to present it. Malformed device lines
/// are the steady-state noise of a line-oriented sensor feed, so `Parse`
/// errors are swallowed at the tick boundary and only counted.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// The transport could not be opened, or failed mid-read.
    #[error("connection failed: {0}")]
    Connection(String),

    /// A streaming command was issued while disconnected.
    #[error("not connected to the helmet")]
    NotConnected,

    /// A device line did not match the expected wire shape.
    #[error("malformed line: {0}")]
    Parse(String),

    /// A durable insert failed. In-memory state still updates.
    #[error("persistence failed: {0}")]
    Persistence(String),

    /// Bulk export failed. Core state is unaffected.
    #[error("export failed: {0}")]
    Export(String),
}

impl From<rusqlite::Error> for MonitorError {
    fn from(err: rusqlite::Error) -> Self {
        MonitorError::Persistence(err.to_string())
    }
}
