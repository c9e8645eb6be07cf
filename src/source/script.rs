//! Scripted in-memory transport.
//!
//! Feeds a fixed sequence of lines through the [`Transport`] interface. Used
//! to replay captured device sessions from a file and for deterministic
//! tests that need an exact stream without sockets.

use std::collections::VecDeque;
use std::fs;
use std::path::Path;

use super::Transport;
use crate::error::MonitorError;

/// A transport that replays a queued sequence of lines.
///
/// The transport reports open while lines remain and closes itself once the
/// script is exhausted, which lets a driving loop notice end-of-stream the
/// same way it would a dropped TCP peer.
#[derive(Debug)]
pub struct ScriptTransport {
    lines: VecDeque<String>,
    open: bool,
    description: String,
}

impl ScriptTransport {
    /// Queue the given lines for replay.
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            open: true,
            description: "script".to_string(),
        }
    }

    /// Load a captured session file, one reading per line.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, MonitorError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            MonitorError::Connection(format!("failed to read {}: {e}", path.display()))
        })?;

        let mut transport = Self::new(content.lines().map(str::to_string));
        transport.description = format!("replay: {}", path.display());
        Ok(transport)
    }

    /// Queue another line at the tail of the script.
    pub fn push_line(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
    }

    /// Lines not yet consumed.
    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl Transport for ScriptTransport {
    fn is_open(&self) -> bool {
        self.open && !self.lines.is_empty()
    }

    fn has_data(&mut self) -> bool {
        self.open && !self.lines.is_empty()
    }

    fn read_line(&mut self) -> Result<String, MonitorError> {
        if !self.open {
            return Err(MonitorError::Connection("transport closed".to_string()));
        }
        self.lines
            .pop_front()
            .ok_or_else(|| MonitorError::Connection("script exhausted".to_string()))
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn description(&self) -> &str {
        &self.description
    }
}
