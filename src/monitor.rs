//! The tick-driven monitoring engine.
//!
//! [`HelmetMonitor`] owns the transport, the store, and every piece of
//! mutable state, and turns each externally driven tick into at most one
//! read → parse → persist → window → alert pass. Ticks never block: a line
//! is only read after a successful non-blocking poll, and the absence of
//! data is a valid, cheap outcome.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MonitorConfig;
use crate::data::{AlertState, Reading, SlidingWindow, ADC_MAX};
use crate::error::MonitorError;
use crate::source::Transport;
use crate::store::SensorStore;

/// Connection lifecycle for the device stream.
///
/// Advances `Disconnected → Connected → Streaming`; only an explicit
/// [`HelmetMonitor::close`] returns it to `Disconnected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConnectionState {
    Disconnected,
    Connected,
    Streaming,
}

impl ConnectionState {
    /// Display label for status lines.
    pub fn label(&self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connected => "connected",
            ConnectionState::Streaming => "streaming",
        }
    }
}

/// Read-only per-tick projection handed to the rendering layer.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// `(seconds since session start, CO level)` per window entry, oldest
    /// first.
    pub points: Vec<(f64, f64)>,
    /// Alert state derived from the latest reading.
    pub alert: AlertState,
    /// Latest worn flag; `None` until the first reading arrives.
    pub worn: Option<bool>,
    pub connection: ConnectionState,
    /// Last transport read failure, if the stream has started failing.
    pub transport_error: Option<String>,
}

impl Snapshot {
    fn idle() -> Self {
        Self {
            points: Vec::new(),
            alert: AlertState::Normal,
            worn: None,
            connection: ConnectionState::Disconnected,
            transport_error: None,
        }
    }
}

/// The ingestion, windowing, and alerting core.
///
/// All operations run synchronously inside the caller's tick; there is no
/// background thread. The transport and store handles are exclusively owned
/// here and released only by [`close`](HelmetMonitor::close).
pub struct HelmetMonitor {
    transport: Option<Box<dyn Transport>>,
    store: Option<SensorStore>,
    config: MonitorConfig,
    state: ConnectionState,
    window: SlidingWindow,
    session_start: Option<Instant>,
    alert: AlertState,
    worn: Option<bool>,
    parse_failures: u64,
    transport_error: Option<String>,
    last_snapshot: Snapshot,
}

impl HelmetMonitor {
    /// Create a core around an already-constructed transport and store.
    ///
    /// Construction never fails and performs no I/O; the first fallible step
    /// is [`connect`](HelmetMonitor::connect).
    pub fn new(transport: Box<dyn Transport>, store: SensorStore, config: MonitorConfig) -> Self {
        let window = SlidingWindow::new(config.window_capacity);
        Self {
            transport: Some(transport),
            store: Some(store),
            config,
            state: ConnectionState::Disconnected,
            window,
            session_start: None,
            alert: AlertState::Normal,
            worn: None,
            parse_failures: 0,
            transport_error: None,
            last_snapshot: Snapshot::idle(),
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.state
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Malformed lines dropped so far. Diagnostic only; parse failures are
    /// never surfaced past the tick boundary.
    pub fn parse_failures(&self) -> u64 {
        self.parse_failures
    }

    /// Whether the underlying transport still reports open. Lets a driving
    /// loop notice end-of-stream without inspecting the transport itself.
    pub fn transport_open(&self) -> bool {
        self.transport.as_ref().is_some_and(|t| t.is_open())
    }

    /// Rows persisted so far, for status displays.
    pub fn persisted_rows(&self) -> Result<u64, MonitorError> {
        match self.store.as_ref() {
            Some(store) => store.row_count(),
            None => Err(MonitorError::Persistence(
                "store has been closed".to_string(),
            )),
        }
    }

    /// Move to `Connected` if the transport reports open.
    ///
    /// A successful connect (re)starts the session clock, so the elapsed-time
    /// axis resets on every reconnect. Reconnecting while streaming keeps the
    /// stream running; the state only ever moves backwards through an
    /// explicit [`close`](HelmetMonitor::close). On failure the state remains
    /// `Disconnected` and the error is reported, not fatal.
    pub fn connect(&mut self) -> Result<(), MonitorError> {
        let Some(transport) = self.transport.as_ref() else {
            return Err(MonitorError::Connection(
                "transport has been closed".to_string(),
            ));
        };
        if !transport.is_open() {
            return Err(MonitorError::Connection(
                "transport is not open".to_string(),
            ));
        }

        info!("connected to {}", transport.description());
        if self.state != ConnectionState::Streaming {
            self.state = ConnectionState::Connected;
        }
        self.session_start = Some(Instant::now());
        self.refresh_snapshot();
        Ok(())
    }

    /// Begin reading on subsequent ticks.
    ///
    /// Idempotent while streaming; fails with
    /// [`MonitorError::NotConnected`] (state unchanged) when disconnected.
    pub fn start_streaming(&mut self) -> Result<(), MonitorError> {
        match self.state {
            ConnectionState::Connected | ConnectionState::Streaming => {
                self.state = ConnectionState::Streaming;
                self.refresh_snapshot();
                Ok(())
            }
            ConnectionState::Disconnected => Err(MonitorError::NotConnected),
        }
    }

    /// Run one tick of the ingestion pipeline.
    ///
    /// Never blocks. Outside `Streaming` the tick is a no-op that returns
    /// the last known snapshot. A transport read failure is recorded in the
    /// snapshot and the tick still completes. A persistence failure is
    /// returned as an error, but only after the in-memory window, alert, and
    /// worn flag have been updated; the refreshed snapshot stays available
    /// via [`snapshot`](HelmetMonitor::snapshot).
    pub fn tick(&mut self) -> Result<Snapshot, MonitorError> {
        if self.state != ConnectionState::Streaming {
            return Ok(self.last_snapshot.clone());
        }

        let mut persist_result = Ok(());
        match self.poll_line() {
            Some(Ok(line)) => {
                self.transport_error = None;
                match Reading::parse(&line) {
                    Ok(reading) => persist_result = self.accept(reading),
                    Err(err) => {
                        self.parse_failures += 1;
                        debug!("dropping malformed line {line:?}: {err}");
                    }
                }
            }
            Some(Err(err)) => {
                warn!("transport read failed: {err}");
                self.transport_error = Some(err.to_string());
            }
            None => {}
        }

        self.refresh_snapshot();
        persist_result.map(|()| self.last_snapshot.clone())
    }

    /// Poll the transport once; `None` when no complete line is ready.
    fn poll_line(&mut self) -> Option<Result<String, MonitorError>> {
        let transport = self.transport.as_mut()?;
        if !transport.has_data() {
            return None;
        }
        Some(transport.read_line())
    }

    /// Persist one accepted reading and fold it into the live state.
    fn accept(&mut self, reading: Reading) -> Result<(), MonitorError> {
        if reading.co_level > ADC_MAX || reading.co_level < 0.0 {
            debug!(
                "CO level {} outside ADC range [0, {ADC_MAX}]",
                reading.co_level
            );
        }

        let persisted = match self.store.as_ref() {
            Some(store) => store.append(&reading),
            None => Err(MonitorError::Persistence(
                "store has been closed".to_string(),
            )),
        };
        if let Err(ref err) = persisted {
            warn!("failed to persist reading: {err}");
        }

        self.worn = Some(reading.worn);
        self.alert = AlertState::evaluate(reading.co_level, self.config.threshold);
        if self.alert.is_warning() {
            warn!(
                "CO level {} above threshold {}",
                reading.co_level, self.config.threshold
            );
        }
        self.window.push(reading);

        persisted
    }

    /// The current projection of window, alert, and connection status.
    pub fn snapshot(&self) -> Snapshot {
        self.last_snapshot.clone()
    }

    /// Export every persisted reading to `path` as CSV.
    ///
    /// Returns the number of exported rows; in-memory state is unaffected.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<u64, MonitorError> {
        match self.store.as_ref() {
            Some(store) => store.export_csv(path),
            None => Err(MonitorError::Export("store has been closed".to_string())),
        }
    }

    /// Release the transport and store and return to `Disconnected`.
    ///
    /// Idempotent: closing an already-closed core is a no-op. Subsequent
    /// ticks are no-ops that keep returning the last snapshot.
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            info!("closed transport {}", transport.description());
        }
        // SQLite connection closes when the handle drops.
        self.store = None;
        self.state = ConnectionState::Disconnected;
        self.refresh_snapshot();
    }

    fn refresh_snapshot(&mut self) {
        let points = match self.session_start {
            Some(start) => self.window.points(start),
            None => Vec::new(),
        };
        self.last_snapshot = Snapshot {
            points,
            alert: self.alert,
            worn: self.worn,
            connection: self.state,
            transport_error: self.transport_error.clone(),
        };
    }
}
