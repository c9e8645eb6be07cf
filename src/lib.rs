//! # helmwatch
//!
//! Ingestion, windowing, and alerting core for a CO safety helmet's
//! line-oriented sensor stream.
//!
//! The helmet streams periodic readings (`CO: <float>, WORN: <0|1>`) over an
//! unreliable serial-style link. This crate turns that stream into durable
//! rows, a bounded recent-history window, and a binary alert state, under a
//! tick-driven execution model: an external periodic clock calls
//! [`HelmetMonitor::tick`], and the core does at most one non-blocking
//! read → parse → persist → window → alert pass per tick.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      HelmetMonitor                         │
//! │  ┌─────────┐   ┌────────┐   ┌────────┐   ┌─────────────┐  │
//! │  │ source  │──▶│  data  │──▶│ store  │──▶│  Snapshot   │  │
//! │  │ (lines) │   │ (parse,│   │(SQLite)│   │ (per tick)  │  │
//! │  └─────────┘   │ window,│   └────────┘   └─────────────┘  │
//! │                │ alert) │                                  │
//! │                └────────┘                                  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: the non-blocking [`Transport`] trait with TCP and
//!   scripted-replay implementations
//! - **[`data`]**: the [`Reading`] parser, the bounded [`SlidingWindow`],
//!   and the [`AlertState`] evaluator
//! - **[`store`]**: per-reading durable inserts and CSV export over SQLite
//! - **[`monitor`]**: the connection state machine and the tick pipeline
//!
//! Rendering, buttons, and charts are external collaborators: they drive the
//! clock and consume the [`Snapshot`] the core hands back each tick.
//!
//! ## Usage
//!
//! ```
//! use helmwatch::{HelmetMonitor, MonitorConfig, ScriptTransport, SensorStore};
//!
//! let transport = ScriptTransport::new(["CO: 215.0, WORN: 1"]);
//! let store = SensorStore::open_in_memory().unwrap();
//! let mut monitor = HelmetMonitor::new(Box::new(transport), store, MonitorConfig::default());
//!
//! monitor.connect().unwrap();
//! monitor.start_streaming().unwrap();
//!
//! let snapshot = monitor.tick().unwrap();
//! assert_eq!(snapshot.points.len(), 1);
//! assert_eq!(snapshot.worn, Some(true));
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod monitor;
pub mod source;
pub mod store;

// Re-export main types for convenience
pub use config::MonitorConfig;
pub use data::{parse_line, AlertState, Reading, SlidingWindow, ADC_MAX};
pub use error::MonitorError;
pub use monitor::{ConnectionState, HelmetMonitor, Snapshot};
pub use source::{ScriptTransport, TcpTransport, Transport};
pub use store::{SensorStore, StoredReading};
