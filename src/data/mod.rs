//! Data models for the ingestion pipeline.
//!
//! ## Submodules
//!
//! - [`reading`]: the [`Reading`] sample type and the pure line parser
//! - [`window`]: the bounded [`SlidingWindow`] of recent readings
//! - [`alert`]: the [`AlertState`] threshold evaluator
//!
//! ## Data flow
//!
//! ```text
//! raw line ("CO: 215.0, WORN: 1")
//!        │
//!        ▼
//! reading::parse_line()
//!        │
//!        ├──▶ SensorStore::append()         (durable, arrival order)
//!        ├──▶ SlidingWindow::push()         (bounded display history)
//!        └──▶ AlertState::evaluate()        (latest reading only)
//! ```

pub mod alert;
pub mod reading;
pub mod window;

pub use alert::AlertState;
pub use reading::{parse_line, Reading, ADC_MAX};
pub use window::SlidingWindow;
