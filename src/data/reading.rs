//! Device readings and wire-format parsing.
//!
//! The helmet emits one reading per line, newline-terminated ASCII:
//!
//! ```text
//! CO: <float>, WORN: <0|1>
//! ```
//!
//! e.g. `CO: 215.0, WORN: 1`. Parsing is pure: a malformed line produces a
//! [`MonitorError::Parse`] and nothing else.

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::error::MonitorError;

/// Full-scale value of the helmet's 10-bit CO ADC.
///
/// The wire format does not enforce the range, so values above this are still
/// accepted as data; clipping them is a display concern.
pub const ADC_MAX: f64 = 1023.0;

/// One parsed device sample. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Reading {
    /// Monotonic arrival instant, used for the elapsed-time axis.
    pub received_at: Instant,
    /// Wall-clock arrival time, used for the persisted timestamp column.
    pub recorded_at: DateTime<Utc>,
    /// CO level as reported, nominally in `[0, ADC_MAX]`.
    pub co_level: f64,
    /// Whether the helmet was worn when the sample was taken.
    pub worn: bool,
}

impl Reading {
    /// Stamp a new reading with the current clocks.
    pub fn new(co_level: f64, worn: bool) -> Self {
        Self {
            received_at: Instant::now(),
            recorded_at: Utc::now(),
            co_level,
            worn,
        }
    }

    /// Parse one raw line and stamp it on success.
    pub fn parse(line: &str) -> Result<Self, MonitorError> {
        let (co_level, worn) = parse_line(line)?;
        Ok(Self::new(co_level, worn))
    }
}

/// Parse one raw device line into `(co_level, worn)`.
///
/// The line must hold exactly two comma-separated fields, each of the form
/// `<label>: <value>`. The first value is parsed as a float, the second as an
/// integer coerced to a boolean (nonzero = worn). Any structural or numeric
/// deviation yields [`MonitorError::Parse`] and the caller drops the line.
pub fn parse_line(line: &str) -> Result<(f64, bool), MonitorError> {
    let fields: Vec<&str> = line.trim().split(',').collect();
    if fields.len() != 2 {
        return Err(MonitorError::Parse(format!(
            "expected 2 fields, got {}",
            fields.len()
        )));
    }

    let co_token = field_value(fields[0])?;
    let worn_token = field_value(fields[1])?;

    let co_level: f64 = co_token
        .parse()
        .map_err(|_| MonitorError::Parse(format!("invalid CO value '{co_token}'")))?;
    let worn: i64 = worn_token
        .parse()
        .map_err(|_| MonitorError::Parse(format!("invalid WORN value '{worn_token}'")))?;

    Ok((co_level, worn != 0))
}

/// Take the value half of a `<label>: <value>` field.
fn field_value(field: &str) -> Result<&str, MonitorError> {
    field
        .split_once(": ")
        .map(|(_, value)| value.trim())
        .ok_or_else(|| {
            MonitorError::Parse(format!("missing ': ' separator in '{}'", field.trim()))
        })
}
