//! Runtime configuration for the monitoring core.

use std::time::Duration;

/// Tunable knobs for the monitoring core.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// CO level above which the alert switches to `Warning` (strict).
    pub threshold: f64,
    /// Number of recent readings retained in the display window.
    pub window_capacity: usize,
    /// Nominal tick period. The core never sleeps on this itself; it is
    /// carried for whichever scheduler drives `tick()`.
    pub tick_period: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: 600.0,
            window_capacity: 10,
            tick_period: Duration::from_secs(1),
        }
    }
}
