//! CO alert evaluation.

use serde::Serialize;

/// Binary alert state derived from the latest CO level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertState {
    Normal,
    Warning,
}

impl AlertState {
    /// Evaluate a CO level against the warning threshold.
    ///
    /// `Warning` iff the level strictly exceeds the threshold; equality is
    /// `Normal`. The state is recomputed fresh from each reading, with no
    /// hysteresis or debouncing.
    pub fn evaluate(co_level: f64, threshold: f64) -> Self {
        if co_level > threshold {
            AlertState::Warning
        } else {
            AlertState::Normal
        }
    }

    /// Short symbol for status lines.
    pub fn symbol(&self) -> &'static str {
        match self {
            AlertState::Normal => "OK",
            AlertState::Warning => "WARN",
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, AlertState::Warning)
    }
}
