use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PresenceSignal;
use crate::frame::Frame;

/// Half-open interval `[start_secs, end_secs)` relative to the first frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceWindow {
    pub start_secs: f64,
    pub end_secs: f64,
}

impl PresenceWindow {
    pub fn contains(&self, offset_secs: f64) -> bool {
        offset_secs >= self.start_secs && offset_secs < self.end_secs
    }
}

/// Presence that follows a fixed timetable
///
/// Useful for demos and replaying a recorded detector output.
#[derive(Debug, Clone, Default)]
pub struct ScheduledPresence {
    windows: Vec<PresenceWindow>,
    origin: Option<DateTime<Utc>>,
}

impl ScheduledPresence {
    pub fn new(windows: Vec<PresenceWindow>) -> Self {
        Self {
            windows,
            origin: None,
        }
    }

    pub fn windows(&self) -> &[PresenceWindow] {
        &self.windows
    }
}

impl PresenceSignal for ScheduledPresence {
    fn evaluate(&mut self, frame: &Frame) -> bool {
        let origin = *self.origin.get_or_insert(frame.captured_at);
        let offset = frame.captured_at.signed_duration_since(origin);
        let offset_secs = offset.num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0;

        self.windows.iter().any(|w| w.contains(offset_secs))
    }
}
