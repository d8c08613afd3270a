// Fixed-rate output pacing
//
// Input frames arrive whenever the source delivers them. Output slots are
// spaced exactly one interval apart starting at the clip's start instant;
// each tick writes the current frame once per slot that has come due. Slow
// input duplicates frames, fast input drops them, and playback length tracks
// elapsed capture time.

use chrono::{DateTime, Duration, Utc};

use super::config::normalize_rate;

#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl FramePacer {
    pub fn new(rate: f64) -> Self {
        let nanos = (1_000_000_000.0 / normalize_rate(rate)).round() as i64;
        Self {
            interval: Duration::nanoseconds(nanos),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn next_due(&self) -> Option<DateTime<Utc>> {
        self.next_due
    }

    /// Anchor the first slot at `start`, discarding any previous schedule
    pub fn anchor(&mut self, start: DateTime<Utc>) {
        self.next_due = Some(start);
    }

    /// Count the slots due at `now` and advance past them
    ///
    /// Returns 0 when the pacer has not been anchored.
    pub fn poll(&mut self, now: DateTime<Utc>) -> usize {
        let Some(mut due) = self.next_due else {
            return 0;
        };

        let mut slots = 0;
        while due <= now {
            slots += 1;
            due += self.interval;
        }

        self.next_due = Some(due);
        slots
    }
}
