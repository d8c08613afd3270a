use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recorder::{ClipMetadata, TickEvent};

/// Statistics about a recording session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionStats {
    /// When the first frame arrived
    pub started_at: Option<DateTime<Utc>>,

    /// Frames delivered by the source (one tick each)
    pub ticks: u64,

    /// Ticks on which presence was true
    pub presence_ticks: u64,

    pub clips_opened: u64,

    pub clips_closed: u64,

    /// Triggers that could not open a destination
    pub open_failures: u64,

    /// Frames written across closed clips, pre-roll included
    pub frames_written: u64,
}

impl SessionStats {
    /// Account for one tick and what it did
    pub fn record(&mut self, at: DateTime<Utc>, presence: bool, event: &TickEvent) {
        self.started_at.get_or_insert(at);
        self.ticks += 1;
        if presence {
            self.presence_ticks += 1;
        }

        match event {
            TickEvent::Idle | TickEvent::Recording { .. } => {}
            TickEvent::Started { .. } => self.clips_opened += 1,
            TickEvent::Closed(metadata) => self.record_close(metadata),
            TickEvent::OpenFailed(_) => self.open_failures += 1,
        }
    }

    /// Account for a closed clip
    pub fn record_close(&mut self, metadata: &ClipMetadata) {
        self.clips_closed += 1;
        self.frames_written += metadata.frames_written;
    }
}
