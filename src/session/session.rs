use anyhow::{Context, Result};
use std::future::Future;
use tracing::{error, info, warn};

use super::stats::SessionStats;
use crate::frame::FrameSource;
use crate::presence::PresenceSignal;
use crate::recorder::{ClipRecorder, TickEvent};

/// Drives a [`ClipRecorder`] from a frame source and a presence signal
pub struct RecorderSession {
    recorder: ClipRecorder,
    presence: Box<dyn PresenceSignal>,
}

impl RecorderSession {
    pub fn new(recorder: ClipRecorder, presence: Box<dyn PresenceSignal>) -> Self {
        Self { recorder, presence }
    }

    pub fn recorder(&self) -> &ClipRecorder {
        &self.recorder
    }

    /// Record until the source runs dry or `stop` resolves
    ///
    /// Frames are ticked one at a time in arrival order. Any clip still open
    /// at the end is closed before this returns.
    pub async fn run<S>(mut self, mut source: Box<dyn FrameSource>, stop: S) -> Result<SessionStats>
    where
        S: Future<Output = ()> + Send,
    {
        info!("Starting recorder session (source: {})", source.name());

        let mut frames = source
            .start()
            .await
            .with_context(|| format!("Failed to start frame source {}", source.name()))?;

        let mut stats = SessionStats::default();
        tokio::pin!(stop);

        loop {
            tokio::select! {
                biased;

                _ = &mut stop => {
                    info!("Stop requested");
                    break;
                }

                frame = frames.recv() => {
                    let Some(frame) = frame else {
                        info!("Frame source closed");
                        break;
                    };

                    let presence = self.presence.evaluate(&frame);
                    let event = self.recorder.tick(&frame, presence);
                    if let TickEvent::OpenFailed(e) = &event {
                        warn!("Trigger at frame {} not recorded: {}", frame.sequence, e);
                    }
                    stats.record(frame.captured_at, presence, &event);
                }
            }
        }

        if let Err(e) = source.stop().await {
            error!("Failed to stop frame source: {}", e);
        }

        if let Some(metadata) = self.recorder.shutdown() {
            stats.record_close(&metadata);
        }

        info!(
            "Recorder session complete: {} ticks, {} clips, {} frames written",
            stats.ticks, stats.clips_closed, stats.frames_written
        );

        Ok(stats)
    }
}
