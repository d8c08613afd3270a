use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use std::path::PathBuf;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::config::RecorderConfig;
use super::error::RecorderError;
use super::metadata::{emit, ClipMetadata, ClipSink, CloseReason};
use super::pacer::FramePacer;
use super::writer::{ClipWriter, ClipWriterFactory, FileClipWriterFactory};
use super::zone::ClipZone;
use crate::frame::{Frame, PreRollBuffer};

/// What a single tick did
#[derive(Debug)]
pub enum TickEvent {
    /// Not recording and no trigger
    Idle,
    /// A clip was opened on this tick
    Started {
        clip_id: Uuid,
        path: PathBuf,
        preroll_frames: u64,
        /// Live frames written on the opening tick
        written: u64,
    },
    /// Recording continued; `written` is the number of paced writes
    Recording { written: u64 },
    /// The clip was closed on this tick
    Closed(ClipMetadata),
    /// The trigger fired but no destination could be opened; still idle
    OpenFailed(RecorderError),
}

enum State {
    Idle,
    Recording(ActiveClip),
}

impl State {
    fn take(&mut self) -> State {
        std::mem::replace(self, State::Idle)
    }
}

/// A clip in progress; owns its writer exclusively
struct ActiveClip {
    id: Uuid,
    writer: Box<dyn ClipWriter>,
    path: PathBuf,
    started_at: DateTime<Utc>,
    last_presence_at: DateTime<Utc>,
    preroll_frames: u64,
    pacer: FramePacer,
}

impl ActiveClip {
    fn write(&mut self, frame: &Frame) -> Result<(), RecorderError> {
        self.writer.write(frame)
    }

    /// Write `frame` once per output slot due at `now`
    fn write_due(&mut self, frame: &Frame, now: DateTime<Utc>) -> Result<u64, RecorderError> {
        let slots = self.pacer.poll(now) as u64;
        for _ in 0..slots {
            self.write(frame)?;
        }
        Ok(slots)
    }
}

/// Presence-triggered clip recorder
///
/// Call [`ClipRecorder::tick`] exactly once per captured frame, from one
/// thread. A clip opens when presence turns true, keeps recording through
/// presence gaps no longer than the hold window, and closes once the hold
/// elapses. Every closed clip produces one [`ClipMetadata`] for the sink.
pub struct ClipRecorder {
    config: RecorderConfig,
    rate: f64,
    hold: Duration,
    zone: ClipZone,
    writers: Box<dyn ClipWriterFactory>,
    sink: Box<dyn ClipSink>,
    preroll: PreRollBuffer,
    state: State,
    last_tick_at: Option<DateTime<Utc>>,
}

impl ClipRecorder {
    pub fn new(
        config: RecorderConfig,
        writers: Box<dyn ClipWriterFactory>,
        sink: Box<dyn ClipSink>,
    ) -> Self {
        let rate = config.effective_rate();
        let hold = Duration::from_std(config.hold()).unwrap_or(Duration::MAX);
        let zone = ClipZone::resolve(&config.time_zone);
        let preroll = PreRollBuffer::new(config.preroll_capacity());

        info!(
            "Clip recorder initialized: {} fps, hold {:.1}s, pre-roll {} frames, zone {}",
            rate,
            config.hold().as_secs_f64(),
            preroll.capacity(),
            zone.id()
        );

        Self {
            config,
            rate,
            hold,
            zone,
            writers,
            sink,
            preroll,
            state: State::Idle,
            last_tick_at: None,
        }
    }

    /// Recorder writing clip files under `config.output.dir`
    ///
    /// Fails if the output directory cannot be created.
    pub fn with_files(config: RecorderConfig, sink: Box<dyn ClipSink>) -> Result<Self> {
        let writers = FileClipWriterFactory::from_config(&config)?;
        Ok(Self::new(config, Box::new(writers), sink))
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn zone(&self) -> &ClipZone {
        &self.zone
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, State::Recording(_))
    }

    pub fn preroll(&self) -> &PreRollBuffer {
        &self.preroll
    }

    /// Feed one frame and its presence flag
    ///
    /// The frame's capture instant is the clock for pacing and hold. Never
    /// fails; open and write failures are recovered and reported in the
    /// returned event.
    pub fn tick(&mut self, frame: &Frame, presence: bool) -> TickEvent {
        let now = frame.captured_at;
        self.last_tick_at = Some(now);

        let event = match self.state.take() {
            State::Idle if presence => self.start_clip(frame, now),
            State::Idle => TickEvent::Idle,
            State::Recording(clip) => self.continue_clip(clip, frame, presence, now),
        };

        // A closing frame is already in the finished clip; keep it out of the next one
        if !matches!(event, TickEvent::Closed(_)) {
            self.preroll.push(frame);
        }

        event
    }

    /// Close any open clip and release buffered frames
    ///
    /// Safe to call repeatedly; only the first call after a clip opened
    /// returns (and emits) metadata.
    pub fn shutdown(&mut self) -> Option<ClipMetadata> {
        match self.state.take() {
            State::Idle => {
                self.preroll.clear();
                None
            }
            State::Recording(clip) => {
                let end = self
                    .last_tick_at
                    .map_or(clip.started_at, |t| t.max(clip.started_at));
                Some(self.finish(clip, end, CloseReason::Shutdown))
            }
        }
    }

    fn start_clip(&mut self, frame: &Frame, now: DateTime<Utc>) -> TickEvent {
        let stem = format!("{}_{}", self.config.output.prefix, self.zone.file_stamp(now));

        let writer = match self.writers.open(&stem) {
            Ok(writer) => writer,
            Err(e) => {
                warn!("Failed to start clip {}: {}", stem, e);
                return TickEvent::OpenFailed(e);
            }
        };

        let mut pacer = FramePacer::new(self.rate);
        pacer.anchor(now);

        let mut clip = ActiveClip {
            id: Uuid::new_v4(),
            path: writer.path().to_path_buf(),
            writer,
            started_at: now,
            last_presence_at: now,
            preroll_frames: 0,
            pacer,
        };

        info!("Clip {} started: {}", clip.id, clip.path.display());

        let mut failure = None;
        for buffered in self.preroll.drain() {
            if let Err(e) = clip.write(&buffered) {
                failure = Some(e);
                break;
            }
            clip.preroll_frames += 1;
        }
        if let Some(e) = failure {
            error!("Pre-roll write failed for clip {}: {}", clip.id, e);
            return TickEvent::Closed(self.finish(clip, now, CloseReason::WriteFailed));
        }

        let written = match clip.write_due(frame, now) {
            Ok(written) => written,
            Err(e) => {
                error!("Write failed for clip {}: {}", clip.id, e);
                return TickEvent::Closed(self.finish(clip, now, CloseReason::WriteFailed));
            }
        };

        let event = TickEvent::Started {
            clip_id: clip.id,
            path: clip.path.clone(),
            preroll_frames: clip.preroll_frames,
            written,
        };
        self.state = State::Recording(clip);
        event
    }

    fn continue_clip(
        &mut self,
        mut clip: ActiveClip,
        frame: &Frame,
        presence: bool,
        now: DateTime<Utc>,
    ) -> TickEvent {
        if presence {
            clip.last_presence_at = now;
        }

        let written = match clip.write_due(frame, now) {
            Ok(written) => written,
            Err(e) => {
                error!("Write failed for clip {}: {}", clip.id, e);
                return TickEvent::Closed(self.finish(clip, now, CloseReason::WriteFailed));
            }
        };

        if !presence && now.signed_duration_since(clip.last_presence_at) > self.hold {
            debug!("Hold elapsed for clip {}", clip.id);
            return TickEvent::Closed(self.finish(clip, now, CloseReason::HoldElapsed));
        }

        self.state = State::Recording(clip);
        TickEvent::Recording { written }
    }

    /// Close the writer, reset per-clip state, then publish the record
    fn finish(&mut self, mut clip: ActiveClip, end: DateTime<Utc>, reason: CloseReason) -> ClipMetadata {
        if let Err(e) = clip.writer.close() {
            warn!("Clip {} did not close cleanly: {}", clip.id, e);
        }
        self.preroll.clear();

        let duration = end.signed_duration_since(clip.started_at);
        let metadata = ClipMetadata {
            clip_id: clip.id,
            path: clip.path,
            started_at: clip.started_at,
            ended_at: end,
            started_local: self.zone.render(clip.started_at),
            ended_local: self.zone.render(end),
            duration_secs: duration.num_microseconds().unwrap_or(i64::MAX) as f64 / 1_000_000.0,
            frames_written: clip.writer.frames_written(),
            preroll_frames: clip.preroll_frames,
            target_rate: self.rate,
            time_zone: self.zone.id().to_string(),
            close_reason: reason,
        };

        info!(
            "Clip {} complete: {:.1}s, {} frames ({} pre-roll)",
            metadata.clip_id, metadata.duration_secs, metadata.frames_written, metadata.preroll_frames
        );

        emit(self.sink.as_mut(), &metadata);
        metadata
    }
}

impl Drop for ClipRecorder {
    fn drop(&mut self) {
        if let Some(metadata) = self.shutdown() {
            debug!("Clip {} finalized on drop", metadata.clip_id);
        }
    }
}

impl std::fmt::Debug for ClipRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipRecorder")
            .field("rate", &self.rate)
            .field("hold", &self.hold)
            .field("zone", &self.zone)
            .field("recording", &self.is_recording())
            .field("preroll", &self.preroll.len())
            .finish()
    }
}
