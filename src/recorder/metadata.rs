use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Why a clip was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// Presence stayed false for longer than the hold window
    HoldElapsed,
    /// The destination rejected a write mid-clip
    WriteFailed,
    /// The recorder was shut down with the clip still open
    Shutdown,
}

/// Finalized record of one closed clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub clip_id: Uuid,
    pub path: PathBuf,
    /// Capture-clock start and end
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    /// The same instants rendered in the configured zone
    pub started_local: DateTime<FixedOffset>,
    pub ended_local: DateTime<FixedOffset>,
    pub duration_secs: f64,
    /// Total frames written, pre-roll included
    pub frames_written: u64,
    /// How many of `frames_written` came from the pre-roll buffer
    pub preroll_frames: u64,
    pub target_rate: f64,
    pub time_zone: String,
    pub close_reason: CloseReason,
}

/// Consumer of finalized clip records
///
/// Called once per closed clip. Errors and panics are contained by the
/// recorder and never affect its state.
pub trait ClipSink: Send {
    fn publish(&mut self, metadata: &ClipMetadata) -> Result<()>;
}

impl<F> ClipSink for F
where
    F: FnMut(&ClipMetadata) -> Result<()> + Send,
{
    fn publish(&mut self, metadata: &ClipMetadata) -> Result<()> {
        self(metadata)
    }
}

/// Publish `metadata`, containing sink failures
///
/// Returns whether the sink accepted the record.
pub(crate) fn emit(sink: &mut dyn ClipSink, metadata: &ClipMetadata) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.publish(metadata))) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            warn!("Clip sink failed for {}: {:#}", metadata.clip_id, e);
            false
        }
        Err(_) => {
            warn!("Clip sink panicked for {}", metadata.clip_id);
            false
        }
    }
}

/// Logs each clip record
#[derive(Debug, Default)]
pub struct LogSink;

impl ClipSink for LogSink {
    fn publish(&mut self, metadata: &ClipMetadata) -> Result<()> {
        info!(
            "Clip {} closed ({:?}): {:.1}s, {} frames @ {} fps -> {}",
            metadata.clip_id,
            metadata.close_reason,
            metadata.duration_secs,
            metadata.frames_written,
            metadata.target_rate,
            metadata.path.display()
        );
        Ok(())
    }
}

/// Appends one JSON object per clip to a file
pub struct JsonLinesSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl JsonLinesSink {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create metadata directory: {:?}", parent))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open metadata log: {:?}", path))?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ClipSink for JsonLinesSink {
    fn publish(&mut self, metadata: &ClipMetadata) -> Result<()> {
        serde_json::to_writer(&mut self.writer, metadata)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush().context("Failed to flush metadata log")?;
        Ok(())
    }
}

/// Forwards clip records into an async channel
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ClipMetadata>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<ClipMetadata>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ClipMetadata>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ClipSink for ChannelSink {
    fn publish(&mut self, metadata: &ClipMetadata) -> Result<()> {
        self.tx
            .send(metadata.clone())
            .context("Clip metadata receiver dropped")
    }
}
