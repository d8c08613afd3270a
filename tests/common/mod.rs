// Shared fixtures for recorder tests
//
// An in-memory writer factory that records which frames reached which clip,
// a sink that collects metadata, and helpers for building frames on a
// simulated clock.

#![allow(dead_code)]

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use trigger_recorder::recorder::{ClipMetadata, ClipWriter, ClipWriterFactory, RecorderError};
use trigger_recorder::{Frame, FrameGeometry, PixelFormat};

pub const GEOMETRY: FrameGeometry = FrameGeometry {
    width: 4,
    height: 2,
    format: PixelFormat::Gray8,
};

pub fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Frame `sequence` captured `ms` milliseconds after [`epoch`]
pub fn frame_at(sequence: u64, ms: i64) -> Frame {
    Frame::filled(sequence, epoch() + Duration::milliseconds(ms), GEOMETRY, (sequence % 251) as u8)
}

/// Everything written to one clip
#[derive(Debug, Clone, Default)]
pub struct ClipLog {
    pub path: PathBuf,
    /// Sequence numbers in write order
    pub sequences: Vec<u64>,
    /// Capture instants in write order
    pub captured: Vec<DateTime<Utc>>,
    pub close_calls: usize,
}

#[derive(Clone, Default)]
pub struct MemoryWriters {
    pub clips: Arc<Mutex<Vec<ClipLog>>>,
    pub fail_open: Arc<AtomicBool>,
    /// Writes fail once a clip holds this many frames
    pub fail_after: Arc<Mutex<Option<usize>>>,
    pub open_now: Arc<AtomicUsize>,
    pub max_open: Arc<AtomicUsize>,
}

impl MemoryWriters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn factory(&self) -> Box<dyn ClipWriterFactory> {
        Box::new(self.clone())
    }

    pub fn clips(&self) -> Vec<ClipLog> {
        self.clips.lock().unwrap().clone()
    }
}

impl ClipWriterFactory for MemoryWriters {
    fn open(&mut self, stem: &str) -> Result<Box<dyn ClipWriter>, RecorderError> {
        let path = PathBuf::from(format!("{}.mem", stem));
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(RecorderError::Open {
                path,
                source: io::Error::new(io::ErrorKind::PermissionDenied, "destination unavailable"),
            });
        }

        let open = self.open_now.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_open.fetch_max(open, Ordering::SeqCst);

        let mut clips = self.clips.lock().unwrap();
        clips.push(ClipLog {
            path: path.clone(),
            ..Default::default()
        });

        Ok(Box::new(MemoryWriter {
            index: clips.len() - 1,
            path,
            writers: self.clone(),
            open: true,
            written: 0,
        }))
    }
}

struct MemoryWriter {
    index: usize,
    path: PathBuf,
    writers: MemoryWriters,
    open: bool,
    written: u64,
}

impl ClipWriter for MemoryWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), RecorderError> {
        let limit = *self.writers.fail_after.lock().unwrap();
        if !self.open || limit.is_some_and(|n| self.written as usize >= n) {
            return Err(RecorderError::Write {
                path: self.path.clone(),
                index: self.written,
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }

        let mut clips = self.writers.clips.lock().unwrap();
        let log = &mut clips[self.index];
        log.sequences.push(frame.sequence);
        log.captured.push(frame.captured_at);
        self.written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        self.writers.clips.lock().unwrap()[self.index].close_calls += 1;
        if self.open {
            self.open = false;
            self.writers.open_now.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn frames_written(&self) -> u64 {
        self.written
    }
}

/// Sink that keeps every record it is given
#[derive(Clone, Default)]
pub struct CollectingSink {
    pub records: Arc<Mutex<Vec<ClipMetadata>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boxed(&self) -> Box<dyn trigger_recorder::ClipSink> {
        let records = Arc::clone(&self.records);
        Box::new(move |metadata: &ClipMetadata| -> Result<()> {
            records.lock().unwrap().push(metadata.clone());
            Ok(())
        })
    }

    pub fn records(&self) -> Vec<ClipMetadata> {
        self.records.lock().unwrap().clone()
    }
}
