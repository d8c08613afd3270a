//! Presence-triggered clip recording
//!
//! This module provides the `ClipRecorder` state machine and its parts:
//! - Output pacing at a fixed rate (`FramePacer`)
//! - Clip destinations (`ClipWriter`, `ClipWriterFactory`)
//! - Clip naming and metadata time zones (`ClipZone`)
//! - Finalized clip records and their sinks (`ClipMetadata`, `ClipSink`)

mod clip;
mod config;
mod error;
mod metadata;
mod pacer;
mod writer;
mod zone;

pub use clip::{ClipRecorder, TickEvent};
pub use config::{
    normalize_rate, Container, OutputConfig, PreRollConfig, RecorderConfig, ZoneConfig,
    DEFAULT_TARGET_RATE, MAX_TARGET_RATE, MIN_TARGET_RATE,
};
pub use error::RecorderError;
pub use metadata::{ChannelSink, ClipMetadata, ClipSink, CloseReason, JsonLinesSink, LogSink};
pub use pacer::FramePacer;
pub use writer::{ClipWriter, ClipWriterFactory, FileClipWriterFactory};
pub use zone::ClipZone;
