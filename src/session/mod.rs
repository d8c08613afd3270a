//! Recording session management
//!
//! This module provides the `RecorderSession` driver that connects:
//! - Frame capture from a `FrameSource`
//! - The presence signal evaluated per frame
//! - The `ClipRecorder` state machine, ticked once per frame
//! - Session statistics and deterministic shutdown

mod session;
mod stats;

pub use session::RecorderSession;
pub use stats::SessionStats;
