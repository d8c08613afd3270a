pub mod config;
pub mod frame;
pub mod presence;
pub mod recorder;
pub mod session;

pub use config::Config;
pub use frame::{Frame, FrameGeometry, FrameSource, FrameSourceConfig, PixelFormat, PreRollBuffer, SyntheticSource};
pub use presence::{PresenceSignal, PresenceWindow, ScheduledPresence};
pub use recorder::{
    ClipMetadata, ClipRecorder, ClipSink, ClipWriter, ClipWriterFactory, ClipZone, CloseReason,
    Container, FramePacer, RecorderConfig, RecorderError, TickEvent,
};
pub use session::{RecorderSession, SessionStats};
