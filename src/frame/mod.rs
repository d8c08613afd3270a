pub mod preroll;
pub mod source;

pub use preroll::PreRollBuffer;
pub use source::{Frame, FrameGeometry, FrameSource, FrameSourceConfig, PixelFormat, SyntheticSource};
