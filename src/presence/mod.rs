pub mod schedule;

pub use schedule::{PresenceWindow, ScheduledPresence};

use crate::frame::Frame;

/// Source of the per-frame trigger condition
///
/// What "presence" means (motion, a detected face, an object count above
/// zero) is entirely up to the implementation. The recorder only consumes
/// the boolean.
pub trait PresenceSignal: Send {
    fn evaluate(&mut self, frame: &Frame) -> bool;
}

impl<F> PresenceSignal for F
where
    F: FnMut(&Frame) -> bool + Send,
{
    fn evaluate(&mut self, frame: &Frame) -> bool {
        self(frame)
    }
}
