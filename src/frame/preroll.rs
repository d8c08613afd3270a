// Pre-roll buffer
//
// Retains owned copies of the most recent frames so a clip can begin with
// footage captured before its trigger fired. Capacity is fixed at
// construction; a capacity of zero disables retention entirely.

use std::collections::VecDeque;
use tracing::trace;

use super::source::Frame;

#[derive(Debug)]
pub struct PreRollBuffer {
    frames: VecDeque<Frame>,
    capacity: usize,
}

impl PreRollBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn is_enabled(&self) -> bool {
        self.capacity > 0
    }

    /// Retain a copy of `frame`, evicting the oldest entry on overflow
    pub fn push(&mut self, frame: &Frame) {
        if self.capacity == 0 {
            return;
        }

        while self.frames.len() >= self.capacity {
            if let Some(evicted) = self.frames.pop_front() {
                trace!("Pre-roll evicted frame {}", evicted.sequence);
            }
        }

        self.frames.push_back(frame.clone());
    }

    /// Take every retained frame, oldest first, leaving the buffer empty
    pub fn drain(&mut self) -> impl Iterator<Item = Frame> + '_ {
        self.frames.drain(..)
    }

    /// Release every retained frame
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Retained frames, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }
}
