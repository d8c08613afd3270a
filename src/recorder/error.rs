use std::path::PathBuf;
use thiserror::Error;

use super::config::Container;
use crate::frame::PixelFormat;

/// Failures the recorder recovers from locally and reports per tick
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("failed to open clip destination {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{container} container cannot carry {format} frames")]
    UnsupportedFormat {
        container: Container,
        format: PixelFormat,
    },

    #[error("failed to write frame {index} to {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        index: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to finalize {}: {source}", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
