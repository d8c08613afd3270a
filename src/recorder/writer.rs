use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::config::{Container, RecorderConfig};
use super::error::RecorderError;
use crate::frame::{Frame, FrameGeometry, PixelFormat};

/// Destination for the frames of one clip
///
/// Append-only. `close` must be safe to call more than once.
pub trait ClipWriter: Send {
    /// Append one frame
    fn write(&mut self, frame: &Frame) -> Result<(), RecorderError>;

    /// Flush and release the destination; a no-op once closed
    fn close(&mut self) -> Result<(), RecorderError>;

    /// Where this clip is being written
    fn path(&self) -> &Path;

    fn frames_written(&self) -> u64;
}

/// Opens a fresh [`ClipWriter`] for each clip
pub trait ClipWriterFactory: Send {
    /// Open a destination named after `stem` (no extension)
    fn open(&mut self, stem: &str) -> Result<Box<dyn ClipWriter>, RecorderError>;
}

/// Creates clip files under a directory
pub struct FileClipWriterFactory {
    dir: PathBuf,
    container: Container,
    geometry: FrameGeometry,
    rate: f64,
}

impl FileClipWriterFactory {
    /// Fails if the output directory cannot be created
    pub fn new(dir: PathBuf, container: Container, geometry: FrameGeometry, rate: f64) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

        info!(
            "Clip files: {} ({} container, {}x{} {})",
            dir.display(),
            container,
            geometry.width,
            geometry.height,
            geometry.format
        );

        Ok(Self {
            dir,
            container,
            geometry,
            rate,
        })
    }

    pub fn from_config(config: &RecorderConfig) -> Result<Self> {
        Self::new(
            config.output.dir.clone(),
            config.output.container,
            config.frame,
            config.effective_rate(),
        )
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create `stem.ext`, or `stem_1.ext`, `stem_2.ext`, ... if taken
    fn create_unique(&self, stem: &str) -> Result<(PathBuf, File), RecorderError> {
        let ext = self.container.extension();
        let mut suffix = 0u32;

        loop {
            let name = if suffix == 0 {
                format!("{}.{}", stem, ext)
            } else {
                format!("{}_{}.{}", stem, suffix, ext)
            };
            let path = self.dir.join(name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists && suffix < 1000 => {
                    suffix += 1;
                }
                Err(source) => return Err(RecorderError::Open { path, source }),
            }
        }
    }
}

impl ClipWriterFactory for FileClipWriterFactory {
    fn open(&mut self, stem: &str) -> Result<Box<dyn ClipWriter>, RecorderError> {
        let header = match self.container {
            Container::Raw => None,
            Container::Y4m => Some(y4m_header(self.geometry, self.rate)?),
        };

        let (path, file) = self.create_unique(stem)?;
        let mut writer = BufWriter::new(file);

        if let Some(header) = header {
            if let Err(source) = writer.write_all(header.as_bytes()) {
                drop(writer);
                // Leave no empty header-only file behind
                let _ = fs::remove_file(&path);
                return Err(RecorderError::Open { path, source });
            }
        }

        debug!("Opened clip file {:?}", path);

        Ok(Box::new(FileClipWriter {
            writer: Some(writer),
            container: self.container,
            path,
            frames_written: 0,
        }))
    }
}

fn y4m_header(geometry: FrameGeometry, rate: f64) -> Result<String, RecorderError> {
    let colorspace = match geometry.format {
        PixelFormat::Gray8 => "mono",
        PixelFormat::Yuv444p => "444",
        format => {
            return Err(RecorderError::UnsupportedFormat {
                container: Container::Y4m,
                format,
            })
        }
    };

    let (num, den) = if rate.fract() == 0.0 {
        (rate as u64, 1)
    } else {
        ((rate * 1000.0).round() as u64, 1000)
    };

    Ok(format!(
        "YUV4MPEG2 W{} H{} F{}:{} Ip A1:1 C{}\n",
        geometry.width, geometry.height, num, den, colorspace
    ))
}

/// Writes a single clip to disk
struct FileClipWriter {
    writer: Option<BufWriter<File>>,
    container: Container,
    path: PathBuf,
    frames_written: u64,
}

impl FileClipWriter {
    fn write_frame(writer: &mut BufWriter<File>, container: Container, frame: &Frame) -> io::Result<()> {
        if container == Container::Y4m {
            writer.write_all(b"FRAME\n")?;
        }
        writer.write_all(&frame.data)
    }
}

impl ClipWriter for FileClipWriter {
    fn write(&mut self, frame: &Frame) -> Result<(), RecorderError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(RecorderError::Write {
                path: self.path.clone(),
                index: self.frames_written,
                source: io::Error::new(ErrorKind::BrokenPipe, "clip already closed"),
            });
        };

        Self::write_frame(writer, self.container, frame).map_err(|source| RecorderError::Write {
            path: self.path.clone(),
            index: self.frames_written,
            source,
        })?;

        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), RecorderError> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|source| RecorderError::Close {
                path: self.path.clone(),
                source,
            })?;
            debug!("Closed clip file {:?} ({} frames)", self.path, self.frames_written);
        }
        Ok(())
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl Drop for FileClipWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to finalize clip writer on drop: {}", e);
        }
    }
}
