use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Pixel layout of a frame buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    /// 8-bit luma only
    Gray8,
    /// Packed 8-bit RGB
    Rgb24,
    /// Packed 8-bit BGR (typical camera layout)
    Bgr24,
    /// Planar 8-bit YUV, no chroma subsampling
    Yuv444p,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb24 | PixelFormat::Bgr24 | PixelFormat::Yuv444p => 3,
        }
    }
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelFormat::Gray8 => "gray8",
            PixelFormat::Rgb24 => "rgb24",
            PixelFormat::Bgr24 => "bgr24",
            PixelFormat::Yuv444p => "yuv444p",
        };
        f.write_str(name)
    }
}

/// Fixed frame dimensions and layout, established once per recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
}

impl FrameGeometry {
    /// Size in bytes of one frame buffer
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * self.format.bytes_per_pixel()
    }
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            format: PixelFormat::Gray8,
        }
    }
}

/// One captured image sample
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Monotonic sequence number assigned by the source
    pub sequence: u64,
    /// Capture-clock instant of this frame
    pub captured_at: DateTime<Utc>,
    pub geometry: FrameGeometry,
    /// Raw pixel bytes, `geometry.frame_len()` long
    pub data: Vec<u8>,
}

impl Frame {
    pub fn new(sequence: u64, captured_at: DateTime<Utc>, geometry: FrameGeometry, data: Vec<u8>) -> Self {
        Self {
            sequence,
            captured_at,
            geometry,
            data,
        }
    }

    /// A frame filled with a single byte value
    pub fn filled(sequence: u64, captured_at: DateTime<Utc>, geometry: FrameGeometry, value: u8) -> Self {
        Self::new(sequence, captured_at, geometry, vec![value; geometry.frame_len()])
    }
}

/// Configuration for a frame source
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameSourceConfig {
    pub geometry: FrameGeometry,
    /// Nominal capture rate in frames per second
    pub fps: f64,
    /// Stop after this many frames (None = run until stopped)
    pub max_frames: Option<u64>,
}

impl Default for FrameSourceConfig {
    fn default() -> Self {
        Self {
            geometry: FrameGeometry::default(),
            fps: 30.0,
            max_frames: None,
        }
    }
}

/// Frame capture backend trait
///
/// Device-specific capture lives behind this trait; the recorder only sees
/// the frames it delivers.
#[async_trait::async_trait]
pub trait FrameSource: Send + Sync {
    /// Start capturing
    ///
    /// Returns a channel receiver that will receive frames in capture order
    async fn start(&mut self) -> Result<mpsc::Receiver<Frame>>;

    /// Stop capturing
    async fn stop(&mut self) -> Result<()>;

    /// Check if source is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get source name for logging
    fn name(&self) -> &str;
}

/// Test-pattern source: a vertical bar sweeping across a dark background
pub struct SyntheticSource {
    config: FrameSourceConfig,
    task: Option<JoinHandle<()>>,
}

impl SyntheticSource {
    pub fn new(config: FrameSourceConfig) -> Self {
        Self { config, task: None }
    }

    /// Render pattern frame `sequence`
    pub fn render(geometry: FrameGeometry, sequence: u64, captured_at: DateTime<Utc>) -> Frame {
        let width = geometry.width.max(1) as usize;
        let bpp = geometry.format.bytes_per_pixel();
        let bar = (sequence as usize * 4) % width;
        let bar_width = (width / 16).max(1);

        let mut data = vec![16u8; geometry.frame_len()];
        for (i, px) in data.chunks_exact_mut(bpp).enumerate() {
            let x = i % width;
            if x >= bar && x < bar + bar_width {
                px.fill(235);
            }
        }

        Frame::new(sequence, captured_at, geometry, data)
    }
}

#[async_trait::async_trait]
impl FrameSource for SyntheticSource {
    async fn start(&mut self) -> Result<mpsc::Receiver<Frame>> {
        if self.task.is_some() {
            bail!("Synthetic source already started");
        }
        if !self.config.fps.is_finite() || self.config.fps <= 0.0 {
            bail!("Invalid synthetic source rate: {}", self.config.fps);
        }

        info!(
            "Starting synthetic source ({}x{} {}, {:.1} fps)",
            self.config.geometry.width,
            self.config.geometry.height,
            self.config.geometry.format,
            self.config.fps
        );

        let (tx, rx) = mpsc::channel(100);
        let config = self.config.clone();

        let task = tokio::spawn(async move {
            let period = std::time::Duration::from_secs_f64(1.0 / config.fps);
            let mut ticker = tokio::time::interval(period);
            let mut sequence = 0u64;

            loop {
                if config.max_frames.is_some_and(|max| sequence >= max) {
                    break;
                }
                ticker.tick().await;

                let frame = Self::render(config.geometry, sequence, Utc::now());
                if tx.send(frame).await.is_err() {
                    debug!("Synthetic source receiver dropped");
                    break;
                }
                sequence += 1;
            }

            debug!("Synthetic source finished after {} frames", sequence);
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(task) = self.task.take() {
            task.abort();
            info!("Synthetic source stopped");
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}
