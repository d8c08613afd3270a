// Example: Drive the clip recorder from a simulated clock
//
// This example feeds the recorder a synthetic frame stream with jittery
// arrival times and a presence pattern that flickers, then prints the
// metadata of every clip written:
// 1. Frames arrive every 25-45ms (faster than the 20 fps output rate)
// 2. Presence is on for 1s, flickers off briefly, then goes away for good
// 3. The hold window bridges the flicker, so one clip is produced
//
// Usage: cargo run --example simulated_recording -- --hold 1.5 --preroll 1

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{info, Level};
use trigger_recorder::recorder::ClipMetadata;
use trigger_recorder::{ClipRecorder, RecorderConfig, SyntheticSource};

#[derive(Parser)]
#[command(name = "simulated_recording")]
#[command(about = "Record clips from a simulated camera")]
struct Args {
    /// Hold window in seconds
    #[arg(long, default_value = "1.5")]
    hold: f64,

    /// Pre-roll in seconds (0 disables)
    #[arg(long, default_value = "1")]
    preroll: f64,

    /// Output directory
    #[arg(short, long, default_value = "recordings/simulated")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let args = Args::parse();

    let mut config = RecorderConfig::new(&args.output_dir);
    config.hold_secs = args.hold;
    config.preroll.enabled = args.preroll > 0.0;
    config.preroll.seconds = args.preroll;
    let geometry = config.frame;

    let clips: Arc<Mutex<Vec<ClipMetadata>>> = Arc::new(Mutex::new(Vec::new()));
    let sink_clips = Arc::clone(&clips);
    let sink = move |metadata: &ClipMetadata| -> Result<()> {
        sink_clips.lock().unwrap().push(metadata.clone());
        Ok(())
    };

    let mut recorder = ClipRecorder::with_files(config, Box::new(sink))?;

    let start = Utc::now();
    let mut at = start;
    let jitter = [25, 45, 30, 40, 35];

    for sequence in 0..200u64 {
        let elapsed = at.signed_duration_since(start).num_milliseconds();
        let presence = (2000..3000).contains(&elapsed) || (3300..3600).contains(&elapsed);

        let frame = SyntheticSource::render(geometry, sequence, at);
        recorder.tick(&frame, presence);

        at += Duration::milliseconds(jitter[sequence as usize % jitter.len()]);
    }

    recorder.shutdown();

    for clip in clips.lock().unwrap().iter() {
        info!(
            "{}: {:.2}s, {} frames ({} pre-roll), {:?}",
            clip.path.display(),
            clip.duration_secs,
            clip.frames_written,
            clip.preroll_frames,
            clip.close_reason
        );
        println!("{}", serde_json::to_string_pretty(clip)?);
    }

    Ok(())
}
