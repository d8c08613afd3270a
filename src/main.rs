use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use trigger_recorder::recorder::{ClipMetadata, ClipSink, JsonLinesSink, LogSink};
use trigger_recorder::{ClipRecorder, Config, RecorderSession, ScheduledPresence, SyntheticSource};

#[derive(Parser)]
#[command(name = "trigger-recorder")]
#[command(about = "Record fixed-rate clips while a presence signal is active")]
struct Args {
    /// Configuration file (extension optional)
    #[arg(short, long, default_value = "config/trigger-recorder")]
    config: String,

    /// Stop after this many seconds (default: until Ctrl-C)
    #[arg(short, long)]
    duration: Option<u64>,

    /// Override the clip output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

/// Logs every record and appends it to the JSON-lines file if configured
struct MetadataLog {
    log: LogSink,
    jsonl: Option<JsonLinesSink>,
}

impl ClipSink for MetadataLog {
    fn publish(&mut self, metadata: &ClipMetadata) -> Result<()> {
        self.log.publish(metadata)?;
        if let Some(jsonl) = self.jsonl.as_mut() {
            jsonl.publish(metadata)?;
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut cfg = Config::load(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.service.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(dir) = args.output_dir {
        cfg.recorder.output.dir = dir;
    }
    // The source must deliver what the clip container was configured for
    cfg.source.geometry = cfg.recorder.frame;

    info!("{} v{}", cfg.service.name, env!("CARGO_PKG_VERSION"));
    info!("Clips: {}", cfg.recorder.output.dir.display());
    if cfg.presence.windows.is_empty() {
        warn!("No presence windows configured; nothing will be recorded");
    }

    let jsonl = match cfg.metadata.jsonl_path.as_ref() {
        Some(path) => Some(JsonLinesSink::open(path)?),
        None => None,
    };
    let sink = MetadataLog { log: LogSink, jsonl };

    let recorder = ClipRecorder::with_files(cfg.recorder, Box::new(sink))?;
    let presence = ScheduledPresence::new(cfg.presence.windows);
    let session = RecorderSession::new(recorder, Box::new(presence));
    let source = SyntheticSource::new(cfg.source);

    let duration = args.duration;
    let stop = async move {
        match duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };

    let stats = session.run(Box::new(source), stop).await?;
    println!("{}", serde_json::to_string_pretty(&stats)?);

    Ok(())
}
