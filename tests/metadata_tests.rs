// Tests for clip metadata serialization and the provided sinks

use anyhow::Result;
use chrono::{FixedOffset, TimeZone, Utc};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use trigger_recorder::recorder::{ChannelSink, ClipMetadata, ClipSink, CloseReason, JsonLinesSink, LogSink};
use uuid::Uuid;

fn tokyo() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
}

fn sample(frames: u64) -> ClipMetadata {
    let started_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
    let ended_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 4).unwrap();
    ClipMetadata {
        clip_id: Uuid::new_v4(),
        path: PathBuf::from("recordings/clip_20240301_120000.y4m"),
        started_at,
        ended_at,
        started_local: started_at.with_timezone(&tokyo()),
        ended_local: ended_at.with_timezone(&tokyo()),
        duration_secs: 4.0,
        frames_written: frames,
        preroll_frames: 0,
        target_rate: 20.0,
        time_zone: "UTC".to_string(),
        close_reason: CloseReason::HoldElapsed,
    }
}

#[test]
fn test_metadata_serializes_close_reason_in_snake_case() -> Result<()> {
    let json = serde_json::to_value(sample(80))?;

    assert_eq!(json["close_reason"], "hold_elapsed");
    assert_eq!(json["frames_written"], 80);
    assert_eq!(json["started_local"], "2024-03-01T21:00:00+09:00");
    assert_eq!(json["ended_local"], "2024-03-01T21:00:04+09:00");

    Ok(())
}

#[test]
fn test_json_lines_sink_appends_records() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("logs").join("clips.jsonl");

    let first = sample(10);
    let second = sample(20);
    {
        let mut sink = JsonLinesSink::open(&path)?;
        sink.publish(&first)?;
    }
    {
        // Reopening appends rather than truncating
        let mut sink = JsonLinesSink::open(&path)?;
        sink.publish(&second)?;
        assert_eq!(sink.path(), path.as_path());
    }

    let text = fs::read_to_string(&path)?;
    let records: Vec<ClipMetadata> = text
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(records, vec![first, second]);

    Ok(())
}

#[test]
fn test_channel_sink_forwards_records() -> Result<()> {
    let (mut sink, mut rx) = ChannelSink::channel();
    let record = sample(5);

    sink.publish(&record)?;
    assert_eq!(rx.try_recv()?, record);

    drop(rx);
    assert!(sink.publish(&record).is_err(), "Dropped receiver is a sink failure");

    Ok(())
}

#[test]
fn test_log_sink_accepts_records() {
    let mut sink = LogSink;
    assert!(sink.publish(&sample(1)).is_ok());
}
