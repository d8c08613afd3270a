// Unit tests for the pre-roll buffer and its sizing

mod common;

use common::frame_at;
use trigger_recorder::{PreRollBuffer, RecorderConfig};

#[test]
fn test_zero_capacity_retains_nothing() {
    let mut buffer = PreRollBuffer::new(0);
    for i in 0..10 {
        buffer.push(&frame_at(i, i as i64 * 10));
    }

    assert!(!buffer.is_enabled());
    assert!(buffer.is_empty());
}

#[test]
fn test_overflow_evicts_oldest_first() {
    let mut buffer = PreRollBuffer::new(5);
    for i in 0..12 {
        buffer.push(&frame_at(i, i as i64 * 10));
        assert!(buffer.len() <= 5, "Buffer must never exceed capacity");
    }

    let retained: Vec<u64> = buffer.iter().map(|f| f.sequence).collect();
    assert_eq!(retained, vec![7, 8, 9, 10, 11]);
}

#[test]
fn test_retained_frames_are_independent_copies() {
    let mut buffer = PreRollBuffer::new(3);
    let mut frame = frame_at(1, 0);
    buffer.push(&frame);

    // The source reuses its buffer for the next capture
    frame.data.fill(0xAA);
    frame.sequence = 2;

    let retained = buffer.iter().next().unwrap();
    assert_eq!(retained.sequence, 1);
    assert!(retained.data.iter().all(|&b| b == 1));
}

#[test]
fn test_drain_yields_fifo_and_empties() {
    let mut buffer = PreRollBuffer::new(4);
    for i in 0..6 {
        buffer.push(&frame_at(i, i as i64 * 10));
    }

    let drained: Vec<u64> = buffer.drain().map(|f| f.sequence).collect();
    assert_eq!(drained, vec![2, 3, 4, 5]);
    assert!(buffer.is_empty());
    assert_eq!(buffer.capacity(), 4, "Draining keeps the capacity");
}

#[test]
fn test_clear_releases_everything() {
    let mut buffer = PreRollBuffer::new(4);
    buffer.push(&frame_at(0, 0));
    buffer.push(&frame_at(1, 10));
    buffer.clear();

    assert!(buffer.is_empty());
    buffer.push(&frame_at(2, 20));
    assert_eq!(buffer.iter().map(|f| f.sequence).collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_capacity_from_rate_and_seconds() {
    let mut config = RecorderConfig::default();
    config.preroll.enabled = true;

    config.target_rate = 10.0;
    config.preroll.seconds = 2.0;
    assert_eq!(config.preroll_capacity(), 20);

    config.target_rate = 15.0;
    config.preroll.seconds = 0.5;
    assert_eq!(config.preroll_capacity(), 8, "7.5 frames rounds up");

    // Out-of-range rate is normalized to 20 before sizing
    config.target_rate = 100.0;
    config.preroll.seconds = 2.0;
    assert_eq!(config.preroll_capacity(), 40);
}

#[test]
fn test_capacity_is_zero_when_disabled_or_negative() {
    let mut config = RecorderConfig::default();
    config.preroll.seconds = 5.0;
    assert_eq!(config.preroll_capacity(), 0, "Disabled pre-roll has no capacity");

    config.preroll.enabled = true;
    config.preroll.seconds = -1.0;
    assert_eq!(config.preroll_capacity(), 0);

    config.preroll.seconds = f64::NAN;
    assert_eq!(config.preroll_capacity(), 0);
}
