//! Integration tests driving the pipeline through its message channel.

use emg_gesture_agent::core::Phase;
use emg_gesture_agent::{
    create_shared_stats, DetectorConfig, Pipeline, PipelineMessage, RecordingSink, ReplaySource,
    SampleTicker, SinkCall, SourceConfig,
};
use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const CLENCH: f64 = -120.0;
const QUIET: f64 = 50.0;

fn config(cooldown_ms: u64) -> DetectorConfig {
    DetectorConfig {
        history_length: 7,
        cooldown: Duration::from_millis(cooldown_ms),
        ..Default::default()
    }
}

/// Two clenches six ticks (300ms) apart in a seven-slot history.
fn double_clench() -> Vec<f64> {
    vec![CLENCH, QUIET, QUIET, QUIET, QUIET, QUIET, CLENCH]
}

fn send_all(sender: &crossbeam_channel::Sender<PipelineMessage>, values: &[f64]) {
    for value in values {
        sender.send(PipelineMessage::Sample(*value)).unwrap();
    }
}

fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

#[test]
fn test_double_clench_then_counted_clenches() {
    let sink = RecordingSink::new();
    let stats = create_shared_stats();
    let pipeline = Pipeline::new(&config(8_000), sink.clone(), stats.clone()).unwrap();
    let sender = pipeline.sender();
    let handle = thread::spawn(move || pipeline.run());

    send_all(&sender, &double_clench());
    send_all(&sender, &[CLENCH, 2.0, CLENCH]);
    sender.send(PipelineMessage::Shutdown).unwrap();
    let snapshot = handle.join().unwrap();

    assert_eq!(sink.triggers(), vec![1, 2, 3]);
    assert_eq!(
        sink.calls()[0],
        SinkCall::Notify {
            title: "Double Clench".to_string(),
            body: "Reset to workspace 1".to_string(),
        }
    );
    assert_eq!(snapshot.phase, Phase::Suppressed);
    assert_eq!(snapshot.trigger_count, 3);

    let stats = stats.stats();
    assert_eq!(stats.samples_processed, 10);
    assert_eq!(stats.double_clenches, 1);
    assert_eq!(stats.clenches, 4);
    assert_eq!(stats.reflex_blinks, 1);
    assert_eq!(stats.triggers_fired, 3);
}

#[test]
fn test_cooldown_expiry_returns_to_idle() {
    let sink = RecordingSink::new();
    let stats = create_shared_stats();
    let pipeline = Pipeline::new(&config(100), sink.clone(), stats.clone()).unwrap();
    let sender = pipeline.sender();
    let handle = thread::spawn(move || pipeline.run());

    send_all(&sender, &double_clench());
    assert!(wait_for(Duration::from_secs(2), || stats
        .stats()
        .cooldowns_expired
        == 1));

    // Idle again: a clench is recorded but fires nothing.
    send_all(&sender, &[CLENCH]);
    sender.send(PipelineMessage::Shutdown).unwrap();
    let snapshot = handle.join().unwrap();

    assert_eq!(sink.triggers(), vec![1]);
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.trigger_count, 0);
}

#[test]
fn test_rearm_supersedes_earlier_cooldown() {
    let sink = RecordingSink::new();
    let stats = create_shared_stats();
    let pipeline = Pipeline::new(&config(1_000), sink.clone(), stats.clone()).unwrap();
    let sender = pipeline.sender();
    let handle = thread::spawn(move || pipeline.run());

    let start = Instant::now();
    send_all(&sender, &double_clench());
    thread::sleep(Duration::from_millis(500));
    send_all(&sender, &double_clench());

    // The first timer fires around 1000ms and must be ignored.
    assert!(wait_for(Duration::from_secs(3), || stats
        .stats()
        .stale_expiries
        == 1));
    assert!(start.elapsed() < Duration::from_millis(1_500));
    sink.clear();
    send_all(&sender, &[CLENCH]);
    assert!(wait_for(Duration::from_secs(1), || sink.triggers() == vec![2]));

    // The second timer clears the state.
    assert!(wait_for(Duration::from_secs(3), || stats
        .stats()
        .cooldowns_expired
        == 1));
    sender.send(PipelineMessage::Shutdown).unwrap();
    let snapshot = handle.join().unwrap();
    assert_eq!(snapshot.phase, Phase::Idle);
    assert_eq!(snapshot.generation, 2);
}

#[test]
fn test_sink_failures_are_counted_not_propagated() {
    let sink = RecordingSink::new();
    sink.set_failing(true);
    let stats = create_shared_stats();
    let mut pipeline = Pipeline::new(&config(8_000), sink.clone(), stats.clone()).unwrap();

    for value in double_clench() {
        pipeline.process_sample(value);
    }
    pipeline.process_sample(CLENCH);

    assert_eq!(sink.triggers(), vec![1, 2]);
    assert_eq!(stats.stats().sink_failures, 4);
    assert_eq!(pipeline.detector().state().trigger_count, 2);
}

#[test]
fn test_replay_source_feeds_pipeline() {
    let mut text = String::from("# raw headset readings\n");
    for _ in 0..40 {
        text.push_str("-150\n");
    }

    // Long history so a sustained clench never reaches the oldest slot.
    let detector = DetectorConfig {
        sample_interval: Duration::from_millis(5),
        history_length: 500,
        ..Default::default()
    };
    let source_config = SourceConfig {
        smoothing_age: 1,
        replay_rate_hz: 0,
        ..Default::default()
    };

    let mut source = ReplaySource::new(Box::new(Cursor::new(text)), 100);
    source.start().unwrap();

    let stats = create_shared_stats();
    let sink = RecordingSink::new();
    let pipeline = Pipeline::new(&detector, sink.clone(), stats.clone()).unwrap();

    let ticker = SampleTicker::new(&detector, &source_config);
    let readings = source.receiver().clone();
    let sender = pipeline.sender();
    let ticker_stats = stats.clone();
    let ticker_handle = thread::spawn(move || {
        ticker.run(readings, sender, Arc::new(AtomicBool::new(true)), ticker_stats)
    });

    let snapshot = pipeline.run();
    ticker_handle.join().unwrap();

    let stats = stats.stats();
    assert!(stats.samples_processed >= 1);
    assert_eq!(stats.clenches, stats.samples_processed);
    assert!(snapshot.history.ends_with("clench"));
}
