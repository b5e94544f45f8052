//! Demonstration of double-clench detection on a synthetic recording.
//!
//! This example shows how to:
//! 1. Build a classifier-and-detector pipeline
//! 2. Feed it smoothed samples one tick at a time
//! 3. Observe the double clench and the counted clenches that follow
//!
//! Run with: cargo run --example replay_demo

use emg_gesture_agent::{
    core::EventType, create_shared_stats, DetectorConfig, LogSink, Pipeline,
};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    println!("EMG Gesture Agent - Replay Demo");
    println!("===============================");
    println!();

    let config = DetectorConfig::default();
    let stats = create_shared_stats();
    let mut pipeline = match Pipeline::new(&config, LogSink, stats.clone()) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            return;
        }
    };

    // Two clenches 400ms apart, quiet until the first reaches the oldest
    // slot, then two single clenches during the cooldown.
    let mut recording = vec![-130.0];
    recording.extend(std::iter::repeat(2.0).take(7));
    recording.push(-125.0);
    recording.extend(std::iter::repeat(-30.0).take(16));
    recording.extend([-140.0, 1.0, 1.0, -140.0]);

    for (tick, value) in recording.into_iter().enumerate() {
        let step = pipeline.process_sample(value);
        if step.event_type != EventType::None && step.event_type != EventType::ReflexBlink {
            println!("[{:>5}ms] {:>8.1} -> {}", tick * 50, value, step.event_type);
        }
        if let Some(detected) = step.detected {
            println!("[{:>5}ms] detected {}", tick * 50, detected.label());
        }
    }

    println!();
    println!("{}", stats.summary());
}
