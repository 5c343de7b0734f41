//! Realtime horn host example.
//!
//! Demonstrates: build the reference horn → run it on the tick thread →
//! drain audio on a consumer thread → rebuild a longer horn mid-flight →
//! measure its frequency characteristic → shut down.
//!
//! Set `RUST_LOG=bore_engine=debug` to see lifecycle transitions.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bore_bench::{example_engine, reference_profile};
use bore_core::FieldConfig;
use bore_engine::{FieldManager, RealtimeHorn};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== bore realtime horn example ===\n");

    let (manager, mut audio) = FieldManager::new(example_engine(), reference_profile()).unwrap();
    let mut host = RealtimeHorn::start(manager).unwrap();

    // --- Audio consumer ---
    let stop = Arc::new(AtomicBool::new(false));
    let consumer = {
        let stop = Arc::clone(&stop);
        thread::Builder::new()
            .name("audio".into())
            .spawn(move || {
                let (mut batches, mut samples, mut gaps, mut peak) = (0u64, 0u64, 0u64, 0i16);
                let mut expected = 0u64;
                while !stop.load(Ordering::Acquire) {
                    for batch in audio.drain() {
                        gaps += batch.sequence - expected;
                        expected = batch.sequence + 1;
                        batches += 1;
                        samples += batch.samples.len() as u64;
                        peak = batch
                            .samples
                            .iter()
                            .map(|s| s.saturating_abs())
                            .fold(peak, i16::max);
                    }
                    thread::sleep(Duration::from_millis(5));
                }
                tracing::debug!(batches, samples, gaps, "audio consumer stopped");
                (batches, samples, gaps, peak)
            })
            .unwrap()
    };

    // --- Play the reference horn ---
    println!("Phase 1: reference horn, mouth pressure ramp");
    let started = Instant::now();
    for step in 0..10 {
        host.controls()
            .set_mouth_pressure(0.02 * (step + 1) as f32)
            .unwrap();
        thread::sleep(Duration::from_millis(100));
    }
    report(&host, started);

    // --- Rebuild while the old horn keeps sounding ---
    println!("\nPhase 2: rebuild with a longer tube");
    let longer = FieldConfig {
        segment_sizes: vec![(0.02, 0.02), (0.45, 0.01), (0.10, 0.10)],
        ..reference_profile()
    };
    let outcome = host.controls().rebuild(longer).unwrap();
    match outcome.recv_timeout(Duration::from_secs(10)) {
        Ok(Ok(id)) => println!("  field instance {id} built"),
        Ok(Err(e)) => println!("  rebuild failed: {e}"),
        Err(e) => println!("  no rebuild outcome: {e}"),
    }
    thread::sleep(Duration::from_millis(200));
    report(&host, started);

    // --- Frequency characteristic ---
    println!("\nPhase 3: frequency characteristic sweep");
    host.controls().start_fcm().unwrap();
    thread::sleep(Duration::from_secs(2));
    let response = host
        .controls()
        .end_fcm()
        .unwrap()
        .recv_timeout(Duration::from_secs(1))
        .ok()
        .flatten();
    match response {
        Some(response) => {
            println!("  {} samples folded in", response.samples);
            if let Some(peak) = response.peak() {
                println!(
                    "  peak at {:>8.1} Hz, {:>6.1} dB re 1 Pa",
                    peak.center_hz,
                    peak.magnitude_db(1.0)
                );
            }
        }
        None => println!("  no measurement was running"),
    }

    // --- Shutdown ---
    let shutdown = host.shutdown();
    stop.store(true, Ordering::Release);
    let (batches, samples, gaps, peak) = consumer.join().unwrap();

    println!("\nShutdown:");
    println!(
        "  ticks={}, joined={}, took {} ms",
        shutdown.ticks, shutdown.tick_joined, shutdown.total_ms
    );
    println!("  audio: {batches} batches, {samples} samples, {gaps} skipped, peak {peak}");
}

fn report(host: &RealtimeHorn, started: Instant) {
    let metrics = host.last_metrics();
    let grid = host
        .active_field()
        .latest_frame()
        .map(|(meta, _)| format!("{}x{}", meta.x_grid_count, meta.y_grid_count))
        .unwrap_or_else(|| "-".into());
    println!(
        "  t={:>5} ms: ticks={:>4}, grid={}, sub_steps={}, tick={:>6}μs, swaps={}",
        started.elapsed().as_millis(),
        host.ticks(),
        grid,
        metrics.sub_steps,
        metrics.total_us,
        metrics.swaps,
    );
}
