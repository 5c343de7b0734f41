//! Realtime host loop: the [`FieldManager`] on its own thread.
//!
//! # Architecture
//!
//! ```text
//! GUI / control thread        Tick thread ("bore-tick")       Build thread ("bore-build")
//!     |                           |                               |
//!     |--ControlHandle::send()--->| controls.try_recv()           |
//!     |   [bounded channel]       | swap READY → ACTIVE           |
//!     |                           | update_per_frame sub-steps    |
//!     |                           | finish audio tick ──────────────────▶ AudioReceiver
//!     |                           | poll staging ◀────────────────| Field::from_config
//!     |                           | park(budget - elapsed)        |
//!     |                           |                               |
//! Renderer                        |
//!     |--ActiveFieldPointer::latest_frame()  (reads frame slots, never the field)
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bore_core::ConfigError;

use crate::control::ControlHandle;
use crate::handle::ActiveFieldPointer;
use crate::manager::FieldManager;
use crate::metrics::TickMetrics;

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`RealtimeHorn::shutdown`].
#[derive(Debug)]
pub struct ShutdownReport {
    /// Total time spent shutting down.
    pub total_ms: u64,
    /// Whether the tick thread was joined and the manager recovered.
    pub tick_joined: bool,
    /// Ticks run over the loop's lifetime.
    pub ticks: u64,
}

// ── Tick loop ────────────────────────────────────────────────────

struct TickLoop {
    manager: FieldManager,
    shutdown_flag: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    last_metrics: Arc<Mutex<TickMetrics>>,
    tick_budget: Duration,
}

impl TickLoop {
    /// Runs until `shutdown_flag` is set, then hands the manager back.
    fn run(mut self) -> FieldManager {
        while !self.shutdown_flag.load(Ordering::Acquire) {
            let tick_start = Instant::now();
            let metrics = self.manager.tick();
            *self
                .last_metrics
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = metrics;
            self.ticks.fetch_add(1, Ordering::Release);

            // park_timeout so shutdown() can cut the sleep short.
            if let Some(remaining) = self.tick_budget.checked_sub(tick_start.elapsed()) {
                thread::park_timeout(remaining);
            }
        }
        self.manager
    }
}

// ── RealtimeHorn ─────────────────────────────────────────────────

/// Drives a [`FieldManager`] at its configured tick rate on a dedicated
/// thread.
///
/// All mutation goes through [`controls`](Self::controls); renderers read
/// through [`active_field`](Self::active_field). Dropping the host shuts
/// it down.
pub struct RealtimeHorn {
    controls: ControlHandle,
    pointer: ActiveFieldPointer,
    shutdown_flag: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    last_metrics: Arc<Mutex<TickMetrics>>,
    tick_thread: Option<JoinHandle<FieldManager>>,
    recovered: Option<FieldManager>,
}

impl RealtimeHorn {
    /// Move `manager` onto a new `bore-tick` thread and start ticking.
    pub fn start(manager: FieldManager) -> Result<Self, ConfigError> {
        let controls = manager.control_handle();
        let pointer = manager.pointer();
        let tick_budget = manager.config().tick_budget();
        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let ticks = Arc::new(AtomicU64::new(0));
        let last_metrics = Arc::new(Mutex::new(TickMetrics::default()));

        let state = TickLoop {
            manager,
            shutdown_flag: Arc::clone(&shutdown_flag),
            ticks: Arc::clone(&ticks),
            last_metrics: Arc::clone(&last_metrics),
            tick_budget,
        };
        let tick_thread = thread::Builder::new()
            .name("bore-tick".into())
            .spawn(move || state.run())
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        tracing::info!(budget_us = tick_budget.as_micros() as u64, "tick thread started");

        Ok(Self {
            controls,
            pointer,
            shutdown_flag,
            ticks,
            last_metrics,
            tick_thread: Some(tick_thread),
            recovered: None,
        })
    }

    /// Control channel into the tick loop.
    pub fn controls(&self) -> &ControlHandle {
        &self.controls
    }

    /// Pointer to the active field's frames.
    pub fn active_field(&self) -> &ActiveFieldPointer {
        &self.pointer
    }

    /// Ticks completed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Acquire)
    }

    /// Metrics of the most recent tick.
    pub fn last_metrics(&self) -> TickMetrics {
        self.last_metrics
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether the tick thread is still running.
    pub fn is_running(&self) -> bool {
        self.tick_thread.is_some()
    }

    /// Stop the tick thread and recover the manager. Idempotent.
    pub fn shutdown(&mut self) -> ShutdownReport {
        let start = Instant::now();
        let Some(handle) = self.tick_thread.take() else {
            return ShutdownReport {
                total_ms: 0,
                tick_joined: self.recovered.is_some(),
                ticks: self.ticks(),
            };
        };
        self.shutdown_flag.store(true, Ordering::Release);
        handle.thread().unpark();
        let tick_joined = match handle.join() {
            Ok(manager) => {
                self.recovered = Some(manager);
                true
            }
            Err(_) => false,
        };
        let report = ShutdownReport {
            total_ms: start.elapsed().as_millis() as u64,
            tick_joined,
            ticks: self.ticks(),
        };
        tracing::info!(
            ticks = report.ticks,
            total_ms = report.total_ms,
            joined = report.tick_joined,
            "tick thread stopped"
        );
        report
    }

    /// Shut down and take the manager back.
    pub fn into_manager(mut self) -> Option<FieldManager> {
        self.shutdown();
        self.recovered.take()
    }
}

impl Drop for RealtimeHorn {
    fn drop(&mut self) {
        self.shutdown();
    }
}
