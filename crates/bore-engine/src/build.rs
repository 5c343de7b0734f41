//! Supervised background construction of a staging field.
//!
//! A [`BuildTask`] runs the build closure on a named thread and reports
//! through a one-slot channel. The owner polls it once per tick and never
//! blocks; a build that errors, panics or runs past its timeout resolves
//! to a [`BuildError`] instead of leaving the staging slot occupied.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, TryRecvError};

use bore_core::{ConfigError, FieldConfig};

use crate::error::BuildError;
use crate::instance::FieldInstance;

/// Builds a field instance from a configuration and a frame count.
///
/// The default is [`FieldInstance::build`]; hosts may substitute their
/// own, e.g. to post-process the layout.
pub type BuildFn =
    Arc<dyn Fn(&FieldConfig, usize) -> Result<FieldInstance, ConfigError> + Send + Sync>;

/// The standard builder.
pub fn default_builder() -> BuildFn {
    Arc::new(|config: &FieldConfig, frame_count: usize| {
        FieldInstance::build(config.clone(), frame_count)
    })
}

/// Outcome of polling a [`BuildTask`].
#[derive(Debug)]
pub enum BuildPoll {
    /// Still running, within its timeout.
    Pending,
    /// Finished; the instance is READY.
    Ready(FieldInstance),
    /// Finished without a field, or abandoned.
    Failed(BuildError),
}

/// One in-flight build.
///
/// Dropping the task, or letting it time out, cancels it: the worker
/// discards its result instead of sending it.
#[derive(Debug)]
pub struct BuildTask {
    rx: Receiver<Result<FieldInstance, ConfigError>>,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    started: Instant,
    timeout: Duration,
}

impl BuildTask {
    /// Start building `config` on a new `bore-build` thread.
    pub fn spawn(
        config: FieldConfig,
        frame_count: usize,
        timeout: Duration,
        builder: BuildFn,
    ) -> Result<Self, ConfigError> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let cancel = Arc::new(AtomicBool::new(false));
        let worker_cancel = Arc::clone(&cancel);
        let handle = thread::Builder::new()
            .name("bore-build".into())
            .spawn(move || {
                let result = builder(&config, frame_count);
                if worker_cancel.load(Ordering::Acquire) {
                    return;
                }
                // Receiver gone means the task was dropped.
                let _ = tx.send(result);
            })
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: e.to_string(),
            })?;
        Ok(Self {
            rx,
            cancel,
            handle: Some(handle),
            started: Instant::now(),
            timeout,
        })
    }

    /// Time since the build started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Whether the task has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Check for a result without blocking.
    ///
    /// Once this returns anything other than [`BuildPoll::Pending`] the
    /// task is spent and should be dropped.
    pub fn poll(&mut self) -> BuildPoll {
        match self.rx.try_recv() {
            Ok(result) => self.finish(result),
            Err(TryRecvError::Empty) if self.elapsed() >= self.timeout => self.abandon(),
            Err(TryRecvError::Empty) => BuildPoll::Pending,
            Err(TryRecvError::Disconnected) => self.lost(),
        }
    }

    /// Block until the build reports or its timeout runs out.
    pub fn wait(&mut self) -> BuildPoll {
        let remaining = self.timeout.saturating_sub(self.elapsed());
        match self.rx.recv_timeout(remaining) {
            Ok(result) => self.finish(result),
            Err(RecvTimeoutError::Timeout) => self.abandon(),
            Err(RecvTimeoutError::Disconnected) => self.lost(),
        }
    }

    fn finish(&mut self, result: Result<FieldInstance, ConfigError>) -> BuildPoll {
        self.join();
        match result {
            Ok(instance) => BuildPoll::Ready(instance),
            Err(e) => BuildPoll::Failed(BuildError::Config(e)),
        }
    }

    fn abandon(&mut self) -> BuildPoll {
        self.cancel.store(true, Ordering::Release);
        // Detach; the worker exits on its own once the build returns.
        self.handle.take();
        BuildPoll::Failed(BuildError::TimedOut {
            elapsed_ms: self.elapsed().as_millis() as u64,
        })
    }

    fn lost(&mut self) -> BuildPoll {
        self.join();
        BuildPoll::Failed(BuildError::WorkerPanicked)
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for BuildTask {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bore_test_utils::closed_box_config;

    const LONG: Duration = Duration::from_secs(10);

    fn expect_ready(poll: BuildPoll) -> FieldInstance {
        match poll {
            BuildPoll::Ready(instance) => instance,
            other => panic!("expected a field, got {other:?}"),
        }
    }

    fn expect_failed(poll: BuildPoll) -> BuildError {
        match poll {
            BuildPoll::Failed(e) => e,
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[test]
    fn builds_in_background() {
        let mut task = BuildTask::spawn(closed_box_config(), 3, LONG, default_builder()).unwrap();
        let inst = expect_ready(task.wait());
        assert_eq!(inst.config(), &closed_box_config());
    }

    #[test]
    fn poll_is_pending_until_the_worker_reports() {
        let (gate_tx, gate_rx) = crossbeam_channel::bounded::<()>(1);
        let builder: BuildFn = Arc::new(move |config: &FieldConfig, n: usize| {
            let _ = gate_rx.recv_timeout(LONG);
            FieldInstance::build(config.clone(), n)
        });
        let mut task = BuildTask::spawn(closed_box_config(), 3, LONG, builder).unwrap();
        assert!(matches!(task.poll(), BuildPoll::Pending));
        gate_tx.send(()).unwrap();
        expect_ready(task.wait());
    }

    #[test]
    fn classifier_error_is_reported() {
        let mut cfg = closed_box_config();
        cfg.segment_sizes[0].1 = 1.0;
        let mut task = BuildTask::spawn(cfg, 3, LONG, default_builder()).unwrap();
        let err = expect_failed(task.wait());
        assert!(matches!(
            err,
            BuildError::Config(ConfigError::SegmentTooThin { segment: 0, .. })
        ));
    }

    #[test]
    fn slow_build_times_out_and_is_cancelled() {
        let builder: BuildFn = Arc::new(|config: &FieldConfig, n: usize| {
            thread::sleep(Duration::from_millis(300));
            FieldInstance::build(config.clone(), n)
        });
        let mut task =
            BuildTask::spawn(closed_box_config(), 3, Duration::from_millis(20), builder).unwrap();
        let err = expect_failed(task.wait());
        assert!(matches!(err, BuildError::TimedOut { elapsed_ms } if elapsed_ms >= 20));
        assert!(task.is_cancelled());
    }

    #[test]
    fn panicking_builder_is_observed() {
        let builder: BuildFn =
            Arc::new(|_: &FieldConfig, _: usize| -> Result<FieldInstance, ConfigError> {
                panic!("allocation failed")
            });
        let mut task = BuildTask::spawn(closed_box_config(), 3, LONG, builder).unwrap();
        assert_eq!(expect_failed(task.wait()), BuildError::WorkerPanicked);
    }
}
