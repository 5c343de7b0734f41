//! The field lifecycle manager and its tick.
//!
//! # Tick order
//!
//! ```text
//! 1. drain controls            (mutations land between ticks only)
//! 2. swap READY → ACTIVE       (old ACTIVE → RETIRING, pointer updated)
//! 3. free unreferenced RETIRING fields
//! 4. update_per_frame sub-steps on ACTIVE, each: step, publish frame,
//!    record listener sample, feed the response meter
//! 5. close the audio tick      (publish trace, decimate, batch)
//! 6. poll the staging build    (CONSTRUCTING → READY or → failed)
//! ```
//!
//! A build that completes during tick `n` is observed in step 6 and
//! swapped in at step 2 of tick `n + 1`.

use std::time::Instant;

use crossbeam_channel::Receiver;

use bore_audio::{AudioReceiver, FrequencyResponse, ResponseMeter, SoundExtractor};
use bore_core::{ConfigError, FieldConfig, FieldInstanceId};
use bore_solver::{Excitation, Stepper, Waveform};

use crate::build::{default_builder, BuildFn, BuildPoll, BuildTask};
use crate::config::EngineConfig;
use crate::control::{control_channel, Control, ControlHandle, RebuildReply};
use crate::error::BuildError;
use crate::handle::ActiveFieldPointer;
use crate::instance::FieldInstance;
use crate::lifecycle::LifecycleState;
use crate::metrics::TickMetrics;

struct Staging {
    task: BuildTask,
    reply: Option<RebuildReply>,
}

struct Fcm {
    meter: ResponseMeter,
    previous: Waveform,
}

/// Owns the active field, at most one field under construction, and the
/// retiring fields still referenced by consumers.
///
/// Only one field is driven at a time. A rebuild constructs its field on
/// a background thread that never sees the active one; the exchange
/// happens on the tick thread between ticks.
pub struct FieldManager {
    config: EngineConfig,
    requested: FieldConfig,
    active: Option<FieldInstance>,
    staging: Option<Staging>,
    ready: Option<FieldInstance>,
    retiring: Vec<FieldInstance>,
    stepper: Stepper,
    sound: SoundExtractor,
    native_rate: f64,
    fcm: Option<Fcm>,
    update_per_frame: u32,
    pointer: ActiveFieldPointer,
    controls: Receiver<Control>,
    handle: ControlHandle,
    builder: BuildFn,
    last_build_error: Option<BuildError>,
    totals: TickMetrics,
}

impl std::fmt::Debug for FieldManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldManager")
            .field("state", &self.state())
            .field("active", &self.active_id())
            .field("retiring", &self.retiring.len())
            .field("update_per_frame", &self.update_per_frame)
            .finish_non_exhaustive()
    }
}

const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<FieldManager>();
};

impl FieldManager {
    /// Create a manager and start building `initial`.
    ///
    /// Returns the receiving end of the audio queue alongside. The
    /// manager starts in [`LifecycleState::Constructing`].
    pub fn new(
        config: EngineConfig,
        initial: FieldConfig,
    ) -> Result<(Self, AudioReceiver), ConfigError> {
        Self::with_builder(config, initial, default_builder())
    }

    /// As [`new`](Self::new), with a custom field builder.
    pub fn with_builder(
        config: EngineConfig,
        initial: FieldConfig,
        builder: BuildFn,
    ) -> Result<(Self, AudioReceiver), ConfigError> {
        config.validate()?;
        initial.validate()?;
        let native_rate = initial.native_rate();
        let (sound, audio) = SoundExtractor::new(config.sound, native_rate, config.frame_count)?;
        let stepper = Stepper::new(Excitation::new(
            config.excitation.sine(),
            config.excitation.amplitude,
        ));
        let (handle, controls) = control_channel(config.control_capacity);
        let mut manager = Self {
            update_per_frame: initial.update_per_frame,
            requested: initial.clone(),
            config,
            active: None,
            staging: None,
            ready: None,
            retiring: Vec::new(),
            stepper,
            sound,
            native_rate,
            fcm: None,
            pointer: ActiveFieldPointer::new(),
            controls,
            handle,
            builder,
            last_build_error: None,
            totals: TickMetrics::default(),
        };
        manager.rebuild(initial)?;
        Ok((manager, audio))
    }

    // ── Observation ──────────────────────────────────────────────

    /// Engine settings.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// State of the next field in line: the staging field if there is
    /// one, otherwise the active field.
    pub fn state(&self) -> LifecycleState {
        if self.staging.is_some() {
            LifecycleState::Constructing
        } else if self.ready.is_some() {
            LifecycleState::Ready
        } else if self.active.is_some() {
            LifecycleState::Active
        } else {
            LifecycleState::Empty
        }
    }

    /// The field being driven.
    pub fn active(&self) -> Option<&FieldInstance> {
        self.active.as_ref()
    }

    /// Id of the field being driven.
    pub fn active_id(&self) -> Option<FieldInstanceId> {
        self.active.as_ref().map(FieldInstance::id)
    }

    /// Replaced fields not yet freed.
    pub fn retiring_count(&self) -> usize {
        self.retiring.len()
    }

    /// Shared pointer renderers read the active field through.
    pub fn pointer(&self) -> ActiveFieldPointer {
        self.pointer.clone()
    }

    /// Sending side of this manager's control channel.
    pub fn control_handle(&self) -> ControlHandle {
        self.handle.clone()
    }

    /// The sound extractor.
    pub fn sound(&self) -> &SoundExtractor {
        &self.sound
    }

    /// The stepper and its excitation.
    pub fn stepper(&self) -> &Stepper {
        &self.stepper
    }

    /// Sub-steps per tick.
    pub fn update_per_frame(&self) -> u32 {
        self.update_per_frame
    }

    /// Why the most recent failed build failed.
    pub fn last_build_error(&self) -> Option<&BuildError> {
        self.last_build_error.as_ref()
    }

    /// Whether a frequency-characteristic measurement is running.
    pub fn is_measuring(&self) -> bool {
        self.fcm.is_some()
    }

    // ── Mutation surface ─────────────────────────────────────────

    /// Start building `config` in the background.
    ///
    /// Structural problems are reported here; problems found while
    /// classifying arrive later as [`BuildError::Config`]. Either way the
    /// active field is untouched.
    ///
    /// # Errors
    ///
    /// [`ConfigError::RebuildInProgress`] if a previous build has not been
    /// swapped in yet.
    pub fn rebuild(&mut self, config: FieldConfig) -> Result<(), ConfigError> {
        if self.staging.is_some() || self.ready.is_some() {
            self.totals.rejected_rebuilds += 1;
            tracing::warn!("rebuild rejected: previous build not yet swapped in");
            return Err(ConfigError::RebuildInProgress);
        }
        config
            .validate()
            .and_then(|()| self.sound.config().validate(config.native_rate()))
            .inspect_err(|e| tracing::warn!(error = %e, "rebuild rejected"))?;
        let task = BuildTask::spawn(
            config.clone(),
            self.config.frame_count,
            self.config.build_timeout,
            self.builder.clone(),
        )?;
        tracing::info!(to = %LifecycleState::Constructing, "rebuild started");
        self.requested = config;
        self.staging = Some(Staging { task, reply: None });
        Ok(())
    }

    /// Sub-steps per tick, from the next tick on. Later rebuilds inherit
    /// it; a swap adopts the new field's own value.
    pub fn set_update_per_frame(&mut self, update_per_frame: u32) -> Result<(), ConfigError> {
        if update_per_frame == 0 {
            return Err(ConfigError::UpdatePerFrameZero);
        }
        self.update_per_frame = update_per_frame;
        self.requested.update_per_frame = update_per_frame;
        tracing::debug!(update_per_frame, "update_per_frame set");
        Ok(())
    }

    /// Exciter amplitude.
    pub fn set_mouth_pressure(&mut self, pressure: f32) -> Result<(), ConfigError> {
        if !pressure.is_finite() {
            return Err(ConfigError::InvalidConstant {
                name: "mouth_pressure",
                value: pressure,
            });
        }
        self.stepper.excitation_mut().set_amplitude(pressure);
        Ok(())
    }

    /// Open or close the tone hole by rebuilding the field with the hole
    /// reclassified. A no-op if it is already in that state.
    pub fn set_tone_hole_state(&mut self, open: bool) -> Result<(), ConfigError> {
        let mut config = self.requested.clone();
        let hole = config.tone_hole.as_mut().ok_or(ConfigError::NoToneHole)?;
        if hole.open == open {
            return Ok(());
        }
        hole.open = open;
        self.rebuild(config)
    }

    /// Switch the exciter to the measurement sweep. A no-op while a
    /// measurement is already running.
    pub fn start_fcm(&mut self) {
        if self.fcm.is_some() {
            return;
        }
        let ex = self.config.excitation;
        let previous = self.stepper.excitation().waveform();
        self.stepper.set_waveform(ex.sweep());
        self.fcm = Some(Fcm {
            meter: ResponseMeter::new(ex.sweep_start_hz, ex.sweep_end_hz, self.config.response_bins),
            previous,
        });
        tracing::info!(
            from_hz = ex.sweep_start_hz,
            to_hz = ex.sweep_end_hz,
            "frequency measurement started"
        );
    }

    /// Restore the previous waveform and return the measured response.
    pub fn end_fcm(&mut self) -> Option<FrequencyResponse> {
        let fcm = self.fcm.take()?;
        self.stepper.set_waveform(fcm.previous);
        let response = fcm.meter.finish();
        tracing::info!(samples = response.samples, "frequency measurement ended");
        Some(response)
    }

    /// Apply one control message.
    pub fn apply(&mut self, control: Control) {
        let result = match control {
            Control::SetUpdatePerFrame(n) => self.set_update_per_frame(n),
            Control::SetMouthPressure(p) => self.set_mouth_pressure(p),
            Control::SetToneHole(open) => self.set_tone_hole_state(open),
            Control::StartFcm => {
                self.start_fcm();
                Ok(())
            }
            Control::EndFcm { reply } => {
                // Best-effort reply; the caller may have dropped the receiver.
                let _ = reply.send(self.end_fcm());
                Ok(())
            }
            Control::Rebuild { config, reply } => match self.rebuild(config) {
                Ok(()) => {
                    if let Some(staging) = self.staging.as_mut() {
                        staging.reply = reply;
                    }
                    Ok(())
                }
                Err(e) => {
                    if let Some(reply) = reply {
                        let _ = reply.send(Err(BuildError::Config(e.clone())));
                    }
                    Err(e)
                }
            },
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "control rejected");
        }
    }

    // ── Tick ─────────────────────────────────────────────────────

    /// Run one tick. Never blocks on the staging build.
    pub fn tick(&mut self) -> TickMetrics {
        let start = Instant::now();
        let mut m = TickMetrics {
            controls_applied: self.drain_controls(),
            swapped: self.swap_if_ready(),
            retired_freed: self.free_retired(),
            ..Default::default()
        };

        let step_start = Instant::now();
        m.sub_steps = self.run_sub_steps();
        m.step_us = step_start.elapsed().as_micros() as u64;

        let sound_start = Instant::now();
        let (sent, skipped) = self.sound.finish_tick();
        m.batches_sent = sent;
        m.batches_skipped = skipped;
        m.sound_us = sound_start.elapsed().as_micros() as u64;

        self.poll_staging();

        m.swaps = self.totals.swaps;
        m.build_failures = self.totals.build_failures;
        m.rejected_rebuilds = self.totals.rejected_rebuilds;
        m.frozen_ticks = self.totals.frozen_ticks;
        m.total_us = start.elapsed().as_micros() as u64;
        tracing::trace!(sub_steps = m.sub_steps, total_us = m.total_us, "tick");
        m
    }

    /// Block until the staging build reports or times out, and settle
    /// it as a tick would. The swap itself still waits for the next tick.
    ///
    /// `None` if nothing is building.
    pub fn wait_for_build(&mut self) -> Option<Result<FieldInstanceId, BuildError>> {
        let outcome = self.staging.as_mut()?.task.wait();
        self.settle(outcome)
    }

    fn drain_controls(&mut self) -> u32 {
        let mut applied = 0;
        while let Ok(control) = self.controls.try_recv() {
            self.apply(control);
            applied += 1;
        }
        applied
    }

    fn swap_if_ready(&mut self) -> bool {
        let Some(mut next) = self.ready.take() else {
            return false;
        };
        next.set_state(LifecycleState::Active);
        let rate = next.config().native_rate();
        if rate != self.native_rate {
            match self.sound.retarget(rate) {
                Ok(()) => self.native_rate = rate,
                Err(e) => tracing::warn!(error = %e, "sound extractor kept its old rate"),
            }
        }
        self.update_per_frame = next.config().update_per_frame;
        self.pointer.store(Some(next.handle()));
        tracing::info!(
            id = %next.id(),
            previous = ?self.active_id().map(FieldInstanceId::get),
            "field swapped in"
        );
        if let Some(mut old) = self.active.replace(next) {
            old.set_state(LifecycleState::Retiring);
            self.retiring.push(old);
        }
        self.totals.swaps += 1;
        true
    }

    fn free_retired(&mut self) -> u32 {
        let before = self.retiring.len();
        self.retiring.retain(|instance| {
            let held = instance.consumers() > 0;
            if !held {
                tracing::debug!(id = %instance.id(), "retired field freed");
            }
            held
        });
        (before - self.retiring.len()) as u32
    }

    fn run_sub_steps(&mut self) -> u32 {
        let Some(active) = self.active.as_mut() else {
            return 0;
        };
        if active.is_frozen() {
            self.totals.frozen_ticks += 1;
            return 0;
        }
        let dt = active.field().coefficients().dt;
        let mut ran = 0;
        for _ in 0..self.update_per_frame {
            let frequency = self.stepper.sweep_frequency(dt);
            if active.step(&mut self.stepper).is_err() {
                tracing::info!(id = %active.id(), "holding last good frame");
                break;
            }
            ran += 1;
            let pressure = active.field().listener_pressure();
            self.sound.record_pressure(pressure);
            if let (Some(fcm), Some(frequency)) = (self.fcm.as_mut(), frequency) {
                fcm.meter.record(frequency, pressure);
            }
        }
        ran
    }

    fn poll_staging(&mut self) {
        let Some(staging) = self.staging.as_mut() else {
            return;
        };
        let outcome = staging.task.poll();
        self.settle(outcome);
    }

    fn settle(&mut self, outcome: BuildPoll) -> Option<Result<FieldInstanceId, BuildError>> {
        let result = match outcome {
            BuildPoll::Pending => return None,
            BuildPoll::Ready(instance) => {
                let id = instance.id();
                tracing::info!(%id, to = %LifecycleState::Ready, "staging field built");
                self.ready = Some(instance);
                Ok(id)
            }
            BuildPoll::Failed(err) => {
                tracing::warn!(error = %err, "staging build failed; active field kept");
                self.totals.build_failures += 1;
                self.last_build_error = Some(err.clone());
                if let Some(active) = &self.active {
                    self.requested = active.config().clone();
                    self.requested.update_per_frame = self.update_per_frame;
                }
                Err(err)
            }
        };
        if let Some(reply) = self.staging.take().and_then(|s| s.reply) {
            let _ = reply.send(result.clone());
        }
        Some(result)
    }
}
