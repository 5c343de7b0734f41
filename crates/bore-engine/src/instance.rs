//! One constructed field together with its pressure frames.

use std::sync::Arc;

use bore_core::{ConfigError, FieldConfig, FieldInstanceId, StepError};
use bore_frame::{FrameRotator, FrameSet, FrameWriter};
use bore_grid::{GridLayout, GridMetadata};
use bore_solver::{Field, Stepper};

use crate::handle::FieldHandle;
use crate::lifecycle::LifecycleState;

/// A field, the frame set its pressure is published to, and its place in
/// the lifecycle.
///
/// Instances are built off the tick thread and moved to it whole; the
/// field's cell arrays are only ever touched by whichever thread owns
/// the instance.
#[derive(Debug)]
pub struct FieldInstance {
    id: FieldInstanceId,
    config: FieldConfig,
    field: Field,
    frames: FrameWriter,
    state: LifecycleState,
}

// Built on one thread, driven on another.
const _: fn() = || {
    fn assert<T: Send>() {}
    assert::<FieldInstance>();
};

impl FieldInstance {
    /// Classify `config`, allocate the field and its frames.
    pub fn build(config: FieldConfig, frame_count: usize) -> Result<Self, ConfigError> {
        let field = Field::from_config(&config)?;
        Self::with_field(config, field, frame_count)
    }

    /// Wrap an already allocated field.
    pub fn with_field(
        config: FieldConfig,
        field: Field,
        frame_count: usize,
    ) -> Result<Self, ConfigError> {
        let frames = FrameWriter::new(frame_count, field.len())?;
        let id = FieldInstanceId::next();
        tracing::debug!(%id, cells = field.len(), "field instance built");
        Ok(Self {
            id,
            config,
            field,
            frames,
            state: LifecycleState::Ready,
        })
    }

    /// Unique id of this build.
    pub fn id(&self) -> FieldInstanceId {
        self.id
    }

    /// The configuration this instance was built from.
    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Field state.
    pub fn field(&self) -> &Field {
        &self.field
    }

    /// Classified grid.
    pub fn layout(&self) -> &GridLayout {
        self.field.layout()
    }

    /// Grid dimensions for renderers.
    pub fn metadata(&self) -> GridMetadata {
        self.field.layout().metadata()
    }

    /// Published pressure frames.
    pub fn frames(&self) -> &Arc<FrameSet> {
        self.frames.frames()
    }

    /// Rotator of the pressure frames.
    pub fn rotator(&self) -> &FrameRotator {
        self.frames.rotator()
    }

    /// Lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether a step failure has frozen the field.
    pub fn is_frozen(&self) -> bool {
        self.field.is_frozen()
    }

    /// Strong references to the frame set held outside this instance.
    pub fn consumers(&self) -> usize {
        Arc::strong_count(self.frames.frames()) - 1
    }

    /// Non-owning handle for renderers.
    pub fn handle(&self) -> FieldHandle {
        FieldHandle::new(self.id, self.metadata(), self.frames.frames())
    }

    /// Run one sub-step, then publish the new pressure and advance the
    /// rotator.
    ///
    /// On failure nothing is published, so readers keep seeing the last
    /// good frame.
    pub fn step(&mut self, stepper: &mut Stepper) -> Result<(), StepError> {
        stepper.step(&mut self.field)?;
        self.frames.publish(self.field.pressure());
        Ok(())
    }

    pub(crate) fn set_state(&mut self, next: LifecycleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.state
        );
        tracing::info!(id = %self.id, from = %self.state, to = %next, "field lifecycle");
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bore_solver::{Excitation, Waveform};
    use bore_test_utils::closed_box_config;

    #[test]
    fn built_instance_is_ready_and_unpublished() {
        let inst = FieldInstance::build(closed_box_config(), 3).unwrap();
        assert_eq!(inst.state(), LifecycleState::Ready);
        assert_eq!(inst.frames().published(), 0);
        assert_eq!(inst.frames().frame_len(), inst.field().len());
        assert_eq!(inst.consumers(), 0);
    }

    #[test]
    fn every_step_publishes_one_frame() {
        let mut inst = FieldInstance::build(closed_box_config(), 3).unwrap();
        let mut stepper = Stepper::new(Excitation::new(Waveform::Impulse, 0.0));
        for n in 1..=7u64 {
            inst.step(&mut stepper).unwrap();
            assert_eq!(inst.frames().published(), n);
            assert_eq!(inst.rotator().current_index(), (n % 3) as usize);
        }
        let latest = inst.frames().latest().unwrap();
        assert_eq!(latest.position(), 6);
        assert_eq!(latest.data(), inst.field().pressure());
    }

    #[test]
    fn handle_counts_as_consumer_only_when_upgraded() {
        let inst = FieldInstance::build(closed_box_config(), 2).unwrap();
        let handle = inst.handle();
        assert_eq!(inst.consumers(), 0);
        let held = handle.upgrade().unwrap();
        assert_eq!(inst.consumers(), 1);
        drop(held);
        assert_eq!(inst.consumers(), 0);
        drop(inst);
        assert!(handle.upgrade().is_none());
    }

    #[test]
    fn rejects_bad_frame_count() {
        assert_eq!(
            FieldInstance::build(closed_box_config(), 4).unwrap_err(),
            ConfigError::InvalidFrameCount { configured: 4 }
        );
    }
}
