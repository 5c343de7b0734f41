//! Leapfrog sub-step driver.

use bore_core::{StepError, SubStep};

use crate::excitation::{Excitation, Waveform};
use crate::field::Field;

/// Drives a [`Field`] forward with a given exciter drive.
///
/// The excitation and its clock live here rather than in the field, so
/// the drive continues without a jump when the field is replaced.
#[derive(Clone, Debug, PartialEq)]
pub struct Stepper {
    excitation: Excitation,
    pub(crate) clock: SubStep,
}

impl Stepper {
    /// Stepper with the given drive, clock at zero.
    pub fn new(excitation: Excitation) -> Self {
        Self {
            excitation,
            clock: SubStep(0),
        }
    }

    /// Sub-steps run by this stepper, across every field it has driven.
    pub fn clock(&self) -> SubStep {
        self.clock
    }

    /// Switch waveform, starting it at the current clock.
    pub fn set_waveform(&mut self, waveform: Waveform) {
        let now = self.clock;
        self.excitation.set_waveform(waveform, now);
    }

    /// Instantaneous sweep frequency at the current clock, if sweeping.
    pub fn sweep_frequency(&self, dt: f32) -> Option<f32> {
        self.excitation.instantaneous_frequency(self.clock, dt)
    }

    /// Current drive.
    pub fn excitation(&self) -> &Excitation {
        &self.excitation
    }

    /// Mutable drive, for amplitude changes between sub-steps.
    pub fn excitation_mut(&mut self) -> &mut Excitation {
        &mut self.excitation
    }

    /// Velocity half of a sub-step: every face velocity advances from
    /// `n - 1/2` to `n + 1/2` using pressure at `n` only.
    ///
    /// Does not advance the sub-step counter.
    pub fn velocity_sweep(&self, field: &mut Field) -> Result<(), StepError> {
        let drive = self.excitation.drive(self.clock, field.coefficients().dt);
        field.sweep_velocity(drive)
    }

    /// Pressure half of a sub-step: pressure advances from `n` to `n + 1`
    /// using the velocities just produced.
    ///
    /// Does not advance the sub-step counter.
    pub fn pressure_sweep(&self, field: &mut Field) -> Result<(), StepError> {
        field.sweep_pressure()
    }

    /// One full sub-step; advances both the field and the clock.
    ///
    /// Cell kinds are checked before anything is written. On failure the
    /// field is left untouched and frozen; later calls return
    /// [`StepError::FieldFrozen`].
    pub fn step(&mut self, field: &mut Field) -> Result<(), StepError> {
        if field.frozen {
            return Err(StepError::FieldFrozen);
        }
        if let Some(err) = field.unsupported_cell().cloned() {
            field.frozen = true;
            tracing::error!(error = %err, sub_step = %field.sub_step, "field frozen");
            return Err(err);
        }
        self.velocity_sweep(field)?;
        self.pressure_sweep(field)?;
        field.sub_step = field.sub_step.next();
        self.clock = self.clock.next();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Coefficients;
    use bore_core::{CellKind, FieldConfig, SubStep};
    use bore_grid::classify;

    fn unit() -> Coefficients {
        Coefficients {
            kv: 0.5,
            kp: 0.5,
            dt: 0.5,
        }
    }

    fn silent() -> Stepper {
        Stepper::new(Excitation::new(Waveform::Impulse, 0.0))
    }

    #[test]
    fn step_advances_counter() {
        let mut field = Field::from_config(&FieldConfig::default()).unwrap();
        let mut s = silent();
        for _ in 0..3 {
            s.step(&mut field).unwrap();
        }
        assert_eq!(field.sub_step(), SubStep(3));
    }

    #[test]
    fn unsupported_kind_fails_before_mutation() {
        let mut layout = classify(&[2], &[(5.0, 5.0)], 1.0, 0).unwrap();
        layout.set_kind(12, CellKind::Empty);
        let mut field = Field::new(layout, unit(), 12).unwrap();
        field.pressure_mut()[11] = 1.0;
        let before = field.pressure().to_vec();

        let mut s = silent();
        assert_eq!(
            s.step(&mut field),
            Err(StepError::UnsupportedCellKind {
                index: 12,
                kind: CellKind::Empty
            })
        );
        assert_eq!(field.pressure(), before.as_slice());
        assert!(field.velocity_x().iter().all(|&v| v == 0.0));
        assert!(field.is_frozen());
        assert_eq!(s.step(&mut field), Err(StepError::FieldFrozen));
        assert_eq!(field.sub_step(), SubStep(0));
        assert_eq!(s.clock(), SubStep(0));
    }

    #[test]
    fn clock_survives_field_replacement() {
        let mut s = Stepper::new(Excitation::new(Waveform::Sine { frequency: 1.0 }, 1.0));
        let mut a = Field::from_config(&bore_test_utils::closed_box_config()).unwrap();
        for _ in 0..5 {
            s.step(&mut a).unwrap();
        }
        let mut b = Field::from_config(&bore_test_utils::closed_box_config()).unwrap();
        s.step(&mut b).unwrap();
        assert_eq!(s.clock(), SubStep(6));
        assert_eq!(b.sub_step(), SubStep(1));
    }

    #[test]
    fn waveform_switch_starts_at_clock() {
        let mut s = silent();
        let mut field = Field::from_config(&bore_test_utils::closed_box_config()).unwrap();
        for _ in 0..4 {
            s.step(&mut field).unwrap();
        }
        s.excitation_mut().set_amplitude(2.0);
        s.set_waveform(Waveform::Impulse);
        assert_eq!(s.excitation().drive(s.clock(), 0.5), 2.0);
        assert_eq!(s.sweep_frequency(0.5), None);
    }

    #[test]
    fn walls_never_move() {
        let layout = classify(&[2], &[(5.0, 5.0)], 1.0, 0).unwrap();
        let walls: Vec<usize> = layout
            .kinds()
            .enumerate()
            .filter(|(_, k)| *k == CellKind::Wall)
            .map(|(i, _)| i)
            .collect();
        let mut field = Field::new(layout, unit(), 12).unwrap();
        field.pressure_mut()[12] = 1.0;
        let mut s = silent();
        for _ in 0..20 {
            s.step(&mut field).unwrap();
        }
        for &w in &walls {
            assert_eq!(field.pressure()[w], 0.0);
            assert_eq!(field.velocity_x()[w], 0.0);
            assert_eq!(field.velocity_y()[w], 0.0);
        }
    }

    #[test]
    fn exciter_imposes_drive() {
        let layout = classify(&[1, 2], &[(4.0, 1.0), (4.0, 3.0)], 1.0, 0).unwrap();
        let exciter = layout
            .kinds()
            .position(|k| k == CellKind::Exciter)
            .unwrap();
        let mut field = Field::new(layout, unit(), exciter).unwrap();
        let mut s = Stepper::new(Excitation::new(Waveform::Impulse, 0.25));
        s.step(&mut field).unwrap();
        assert_eq!(field.velocity_x()[exciter], 0.25);
        assert_eq!(field.pressure()[exciter], -0.125);
        s.step(&mut field).unwrap();
        assert_eq!(field.velocity_x()[exciter], 0.0);
    }

    #[test]
    fn tube_carries_pulse_into_membrane() {
        let layout = classify(&[1, 2], &[(6.0, 1.0), (6.0, 5.0)], 1.0, 0).unwrap();
        let listener = layout.index(8, layout.center_row()).unwrap();
        let mut field = Field::new(layout, unit(), listener).unwrap();
        let mut s = Stepper::new(Excitation::new(Waveform::Impulse, 1.0));
        let mut heard = 0.0f32;
        for _ in 0..40 {
            s.step(&mut field).unwrap();
            heard = heard.max(field.listener_pressure().abs());
        }
        assert!(heard > 1e-3);
    }
}
