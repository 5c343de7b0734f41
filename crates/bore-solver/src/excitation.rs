//! Driven boundary waveforms for EXCITER cells.

use std::f64::consts::TAU;

use bore_core::{ConfigError, SubStep};

/// Shape of the exciter drive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Waveform {
    /// Continuous sine.
    Sine {
        /// Frequency in Hz.
        frequency: f32,
    },
    /// A single-sub-step pulse at the moment the waveform is selected.
    Impulse,
    /// Exponential sine sweep, repeated every `duration` seconds.
    Sweep {
        /// Start frequency in Hz.
        start_hz: f32,
        /// End frequency in Hz.
        end_hz: f32,
        /// Sweep length in seconds.
        duration: f32,
    },
}

/// Tunables for the exciter and the frequency-characteristic sweep.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExcitationConfig {
    /// Sine frequency in Hz.
    pub frequency: f32,
    /// Initial drive amplitude (mouth pressure), in m/s.
    pub amplitude: f32,
    /// Sweep start frequency in Hz.
    pub sweep_start_hz: f32,
    /// Sweep end frequency in Hz.
    pub sweep_end_hz: f32,
    /// Sweep duration in seconds.
    pub sweep_duration: f32,
}

impl Default for ExcitationConfig {
    fn default() -> Self {
        Self {
            frequency: 220.0,
            amplitude: 0.1,
            sweep_start_hz: 20.0,
            sweep_end_hz: 20_000.0,
            sweep_duration: 2.0,
        }
    }
}

impl ExcitationConfig {
    /// Check that every frequency and duration is finite and positive, the
    /// amplitude is finite, and the sweep rises.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("frequency", self.frequency),
            ("sweep_start_hz", self.sweep_start_hz),
            ("sweep_end_hz", self.sweep_end_hz),
            ("sweep_duration", self.sweep_duration),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidConstant { name, value });
            }
        }
        if !self.amplitude.is_finite() {
            return Err(ConfigError::InvalidConstant {
                name: "amplitude",
                value: self.amplitude,
            });
        }
        if self.sweep_end_hz <= self.sweep_start_hz {
            return Err(ConfigError::InvalidConstant {
                name: "sweep_end_hz",
                value: self.sweep_end_hz,
            });
        }
        Ok(())
    }

    /// The steady-state sine waveform.
    pub fn sine(&self) -> Waveform {
        Waveform::Sine {
            frequency: self.frequency,
        }
    }

    /// The measurement sweep.
    pub fn sweep(&self) -> Waveform {
        Waveform::Sweep {
            start_hz: self.sweep_start_hz,
            end_hz: self.sweep_end_hz,
            duration: self.sweep_duration,
        }
    }
}

/// Amplitude-scaled waveform with its own time origin.
///
/// Time is measured from the sub-step at which the waveform was last
/// selected, so a sweep or impulse starts cleanly when switched in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Excitation {
    waveform: Waveform,
    amplitude: f32,
    origin: SubStep,
}

impl Excitation {
    /// Drive starting at sub-step 0.
    pub fn new(waveform: Waveform, amplitude: f32) -> Self {
        Self {
            waveform,
            amplitude,
            origin: SubStep(0),
        }
    }

    /// Current waveform.
    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Current amplitude.
    pub fn amplitude(&self) -> f32 {
        self.amplitude
    }

    /// Set the drive amplitude (mouth pressure).
    pub fn set_amplitude(&mut self, amplitude: f32) {
        self.amplitude = amplitude;
    }

    /// Switch waveform, restarting its clock at `now`.
    pub fn set_waveform(&mut self, waveform: Waveform, now: SubStep) {
        self.waveform = waveform;
        self.origin = now;
    }

    fn elapsed(&self, step: SubStep, dt: f32) -> Option<(u64, f64)> {
        let n = step.0.checked_sub(self.origin.0)?;
        Some((n, n as f64 * dt as f64))
    }

    /// Exciter velocity at `step`.
    pub fn drive(&self, step: SubStep, dt: f32) -> f32 {
        let Some((n, t)) = self.elapsed(step, dt) else {
            return 0.0;
        };
        let unit = match self.waveform {
            Waveform::Sine { frequency } => (TAU * frequency as f64 * t).sin(),
            Waveform::Impulse => {
                if n == 0 {
                    1.0
                } else {
                    0.0
                }
            }
            Waveform::Sweep {
                start_hz,
                end_hz,
                duration,
            } => {
                let (f1, t_len) = (start_hz as f64, duration as f64);
                let rate = (end_hz as f64 / f1).ln() / t_len;
                let local = t % t_len;
                (TAU * f1 * ((rate * local).exp() - 1.0) / rate).sin()
            }
        };
        self.amplitude * unit as f32
    }

    /// Instantaneous sweep frequency at `step`, if sweeping.
    pub fn instantaneous_frequency(&self, step: SubStep, dt: f32) -> Option<f32> {
        let Waveform::Sweep {
            start_hz,
            end_hz,
            duration,
        } = self.waveform
        else {
            return None;
        };
        let (_, t) = self.elapsed(step, dt)?;
        let (f1, t_len) = (start_hz as f64, duration as f64);
        let rate = (end_hz as f64 / f1).ln() / t_len;
        Some((f1 * (rate * (t % t_len)).exp()) as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(ExcitationConfig::default().validate().is_ok());
    }

    #[test]
    fn falling_sweep_rejected() {
        let cfg = ExcitationConfig {
            sweep_start_hz: 1000.0,
            sweep_end_hz: 100.0,
            ..ExcitationConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::InvalidConstant {
                name: "sweep_end_hz",
                ..
            })
        ));
    }

    #[test]
    fn sine_quarter_period_peaks() {
        let e = Excitation::new(Waveform::Sine { frequency: 1.0 }, 2.0);
        assert!((e.drive(SubStep(1), 0.25) - 2.0).abs() < 1e-6);
        assert!(e.drive(SubStep(0), 0.25).abs() < 1e-6);
    }

    #[test]
    fn impulse_fires_once_from_origin() {
        let mut e = Excitation::new(Waveform::Sine { frequency: 1.0 }, 3.0);
        e.set_waveform(Waveform::Impulse, SubStep(10));
        assert_eq!(e.drive(SubStep(9), 1.0), 0.0);
        assert_eq!(e.drive(SubStep(10), 1.0), 3.0);
        assert_eq!(e.drive(SubStep(11), 1.0), 0.0);
    }

    #[test]
    fn sweep_frequency_rises_then_wraps() {
        let e = Excitation::new(
            Waveform::Sweep {
                start_hz: 100.0,
                end_hz: 1000.0,
                duration: 1.0,
            },
            1.0,
        );
        let dt = 0.001;
        let f0 = e.instantaneous_frequency(SubStep(0), dt).unwrap();
        let mid = e.instantaneous_frequency(SubStep(500), dt).unwrap();
        let wrapped = e.instantaneous_frequency(SubStep(1000), dt).unwrap();
        assert!((f0 - 100.0).abs() < 1e-3);
        assert!((mid - 316.227_77).abs() < 0.5);
        assert!((wrapped - 100.0).abs() < 1e-2);
        assert!(Excitation::new(Waveform::Impulse, 1.0)
            .instantaneous_frequency(SubStep(0), dt)
            .is_none());
    }

    #[test]
    fn amplitude_scales_drive() {
        let mut e = Excitation::new(Waveform::Impulse, 1.0);
        e.set_amplitude(0.5);
        assert_eq!(e.drive(SubStep(0), 1.0), 0.5);
    }
}
