//! Engine configuration: frame buffering, build supervision, audio output,
//! exciter tunables and the host loop rate.

use std::time::Duration;

use bore_audio::SoundConfig;
use bore_core::ConfigError;
use bore_solver::ExcitationConfig;

// ── EngineConfig ─────────────────────────────────────────────────

/// Settings that outlive any one field instance.
///
/// The [`FieldConfig`](bore_core::FieldConfig) describes a grid and is
/// replaced on every rebuild; this struct is fixed for the life of a
/// [`FieldManager`](crate::FieldManager).
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Pressure frame copies per field (2 or 3). Also used for the
    /// listener trace frames. Default: 3.
    pub frame_count: usize,
    /// How long a background build may run before it is abandoned.
    /// Default: 5 s.
    pub build_timeout: Duration,
    /// Audio output settings.
    pub sound: SoundConfig,
    /// Exciter waveform and frequency-measurement sweep.
    pub excitation: ExcitationConfig,
    /// Host loop rate in Hz. Only the realtime host reads it. Default: 30.
    pub tick_rate_hz: f64,
    /// Bins in a frequency-characteristic measurement. Default: 64.
    pub response_bins: usize,
    /// Control messages the channel holds before senders see
    /// backpressure. Default: 64.
    pub control_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            frame_count: 3,
            build_timeout: Duration::from_secs(5),
            sound: SoundConfig::default(),
            excitation: ExcitationConfig::default(),
            tick_rate_hz: 30.0,
            response_bins: 64,
            control_capacity: 64,
        }
    }
}

impl EngineConfig {
    /// Check every field except `sound`, which needs the native rate of a
    /// field and is checked when one is requested.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=3).contains(&self.frame_count) {
            return Err(ConfigError::InvalidFrameCount {
                configured: self.frame_count,
            });
        }
        if self.build_timeout.is_zero() {
            return Err(ConfigError::InvalidConstant {
                name: "build_timeout",
                value: 0.0,
            });
        }
        let period = Duration::try_from_secs_f64(1.0 / self.tick_rate_hz);
        if !self.tick_rate_hz.is_finite() || !period.is_ok_and(|p| !p.is_zero()) {
            return Err(ConfigError::InvalidConstant {
                name: "tick_rate_hz",
                value: self.tick_rate_hz as f32,
            });
        }
        for (name, value) in [
            ("response_bins", self.response_bins),
            ("control_capacity", self.control_capacity),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidConstant { name, value: 0.0 });
            }
        }
        self.excitation.validate()
    }

    /// One host tick. Saturates for a rate [`validate`](Self::validate)
    /// would reject.
    pub fn tick_budget(&self) -> Duration {
        Duration::try_from_secs_f64(1.0 / self.tick_rate_hz).unwrap_or(Duration::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = EngineConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.frame_count, 3);
        assert_eq!(c.build_timeout, Duration::from_secs(5));
    }

    #[test]
    fn rejects_frame_count() {
        for n in [0, 1, 4] {
            let c = EngineConfig {
                frame_count: n,
                ..Default::default()
            };
            assert_eq!(
                c.validate(),
                Err(ConfigError::InvalidFrameCount { configured: n })
            );
        }
    }

    #[test]
    fn rejects_bad_tick_rate() {
        for rate in [0.0, -30.0, f64::NAN, f64::INFINITY, 1e-20, f64::from_bits(1), 1e300] {
            let c = EngineConfig {
                tick_rate_hz: rate,
                ..Default::default()
            };
            assert!(matches!(
                c.validate(),
                Err(ConfigError::InvalidConstant {
                    name: "tick_rate_hz",
                    ..
                })
            ));
        }
    }

    #[test]
    fn tick_budget_saturates_on_tiny_rates() {
        for rate in [1e-20, f64::from_bits(1), 0.0] {
            let c = EngineConfig {
                tick_rate_hz: rate,
                ..Default::default()
            };
            assert_eq!(c.tick_budget(), Duration::MAX);
        }
    }

    #[test]
    fn rejects_zero_timeout_and_capacities() {
        let c = EngineConfig {
            build_timeout: Duration::ZERO,
            ..Default::default()
        };
        assert!(c.validate().is_err());
        let c = EngineConfig {
            control_capacity: 0,
            ..Default::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn tick_budget_matches_rate() {
        let c = EngineConfig {
            tick_rate_hz: 50.0,
            ..Default::default()
        };
        assert_eq!(c.tick_budget(), Duration::from_millis(20));
    }
}
