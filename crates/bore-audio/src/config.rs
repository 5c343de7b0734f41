//! Audio output configuration.

use bore_core::ConfigError;

/// Audio output settings.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundConfig {
    /// Output sample rate in Hz.
    pub target_rate: u32,
    /// Samples per batch handed to the audio backend.
    pub batch_len: usize,
    /// Batches the audio queue holds before backpressure.
    pub queue_capacity: usize,
    /// Pressure-to-full-scale factor applied before 16-bit conversion.
    pub gain: f32,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            target_rate: 44_100,
            batch_len: 1_470,
            queue_capacity: 4,
            gain: 0.02,
        }
    }
}

impl SoundConfig {
    /// Check every field, and that `native_rate` is at least the target rate.
    pub fn validate(&self, native_rate: f64) -> Result<(), ConfigError> {
        let reason = if self.target_rate == 0 {
            "target_rate must be positive".to_string()
        } else if self.batch_len == 0 {
            "batch_len must be positive".to_string()
        } else if self.queue_capacity == 0 {
            "queue_capacity must be positive".to_string()
        } else if !self.gain.is_finite() {
            format!("gain must be finite, got {}", self.gain)
        } else if !native_rate.is_finite() || native_rate < self.target_rate as f64 {
            format!(
                "native rate {native_rate} Hz is below target rate {} Hz",
                self.target_rate
            )
        } else {
            return Ok(());
        };
        Err(ConfigError::InvalidSoundConfig { reason })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_valid_at_128k() {
        assert!(SoundConfig::default().validate(128_000.0).is_ok());
    }

    #[test]
    fn rejects_upsampling() {
        let err = SoundConfig::default().validate(22_050.0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSoundConfig { .. }));
        assert!(err.to_string().contains("below target rate"));
    }

    #[test]
    fn rejects_zero_fields() {
        for cfg in [
            SoundConfig {
                batch_len: 0,
                ..SoundConfig::default()
            },
            SoundConfig {
                queue_capacity: 0,
                ..SoundConfig::default()
            },
            SoundConfig {
                target_rate: 0,
                ..SoundConfig::default()
            },
        ] {
            assert!(cfg.validate(128_000.0).is_err());
        }
    }
}
