//! Benchmark profiles and utilities for the bore wave-field engine.
//!
//! Provides pre-built [`FieldConfig`] profiles for benchmarking and examples:
//!
//! - [`reference_profile`]: the default 2D–1D–2D horn (~3K cells)
//! - [`stress_profile`]: the same horn at half the grid spacing with a
//!   larger bell (~75K cells)
//! - [`example_engine`]: an [`EngineConfig`] suited to the example host

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use bore_audio::SoundConfig;
use bore_core::FieldConfig;
use bore_engine::EngineConfig;

/// The default horn: mouthpiece, 30 cm tube, 10 cm bell at `dx = 5 mm`.
///
/// Courant number `c·dt/dx ≈ 0.53`.
pub fn reference_profile() -> FieldConfig {
    FieldConfig::default()
}

/// A longer horn at `dx = 2.5 mm` sampled at 256 kHz.
///
/// Same Courant number as [`reference_profile`] at roughly 25x the cell
/// count.
pub fn stress_profile() -> FieldConfig {
    FieldConfig {
        segment_sizes: vec![(0.04, 0.04), (0.60, 0.02), (0.40, 0.40)],
        dt: 1.0 / 256_000.0,
        dx: 0.0025,
        pml_count: 10,
        update_per_frame: 256_000 / 30,
        ..FieldConfig::default()
    }
}

/// Engine settings for the example host: three frames, 30 Hz ticks,
/// 44.1 kHz audio in one-tick batches.
pub fn example_engine() -> EngineConfig {
    EngineConfig {
        sound: SoundConfig {
            queue_capacity: 8,
            ..SoundConfig::default()
        },
        ..EngineConfig::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_validate() {
        assert!(reference_profile().validate().is_ok());
        assert!(stress_profile().validate().is_ok());
        assert!(example_engine().validate().is_ok());
    }

    #[test]
    fn stress_profile_keeps_the_courant_number() {
        let courant = |c: &FieldConfig| c.sound_speed * c.dt / c.dx;
        let reference = courant(&reference_profile());
        let stress = courant(&stress_profile());
        assert!((reference - stress).abs() < 1e-4);
        assert!(stress < std::f32::consts::FRAC_1_SQRT_2);
    }
}
