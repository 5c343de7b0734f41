//! Bore: a real-time acoustic field engine for horns and tubes.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! bore sub-crates. For most users, adding `bore` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use bore::prelude::*;
//! use bore::audio::SoundConfig;
//!
//! // A single 12 × 11 box, one sub-step per tick, audio at the native rate.
//! let field = FieldConfig {
//!     segment_dimensions: vec![2],
//!     segment_sizes: vec![(12.0, 11.0)],
//!     dt: 0.5,
//!     dx: 1.0,
//!     rho: 1.0,
//!     sound_speed: 1.0,
//!     pml_count: 0,
//!     update_per_frame: 1,
//!     tone_hole: None,
//!     listener: None,
//! };
//! let engine = EngineConfig {
//!     sound: SoundConfig { target_rate: 1, batch_len: 1, queue_capacity: 4, gain: 1.0 },
//!     ..Default::default()
//! };
//!
//! let (mut manager, mut audio) = FieldManager::new(engine, field).unwrap();
//! manager.wait_for_build().unwrap().unwrap();
//! let metrics = manager.tick();
//! assert!(metrics.swapped);
//! assert_eq!(manager.state(), LifecycleState::Active);
//!
//! let (meta, frame) = manager.pointer().latest_frame().unwrap();
//! assert_eq!(frame.data().len(), meta.whole_grid_count);
//! assert!(audio.try_recv().is_some());
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `bore-core` | IDs, cell kinds, `FieldConfig`, error types |
//! | [`grid`] | `bore-grid` | Grid classifier, `GridLayout`, junction tables, PML ramp |
//! | [`frame`] | `bore-frame` | `FrameRotator`, `FrameSet`, `FrameSnapshot` |
//! | [`solver`] | `bore-solver` | `Field`, `Stepper`, cell rules, excitation |
//! | [`audio`] | `bore-audio` | Decimation, audio batches, frequency response |
//! | [`engine`] | `bore-engine` | `FieldManager`, hot-swap lifecycle, `RealtimeHorn` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, configuration and errors (`bore-core`).
///
/// Contains identifiers, [`types::CellKind`], [`types::FieldConfig`] and the
/// error taxonomy ([`types::ConfigError`], [`types::StepError`]).
pub use bore_core as types;

/// Grid classification (`bore-grid`).
///
/// [`grid::Classifier`] turns a segment list into a [`grid::GridLayout`]
/// with per-cell kinds, PML depths and 1D↔2D junction pairings.
pub use bore_grid as grid;

/// Frame buffering (`bore-frame`).
///
/// [`frame::FrameWriter`] publishes into a [`frame::FrameSet`] whose slot
/// roles follow a [`frame::FrameRotator`].
pub use bore_frame as frame;

/// Field storage and time stepping (`bore-solver`).
///
/// [`solver::Stepper`] runs the leapfrog velocity and pressure sweeps over a
/// [`solver::Field`].
pub use bore_solver as solver;

/// Sound extraction (`bore-audio`).
///
/// [`audio::SoundExtractor`] decimates the listener trace into
/// [`audio::AudioBatch`]es; [`audio::ResponseMeter`] measures frequency
/// characteristics.
pub use bore_audio as audio;

/// Field lifecycle and hosting (`bore-engine`).
///
/// [`engine::FieldManager`] for host-driven ticking,
/// [`engine::RealtimeHorn`] for a dedicated tick thread.
pub use bore_engine as engine;

/// Common imports for typical bore usage.
///
/// ```rust
/// use bore::prelude::*;
/// ```
///
/// This imports the most frequently used types: configuration, the manager
/// and its host loop, renderer handles, and the error types.
pub mod prelude {
    // Core types
    pub use bore_core::{CellKind, FieldConfig, FieldInstanceId, ToneHole};

    // Errors
    pub use bore_core::{ConfigError, StepError};
    pub use bore_engine::{BuildError, SubmitError};

    // Solver
    pub use bore_solver::{ExcitationConfig, Waveform};

    // Audio
    pub use bore_audio::{AudioBatch, AudioReceiver, FrequencyResponse};

    // Engine
    pub use bore_engine::{
        ActiveFieldPointer, ControlHandle, EngineConfig, FieldHandle, FieldManager,
        LifecycleState, RealtimeHorn, TickMetrics,
    };
}
