//! Staggered-grid FDTD field store and time-step engine.
//!
//! A [`Field`] holds pressure at cell centres and particle velocity on
//! cell faces, in structure-of-arrays layout. The [`Stepper`] advances it
//! one leapfrog sub-step at a time: a full velocity sweep reading only
//! pre-step pressure, then a full pressure sweep reading only the
//! velocities just produced.
//!
//! ```text
//! v^{n+1/2} = v^{n-1/2} - kv · ∇p^n
//! p^{n+1}   = p^n       - kp · ∇·v^{n+1/2}
//! ```
//!
//! Per-kind update rules live in one strategy table ([`rules`]) so the
//! velocity and pressure forms of a kind are defined side by side.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod energy;
pub mod excitation;
pub mod field;
pub mod rules;
pub mod stepper;

pub use energy::{acoustic_energy, step_with_invariant};
pub use excitation::{Excitation, ExcitationConfig, Waveform};
pub use field::{Coefficients, Field};
pub use rules::{rule_for, CellRule};
pub use stepper::Stepper;
