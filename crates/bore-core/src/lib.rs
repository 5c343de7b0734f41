//! Core types for the bore FDTD wave-field engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the vocabulary shared by every other crate in the workspace: cell
//! kinds, strongly-typed identifiers, the [`FieldConfig`] construction
//! input, and the error taxonomy.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod config;
pub mod error;
pub mod id;

pub use cell::{CellKind, Dimensionality};
pub use config::{FieldConfig, ToneHole};
pub use error::{ConfigError, StepError};
pub use id::{FieldInstanceId, SegmentId, SubStep};
