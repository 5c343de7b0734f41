//! Field lifecycle management for the bore wave-field engine.
//!
//! The [`FieldManager`] owns the field being driven and supervises the
//! construction of its replacement. A rebuild classifies and allocates a
//! new field on a background thread while the active one keeps stepping;
//! at the next tick boundary after the build reports, the two are
//! exchanged and the old field retires until no renderer holds its
//! frames.
//!
//! Hosts either call [`FieldManager::tick`] from their own render loop or
//! hand the manager to a [`RealtimeHorn`], which runs it on a dedicated
//! thread at a fixed rate.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod build;
pub mod config;
pub mod control;
pub mod error;
pub mod handle;
pub mod instance;
pub mod lifecycle;
pub mod manager;
pub mod metrics;
pub mod realtime;

pub use build::{default_builder, BuildFn, BuildPoll, BuildTask};
pub use config::EngineConfig;
pub use control::{control_channel, Control, ControlHandle, RebuildReply};
pub use error::{BuildError, SubmitError};
pub use handle::{ActiveFieldPointer, FieldHandle};
pub use instance::FieldInstance;
pub use lifecycle::LifecycleState;
pub use manager::FieldManager;
pub use metrics::TickMetrics;
pub use realtime::{RealtimeHorn, ShutdownReport};
