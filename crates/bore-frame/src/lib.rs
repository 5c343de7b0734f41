//! Multi-buffer frame rotation.
//!
//! The stepping thread is the single writer. After each full sub-step it
//! copies the pressure array into the write-target slot of a [`FrameSet`]
//! and advances its [`FrameRotator`]. Renderer and audio consumers read
//! only the most-recent-complete and two-ago slots, so they never observe
//! a partially written buffer.
//!
//! Two rotators run independently: one for the pressure field (advanced
//! per sub-step) and one for the listener trace (advanced per tick).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod frame_set;
pub mod rotator;

pub use frame_set::{FrameSet, FrameSnapshot, FrameWriter};
pub use rotator::{FrameRoles, FrameRotator};
