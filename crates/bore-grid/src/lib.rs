//! Grid classification for heterogeneous 1D/2D FDTD layouts.
//!
//! A layout is an ordered list of segments laid out left to right along
//! the x axis, each either a 1D tube or a 2D membrane. The [`Classifier`]
//! turns that list into a flat, row-major array of [`CellMeta`] records
//! telling the time-step engine which update rule each cell follows.
//!
//! # Layout
//!
//! ```text
//!  x →   seg 0 (2D)   seg 1 (1D)   seg 2 (2D, terminal)
//!       W  W  W      W  W  W      P  P  P  P
//!       W  W  W      W  W  W      .  .  .  P
//!       E  .  J<     >J .  J>     <J .  .  P     ← centre row
//!       W  W  W      W  W  W      .  .  .  P
//!       W  W  W      W  W  W      P  P  P  P
//! ```
//!
//! Every segment is centred on the same row. The terminal segment is
//! widened by `pml_count` cells on each border it shares with open space.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod layout;
pub mod pml;
pub mod segment;

pub use classify::{classify, Classifier};
pub use layout::{CellMeta, GridLayout, GridMetadata, Junctions};
pub use pml::pml_ramp;
pub use segment::Segment;
