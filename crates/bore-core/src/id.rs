//! Strongly-typed identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Index of a segment within a grid layout, in left-to-right order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SegmentId(pub u16);

impl SegmentId {
    /// The segment index as a `usize`, for indexing segment tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for SegmentId {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

/// Monotonic count of leapfrog sub-steps executed on one field.
///
/// Drives the excitation waveform phase (`t = step * dt`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SubStep(pub u64);

impl SubStep {
    /// The sub-step that follows this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SubStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SubStep {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Counter for unique [`FieldInstanceId`] allocation.
static FIELD_INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a constructed field.
///
/// Every build (initial or hot-swap rebuild) receives a fresh id, so a
/// renderer can tell two fields with identical layouts apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldInstanceId(u64);

impl FieldInstanceId {
    /// Allocate a fresh, unique instance ID. Thread-safe.
    pub fn next() -> Self {
        Self(FIELD_INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FieldInstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
