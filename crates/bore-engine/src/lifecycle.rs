//! Field lifecycle states.

use std::fmt;

/// Where a field instance is in its life.
///
/// ```text
/// EMPTY ──rebuild──▶ CONSTRUCTING ──built──▶ READY ──swap──▶ ACTIVE ──swap──▶ RETIRING ──▶ (freed)
///                         │
///                         └──failed / timed out──▶ EMPTY
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    /// No field and no build in flight.
    Empty,
    /// A build is running on the background thread.
    Constructing,
    /// Built and waiting for the next tick boundary.
    Ready,
    /// Driven by the tick loop.
    Active,
    /// Replaced; freed once no consumer holds its frames.
    Retiring,
}

impl LifecycleState {
    /// Whether `self → next` is a legal transition.
    pub fn can_transition_to(self, next: LifecycleState) -> bool {
        use LifecycleState::*;
        matches!(
            (self, next),
            (Empty, Constructing)
                | (Constructing, Ready)
                | (Constructing, Empty)
                | (Ready, Active)
                | (Active, Retiring)
        )
    }

    /// Upper-case name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Constructing => "CONSTRUCTING",
            Self::Ready => "READY",
            Self::Active => "ACTIVE",
            Self::Retiring => "RETIRING",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
