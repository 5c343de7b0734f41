//! Write-target / most-recent / two-ago index rotation.

use bore_core::ConfigError;

/// Slot roles for one rotation position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRoles {
    /// Slot the writer fills during the current sub-step.
    pub write: usize,
    /// Last completely written slot.
    pub recent: usize,
    /// Slot completed before `recent`. `None` with two frames, where it
    /// would alias the write target.
    pub two_ago: Option<usize>,
}

impl FrameRoles {
    /// Roles over `frame_count` slots when `write` is the write target.
    pub(crate) fn at(frame_count: usize, write: usize) -> Self {
        let n = frame_count;
        let write = write % n;
        Self {
            write,
            recent: (write + n - 1) % n,
            two_ago: (n == 3).then(|| (write + n - 2) % n),
        }
    }

    /// Whether a consumer may read `slot`.
    pub fn is_readable(&self, slot: usize) -> bool {
        slot == self.recent || self.two_ago == Some(slot)
    }
}

/// Modular frame index over 2 or 3 buffers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRotator {
    frame_count: usize,
    current: usize,
    advances: u64,
}

impl FrameRotator {
    /// Create a rotator starting at slot 0.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFrameCount`] unless `frame_count` is 2 or 3.
    pub fn new(frame_count: usize) -> Result<Self, ConfigError> {
        if !(2..=3).contains(&frame_count) {
            return Err(ConfigError::InvalidFrameCount {
                configured: frame_count,
            });
        }
        Ok(Self {
            frame_count,
            current: 0,
            advances: 0,
        })
    }

    /// Number of buffers rotated over.
    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Current write-target slot.
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// Total advances since creation.
    pub fn advances(&self) -> u64 {
        self.advances
    }

    /// Move to the next slot. Call only after the write is complete.
    pub fn advance(&mut self) {
        self.current = (self.current + 1) % self.frame_count;
        self.advances += 1;
    }

    /// Roles for the given write-target index.
    pub fn get_frame_desc_sets(&self, current_index: usize) -> FrameRoles {
        FrameRoles::at(self.frame_count, current_index)
    }

    /// Roles at the current position.
    pub fn roles(&self) -> FrameRoles {
        self.get_frame_desc_sets(self.current)
    }
}
