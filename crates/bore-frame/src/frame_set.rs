//! Position-tagged frame slots shared between the writer and consumers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bore_core::ConfigError;

use crate::rotator::{FrameRoles, FrameRotator};

/// A slot: the monotonic position it was written at, plus the data.
///
/// `tag` is `None` until the slot is first written.
#[derive(Debug)]
struct Slot {
    tag: Option<u64>,
    data: Arc<Vec<f32>>,
}

/// A completed frame handed to a consumer.
///
/// Holding a snapshot keeps its buffer alive; the writer copies on write
/// instead of mutating a buffer a consumer still holds.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameSnapshot {
    position: u64,
    data: Arc<Vec<f32>>,
}

impl FrameSnapshot {
    /// Monotonic publish position of this frame.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Frame contents.
    pub fn data(&self) -> &[f32] {
        &self.data
    }
}

impl AsRef<[f32]> for FrameSnapshot {
    fn as_ref(&self) -> &[f32] {
        &self.data
    }
}

/// `frame_count` fixed-length `f32` buffers with single-writer,
/// multi-reader access.
///
/// The publish position is monotonic and never wraps. Slot index is
/// `position % frame_count`, which always matches the write target of the
/// [`FrameRotator`] driving the [`FrameWriter`]. Each slot stores its
/// position tag so a reader can tell when the slot it meant to read was
/// overwritten between its position check and its lock.
#[derive(Debug)]
pub struct FrameSet {
    slots: Vec<Mutex<Slot>>,
    published: AtomicU64,
    frame_len: usize,
}

// Compile-time assertion: FrameSet must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<FrameSet>();
};

impl FrameSet {
    /// Allocate `frame_count` zeroed buffers of `frame_len` values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFrameCount`] unless `frame_count` is 2 or 3.
    pub fn new(frame_count: usize, frame_len: usize) -> Result<Self, ConfigError> {
        if !(2..=3).contains(&frame_count) {
            return Err(ConfigError::InvalidFrameCount {
                configured: frame_count,
            });
        }
        let slots = (0..frame_count)
            .map(|_| {
                Mutex::new(Slot {
                    tag: None,
                    data: Arc::new(vec![0.0; frame_len]),
                })
            })
            .collect();
        Ok(Self {
            slots,
            published: AtomicU64::new(0),
            frame_len,
        })
    }

    fn lock(&self, slot: usize) -> MutexGuard<'_, Slot> {
        // A panicking reader holds the lock only to clone an Arc.
        self.slots[slot]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of slots.
    pub fn frame_count(&self) -> usize {
        self.slots.len()
    }

    /// Values per frame at allocation. A publish may store a different
    /// length.
    pub fn frame_len(&self) -> usize {
        self.frame_len
    }

    /// Frames published so far.
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    /// Roles at the current publish position.
    pub fn roles(&self) -> FrameRoles {
        let n = self.slots.len();
        FrameRoles::at(n, (self.published() % n as u64) as usize)
    }

    fn store(&self, position: u64, data: &[f32]) {
        let slot_idx = (position % self.slots.len() as u64) as usize;
        {
            let mut slot = self.lock(slot_idx);
            let buf = Arc::make_mut(&mut slot.data);
            buf.clear();
            buf.extend_from_slice(data);
            slot.tag = Some(position);
        }
        // Release-store publishes the slot contents before readers see
        // the new position.
        self.published.store(position + 1, Ordering::Release);
    }

    fn read_at(&self, position: u64) -> Option<FrameSnapshot> {
        let slot_idx = (position % self.slots.len() as u64) as usize;
        let slot = self.lock(slot_idx);
        match slot.tag {
            Some(tag) if tag == position => Some(FrameSnapshot {
                position,
                data: Arc::clone(&slot.data),
            }),
            _ => None,
        }
    }

    /// The most-recent-complete frame, or `None` before the first publish.
    pub fn latest(&self) -> Option<FrameSnapshot> {
        let published = self.published();
        published.checked_sub(1).and_then(|p| self.read_at(p))
    }

    /// The frame completed before the most recent one.
    ///
    /// Always `None` with two slots, where that slot is the write target.
    pub fn two_ago(&self) -> Option<FrameSnapshot> {
        if self.slots.len() < 3 {
            return None;
        }
        let published = self.published();
        published.checked_sub(2).and_then(|p| self.read_at(p))
    }
}

/// The single writer of a [`FrameSet`], owning its rotator.
#[derive(Debug)]
pub struct FrameWriter {
    rotator: FrameRotator,
    set: Arc<FrameSet>,
}

impl FrameWriter {
    /// Create a frame set and its writer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidFrameCount`] unless `frame_count` is 2 or 3.
    pub fn new(frame_count: usize, frame_len: usize) -> Result<Self, ConfigError> {
        let set = Arc::new(FrameSet::new(frame_count, frame_len)?);
        Ok(Self {
            rotator: FrameRotator::new(frame_count)?,
            set,
        })
    }

    /// Shared reader side.
    pub fn frames(&self) -> &Arc<FrameSet> {
        &self.set
    }

    /// The rotator driving this writer.
    pub fn rotator(&self) -> &FrameRotator {
        &self.rotator
    }

    /// Copy `data` into the write-target slot, then advance.
    ///
    /// Returns the position the frame was published at.
    pub fn publish(&mut self, data: &[f32]) -> u64 {
        let position = self.rotator.advances();
        debug_assert_eq!(
            self.rotator.current_index(),
            (position % self.rotator.frame_count() as u64) as usize
        );
        self.set.store(position, data);
        self.rotator.advance();
        position
    }
}
