//! Renderer-side access to whichever field is active.

use std::sync::{Arc, PoisonError, RwLock, Weak};

use bore_core::FieldInstanceId;
use bore_frame::{FrameSet, FrameSnapshot};
use bore_grid::GridMetadata;

/// Non-owning reference to one field instance's pressure frames.
///
/// Upgrading fails once the instance has been destroyed; a renderer never
/// needs to compare ids to detect a stale target.
#[derive(Clone, Debug)]
pub struct FieldHandle {
    id: FieldInstanceId,
    metadata: GridMetadata,
    frames: Weak<FrameSet>,
}

impl FieldHandle {
    pub(crate) fn new(id: FieldInstanceId, metadata: GridMetadata, frames: &Arc<FrameSet>) -> Self {
        Self {
            id,
            metadata,
            frames: Arc::downgrade(frames),
        }
    }

    /// The instance this handle refers to.
    pub fn id(&self) -> FieldInstanceId {
        self.id
    }

    /// Grid dimensions to reshape frames with.
    pub fn metadata(&self) -> GridMetadata {
        self.metadata
    }

    /// Whether the instance still exists.
    pub fn is_alive(&self) -> bool {
        self.frames.strong_count() > 0
    }

    /// Borrow the frame set. Holding the result keeps a retiring
    /// instance from being freed.
    pub fn upgrade(&self) -> Option<Arc<FrameSet>> {
        self.frames.upgrade()
    }

    /// Most recent complete pressure frame.
    pub fn latest(&self) -> Option<FrameSnapshot> {
        self.upgrade()?.latest()
    }
}

/// Shared slot holding the handle of the active field.
///
/// The tick loop stores a new handle at the swap boundary; readers load a
/// clone. Cloning the pointer shares the slot.
#[derive(Clone, Debug, Default)]
pub struct ActiveFieldPointer {
    slot: Arc<RwLock<Option<FieldHandle>>>,
}

impl ActiveFieldPointer {
    /// An empty pointer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle of the active field, if one has been swapped in.
    pub fn load(&self) -> Option<FieldHandle> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Latest frame of the active field with the metadata to read it by.
    pub fn latest_frame(&self) -> Option<(GridMetadata, FrameSnapshot)> {
        let handle = self.load()?;
        let frame = handle.latest()?;
        Some((handle.metadata(), frame))
    }

    pub(crate) fn store(&self, handle: Option<FieldHandle>) {
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = handle;
    }
}

const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<FieldHandle>();
    assert::<ActiveFieldPointer>();
};
