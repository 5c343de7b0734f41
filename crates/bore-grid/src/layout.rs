//! Classified grid: per-cell metadata, segment placement and junction pairing.

use indexmap::IndexMap;
use smallvec::SmallVec;

use bore_core::{CellKind, SegmentId};

use crate::segment::Segment;

/// Inline capacity of a junction pairing list.
pub type PairList = SmallVec<[usize; 8]>;

/// Classification result for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CellMeta {
    /// Update rule the cell follows.
    pub kind: CellKind,
    /// Damping coefficient; non-zero only for [`CellKind::Pml`].
    pub pml_coefficient: f32,
    /// Segment that owns the cell, if any.
    pub segment: Option<SegmentId>,
}

/// Grid dimensions exposed to renderers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridMetadata {
    /// Columns.
    pub x_grid_count: usize,
    /// Rows.
    pub y_grid_count: usize,
    /// `x_grid_count * y_grid_count`.
    pub whole_grid_count: usize,
}

/// Precomputed pairing between 1D and 2D junction cells.
///
/// Pairing is resolved once at classification. The scan that builds it is
/// bounded to the rows of the adjacent 2D segment.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Junctions {
    /// `JUNCTION_1D_TO_2D_LEFT` cell → `JUNCTION_2D_TO_1D_RIGHT` cells on its left.
    tube_left: IndexMap<usize, PairList>,
    /// `JUNCTION_1D_TO_2D_RIGHT` cell → `JUNCTION_2D_TO_1D_LEFT` cells on its right.
    tube_right: IndexMap<usize, PairList>,
    /// `JUNCTION_2D_TO_1D_RIGHT` cell → the 1D cell it drains into.
    membrane_right: IndexMap<usize, usize>,
    /// `JUNCTION_2D_TO_1D_LEFT` cell → the 1D cell that feeds it.
    membrane_left: IndexMap<usize, usize>,
}

impl Junctions {
    pub(crate) fn pair_tube_left(&mut self, tube: usize, membrane: PairList) {
        for &cell in &membrane {
            self.membrane_right.insert(cell, tube);
        }
        self.tube_left.insert(tube, membrane);
    }

    pub(crate) fn pair_tube_right(&mut self, tube: usize, membrane: PairList) {
        for &cell in &membrane {
            self.membrane_left.insert(cell, tube);
        }
        self.tube_right.insert(tube, membrane);
    }

    /// 2D cells paired with a `JUNCTION_1D_TO_2D_LEFT` cell.
    pub fn tube_left(&self, index: usize) -> &[usize] {
        self.tube_left.get(&index).map_or(&[], |p| p.as_slice())
    }

    /// 2D cells paired with a `JUNCTION_1D_TO_2D_RIGHT` cell.
    pub fn tube_right(&self, index: usize) -> &[usize] {
        self.tube_right.get(&index).map_or(&[], |p| p.as_slice())
    }

    /// 1D cell paired with a `JUNCTION_2D_TO_1D_RIGHT` cell.
    pub fn membrane_right(&self, index: usize) -> Option<usize> {
        self.membrane_right.get(&index).copied()
    }

    /// 1D cell paired with a `JUNCTION_2D_TO_1D_LEFT` cell.
    pub fn membrane_left(&self, index: usize) -> Option<usize> {
        self.membrane_left.get(&index).copied()
    }

    /// Number of 1D junction cells with at least one pairing.
    pub fn tube_count(&self) -> usize {
        self.tube_left.len() + self.tube_right.len()
    }
}

/// The classified grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridLayout {
    pub(crate) whole_x: usize,
    pub(crate) whole_y: usize,
    pub(crate) pml_count: usize,
    pub(crate) segments: Vec<Segment>,
    pub(crate) cells: Vec<CellMeta>,
    pub(crate) junctions: Junctions,
}

impl GridLayout {
    /// Columns in the whole grid.
    pub fn whole_x(&self) -> usize {
        self.whole_x
    }

    /// Rows in the whole grid.
    pub fn whole_y(&self) -> usize {
        self.whole_y
    }

    /// Total cell count.
    pub fn whole_grid_count(&self) -> usize {
        self.cells.len()
    }

    /// Absorbing layer thickness in cells.
    pub fn pml_count(&self) -> usize {
        self.pml_count
    }

    /// Row on which every segment is centred.
    pub fn center_row(&self) -> usize {
        self.whole_y / 2
    }

    /// Segment placements, left to right.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Per-cell metadata, row-major.
    pub fn cells(&self) -> &[CellMeta] {
        &self.cells
    }

    /// Kind of the cell at `index`.
    pub fn kind(&self, index: usize) -> CellKind {
        self.cells[index].kind
    }

    /// Iterator over every cell kind, row-major.
    pub fn kinds(&self) -> impl Iterator<Item = CellKind> + '_ {
        self.cells.iter().map(|c| c.kind)
    }

    /// Junction pairing tables.
    pub fn junctions(&self) -> &Junctions {
        &self.junctions
    }

    /// Row-major index of `(x, y)`, or `None` if out of range.
    pub fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.whole_x && y < self.whole_y).then_some(y * self.whole_x + x)
    }

    /// `(x, y)` of a row-major index.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.whole_x, index / self.whole_x)
    }

    /// Dimensions for renderers.
    pub fn metadata(&self) -> GridMetadata {
        GridMetadata {
            x_grid_count: self.whole_x,
            y_grid_count: self.whole_y,
            whole_grid_count: self.cells.len(),
        }
    }

    /// Listener cell used when none is configured: centre row, just inside
    /// the right PML band.
    pub fn default_listener(&self) -> usize {
        let x = self.whole_x.saturating_sub(self.pml_count + 1);
        self.center_row() * self.whole_x + x
    }

    /// Override the kind of one cell after classification.
    ///
    /// Junction pairing is not recomputed.
    pub fn set_kind(&mut self, index: usize, kind: CellKind) {
        self.cells[index].kind = kind;
    }

    /// Number of cells of the given kind.
    pub fn count(&self, kind: CellKind) -> usize {
        self.kinds().filter(|&k| k == kind).count()
    }
}
