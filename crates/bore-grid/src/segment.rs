//! Per-segment placement produced by classification.

use std::ops::Range;

use bore_core::{Dimensionality, SegmentId};

/// Placement of one segment inside the whole grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    /// Position in the layout, left to right.
    pub id: SegmentId,
    /// Tube or membrane.
    pub dimension: Dimensionality,
    /// Interior cell counts `(x, y)`, before PML widening.
    ///
    /// For a 1D segment the y count is its radial count: the number of
    /// membrane rows it couples to at a junction. It occupies one row.
    pub grid_count: (usize, usize),
    /// Physical extents `(x, y)` in metres.
    pub length: (f32, f32),
    /// First column of the segment.
    pub x_start: usize,
    /// First row of the segment, including any PML band.
    pub y_start: usize,
    /// Columns occupied, including any PML band.
    pub width: usize,
    /// Rows occupied, including any PML band.
    pub height: usize,
    /// Row-major index of `(x_start, y_start)`.
    pub edge_index: usize,
    /// Whether this is the terminal segment carrying the absorbing layer.
    pub terminal: bool,
}

impl Segment {
    /// Columns spanned by this segment.
    pub fn x_range(&self) -> Range<usize> {
        self.x_start..self.x_start + self.width
    }

    /// Rows spanned by this segment.
    pub fn y_range(&self) -> Range<usize> {
        self.y_start..self.y_start + self.height
    }

    /// Last interior column (excludes the right PML band).
    pub fn x_last_interior(&self) -> usize {
        self.x_start + self.grid_count.0 - 1
    }

    /// Half the radial count, rounded down: junction rows sit within this
    /// distance of the centre row.
    pub fn radial_half(&self) -> usize {
        self.grid_count.1 / 2
    }

    /// Whether column `x` falls inside this segment.
    pub fn contains_column(&self, x: usize) -> bool {
        self.x_range().contains(&x)
    }
}
