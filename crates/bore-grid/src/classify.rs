//! Segment list → classified grid.

use bore_core::{CellKind, ConfigError, Dimensionality, FieldConfig, SegmentId, ToneHole};

use crate::layout::{CellMeta, GridLayout, Junctions, PairList};
use crate::pml::pml_ramp;
use crate::segment::Segment;

/// Tolerance added before flooring `length / dx`, so lengths that are an
/// exact multiple of `dx` in decimal do not lose a cell to rounding.
const GRID_EPSILON: f32 = 1e-4;

/// Builder for a grid classification.
///
/// # Examples
///
/// ```
/// use bore_grid::Classifier;
///
/// let layout = Classifier::new(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)])
///     .dx(1.0)
///     .pml_count(1)
///     .classify()
///     .unwrap();
/// assert_eq!((layout.whole_x(), layout.whole_y()), (10, 5));
/// ```
#[derive(Clone, Debug)]
pub struct Classifier<'a> {
    dimensions: &'a [u32],
    sizes: &'a [(f32, f32)],
    dx: f32,
    pml_count: usize,
    tone_hole: Option<ToneHole>,
}

/// Classify a layout without a tone hole.
pub fn classify(
    dimensions: &[u32],
    sizes: &[(f32, f32)],
    dx: f32,
    pml_count: usize,
) -> Result<GridLayout, ConfigError> {
    Classifier::new(dimensions, sizes)
        .dx(dx)
        .pml_count(pml_count)
        .classify()
}

impl<'a> Classifier<'a> {
    /// Start a classification with `dx = 1` and no absorbing layer.
    pub fn new(dimensions: &'a [u32], sizes: &'a [(f32, f32)]) -> Self {
        Self {
            dimensions,
            sizes,
            dx: 1.0,
            pml_count: 0,
            tone_hole: None,
        }
    }

    /// Classifier configured from a [`FieldConfig`].
    pub fn from_config(config: &'a FieldConfig) -> Self {
        Self::new(&config.segment_dimensions, &config.segment_sizes)
            .dx(config.dx)
            .pml_count(config.pml_count)
            .tone_hole(config.tone_hole)
    }

    /// Grid spacing in metres.
    pub fn dx(mut self, dx: f32) -> Self {
        self.dx = dx;
        self
    }

    /// Absorbing layer thickness in cells.
    pub fn pml_count(mut self, pml_count: usize) -> Self {
        self.pml_count = pml_count;
        self
    }

    /// Optional tone hole applied after the rule pass.
    pub fn tone_hole(mut self, tone_hole: Option<ToneHole>) -> Self {
        self.tone_hole = tone_hole;
        self
    }

    /// Run the classification.
    pub fn classify(&self) -> Result<GridLayout, ConfigError> {
        let dims = self.parse_dimensions()?;
        if !self.dx.is_finite() || self.dx <= 0.0 {
            return Err(ConfigError::InvalidConstant {
                name: "dx",
                value: self.dx,
            });
        }

        let counts = dims
            .iter()
            .zip(self.sizes)
            .enumerate()
            .map(|(i, (&dim, &(lx, ly)))| self.grid_counts(i, dim, lx, ly))
            .collect::<Result<Vec<_>, _>>()?;

        let pml = self.pml_count;
        let last = dims.len() - 1;
        let whole_x = counts
            .iter()
            .try_fold(pml, |acc, &(nx, _)| acc.checked_add(nx))
            .ok_or(ConfigError::CellCountOverflow)?;
        let terminal_rows = pml
            .checked_mul(2)
            .and_then(|band| counts[last].1.checked_add(band))
            .ok_or(ConfigError::CellCountOverflow)?;
        let whole_y = dims
            .iter()
            .zip(&counts)
            .enumerate()
            .map(|(i, (&dim, &(_, ny)))| match dim {
                _ if i == last => terminal_rows,
                Dimensionality::Two => ny,
                Dimensionality::One => 1,
            })
            .max()
            .unwrap_or(1);
        let total = whole_x
            .checked_mul(whole_y)
            .filter(|&n| {
                n.checked_mul(std::mem::size_of::<CellMeta>())
                    .is_some_and(|bytes| bytes <= isize::MAX as usize)
            })
            .ok_or(ConfigError::CellCountOverflow)?;
        let center = whole_y / 2;

        let mut segments = Vec::with_capacity(dims.len());
        let mut x_start = 0;
        for (i, (&dimension, &grid_count)) in dims.iter().zip(&counts).enumerate() {
            let terminal = i == last;
            let (nx, ny) = grid_count;
            let (width, height) = match dimension {
                _ if terminal => (nx + pml, terminal_rows),
                Dimensionality::Two => (nx, ny),
                Dimensionality::One => (nx, 1),
            };
            let y_start = center - height / 2;
            segments.push(Segment {
                id: SegmentId(i as u16),
                dimension,
                grid_count,
                length: self.sizes[i],
                x_start,
                y_start,
                width,
                height,
                edge_index: y_start * whole_x + x_start,
                terminal,
            });
            x_start += nx;
        }

        let mut cells = vec![CellMeta::default(); total];
        mark_pml(&mut cells, whole_x, pml, &segments[last]);
        for (i, seg) in segments.iter().enumerate() {
            let prev = i.checked_sub(1).map(|p| &segments[p]);
            let next = segments.get(i + 1);
            for y in seg.y_range() {
                for x in seg.x_range() {
                    let cell = &mut cells[y * whole_x + x];
                    if cell.kind != CellKind::Empty {
                        continue;
                    }
                    if let Some(kind) = rule_kind(seg, prev, next, i == 0, x, y, center) {
                        cell.kind = kind;
                        cell.segment = Some(seg.id);
                    }
                }
            }
        }

        if let Some(hole) = self.tone_hole {
            apply_tone_hole(&mut cells, whole_x, whole_y, &segments, hole)?;
        }

        for cell in cells.iter_mut().filter(|c| c.kind == CellKind::Empty) {
            cell.kind = CellKind::Wall;
        }

        let junctions = pair_junctions(&cells, whole_x, center, &segments);
        let layout = GridLayout {
            whole_x,
            whole_y,
            pml_count: pml,
            segments,
            cells,
            junctions,
        };
        tracing::debug!(
            whole_x,
            whole_y,
            segments = layout.segments.len(),
            pml = layout.count(CellKind::Pml),
            junction_tubes = layout.junctions.tube_count(),
            "grid classified"
        );
        Ok(layout)
    }

    fn parse_dimensions(&self) -> Result<Vec<Dimensionality>, ConfigError> {
        if self.dimensions.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        if self.dimensions.len() != self.sizes.len() {
            return Err(ConfigError::MismatchedLengths {
                dimensions: self.dimensions.len(),
                sizes: self.sizes.len(),
            });
        }
        let dims = self
            .dimensions
            .iter()
            .enumerate()
            .map(|(segment, &dimension)| {
                Dimensionality::from_raw(dimension)
                    .ok_or(ConfigError::InvalidDimension { segment, dimension })
            })
            .collect::<Result<Vec<_>, _>>()?;
        match dims.last() {
            Some(Dimensionality::Two) => Ok(dims),
            _ => Err(ConfigError::TerminalSegmentNot2D {
                dimension: self.dimensions[self.dimensions.len() - 1],
            }),
        }
    }

    fn grid_counts(
        &self,
        segment: usize,
        dim: Dimensionality,
        lx: f32,
        ly: f32,
    ) -> Result<(usize, usize), ConfigError> {
        let nx = cell_count(lx, self.dx);
        if nx == 0 {
            return Err(ConfigError::ZeroLengthSegment { segment });
        }
        let ny = force_odd(cell_count(ly, self.dx));
        match dim {
            Dimensionality::Two if ny < 3 => Err(ConfigError::SegmentTooThin { segment, rows: ny }),
            Dimensionality::Two => Ok((nx, ny)),
            Dimensionality::One => Ok((nx, ny.max(1))),
        }
    }
}

fn cell_count(length: f32, dx: f32) -> usize {
    if !length.is_finite() || length <= 0.0 {
        return 0;
    }
    (length / dx + GRID_EPSILON).floor() as usize
}

fn force_odd(n: usize) -> usize {
    if n % 2 == 0 {
        n.saturating_sub(1)
    } else {
        n
    }
}

/// Mark the top, bottom and right bands of the terminal segment.
fn mark_pml(cells: &mut [CellMeta], whole_x: usize, pml: usize, seg: &Segment) {
    if pml == 0 {
        return;
    }
    let x_inner_end = seg.x_start + seg.grid_count.0;
    let x_outer = seg.x_start + seg.width - 1;
    let y_top_end = seg.y_start + pml;
    let y_bottom_start = seg.y_start + seg.height - pml;
    let y_outer = seg.y_start + seg.height - 1;
    for y in seg.y_range() {
        let ramp_y = if y < y_top_end {
            Some(pml_ramp(pml, y - seg.y_start))
        } else if y >= y_bottom_start {
            Some(pml_ramp(pml, y_outer - y))
        } else {
            None
        };
        for x in seg.x_range() {
            let ramp_x = (x >= x_inner_end).then(|| pml_ramp(pml, x_outer - x));
            let coefficient = match (ramp_x, ramp_y) {
                (None, None) => continue,
                (a, b) => a.unwrap_or(0.0).max(b.unwrap_or(0.0)),
            };
            cells[y * whole_x + x] = CellMeta {
                kind: CellKind::Pml,
                pml_coefficient: coefficient,
                segment: Some(seg.id),
            };
        }
    }
}

/// First-match rule table for a cell not claimed by the PML pass.
fn rule_kind(
    seg: &Segment,
    prev: Option<&Segment>,
    next: Option<&Segment>,
    first: bool,
    x: usize,
    y: usize,
    center: usize,
) -> Option<CellKind> {
    let first_col = x == seg.x_start;
    let last_col = x == seg.x_last_interior();
    match seg.dimension {
        Dimensionality::Two => {
            let top = seg.y_start;
            let bottom = seg.y_start + seg.height - 1;
            let near_tube = |tube: &Segment| y.abs_diff(center) <= tube.radial_half();
            let kind = if y == top || y == bottom {
                CellKind::Wall
            } else if first && first_col {
                CellKind::Exciter
            } else if first_col && prev.is_some_and(|p| is_tube(p) && near_tube(p)) {
                CellKind::Junction2DTo1DLeft
            } else if last_col && next.is_some_and(|n| is_tube(n) && near_tube(n)) {
                CellKind::Junction2DTo1DRight
            } else {
                CellKind::Normal2D
            };
            Some(kind)
        }
        Dimensionality::One if y != center => None,
        Dimensionality::One => {
            let kind = if first && first_col {
                CellKind::Exciter
            } else if first_col && prev.is_some_and(is_membrane) {
                CellKind::Junction1DTo2DLeft
            } else if last_col && next.is_some_and(is_membrane) {
                CellKind::Junction1DTo2DRight
            } else {
                CellKind::Normal1D
            };
            Some(kind)
        }
    }
}

fn is_tube(seg: &Segment) -> bool {
    seg.dimension == Dimensionality::One
}

fn is_membrane(seg: &Segment) -> bool {
    seg.dimension == Dimensionality::Two
}

/// Open carves the cell into its segment's normal kind; closed walls it.
/// Absorbing cells are left alone.
///
/// The cell must lie within the rows of the segment owning its column, so
/// a hole on a tube sits on the centre row and only blocks or unblocks the
/// bore.
fn apply_tone_hole(
    cells: &mut [CellMeta],
    whole_x: usize,
    whole_y: usize,
    segments: &[Segment],
    hole: ToneHole,
) -> Result<(), ConfigError> {
    if hole.x >= whole_x || hole.y >= whole_y {
        return Err(ConfigError::CellOutOfRange {
            what: "tone hole",
            x: hole.x,
            y: hole.y,
        });
    }
    let seg = segments
        .iter()
        .find(|s| s.contains_column(hole.x))
        .filter(|s| s.y_range().contains(&hole.y))
        .ok_or(ConfigError::ToneHoleOffSegment {
            x: hole.x,
            y: hole.y,
        })?;
    let cell = &mut cells[hole.y * whole_x + hole.x];
    if cell.kind == CellKind::Pml {
        return Ok(());
    }
    if !hole.open {
        cell.kind = CellKind::Wall;
        return Ok(());
    }
    if cell.kind != CellKind::Wall && cell.kind != CellKind::Empty {
        return Ok(());
    }
    cell.kind = match seg.dimension {
        Dimensionality::One => CellKind::Normal1D,
        Dimensionality::Two => CellKind::Normal2D,
    };
    cell.segment = Some(seg.id);
    Ok(())
}

/// Pair every 1D junction cell with the 2D junction column beside it.
///
/// The scan walks outward from the centre row and stops at the first cell
/// of the wrong kind or at the edge of the 2D segment.
fn pair_junctions(
    cells: &[CellMeta],
    whole_x: usize,
    center: usize,
    segments: &[Segment],
) -> Junctions {
    let mut junctions = Junctions::default();
    for (i, seg) in segments.iter().enumerate().filter(|(_, s)| is_tube(s)) {
        if let Some(prev) = i.checked_sub(1).map(|p| &segments[p]).filter(|p| is_membrane(p)) {
            let tube = center * whole_x + seg.x_start;
            if cells[tube].kind == CellKind::Junction1DTo2DLeft {
                let column = seg.x_start - 1;
                let pairs = scan_column(
                    cells,
                    whole_x,
                    center,
                    column,
                    prev,
                    CellKind::Junction2DTo1DRight,
                );
                junctions.pair_tube_left(tube, pairs);
            }
        }
        if let Some(next) = segments.get(i + 1).filter(|n| is_membrane(n)) {
            let tube = center * whole_x + seg.x_last_interior();
            if cells[tube].kind == CellKind::Junction1DTo2DRight {
                let pairs = scan_column(
                    cells,
                    whole_x,
                    center,
                    next.x_start,
                    next,
                    CellKind::Junction2DTo1DLeft,
                );
                junctions.pair_tube_right(tube, pairs);
            }
        }
    }
    junctions
}

fn scan_column(
    cells: &[CellMeta],
    whole_x: usize,
    center: usize,
    column: usize,
    membrane: &Segment,
    kind: CellKind,
) -> PairList {
    let rows = membrane.y_range();
    let matches = |y: &usize| cells[y * whole_x + column].kind == kind;
    let up = (rows.start..=center).rev().take_while(|y| matches(y));
    let down = (center + 1..rows.end).take_while(|y| matches(y));
    let mut pairs: PairList = up.chain(down).map(|y| y * whole_x + column).collect();
    pairs.sort_unstable();
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use CellKind::*;

    fn horn() -> GridLayout {
        classify(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)], 1.0, 1).unwrap()
    }

    #[test]
    fn horn_dimensions() {
        let g = horn();
        assert_eq!(g.whole_x(), 10);
        assert_eq!(g.whole_y(), 5);
        assert_eq!(g.whole_grid_count(), 50);
        assert_eq!(g.center_row(), 2);
        let nx_sum: usize = g.segments().iter().map(|s| s.grid_count.0).sum();
        assert_eq!(nx_sum + g.pml_count(), g.whole_x());
    }

    #[test]
    fn horn_cell_table() {
        const W: CellKind = Wall;
        const P: CellKind = Pml;
        const N: CellKind = Normal2D;
        #[rustfmt::skip]
        let expected = [
            W, W, W, W, W, W, P, P, P, P,
            W, W, W, W, W, W, N, N, N, P,
            Exciter, N, Junction2DTo1DRight, Junction1DTo2DLeft, Normal1D,
            Junction1DTo2DRight, Junction2DTo1DLeft, N, N, P,
            W, W, W, W, W, W, N, N, N, P,
            W, W, W, W, W, W, P, P, P, P,
        ];
        let kinds: Vec<_> = horn().kinds().collect();
        assert_eq!(kinds, expected);
    }

    #[test]
    fn horn_pml_coefficients() {
        let g = horn();
        for cell in g.cells() {
            match cell.kind {
                Pml => assert_eq!(cell.pml_coefficient, 0.5),
                _ => assert_eq!(cell.pml_coefficient, 0.0),
            }
        }
    }

    #[test]
    fn horn_junction_pairing() {
        let g = horn();
        let j = g.junctions();
        assert_eq!(j.tube_left(23), &[22]);
        assert_eq!(j.tube_right(25), &[26]);
        assert_eq!(j.membrane_right(22), Some(23));
        assert_eq!(j.membrane_left(26), Some(25));
        assert_eq!(j.membrane_left(16), None);
    }

    #[test]
    fn horn_segments_are_centred() {
        let g = horn();
        let s = g.segments();
        assert_eq!((s[0].x_start, s[0].y_start, s[0].height), (0, 1, 3));
        assert_eq!((s[1].x_start, s[1].y_start, s[1].height), (3, 2, 1));
        assert_eq!((s[2].x_start, s[2].y_start, s[2].height), (6, 0, 5));
        assert_eq!(s[2].width, 4);
        assert_eq!(s[2].edge_index, 6);
        assert!(s[2].terminal);
    }

    #[test]
    fn default_listener_sits_before_pml() {
        let g = horn();
        assert_eq!(g.default_listener(), 2 * 10 + 8);
    }

    #[test]
    fn wide_tube_pairs_several_rows() {
        let g = classify(&[2, 1, 2], &[(2.0, 7.0), (2.0, 3.0), (2.0, 7.0)], 1.0, 0).unwrap();
        assert_eq!(g.whole_y(), 7);
        let c = g.center_row();
        let w = g.whole_x();
        let left = c * w + 2;
        let expected: Vec<usize> = (c - 1..=c + 1).map(|y| y * w + 1).collect();
        assert_eq!(g.junctions().tube_left(left), expected.as_slice());
        for &cell in &expected {
            assert_eq!(g.kind(cell), Junction2DTo1DRight);
            assert_eq!(g.junctions().membrane_right(cell), Some(left));
        }
    }

    #[test]
    fn tube_to_tube_boundary_stays_normal() {
        let g = classify(&[1, 1, 2], &[(2.0, 1.0), (2.0, 1.0), (2.0, 3.0)], 1.0, 0).unwrap();
        let c = g.center_row() * g.whole_x();
        let row: Vec<_> = (0..4).map(|x| g.kind(c + x)).collect();
        assert_eq!(row, [Exciter, Normal1D, Normal1D, Junction1DTo2DRight]);
    }

    #[test]
    fn no_empty_cells_remain() {
        let g = classify(&[1, 2, 1, 2], &[(4.0, 1.0), (3.0, 9.0), (5.0, 1.0), (6.0, 5.0)], 1.0, 2)
            .unwrap();
        assert_eq!(g.count(Empty), 0);
    }

    #[test]
    fn closed_tone_hole_walls_cell() {
        let g = Classifier::new(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)])
            .pml_count(1)
            .tone_hole(Some(ToneHole { x: 4, y: 2, open: false }))
            .classify()
            .unwrap();
        assert_eq!(g.kind(24), Wall);
    }

    #[test]
    fn open_tone_hole_carves_segment_kind() {
        let g = Classifier::new(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)])
            .pml_count(1)
            .tone_hole(Some(ToneHole { x: 1, y: 1, open: true }))
            .classify()
            .unwrap();
        assert_eq!(g.kind(11), Normal2D);
        assert_eq!(g.cells()[11].segment, Some(SegmentId(0)));
    }

    #[test]
    fn open_tone_hole_on_tube_axis_keeps_the_bore() {
        let g = Classifier::new(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)])
            .pml_count(1)
            .tone_hole(Some(ToneHole { x: 4, y: 2, open: true }))
            .classify()
            .unwrap();
        assert_eq!(g, horn());
    }

    #[test]
    fn tone_hole_beside_a_tube_is_rejected() {
        for open in [true, false] {
            let err = Classifier::new(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)])
                .pml_count(1)
                .tone_hole(Some(ToneHole { x: 4, y: 1, open }))
                .classify()
                .unwrap_err();
            assert_eq!(err, ConfigError::ToneHoleOffSegment { x: 4, y: 1 });
        }
    }

    #[test]
    fn tone_hole_above_a_short_membrane_is_rejected() {
        let err = Classifier::new(&[2, 1, 2], &[(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)])
            .pml_count(1)
            .tone_hole(Some(ToneHole { x: 1, y: 0, open: true }))
            .classify()
            .unwrap_err();
        assert_eq!(err, ConfigError::ToneHoleOffSegment { x: 1, y: 0 });
    }

    #[test]
    fn tone_hole_out_of_range() {
        let err = Classifier::new(&[2], &[(3.0, 3.0)])
            .tone_hole(Some(ToneHole { x: 40, y: 0, open: true }))
            .classify()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::CellOutOfRange {
                what: "tone hole",
                x: 40,
                y: 0
            }
        );
    }

    #[test]
    fn rejects_terminal_tube() {
        let err = classify(&[2, 1], &[(3.0, 3.0), (3.0, 1.0)], 1.0, 0).unwrap_err();
        assert_eq!(err, ConfigError::TerminalSegmentNot2D { dimension: 1 });
    }

    #[test]
    fn rejects_invalid_dimension() {
        let err = classify(&[2, 3, 2], &[(3.0, 3.0); 3], 1.0, 0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDimension {
                segment: 1,
                dimension: 3
            }
        );
    }

    #[test]
    fn rejects_zero_length_and_thin_segments() {
        assert_eq!(
            classify(&[2, 2], &[(0.5, 3.0), (3.0, 3.0)], 1.0, 0).unwrap_err(),
            ConfigError::ZeroLengthSegment { segment: 0 }
        );
        assert_eq!(
            classify(&[2, 2], &[(3.0, 2.0), (3.0, 3.0)], 1.0, 0).unwrap_err(),
            ConfigError::SegmentTooThin {
                segment: 0,
                rows: 1
            }
        );
    }

    #[test]
    fn rejects_cell_count_overflow() {
        let wide = classify(&[2, 2], &[(1e20, 3.0), (3.0, 3.0)], 1.0, 2).unwrap_err();
        assert_eq!(wide, ConfigError::CellCountOverflow);
        let area = classify(&[2, 2], &[(1e10, 3.0), (3.0, 1e10)], 1.0, 0).unwrap_err();
        assert_eq!(area, ConfigError::CellCountOverflow);
        let band = classify(&[2], &[(3.0, 3.0)], 1.0, usize::MAX / 2 + 1).unwrap_err();
        assert_eq!(band, ConfigError::CellCountOverflow);
    }

    #[test]
    fn rejects_mismatched_and_empty() {
        assert_eq!(classify(&[], &[], 1.0, 0).unwrap_err(), ConfigError::EmptyLayout);
        assert!(matches!(
            classify(&[2, 2], &[(3.0, 3.0)], 1.0, 0),
            Err(ConfigError::MismatchedLengths { .. })
        ));
    }

    #[test]
    fn pml_ramp_falls_inward() {
        let g = classify(&[2], &[(6.0, 5.0)], 1.0, 3).unwrap();
        let c = g.center_row();
        let w = g.whole_x();
        let right: Vec<f32> = (6..9).map(|x| g.cells()[c * w + x].pml_coefficient).collect();
        assert!((right[0] - 1.0 / 6.0).abs() < 1e-6);
        assert!((right[1] - 2.0 / 6.0).abs() < 1e-6);
        assert_eq!(right[2], 0.5);
        // Corner cells take the stronger of the two axes.
        assert_eq!(g.cells()[w - 1].pml_coefficient, 0.5);
        assert!((g.cells()[w + 6].pml_coefficient - 1.0 / 3.0).abs() < 1e-6);
    }

    fn layout_strategy() -> impl Strategy<Value = (Vec<u32>, Vec<(f32, f32)>, usize)> {
        (
            prop::collection::vec((1u32..=2, 1u32..8, 3u32..12), 0..4),
            (1u32..8, 3u32..12),
            0usize..4,
        )
            .prop_map(|(head, (lx, ly), pml)| {
                let mut dims: Vec<u32> = head.iter().map(|&(d, _, _)| d).collect();
                let mut sizes: Vec<(f32, f32)> = head
                    .iter()
                    .map(|&(d, lx, ly)| (lx as f32, if d == 1 { 1.0 } else { ly as f32 }))
                    .collect();
                dims.push(2);
                sizes.push((lx as f32, ly as f32));
                (dims, sizes, pml)
            })
    }

    proptest! {
        #[test]
        fn classification_is_deterministic((dims, sizes, pml) in layout_strategy()) {
            let a = classify(&dims, &sizes, 1.0, pml).unwrap();
            let b = classify(&dims, &sizes, 1.0, pml).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn every_cell_is_classified((dims, sizes, pml) in layout_strategy()) {
            let g = classify(&dims, &sizes, 1.0, pml).unwrap();
            prop_assert_eq!(g.count(Empty), 0);
            prop_assert_eq!(g.whole_y() % 2, 1);
            let nx: usize = g.segments().iter().map(|s| s.grid_count.0).sum();
            prop_assert_eq!(nx + pml, g.whole_x());
            prop_assert!(g.count(Exciter) > 0);
        }

        #[test]
        fn pml_coefficients_in_range((dims, sizes, pml) in layout_strategy()) {
            let g = classify(&dims, &sizes, 1.0, pml).unwrap();
            for cell in g.cells() {
                if cell.kind == Pml {
                    prop_assert!(cell.pml_coefficient > 0.0 && cell.pml_coefficient <= 0.5);
                } else {
                    prop_assert_eq!(cell.pml_coefficient, 0.0);
                }
            }
        }
    }
}
