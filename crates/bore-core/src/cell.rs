//! Cell classification vocabulary.

use std::fmt;

/// Topological dimensionality of a segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Dimensionality {
    /// A 1D tube: one active row, one velocity component.
    One,
    /// A 2D membrane: every interior row active, two velocity components.
    Two,
}

impl Dimensionality {
    /// Parse a raw dimension number. Only `1` and `2` are valid.
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }

    /// The dimension as a number.
    pub fn get(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }
}

impl fmt::Display for Dimensionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.get())
    }
}

/// The update rule selector for a single grid cell.
///
/// Assigned once by the grid classifier; the time-step engine dispatches
/// on it every sweep. `Empty` only exists while a layout is being built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(u8)]
pub enum CellKind {
    /// Unclassified. Never valid in a finished layout.
    #[default]
    Empty = 0,
    /// Interior cell of a 1D tube.
    Normal1D = 1,
    /// Interior cell of a 2D membrane.
    Normal2D = 2,
    /// Rigid boundary: velocity and pressure stay zero.
    Wall = 3,
    /// Driven boundary: velocity follows the excitation waveform.
    Exciter = 4,
    /// Absorbing boundary layer with a depth-dependent damping coefficient.
    Pml = 5,
    /// First cell of a 1D tube, fed by the preceding 2D segment.
    Junction1DTo2DLeft = 6,
    /// Last cell of a 1D tube, feeding the following 2D segment.
    Junction1DTo2DRight = 7,
    /// Last-column cell of a 2D segment that drains into a following 1D tube.
    Junction2DTo1DRight = 8,
    /// First-column cell of a 2D segment fed by a preceding 1D tube.
    Junction2DTo1DLeft = 9,
}

impl CellKind {
    /// Every kind, in discriminant order.
    pub const ALL: [CellKind; 10] = [
        CellKind::Empty,
        CellKind::Normal1D,
        CellKind::Normal2D,
        CellKind::Wall,
        CellKind::Exciter,
        CellKind::Pml,
        CellKind::Junction1DTo2DLeft,
        CellKind::Junction1DTo2DRight,
        CellKind::Junction2DTo1DRight,
        CellKind::Junction2DTo1DLeft,
    ];

    /// Short stable name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::Normal1D => "NORMAL_1D",
            Self::Normal2D => "NORMAL_2D",
            Self::Wall => "WALL",
            Self::Exciter => "EXCITER",
            Self::Pml => "PML",
            Self::Junction1DTo2DLeft => "JUNCTION_1D_TO_2D_LEFT",
            Self::Junction1DTo2DRight => "JUNCTION_1D_TO_2D_RIGHT",
            Self::Junction2DTo1DRight => "JUNCTION_2D_TO_1D_RIGHT",
            Self::Junction2DTo1DLeft => "JUNCTION_2D_TO_1D_LEFT",
        }
    }

    /// Whether this cell belongs to a 1D tube.
    pub fn is_tube(self) -> bool {
        matches!(
            self,
            Self::Normal1D | Self::Junction1DTo2DLeft | Self::Junction1DTo2DRight
        )
    }

    /// Whether waves can enter this cell. Walls and unclassified cells are closed.
    pub fn is_open(self) -> bool {
        !matches!(self, Self::Wall | Self::Empty)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_discriminant_order() {
        for (i, kind) in CellKind::ALL.iter().enumerate() {
            assert_eq!(*kind as u8 as usize, i);
        }
    }

    #[test]
    fn default_is_empty() {
        assert_eq!(CellKind::default(), CellKind::Empty);
        assert!(!CellKind::Empty.is_open());
        assert!(!CellKind::Wall.is_open());
        assert!(CellKind::Pml.is_open());
    }

    #[test]
    fn dimensionality_parses_only_one_and_two() {
        assert_eq!(Dimensionality::from_raw(1), Some(Dimensionality::One));
        assert_eq!(Dimensionality::from_raw(2), Some(Dimensionality::Two));
        assert_eq!(Dimensionality::from_raw(0), None);
        assert_eq!(Dimensionality::from_raw(3), None);
    }

    #[test]
    fn tube_kinds() {
        assert!(CellKind::Normal1D.is_tube());
        assert!(CellKind::Junction1DTo2DRight.is_tube());
        assert!(!CellKind::Junction2DTo1DLeft.is_tube());
        assert!(!CellKind::Exciter.is_tube());
    }
}
