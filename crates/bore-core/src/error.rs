//! Error types for the bore engine.
//!
//! Construction-time problems surface as [`ConfigError`] and abandon the
//! requested (re)build; sub-step problems surface as [`StepError`] at the
//! `step` call boundary so a host can freeze the field instead of crashing.

use std::error::Error;
use std::fmt;

use crate::cell::CellKind;

/// Errors detected while validating a configuration or classifying a grid.
#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    /// No segments were declared.
    EmptyLayout,
    /// `segment_dimensions` and `segment_sizes` have different lengths.
    MismatchedLengths {
        /// Number of declared dimensions.
        dimensions: usize,
        /// Number of declared sizes.
        sizes: usize,
    },
    /// A segment declared a dimensionality other than 1 or 2.
    InvalidDimension {
        /// Index of the offending segment.
        segment: usize,
        /// The declared dimensionality.
        dimension: u32,
    },
    /// The last segment must be 2D: it carries the PML border.
    TerminalSegmentNot2D {
        /// The declared dimensionality of the last segment.
        dimension: u32,
    },
    /// A segment is shorter than one grid cell along x.
    ZeroLengthSegment {
        /// Index of the offending segment.
        segment: usize,
    },
    /// A 2D segment has fewer than three rows, leaving no interior row
    /// between its walls.
    SegmentTooThin {
        /// Index of the offending segment.
        segment: usize,
        /// Row count after forcing it odd.
        rows: usize,
    },
    /// A physical constant is NaN, infinite, zero or negative.
    InvalidConstant {
        /// Name of the constant.
        name: &'static str,
        /// The rejected value.
        value: f32,
    },
    /// `update_per_frame` must be at least 1.
    UpdatePerFrameZero,
    /// Frame buffering needs 2 or 3 copies.
    InvalidFrameCount {
        /// The configured count.
        configured: usize,
    },
    /// A configured cell coordinate lies outside the grid.
    CellOutOfRange {
        /// What the coordinate designates (listener, tone hole, ...).
        what: &'static str,
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// The tone hole sits outside the rows of the segment owning its column.
    /// A tube owns only its centre row.
    ToneHoleOffSegment {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },
    /// The whole grid has more cells than `usize` can count.
    CellCountOverflow,
    /// A rebuild was requested while a previous one is still constructing.
    RebuildInProgress,
    /// A tone-hole toggle was requested but the layout declares none.
    NoToneHole,
    /// A background thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the spawn failure.
        reason: String,
    },
    /// The sound extractor configuration is unusable.
    InvalidSoundConfig {
        /// Description of the problem.
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyLayout => write!(f, "layout declares no segments"),
            Self::MismatchedLengths { dimensions, sizes } => write!(
                f,
                "segment_dimensions has {dimensions} entries but segment_sizes has {sizes}"
            ),
            Self::InvalidDimension { segment, dimension } => write!(
                f,
                "segment {segment} declares dimensionality {dimension}, expected 1 or 2"
            ),
            Self::TerminalSegmentNot2D { dimension } => write!(
                f,
                "terminal segment must be 2D, got dimensionality {dimension}"
            ),
            Self::ZeroLengthSegment { segment } => {
                write!(f, "segment {segment} is shorter than one grid cell")
            }
            Self::SegmentTooThin { segment, rows } => write!(
                f,
                "2D segment {segment} has {rows} rows, needs at least 3"
            ),
            Self::InvalidConstant { name, value } => {
                write!(f, "{name} must be finite and positive, got {value}")
            }
            Self::UpdatePerFrameZero => write!(f, "update_per_frame must be at least 1"),
            Self::InvalidFrameCount { configured } => {
                write!(f, "frame_count must be 2 or 3, got {configured}")
            }
            Self::CellOutOfRange { what, x, y } => {
                write!(f, "{what} cell ({x}, {y}) lies outside the grid")
            }
            Self::ToneHoleOffSegment { x, y } => {
                write!(f, "tone hole cell ({x}, {y}) lies outside the rows of its segment")
            }
            Self::CellCountOverflow => write!(f, "grid cell count overflows usize"),
            Self::RebuildInProgress => {
                write!(f, "a rebuild is already constructing; request rejected")
            }
            Self::NoToneHole => write!(f, "layout declares no tone hole"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::InvalidSoundConfig { reason } => write!(f, "invalid sound config: {reason}"),
        }
    }
}

impl Error for ConfigError {}

/// Errors from the time-step engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StepError {
    /// A cell carries a kind with no update rule. Indicates a classifier
    /// bug; the sub-step is aborted before any state is touched.
    UnsupportedCellKind {
        /// Flat index of the offending cell.
        index: usize,
        /// The kind found there.
        kind: CellKind,
    },
    /// The field was frozen by an earlier failure and no longer steps.
    FieldFrozen,
}

impl fmt::Display for StepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedCellKind { index, kind } => {
                write!(f, "cell {index} has unsupported kind {kind}")
            }
            Self::FieldFrozen => write!(f, "field is frozen after an earlier step failure"),
        }
    }
}

impl Error for StepError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_segment() {
        let e = ConfigError::InvalidDimension {
            segment: 2,
            dimension: 3,
        };
        assert_eq!(
            e.to_string(),
            "segment 2 declares dimensionality 3, expected 1 or 2"
        );
    }

    #[test]
    fn unsupported_kind_display() {
        let e = StepError::UnsupportedCellKind {
            index: 7,
            kind: CellKind::Empty,
        };
        assert_eq!(e.to_string(), "cell 7 has unsupported kind EMPTY");
    }
}
