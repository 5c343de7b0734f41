//! Field construction input.
//!
//! [`FieldConfig`] is everything the grid classifier and the field store
//! need to build one field instance. [`validate()`](FieldConfig::validate)
//! checks the cheap structural invariants; the classifier re-checks the
//! geometric ones once `dx` has been applied.

use crate::cell::Dimensionality;
use crate::error::ConfigError;

/// A tone hole: one grid cell whose wall/open classification is toggled.
///
/// When `open`, the cell is carved out of whatever wall the classifier
/// would have placed there and takes its segment's normal kind. When
/// closed, the cell is forced to a wall. Coordinates are absolute grid
/// coordinates (column, row).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ToneHole {
    /// Column.
    pub x: usize,
    /// Row.
    pub y: usize,
    /// Whether the hole is uncovered.
    pub open: bool,
}

/// Complete description of one field instance.
///
/// All lengths are in metres, `dt` in seconds. The Courant condition
/// (`sound_speed * dt / dx <= 1/sqrt(2)` for 2D segments) is a documented
/// precondition and is not checked.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldConfig {
    /// Dimensionality (1 or 2) of each segment, left to right.
    pub segment_dimensions: Vec<u32>,
    /// Physical `(length_x, length_y)` of each segment.
    pub segment_sizes: Vec<(f32, f32)>,
    /// Sub-step duration in seconds.
    pub dt: f32,
    /// Grid spacing in metres.
    pub dx: f32,
    /// Medium density in kg/m³.
    pub rho: f32,
    /// Speed of sound in m/s.
    pub sound_speed: f32,
    /// Thickness of the absorbing border, in cells.
    pub pml_count: usize,
    /// Leapfrog sub-steps per render tick.
    pub update_per_frame: u32,
    /// Optional tone hole override.
    pub tone_hole: Option<ToneHole>,
    /// Listener cell `(x, y)`. `None` picks the centre row at the last
    /// interior column before the PML band.
    pub listener: Option<(usize, usize)>,
}

impl Default for FieldConfig {
    /// A small 2D–1D–2D horn sampled at 128 kHz.
    fn default() -> Self {
        Self {
            segment_dimensions: vec![2, 1, 2],
            segment_sizes: vec![(0.02, 0.02), (0.30, 0.01), (0.10, 0.10)],
            dt: 1.0 / 128_000.0,
            dx: 0.005,
            rho: 1.1,
            sound_speed: 340.0,
            pml_count: 6,
            update_per_frame: 128_000 / 30,
            tone_hole: None,
            listener: None,
        }
    }
}

impl FieldConfig {
    /// Velocity update factor `dt / rho`.
    pub fn v_fac(&self) -> f32 {
        self.dt / self.rho
    }

    /// Pressure update factor `dt * rho * c²`.
    pub fn p_fac(&self) -> f32 {
        self.dt * self.rho * self.sound_speed * self.sound_speed
    }

    /// Native sample rate of the sub-step clock, `1 / dt`.
    pub fn native_rate(&self) -> f64 {
        1.0 / self.dt as f64
    }

    /// Parse the declared dimensionalities.
    ///
    /// Fails on the first segment whose dimensionality is not 1 or 2, or
    /// when the terminal segment is not 2D.
    pub fn dimensionalities(&self) -> Result<Vec<Dimensionality>, ConfigError> {
        let dims = self
            .segment_dimensions
            .iter()
            .enumerate()
            .map(|(segment, &dimension)| {
                Dimensionality::from_raw(dimension)
                    .ok_or(ConfigError::InvalidDimension { segment, dimension })
            })
            .collect::<Result<Vec<_>, _>>()?;
        match self.segment_dimensions.last() {
            None => Err(ConfigError::EmptyLayout),
            Some(&2) => Ok(dims),
            Some(&dimension) => Err(ConfigError::TerminalSegmentNot2D { dimension }),
        }
    }

    /// Validate the structural invariants that do not depend on `dx`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segment_dimensions.is_empty() {
            return Err(ConfigError::EmptyLayout);
        }
        if self.segment_dimensions.len() != self.segment_sizes.len() {
            return Err(ConfigError::MismatchedLengths {
                dimensions: self.segment_dimensions.len(),
                sizes: self.segment_sizes.len(),
            });
        }
        self.dimensionalities()?;
        for (name, value) in [
            ("dt", self.dt),
            ("dx", self.dx),
            ("rho", self.rho),
            ("sound_speed", self.sound_speed),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidConstant { name, value });
            }
        }
        for (segment, &(lx, ly)) in self.segment_sizes.iter().enumerate() {
            if !lx.is_finite() || !ly.is_finite() || lx <= 0.0 || ly < 0.0 {
                return Err(ConfigError::ZeroLengthSegment { segment });
            }
        }
        if self.update_per_frame == 0 {
            return Err(ConfigError::UpdatePerFrameZero);
        }
        Ok(())
    }
}
