//! Structure-of-arrays field state.

use bore_core::{ConfigError, FieldConfig, StepError, SubStep};
use bore_grid::{Classifier, GridLayout};

use crate::rules::{rule_for, CellRule, PressurePass, SweepContext, VelocityPass};

/// Update factors folded with the grid spacing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Coefficients {
    /// Velocity factor `dt / (rho · dx)`.
    pub kv: f32,
    /// Pressure factor `dt · rho · c² / dx`.
    pub kp: f32,
    /// Sub-step length in seconds.
    pub dt: f32,
}

impl Coefficients {
    /// Derive the factors from a field configuration.
    pub fn from_config(config: &FieldConfig) -> Self {
        Self {
            kv: config.v_fac() / config.dx,
            kp: config.p_fac() / config.dx,
            dt: config.dt,
        }
    }
}

/// Simulation state of one classified grid.
///
/// Pressure lives at cell centres. `vx[i]` is the velocity on the face
/// between cell `i` and its right neighbour, `vy[i]` on the face between
/// cell `i` and the cell one row up (`i + whole_x`).
#[derive(Debug)]
pub struct Field {
    layout: GridLayout,
    coefficients: Coefficients,
    pub(crate) pressure: Vec<f32>,
    pub(crate) vx: Vec<f32>,
    pub(crate) vy: Vec<f32>,
    pub(crate) rules: Result<Vec<&'static dyn CellRule>, StepError>,
    pub(crate) sub_step: SubStep,
    pub(crate) frozen: bool,
    listener: usize,
}

impl Field {
    /// Allocate a zeroed field over `layout`.
    ///
    /// A layout containing a kind with no update rule is accepted here;
    /// stepping it fails with [`StepError::UnsupportedCellKind`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::CellOutOfRange`] if `listener` is not a cell
    /// of the layout.
    pub fn new(
        layout: GridLayout,
        coefficients: Coefficients,
        listener: usize,
    ) -> Result<Self, ConfigError> {
        let n = layout.whole_grid_count();
        if listener >= n {
            let (x, y) = (listener % layout.whole_x(), listener / layout.whole_x());
            return Err(ConfigError::CellOutOfRange {
                what: "listener",
                x,
                y,
            });
        }
        let rules = layout
            .kinds()
            .enumerate()
            .map(|(index, kind)| rule_for(kind).ok_or(StepError::UnsupportedCellKind { index, kind }))
            .collect();
        Ok(Self {
            layout,
            coefficients,
            pressure: vec![0.0; n],
            vx: vec![0.0; n],
            vy: vec![0.0; n],
            rules,
            sub_step: SubStep(0),
            frozen: false,
            listener,
        })
    }

    /// Validate `config`, classify its layout and allocate the field.
    pub fn from_config(config: &FieldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = Classifier::from_config(config).classify()?;
        let listener = match config.listener {
            Some((x, y)) => layout.index(x, y).ok_or(ConfigError::CellOutOfRange {
                what: "listener",
                x,
                y,
            })?,
            None => layout.default_listener(),
        };
        Self::new(layout, Coefficients::from_config(config), listener)
    }

    /// The classified grid.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// Update factors.
    pub fn coefficients(&self) -> Coefficients {
        self.coefficients
    }

    /// Cell count.
    pub fn len(&self) -> usize {
        self.pressure.len()
    }

    /// Whether the field has no cells.
    pub fn is_empty(&self) -> bool {
        self.pressure.is_empty()
    }

    /// Pressure at every cell, row-major.
    pub fn pressure(&self) -> &[f32] {
        &self.pressure
    }

    /// Mutable pressure, for seeding initial conditions.
    pub fn pressure_mut(&mut self) -> &mut [f32] {
        &mut self.pressure
    }

    /// x-face velocities.
    pub fn velocity_x(&self) -> &[f32] {
        &self.vx
    }

    /// y-face velocities.
    pub fn velocity_y(&self) -> &[f32] {
        &self.vy
    }

    /// Listener cell index.
    pub fn listener(&self) -> usize {
        self.listener
    }

    /// Pressure at the listener cell.
    pub fn listener_pressure(&self) -> f32 {
        self.pressure[self.listener]
    }

    /// Sub-steps completed.
    pub fn sub_step(&self) -> SubStep {
        self.sub_step
    }

    /// Whether a step failure froze this field.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// The first unsupported cell, if any.
    pub fn unsupported_cell(&self) -> Option<&StepError> {
        self.rules.as_ref().err()
    }

    pub(crate) fn sweep_velocity(&mut self, drive: f32) -> Result<(), StepError> {
        let Self {
            layout,
            coefficients,
            pressure,
            vx,
            vy,
            rules,
            ..
        } = self;
        let rules = rules.as_ref().map_err(Clone::clone)?;
        let cx = context(layout, coefficients, drive);
        let mut pass = VelocityPass {
            p: pressure.as_slice(),
            vx: vx.as_mut_slice(),
            vy: vy.as_mut_slice(),
        };
        for (i, rule) in rules.iter().enumerate() {
            rule.velocity(&cx, i, &mut pass);
        }
        Ok(())
    }

    pub(crate) fn sweep_pressure(&mut self) -> Result<(), StepError> {
        let Self {
            layout,
            coefficients,
            pressure,
            vx,
            vy,
            rules,
            ..
        } = self;
        let rules = rules.as_ref().map_err(Clone::clone)?;
        let cx = context(layout, coefficients, 0.0);
        let mut pass = PressurePass {
            p: pressure.as_mut_slice(),
            vx: vx.as_slice(),
            vy: vy.as_slice(),
        };
        for (i, rule) in rules.iter().enumerate() {
            rule.pressure(&cx, i, &mut pass);
        }
        Ok(())
    }
}

fn context<'a>(layout: &'a GridLayout, k: &Coefficients, drive: f32) -> SweepContext<'a> {
    SweepContext {
        cells: layout.cells(),
        junctions: layout.junctions(),
        whole_x: layout.whole_x(),
        kv: k.kv,
        kp: k.kp,
        drive,
    }
}
