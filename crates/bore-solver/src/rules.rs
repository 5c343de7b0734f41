//! Per-kind update rules.
//!
//! Each [`CellKind`] with an update rule has one [`CellRule`] implementation
//! carrying both its velocity and pressure forms. [`rule_for`] is the only
//! dispatch point; [`CellKind::Empty`] has no rule.
//!
//! Every rule writes only the cell it is given. A face is open when the
//! neighbour across it exists and is not a wall; a closed face carries
//! zero velocity.

use std::fmt;

use bore_core::CellKind;
use bore_grid::{CellMeta, Junctions};

/// Read-only inputs to a sweep.
#[derive(Clone, Copy, Debug)]
pub struct SweepContext<'a> {
    /// Per-cell classification.
    pub cells: &'a [CellMeta],
    /// Junction pairing tables.
    pub junctions: &'a Junctions,
    /// Row length.
    pub whole_x: usize,
    /// Velocity factor.
    pub kv: f32,
    /// Pressure factor.
    pub kp: f32,
    /// Exciter velocity for this sub-step.
    pub drive: f32,
}

impl SweepContext<'_> {
    fn right(&self, i: usize) -> Option<usize> {
        (i % self.whole_x + 1 < self.whole_x).then_some(i + 1)
    }

    fn left(&self, i: usize) -> Option<usize> {
        (i % self.whole_x > 0).then(|| i - 1)
    }

    fn next_row(&self, i: usize) -> Option<usize> {
        let j = i + self.whole_x;
        (j < self.cells.len()).then_some(j)
    }

    fn prev_row(&self, i: usize) -> Option<usize> {
        i.checked_sub(self.whole_x)
    }

    fn open(&self, j: usize) -> bool {
        self.cells[j].kind.is_open()
    }

    fn open_right(&self, i: usize) -> Option<usize> {
        self.right(i).filter(|&j| self.open(j))
    }

    fn open_next_row(&self, i: usize) -> Option<usize> {
        self.next_row(i).filter(|&j| self.open(j))
    }
}

/// Velocity sweep view: pressure is read-only.
#[derive(Debug)]
pub struct VelocityPass<'a> {
    /// Pressure at step `n`.
    pub p: &'a [f32],
    /// x-face velocity, updated to `n + 1/2`.
    pub vx: &'a mut [f32],
    /// y-face velocity, updated to `n + 1/2`.
    pub vy: &'a mut [f32],
}

/// Pressure sweep view: velocity is read-only.
#[derive(Debug)]
pub struct PressurePass<'a> {
    /// Pressure, updated to `n + 1`.
    pub p: &'a mut [f32],
    /// x-face velocity at `n + 1/2`.
    pub vx: &'a [f32],
    /// y-face velocity at `n + 1/2`.
    pub vy: &'a [f32],
}

impl PressurePass<'_> {
    fn prev_vx(&self, cx: &SweepContext<'_>, i: usize) -> f32 {
        cx.left(i).map_or(0.0, |l| self.vx[l])
    }

    fn prev_vy(&self, cx: &SweepContext<'_>, i: usize) -> f32 {
        cx.prev_row(i).map_or(0.0, |d| self.vy[d])
    }

    /// `(vx - inflow_x) + (vy - vy_prev)`.
    fn divergence_2d(&self, cx: &SweepContext<'_>, i: usize, inflow_x: f32) -> f32 {
        (self.vx[i] - inflow_x) + (self.vy[i] - self.prev_vy(cx, i))
    }
}

/// Velocity and pressure update for one cell kind.
pub trait CellRule: fmt::Debug + Sync {
    /// Kind name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Update the face velocities owned by cell `i`.
    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>);

    /// Update the pressure of cell `i`.
    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>);
}

/// The rule for `kind`, or `None` if the kind has no update rule.
pub fn rule_for(kind: CellKind) -> Option<&'static dyn CellRule> {
    match kind {
        CellKind::Empty => None,
        CellKind::Normal1D => Some(&Normal1D),
        CellKind::Normal2D => Some(&Normal2D),
        CellKind::Wall => Some(&Wall),
        CellKind::Exciter => Some(&Exciter),
        CellKind::Pml => Some(&Pml),
        CellKind::Junction1DTo2DLeft => Some(&TubeEntry),
        CellKind::Junction1DTo2DRight => Some(&TubeExit),
        CellKind::Junction2DTo1DRight => Some(&MembraneDrain),
        CellKind::Junction2DTo1DLeft => Some(&MembraneFeed),
    }
}

// ── Shared forms ────────────────────────────────────────────────

fn tube_velocity(cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
    pass.vx[i] = match cx.open_right(i) {
        Some(r) => pass.vx[i] - cx.kv * (pass.p[r] - pass.p[i]),
        None => 0.0,
    };
}

fn tube_pressure(cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
    let div = pass.vx[i] - pass.prev_vx(cx, i);
    pass.p[i] -= cx.kp * div;
}

fn membrane_vy(cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
    pass.vy[i] = match cx.open_next_row(i) {
        Some(u) => pass.vy[i] - cx.kv * (pass.p[u] - pass.p[i]),
        None => 0.0,
    };
}

fn membrane_velocity(cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
    tube_velocity(cx, i, pass);
    membrane_vy(cx, i, pass);
}

fn membrane_pressure(cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
    let inflow = pass.prev_vx(cx, i);
    pass.p[i] -= cx.kp * pass.divergence_2d(cx, i, inflow);
}

/// Mean over `cells` of `values`, with the denominator floored to 1.
fn mean_over(values: &[f32], cells: &[usize]) -> f32 {
    let sum: f32 = cells.iter().map(|&c| values[c]).sum();
    sum / cells.len().max(1) as f32
}

// ── Rules ───────────────────────────────────────────────────────

/// Interior tube cell.
#[derive(Debug)]
struct Normal1D;

impl CellRule for Normal1D {
    fn name(&self) -> &'static str {
        "NORMAL_1D"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        tube_velocity(cx, i, pass);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        tube_pressure(cx, i, pass);
    }
}

/// Interior membrane cell.
#[derive(Debug)]
struct Normal2D;

impl CellRule for Normal2D {
    fn name(&self) -> &'static str {
        "NORMAL_2D"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        membrane_velocity(cx, i, pass);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        membrane_pressure(cx, i, pass);
    }
}

#[derive(Debug)]
struct Wall;

impl CellRule for Wall {
    fn name(&self) -> &'static str {
        "WALL"
    }

    fn velocity(&self, _: &SweepContext<'_>, _: usize, _: &mut VelocityPass<'_>) {}

    fn pressure(&self, _: &SweepContext<'_>, _: usize, _: &mut PressurePass<'_>) {}
}

/// Driven boundary: x velocity is imposed, not integrated, and nothing
/// flows in from the left. The y faces behave like a membrane cell's in
/// both updates; at the head of a tube the walls above and below keep
/// them at zero.
#[derive(Debug)]
struct Exciter;

impl CellRule for Exciter {
    fn name(&self) -> &'static str {
        "EXCITER"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        pass.vx[i] = cx.drive;
        membrane_vy(cx, i, pass);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        pass.p[i] -= cx.kp * pass.divergence_2d(cx, i, 0.0);
    }
}

/// Absorbing layer. A missing neighbour at the grid border reads as zero
/// pressure; both updates are divided by `1 + coefficient`.
#[derive(Debug)]
struct Pml;

impl Pml {
    fn face(cx: &SweepContext<'_>, i: usize, next: Option<usize>, v: f32, p: &[f32]) -> f32 {
        match next {
            None => v + cx.kv * p[i],
            Some(j) if cx.open(j) => v - cx.kv * (p[j] - p[i]),
            Some(_) => 0.0,
        }
    }
}

impl CellRule for Pml {
    fn name(&self) -> &'static str {
        "PML"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        let damp = 1.0 + cx.cells[i].pml_coefficient;
        pass.vx[i] = Self::face(cx, i, cx.right(i), pass.vx[i], pass.p) / damp;
        pass.vy[i] = Self::face(cx, i, cx.next_row(i), pass.vy[i], pass.p) / damp;
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        let damp = 1.0 + cx.cells[i].pml_coefficient;
        let inflow = pass.prev_vx(cx, i);
        let div = pass.divergence_2d(cx, i, inflow);
        pass.p[i] = (pass.p[i] - cx.kp * div) / damp;
    }
}

/// First tube cell after a membrane: flux arrives as the mean x velocity
/// of the paired membrane cells.
#[derive(Debug)]
struct TubeEntry;

impl CellRule for TubeEntry {
    fn name(&self) -> &'static str {
        "JUNCTION_1D_TO_2D_LEFT"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        tube_velocity(cx, i, pass);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        let inflow = mean_over(pass.vx, cx.junctions.tube_left(i));
        pass.p[i] -= cx.kp * (pass.vx[i] - inflow);
    }
}

/// Last tube cell before a membrane: pushes against the mean pressure of
/// the paired membrane cells.
#[derive(Debug)]
struct TubeExit;

impl CellRule for TubeExit {
    fn name(&self) -> &'static str {
        "JUNCTION_1D_TO_2D_RIGHT"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        let ahead = mean_over(pass.p, cx.junctions.tube_right(i));
        pass.vx[i] -= cx.kv * (ahead - pass.p[i]);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        tube_pressure(cx, i, pass);
    }
}

/// Membrane cell draining into the tube on its right.
#[derive(Debug)]
struct MembraneDrain;

impl CellRule for MembraneDrain {
    fn name(&self) -> &'static str {
        "JUNCTION_2D_TO_1D_RIGHT"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        pass.vx[i] = match cx.junctions.membrane_right(i) {
            Some(t) => pass.vx[i] - cx.kv * (pass.p[t] - pass.p[i]),
            None => 0.0,
        };
        membrane_vy(cx, i, pass);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        membrane_pressure(cx, i, pass);
    }
}

/// Membrane cell fed by the tube on its left.
#[derive(Debug)]
struct MembraneFeed;

impl CellRule for MembraneFeed {
    fn name(&self) -> &'static str {
        "JUNCTION_2D_TO_1D_LEFT"
    }

    fn velocity(&self, cx: &SweepContext<'_>, i: usize, pass: &mut VelocityPass<'_>) {
        membrane_velocity(cx, i, pass);
    }

    fn pressure(&self, cx: &SweepContext<'_>, i: usize, pass: &mut PressurePass<'_>) {
        let inflow = cx
            .junctions
            .membrane_left(i)
            .map_or(0.0, |t| pass.vx[t]);
        pass.p[i] -= cx.kp * pass.divergence_2d(cx, i, inflow);
    }
}
