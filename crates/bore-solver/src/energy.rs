//! Energy measures.

use bore_core::{Dimensionality, StepError};
use bore_grid::GridLayout;

use crate::field::Field;
use crate::stepper::Stepper;

/// `Σ p² + vx² + vy²` over the whole grid, accumulated in `f64`.
pub fn acoustic_energy(field: &Field) -> f64 {
    let sq = |s: &[f32]| s.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>();
    sq(field.pressure()) + sq(field.velocity_x()) + sq(field.velocity_y())
}

/// Run one sub-step and return the discrete energy the leapfrog scheme
/// preserves exactly on a closed, lossless grid:
///
/// ```text
/// E = Σ w·vx² / kv + Σ vy² / kv + Σ w·p^n·p^{n+1} / kp
/// ```
///
/// A tube cell stands for its whole cross-section, so its pressure and
/// x-velocity carry a weight `w` equal to the tube's radial count; every
/// other cell has `w = 1`. The sum is constant to rounding as long as each
/// tube end pairs with that many membrane rows. The naive `Σ p² + v²`
/// oscillates by O(dt) even without loss.
pub fn step_with_invariant(stepper: &mut Stepper, field: &mut Field) -> Result<f64, StepError> {
    if field.is_frozen() {
        return Err(StepError::FieldFrozen);
    }
    if let Some(err) = field.unsupported_cell() {
        return Err(err.clone());
    }
    let k = field.coefficients();
    let weights = cell_weights(field.layout());
    stepper.velocity_sweep(field)?;
    let kinetic: f64 = field
        .velocity_x()
        .iter()
        .zip(&weights)
        .map(|(&v, &w)| w * (v as f64) * (v as f64))
        .chain(field.velocity_y().iter().map(|&v| (v as f64) * (v as f64)))
        .sum();
    let before = field.pressure().to_vec();
    stepper.pressure_sweep(field)?;
    let cross: f64 = before
        .iter()
        .zip(field.pressure())
        .zip(&weights)
        .map(|((&a, &b), &w)| w * a as f64 * b as f64)
        .sum();
    field.sub_step = field.sub_step.next();
    stepper.clock = stepper.clock.next();
    Ok(kinetic / k.kv as f64 + cross / k.kp as f64)
}

fn cell_weights(layout: &GridLayout) -> Vec<f64> {
    let segments = layout.segments();
    layout
        .cells()
        .iter()
        .map(|cell| {
            cell.segment
                .and_then(|id| segments.get(id.index()))
                .filter(|seg| seg.dimension == Dimensionality::One)
                .map_or(1.0, |seg| seg.grid_count.1 as f64)
        })
        .collect()
}
