//! Absorbing-layer damping ramp.

/// Damping coefficient at the outermost PML layer.
pub const PML_MAX_COEFFICIENT: f32 = 0.5;

/// Damping coefficient for a cell `depth` layers in from the outer edge.
///
/// `depth == 0` is the outermost layer and gets [`PML_MAX_COEFFICIENT`];
/// the coefficient falls linearly towards zero at the inner edge. Returns
/// `0.0` when `pml_count` is zero or `depth` lies past the band.
pub fn pml_ramp(pml_count: usize, depth: usize) -> f32 {
    if pml_count == 0 {
        return 0.0;
    }
    let remaining = pml_count.saturating_sub(depth) as f32;
    remaining * (PML_MAX_COEFFICIENT / pml_count as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn outermost_layer_is_max() {
        assert_eq!(pml_ramp(4, 0), 0.5);
        assert_eq!(pml_ramp(1, 0), 0.5);
    }

    #[test]
    fn innermost_layer_is_one_step() {
        assert!((pml_ramp(10, 9) - 0.05).abs() < 1e-6);
    }

    #[test]
    fn zero_outside_band_and_without_pml() {
        assert_eq!(pml_ramp(4, 4), 0.0);
        assert_eq!(pml_ramp(4, 9), 0.0);
        assert_eq!(pml_ramp(0, 0), 0.0);
    }

    proptest! {
        #[test]
        fn ramp_is_bounded_and_monotone(pml in 1usize..32, depth in 0usize..40) {
            let here = pml_ramp(pml, depth);
            let deeper = pml_ramp(pml, depth + 1);
            prop_assert!((0.0..=PML_MAX_COEFFICIENT).contains(&here));
            prop_assert!(deeper <= here);
        }
    }
}
