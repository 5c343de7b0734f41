//! Test fixtures for bore development.
//!
//! Depends only on `bore-core` so any crate in the workspace can pull it in
//! as a dev-dependency without a type-identity cycle.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    closed_box_config, closed_tube_horn_config, closed_wide_horn_config, holed_tube_horn_config,
    horn_config, pml_box_config, toned_box_config, wide_horn_config,
};

/// `|a - b| <= tol · max(|a|, |b|, 1e-30)`.
pub fn rel_close(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol * a.abs().max(b.abs()).max(1e-30)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rel_close_tolerance() {
        assert!(rel_close(100.0, 100.05, 1e-3));
        assert!(!rel_close(100.0, 101.0, 1e-3));
        assert!(rel_close(0.0, 0.0, 1e-9));
    }

    #[test]
    fn fixtures_validate() {
        for cfg in [
            horn_config(),
            wide_horn_config(),
            closed_box_config(),
            closed_wide_horn_config(),
            closed_tube_horn_config(),
            holed_tube_horn_config(true),
            pml_box_config(),
        ] {
            cfg.validate().unwrap();
        }
    }
}
