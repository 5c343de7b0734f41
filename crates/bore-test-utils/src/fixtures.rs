//! Canonical field configurations.

use bore_core::{FieldConfig, ToneHole};

/// The heterogeneous horn `[2, 1, 2]` at unit spacing: a 10 × 5 grid with
/// a one-cell absorbing layer.
pub fn horn_config() -> FieldConfig {
    FieldConfig {
        segment_dimensions: vec![2, 1, 2],
        segment_sizes: vec![(3.0, 4.0), (3.0, 2.0), (3.0, 4.0)],
        dt: 1.0,
        dx: 1.0,
        rho: 1.1,
        sound_speed: 340.0,
        pml_count: 1,
        update_per_frame: 1,
        tone_hole: None,
        listener: None,
    }
}

/// A stable horn with a three-row tube and a roomy bell, at Courant 0.5.
pub fn wide_horn_config() -> FieldConfig {
    FieldConfig {
        segment_dimensions: vec![2, 1, 2],
        segment_sizes: vec![(4.0, 7.0), (12.0, 3.0), (16.0, 15.0)],
        dt: 0.5,
        dx: 1.0,
        rho: 1.0,
        sound_speed: 1.0,
        pml_count: 4,
        update_per_frame: 16,
        tone_hole: None,
        listener: None,
    }
}

/// The wide horn with its absorbing layer removed: every boundary is a wall.
pub fn closed_wide_horn_config() -> FieldConfig {
    FieldConfig {
        pml_count: 0,
        ..wide_horn_config()
    }
}

/// A wall-bounded horn whose tube is a single row, spanning columns 4 to 15
/// on row 3 of a 7-row grid.
pub fn closed_tube_horn_config() -> FieldConfig {
    FieldConfig {
        segment_dimensions: vec![2, 1, 2],
        segment_sizes: vec![(4.0, 7.0), (12.0, 1.0), (8.0, 7.0)],
        dt: 0.5,
        dx: 1.0,
        rho: 1.0,
        sound_speed: 1.0,
        pml_count: 0,
        update_per_frame: 1,
        tone_hole: None,
        listener: None,
    }
}

/// The closed tube horn with a tone hole on the tube axis at column 8.
pub fn holed_tube_horn_config(open: bool) -> FieldConfig {
    FieldConfig {
        tone_hole: Some(ToneHole { x: 8, y: 3, open }),
        ..closed_tube_horn_config()
    }
}

/// A single wall-bounded 2D box with no absorbing layer, at Courant 0.5.
pub fn closed_box_config() -> FieldConfig {
    FieldConfig {
        segment_dimensions: vec![2],
        segment_sizes: vec![(12.0, 11.0)],
        dt: 0.5,
        dx: 1.0,
        rho: 1.0,
        sound_speed: 1.0,
        pml_count: 0,
        update_per_frame: 1,
        tone_hole: None,
        listener: None,
    }
}

/// The closed box with a closed tone hole in the middle of its top wall.
pub fn toned_box_config() -> FieldConfig {
    FieldConfig {
        tone_hole: Some(ToneHole {
            x: 6,
            y: 0,
            open: false,
        }),
        update_per_frame: 8,
        ..closed_box_config()
    }
}

/// A 2D region with a ten-cell absorbing layer on its open sides.
pub fn pml_box_config() -> FieldConfig {
    FieldConfig {
        segment_dimensions: vec![2],
        segment_sizes: vec![(30.0, 31.0)],
        dt: 0.5,
        dx: 1.0,
        rho: 1.0,
        sound_speed: 1.0,
        pml_count: 10,
        update_per_frame: 1,
        tone_hole: None,
        listener: None,
    }
}
