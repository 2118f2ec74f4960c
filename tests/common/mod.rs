//! Common fixtures for integration tests

#![allow(dead_code)]

use std::path::Path;

use dendrite::interp::InterpolationMethod;
use dendrite::output::OutputField;
use dendrite::{Grid, PhaseFieldParameters, SaveSettings, Simulation, SimulationDescriptor};

/// Model constants of a moderately undercooled melt.
pub fn parameters(epsilon: f64) -> PhaseFieldParameters {
    PhaseFieldParameters {
        alpha: 0.5,
        epsilon,
        delta: 0.5,
        r0: 1.0,
        gamma_psi: std::f64::consts::FRAC_1_SQRT_2,
        gamma_u: 0.1,
        tolerance: 1e-6,
    }
}

/// A simulation writing to `dir`.
pub fn simulation(
    dir: &Path,
    grid: Grid,
    epsilon: f64,
    interval: usize,
    fields: Vec<OutputField>,
    tracking: Vec<InterpolationMethod>,
) -> Simulation {
    Simulation::new(SimulationDescriptor {
        parameters: parameters(epsilon),
        grid,
        save_settings: SaveSettings {
            path: dir.to_path_buf(),
            interval,
            fields,
        },
        tracking,
    })
    .unwrap()
}

/// A quadrant configuration document with the given `time` section.
pub fn config_json(dir: &Path, time: &str, interval: usize) -> String {
    format!(
        r#"{{
            "simulation": "quadrant",
            "phase_field": {{ "alpha": 0.5, "epsilon": 0.05, "delta": 0.5, "r0": 1.0,
                             "postprocess_cspline": true }},
            "grid": {{ "upper": [3.0, 2.0], "spacing": [0.25, 0.25] }},
            "time": {time},
            "output": {{ "path": {path:?}, "interval": {interval}, "save": ["psi", "u"] }}
        }}"#,
        time = time,
        path = dir.display().to_string(),
        interval = interval,
    )
}
