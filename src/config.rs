//! Run configuration, read from a JSON document.
//!
//! ```json
//! {
//!     "simulation": "quadrant",
//!     "phase_field": { "alpha": 0.5, "epsilon": 0.05, "delta": 0.65, "r0": 1.0,
//!                      "postprocess_cspline": true },
//!     "grid": { "upper": [40.0, 40.0], "spacing": [0.4, 0.4] },
//!     "time": { "type": "fixed", "delt": 0.01, "max_time": 100.0 },
//!     "output": { "path": "out", "interval": 1000, "save": ["psi", "u"] }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::grid::Grid;
use crate::interp::InterpolationMethod;
use crate::output::OutputField;
use crate::simulation::{PhaseFieldParameters, SaveSettings, SimulationDescriptor};
use crate::Error;

/// A complete, validated run configuration.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub simulation: SimulationKind,
    pub phase_field: PhaseFieldConfig,
    pub grid: GridConfig,
    pub time: TimeConfig,
    pub output: OutputConfig,
}

/// Which part of the domain is simulated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationKind {
    Full,
    Quadrant,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PhaseFieldConfig {
    pub alpha: f64,
    pub epsilon: f64,
    pub delta: f64,
    pub r0: f64,
    #[serde(default = "default_gamma_psi")]
    pub gamma_psi: f64,
    #[serde(default = "default_gamma_u")]
    pub gamma_u: f64,
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Abort fixed and steady-state runs as soon as `u` leaves its bounds.
    #[serde(default = "default_true")]
    pub stability_check: bool,
    #[serde(default)]
    pub postprocess_polynomial: bool,
    #[serde(default)]
    pub postprocess_cspline: bool,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GridConfig {
    pub upper: [f64; 2],
    /// Only read for full-domain simulations.
    #[serde(default)]
    pub lower: Option<[f64; 2]>,
    pub spacing: [f64; 2],
}

/// How the time step and the run length are chosen.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum TimeConfig {
    /// A fixed step for `floor(max_time / delt)` steps.
    Fixed { delt: f64, max_time: f64 },
    /// A fixed step until the tip velocity settles.
    SteadyState {
        delt: f64,
        steady_state_threshold: f64,
    },
    /// Search downwards from `delt_max` for a step that stays stable for
    /// `max_timesteps` steps.
    Stable {
        delt_max: f64,
        delt_min: f64,
        max_timesteps: usize,
        #[serde(default)]
        delt_multiplier: Option<f64>,
        #[serde(default)]
        delt_step: Option<f64>,
    },
}

/// How a rejected step size is reduced during the stable step search.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepDecrease {
    Multiply(f64),
    Subtract(f64),
}

impl StepDecrease {
    #[inline]
    pub fn apply(&self, delta_t: f64) -> f64 {
        match *self {
            StepDecrease::Multiply(factor) => delta_t * factor,
            StepDecrease::Subtract(step) => delta_t - step,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
    /// Steps between snapshots; zero disables them.
    #[serde(default)]
    pub interval: usize,
    #[serde(default)]
    pub save: Vec<OutputField>,
}

fn default_gamma_psi() -> f64 {
    std::f64::consts::FRAC_1_SQRT_2
}

fn default_gamma_u() -> f64 {
    0.1
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Reads and validates the document at `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(contents: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value that would otherwise yield a meaningless run.
    pub fn validate(&self) -> Result<(), Error> {
        let phase_field = &self.phase_field;
        positive("phase_field.alpha", phase_field.alpha)?;
        positive("phase_field.delta", phase_field.delta)?;
        positive("phase_field.r0", phase_field.r0)?;
        positive("phase_field.gamma_psi", phase_field.gamma_psi)?;
        positive("phase_field.gamma_u", phase_field.gamma_u)?;
        if !(phase_field.tolerance >= 0.0) {
            return Err(invalid("phase_field.tolerance", phase_field.tolerance, "must not be negative"));
        }

        for d in 0..2 {
            positive(&format!("grid.upper[{}]", d), self.grid.upper[d])?;
            positive(&format!("grid.spacing[{}]", d), self.grid.spacing[d])?;
        }
        if self.simulation == SimulationKind::Full {
            let lower = self.grid.lower.ok_or_else(|| Error::Config {
                reason: "grid.lower is required for a full simulation".to_string(),
            })?;
            for d in 0..2 {
                if !(lower[d] < self.grid.upper[d]) {
                    return Err(invalid(
                        &format!("grid.lower[{}]", d),
                        lower[d],
                        "must be below grid.upper",
                    ));
                }
            }
        }

        match self.time {
            TimeConfig::Fixed { delt, max_time } => {
                positive("time.delt", delt)?;
                if !(max_time >= delt) {
                    return Err(invalid("time.max_time", max_time, "must be at least time.delt"));
                }
            }
            TimeConfig::SteadyState {
                delt,
                steady_state_threshold,
            } => {
                positive("time.delt", delt)?;
                positive("time.steady_state_threshold", steady_state_threshold)?;
                if self.tracking_methods().is_empty() {
                    return Err(Error::Config {
                        reason: "steady state runs need postprocess_polynomial or postprocess_cspline"
                            .to_string(),
                    });
                }
            }
            TimeConfig::Stable {
                delt_max,
                delt_min,
                delt_multiplier,
                delt_step,
                ..
            } => {
                positive("time.delt_min", delt_min)?;
                if !(delt_min < delt_max) {
                    return Err(invalid("time.delt_max", delt_max, "must exceed time.delt_min"));
                }
                match (delt_multiplier, delt_step) {
                    (Some(multiplier), None) => {
                        if !(multiplier > 0.0 && multiplier < 1.0) {
                            return Err(invalid(
                                "time.delt_multiplier",
                                multiplier,
                                "must lie strictly between 0 and 1",
                            ));
                        }
                    }
                    (None, Some(step)) => positive("time.delt_step", step)?,
                    _ => {
                        return Err(Error::Config {
                            reason: "exactly one of time.delt_multiplier and time.delt_step is required"
                                .to_string(),
                        })
                    }
                }
            }
        }

        Ok(())
    }

    pub fn grid(&self) -> Grid {
        match self.simulation {
            SimulationKind::Quadrant => Grid::quadrant(self.grid.upper, self.grid.spacing),
            SimulationKind::Full => Grid::full(
                self.grid.upper,
                self.grid.lower.unwrap_or([0.0, 0.0]),
                self.grid.spacing,
            ),
        }
    }

    pub fn parameters(&self) -> PhaseFieldParameters {
        let p = &self.phase_field;
        PhaseFieldParameters {
            alpha: p.alpha,
            epsilon: p.epsilon,
            delta: p.delta,
            r0: p.r0,
            gamma_psi: p.gamma_psi,
            gamma_u: p.gamma_u,
            tolerance: p.tolerance,
        }
    }

    /// Enabled tip trackers; the first one drives the steady-state test.
    pub fn tracking_methods(&self) -> Vec<InterpolationMethod> {
        let mut methods = Vec::new();
        if self.phase_field.postprocess_polynomial {
            methods.push(InterpolationMethod::Polynomial);
        }
        if self.phase_field.postprocess_cspline {
            methods.push(InterpolationMethod::CubicSpline);
        }
        methods
    }

    pub fn save_settings(&self) -> SaveSettings {
        let mut fields = Vec::with_capacity(self.output.save.len());
        for &field in &self.output.save {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        SaveSettings {
            path: self.output.path.clone(),
            interval: self.output.interval,
            fields,
        }
    }

    pub fn simulation_descriptor(&self) -> SimulationDescriptor {
        SimulationDescriptor {
            parameters: self.parameters(),
            grid: self.grid(),
            save_settings: self.save_settings(),
            tracking: self.tracking_methods(),
        }
    }
}

impl TimeConfig {
    /// The reduction applied after an unstable trial, for the step search.
    pub fn step_decrease(&self) -> Option<StepDecrease> {
        match *self {
            TimeConfig::Stable {
                delt_multiplier: Some(factor),
                ..
            } => Some(StepDecrease::Multiply(factor)),
            TimeConfig::Stable {
                delt_step: Some(step),
                ..
            } => Some(StepDecrease::Subtract(step)),
            _ => None,
        }
    }
}

fn invalid(name: &str, value: f64, problem: &str) -> Error {
    Error::Config {
        reason: format!("{} {} (got {})", name, problem, value),
    }
}

fn positive(name: &str, value: f64) -> Result<(), Error> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(invalid(name, value, "must be positive"))
    }
}
