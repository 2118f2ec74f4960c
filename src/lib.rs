//! Phase field simulation of dendritic solidification in a pure metal.
//!
//! A [`Simulation`] integrates the coupled phase (`psi`) and undercooling
//! (`u`) fields with an explicit scheme on a [`Grid`]. After every step, one
//! [`TipTracker`] per interpolation method locates the dendrite tip on the
//! symmetry axis and logs its position, velocity, and curvatures.
//!
//! The `dendrite` binary reads a JSON [`Config`](config::Config) and runs it
//! with [`driver::run`].

mod simulation;

pub mod config;
pub mod driver;
pub mod field;
pub mod grid;
pub mod interp;
pub mod output;
pub mod prelude;
pub mod tracker;

pub use field::Field;
pub use grid::{Grid, GridKind};
pub use simulation::{
    PhaseFieldParameters, SaveSettings, Simulation, SimulationDescriptor, SimulationState,
    Termination,
};
pub use tracker::{TipTracker, TipTrackerDescriptor};

/// Represents an error in the simulation.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {reason}")]
    Config { reason: String },
    #[error("Could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    H5Error(#[from] hdf5::Error),
    #[error("Cannot restart: {reason}")]
    Restart { reason: String },
    #[error("Simulation became unstable at step {step}")]
    Unstable { step: usize },
    #[error("No stable time step above {delta_t_min}")]
    NoStableStep { delta_t_min: f64 },
    #[error("Simulation is not running")]
    NotRunning,
}
