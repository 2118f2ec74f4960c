//! Includes commonly used library components.

pub use crate::config::Config;
pub use crate::driver::{RunDescriptor, RunOutcome};
pub use crate::interp::{Interpolant, InterpolationMethod};
pub use crate::output::OutputField;
pub use crate::{
    Error,
    Field,
    Grid,
    GridKind,
    PhaseFieldParameters,
    SaveSettings,
    Simulation,
    SimulationDescriptor,
    SimulationState,
    Termination,
    TipTracker,
    TipTrackerDescriptor,
};
