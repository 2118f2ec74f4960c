use std::path::{Path, PathBuf};

use ndarray::Zip;

use crate::field::Field;
use crate::grid::Grid;
use crate::interp::InterpolationMethod;
use crate::output::{OutputField, SnapshotDescriptor, SnapshotFile, SnapshotIndex};
use crate::tracker::{TipTracker, TipTrackerDescriptor};
use crate::Error;

/// Ratio between the thermal diffusivity and the coupling constant.
const LAMBDA_RATIO: f64 = 0.6267;
/// Name of the snapshot index, without extension.
const INDEX_NAME: &str = "index";

/// Physical constants of the phase field model.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhaseFieldParameters {
    /// Thermal diffusivity.
    pub alpha: f64,
    /// Anisotropy strength.
    pub epsilon: f64,
    /// Dimensionless undercooling.
    pub delta: f64,
    /// Radius of the initial seed.
    pub r0: f64,
    /// Sharpness of the initial phase profile.
    pub gamma_psi: f64,
    /// Sharpness of the initial undercooling profile.
    pub gamma_u: f64,
    /// Squared gradient norms at or below this are treated as flat.
    pub tolerance: f64,
}

impl PhaseFieldParameters {
    /// Coupling constant between the phase and undercooling fields.
    #[inline]
    pub fn lambda(&self) -> f64 {
        self.alpha / LAMBDA_RATIO
    }
}

/// Where and how often fields are saved.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveSettings {
    /// Output directory. Snapshots go to its `data` subdirectory.
    pub path: PathBuf,
    /// Steps between snapshots. Zero disables them.
    pub interval: usize,
    /// Fields written to each snapshot.
    pub fields: Vec<OutputField>,
}

impl SaveSettings {
    #[inline]
    pub fn enabled(&self) -> bool {
        self.interval > 0 && !self.fields.is_empty()
    }
}

/// Describes a simulation.
pub struct SimulationDescriptor {
    pub parameters: PhaseFieldParameters,
    pub grid: Grid,
    pub save_settings: SaveSettings,
    /// One tip tracker is created for each method.
    pub tracking: Vec<InterpolationMethod>,
}

/// When [`Simulation::next`] reports that a run is over.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Termination {
    /// Stop after this many steps.
    Steps(usize),
    /// Stop once the relative change of the tip velocity falls to the
    /// threshold or the tip reaches the far edge.
    SteadyState { threshold: f64 },
    /// Never stop; the caller decides.
    Unbounded,
}

/// Lifecycle of a [`Simulation`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SimulationState {
    Uninitialized,
    Running,
    Terminated,
}

/// Explicit integrator for the coupled phase and undercooling fields.
pub struct Simulation {
    parameters: PhaseFieldParameters,
    lambda: f64,
    grid: Grid,
    delta_t: f64,
    step: usize,
    termination: Termination,
    state: SimulationState,

    psi: Field,
    u: Field,
    psi0: Field,
    u0: Field,
    psix: Field,
    psiy: Field,
    n2: Field,
    a: Field,
    a2: Field,
    bxy: Field,
    dpsi: Field,
    du: Field,

    save_settings: SaveSettings,
    index: Option<SnapshotIndex>,
    tracking: Vec<InterpolationMethod>,
    trackers: Vec<TipTracker>,
}

impl Simulation {
    /// Creates a new `Simulation` with every field set to zero.
    pub fn new(desc: SimulationDescriptor) -> Result<Self, Error> {
        let grid = desc.grid;
        if grid.is_empty() {
            return Err(Error::Config {
                reason: "grid has no points".to_string(),
            });
        }
        let zeros = Field::new(&grid, 0.0);
        tracing::info!(
            nx = grid.nx(),
            ny = grid.ny(),
            kind = ?grid.kind(),
            "created simulation"
        );

        Ok(Self {
            parameters: desc.parameters,
            lambda: desc.parameters.lambda(),
            grid,
            delta_t: 0.0,
            step: 0,
            termination: Termination::Unbounded,
            state: SimulationState::Uninitialized,
            psi: zeros.clone(),
            u: zeros.clone(),
            psi0: zeros.clone(),
            u0: zeros.clone(),
            psix: zeros.clone(),
            psiy: zeros.clone(),
            n2: zeros.clone(),
            a: zeros.clone(),
            a2: zeros.clone(),
            bxy: zeros.clone(),
            dpsi: zeros.clone(),
            du: zeros,
            save_settings: desc.save_settings,
            index: None,
            tracking: desc.tracking,
            trackers: Vec::new(),
        })
    }

    /// Seeds a circular nucleus of radius `r0` at the origin and opens the
    /// output sinks, discarding earlier output.
    pub fn start(&mut self, delta_t: f64, termination: Termination) -> Result<(), Error> {
        self.delta_t = delta_t;
        self.termination = termination;
        self.step = 0;

        let PhaseFieldParameters {
            delta,
            r0,
            gamma_psi,
            gamma_u,
            ..
        } = self.parameters;
        let grid = self.grid;
        self.psi.update(|i, j| {
            let (x, y) = (grid.x(i), grid.y(j));
            -(gamma_psi * (x * x + y * y - r0 * r0)).tanh()
        });
        self.u.update(|i, j| {
            let (x, y) = (grid.x(i), grid.y(j));
            -delta * (1.0 + (gamma_u * (x * x + y * y - r0 * r0)).tanh()) / 2.0
        });

        self.open_output(false)?;
        self.state = SimulationState::Running;
        tracing::info!(delta_t, ?termination, "started simulation");
        Ok(())
    }

    /// Resumes from the most recent snapshot under the output path.
    ///
    /// Steps `0, interval, 2 interval, ...` are probed until one is missing.
    /// Without any snapshot this is a fresh [`Simulation::start`] followed by
    /// a save. Trackers restart from `r0`, not from the reloaded front.
    pub fn restart(&mut self, delta_t: f64, termination: Termination) -> Result<(), Error> {
        let interval = self.save_settings.interval;
        if interval == 0 {
            return Err(Error::Restart {
                reason: "snapshots are disabled, nothing to restart from".to_string(),
            });
        }

        let root = self.save_settings.path.clone();
        let mut next = 0;
        while SnapshotFile::new(&root, next).exists() {
            next += interval;
        }
        if next == 0 {
            tracing::warn!(path = %root.display(), "no snapshot found, starting afresh");
            self.start(delta_t, termination)?;
            return self.save();
        }

        let step = next - interval;
        let snapshot = SnapshotFile::new(&root, step);
        snapshot.read(&mut self.psi, &mut self.u)?;

        self.delta_t = delta_t;
        self.termination = termination;
        self.step = step;
        self.open_output(true)?;
        self.state = SimulationState::Running;
        tracing::info!(step, snapshot = %snapshot.rel_path(), "restarted simulation");
        Ok(())
    }

    fn open_output(&mut self, append: bool) -> Result<(), Error> {
        let root = &self.save_settings.path;
        self.index = None;
        self.trackers.clear();

        if self.save_settings.enabled() {
            std::fs::create_dir_all(SnapshotFile::data_dir(root))?;
            self.index = Some(SnapshotIndex::create(root, INDEX_NAME, append)?);
        }
        if !self.tracking.is_empty() {
            std::fs::create_dir_all(root)?;
        }
        for &method in &self.tracking {
            self.trackers.push(TipTracker::new(TipTrackerDescriptor {
                method,
                r0: self.parameters.r0,
                output_dir: root,
                // restarted runs append to the tip logs and keep earlier lines
                restart: append,
            })?);
        }
        Ok(())
    }

    /// Advances both fields by one explicit step of size `delta_t`.
    pub fn advance(&mut self) {
        let tolerance = self.parameters.tolerance;
        let epsilon = self.parameters.epsilon;
        let alpha = self.parameters.alpha;
        let lambda = self.lambda;
        let delta_t = self.delta_t;

        self.psi0.copy_field(&self.psi);
        self.u0.copy_field(&self.u);

        let psi0 = &self.psi0;
        self.psix.update(|i, j| psi0.dx(i, j));
        self.psiy.update(|i, j| psi0.dy(i, j));

        Zip::from(self.n2.values_mut())
            .and(self.psix.values())
            .and(self.psiy.values())
            .for_each(|n2, &px, &py| *n2 = px * px + py * py);

        Zip::from(self.a.values_mut())
            .and(self.psix.values())
            .and(self.psiy.values())
            .and(self.n2.values())
            .for_each(|a, &px, &py, &n2| {
                *a = if n2 > tolerance {
                    1.0 + epsilon * (4.0 * (px.powi(4) + py.powi(4)) / (n2 * n2) - 3.0)
                } else {
                    1.0
                };
            });

        Zip::from(self.a2.values_mut())
            .and(self.a.values())
            .for_each(|a2, &a| *a2 = a * a);

        Zip::from(self.bxy.values_mut())
            .and(self.psix.values())
            .and(self.psiy.values())
            .and(self.n2.values())
            .and(self.a.values())
            .for_each(|bxy, &px, &py, &n2, &a| {
                *bxy = if n2 > tolerance {
                    16.0 * epsilon * a * px * py * (px * px - py * py) / (n2 * n2)
                } else {
                    0.0
                };
            });

        let (u0, psix, psiy) = (&self.u0, &self.psix, &self.psiy);
        let (a, a2, bxy) = (&self.a, &self.a2, &self.bxy);
        self.dpsi.update(|i, j| {
            let psi = psi0.get(i, j);
            let u = u0.get(i, j);
            let melt = 1.0 - psi * psi;
            let source = (psi - lambda * u * melt) * melt;
            delta_t
                * (a2.get(i, j) * psi0.laplacian(i, j)
                    + (a2.dx(i, j) - bxy.dy(i, j)) * psix.get(i, j)
                    + (bxy.dx(i, j) + a2.dy(i, j)) * psiy.get(i, j)
                    + source)
                / a.get(i, j)
        });

        // the phase increment already carries delta_t
        let dpsi = &self.dpsi;
        self.du.update(|i, j| delta_t * alpha * u0.laplacian(i, j) + dpsi.get(i, j) / 2.0);

        self.psi.add_field(&self.dpsi);
        self.u.add_field(&self.du);
        self.step += 1;
    }

    /// Advances one step, updates the trackers and reports whether the run
    /// should continue.
    pub fn next(&mut self) -> Result<bool, Error> {
        if self.state != SimulationState::Running {
            return Err(Error::NotRunning);
        }

        self.advance();
        for tracker in &mut self.trackers {
            tracker.process(&self.grid, self.step, &self.psi, self.delta_t)?;
        }

        let running = match self.termination {
            Termination::Steps(budget) => self.step <= budget,
            Termination::SteadyState { threshold } => match self.trackers.first() {
                Some(tracker) => {
                    let edge = self.grid.x(self.grid.nx().saturating_sub(2));
                    if tracker.position() > edge {
                        false
                    } else {
                        let (v, v0) = (tracker.velocity(), tracker.previous_velocity());
                        ((v - v0) / v).abs() > threshold
                    }
                }
                None => true,
            },
            Termination::Unbounded => true,
        };
        if !running {
            self.state = SimulationState::Terminated;
            tracing::info!(step = self.step, time = self.time(), "simulation terminated");
        }
        Ok(running)
    }

    /// Whether every undercooling value lies in `[-delta - tolerance, delta / 2]`.
    ///
    /// A NaN value counts as unstable.
    pub fn stable(&self) -> bool {
        let delta = self.parameters.delta;
        let tolerance = self.parameters.tolerance;
        self.u
            .values()
            .iter()
            .all(|&u| u + delta >= -tolerance && u <= 0.5 * delta)
    }

    /// Writes the selected fields for the current step and lists the file in
    /// the index. Does nothing when snapshots are disabled.
    pub fn save(&self) -> Result<(), Error> {
        let index = match self.index {
            Some(ref index) if self.save_settings.enabled() => index,
            _ => return Ok(()),
        };

        let snapshot = SnapshotFile::new(&self.save_settings.path, self.step);
        snapshot.write(SnapshotDescriptor {
            grid: &self.grid,
            step: self.step,
            time: self.time(),
            fields: self
                .save_settings
                .fields
                .iter()
                .map(|&field| (field, self.field(field)))
                .collect(),
        })?;
        index.add(&snapshot.rel_path())?;
        tracing::debug!(step = self.step, file = %snapshot.rel_path(), "saved snapshot");
        Ok(())
    }

    /// Whether the current step falls on the save interval.
    #[inline]
    pub fn save_timestep(&self) -> bool {
        let interval = self.save_settings.interval;
        interval > 0 && self.step % interval == 0
    }

    /// Fraction of the step budget completed, if there is one.
    #[inline]
    pub fn progress(&self) -> Option<f64> {
        match self.termination {
            Termination::Steps(budget) if budget > 0 => Some(self.step as f64 / budget as f64),
            _ => None,
        }
    }

    #[inline]
    pub fn time(&self) -> f64 {
        self.step as f64 * self.delta_t
    }

    #[inline]
    pub fn step(&self) -> usize {
        self.step
    }

    #[inline]
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[inline]
    pub fn parameters(&self) -> &PhaseFieldParameters {
        &self.parameters
    }

    #[inline]
    pub fn state(&self) -> SimulationState {
        self.state
    }

    #[inline]
    pub fn output_path(&self) -> &Path {
        &self.save_settings.path
    }

    #[inline]
    pub fn psi(&self) -> &Field {
        &self.psi
    }

    #[inline]
    pub fn u(&self) -> &Field {
        &self.u
    }

    /// Mutable access to the primary fields, for custom initial conditions.
    #[inline]
    pub fn fields_mut(&mut self) -> (&mut Field, &mut Field) {
        (&mut self.psi, &mut self.u)
    }

    /// The field written under `field`'s label.
    pub fn field(&self, field: OutputField) -> &Field {
        match field {
            OutputField::Psi => &self.psi,
            OutputField::U => &self.u,
            OutputField::PsiX => &self.psix,
            OutputField::PsiY => &self.psiy,
            OutputField::GradPsiNorm2 => &self.n2,
            OutputField::A => &self.a,
            OutputField::A2 => &self.a2,
            OutputField::Bxy => &self.bxy,
        }
    }

    /// The first tracker, which drives the steady-state test.
    #[inline]
    pub fn tracker(&self) -> Option<&TipTracker> {
        self.trackers.first()
    }

    #[inline]
    pub fn trackers(&self) -> &[TipTracker] {
        &self.trackers
    }
}
