//! Tip tracking on the symmetry row of a quadrant grid.

use std::path::Path;

use crate::field::Field;
use crate::grid::{Grid, GridKind};
use crate::interp::InterpolationMethod;
use crate::output::{TipLog, TipRecord};
use crate::Error;

/// Number of columns in the window fitted around the tip.
const WINDOW: usize = 5;
/// Number of rows, from the symmetry axis, used for transverse fits.
const ROWS: usize = 3;

/// Describes a [`TipTracker`].
pub struct TipTrackerDescriptor<P: AsRef<Path>> {
    /// Interpolant fitted through the local samples.
    pub method: InterpolationMethod,
    /// Initial tip radius, used as the first position reference.
    pub r0: f64,
    /// Directory holding the tip log.
    pub output_dir: P,
    /// Whether to append to an existing log instead of truncating it.
    pub restart: bool,
}

/// Tip geometry measured from a single phase field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TipMeasurement {
    pub position: f64,
    pub k1: f64,
    pub k2: f64,
    pub kpar: f64,
}

/// Follows the interface tip along the x axis and logs its diagnostics.
///
/// Only quadrant grids are tracked; on any other grid [`TipTracker::process`]
/// does nothing.
pub struct TipTracker {
    method: InterpolationMethod,
    position: f64,
    reference: f64,
    velocity: f64,
    previous_velocity: f64,
    k1: f64,
    k2: f64,
    kpar: f64,
    log: TipLog,
}

impl TipTracker {
    /// Creates a tracker logging to `output_dir/tip_<method>`.
    pub fn new<P: AsRef<Path>>(desc: TipTrackerDescriptor<P>) -> Result<Self, Error> {
        let name = format!("tip_{}", desc.method.name());
        let log = TipLog::create(desc.output_dir, &name, desc.restart)?;

        Ok(Self {
            method: desc.method,
            position: desc.r0,
            reference: desc.r0,
            velocity: 0.0,
            previous_velocity: 0.0,
            k1: 0.0,
            k2: 0.0,
            kpar: 0.0,
            log,
        })
    }

    #[inline]
    pub fn method(&self) -> InterpolationMethod {
        self.method
    }

    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Velocity from the previous accepted measurement.
    #[inline]
    pub fn previous_velocity(&self) -> f64 {
        self.previous_velocity
    }

    #[inline]
    pub fn k1(&self) -> f64 {
        self.k1
    }

    #[inline]
    pub fn k2(&self) -> f64 {
        self.k2
    }

    #[inline]
    pub fn kpar(&self) -> f64 {
        self.kpar
    }

    #[inline]
    pub fn log_path(&self) -> &Path {
        self.log.path()
    }

    /// Measures the tip in `psi` after `step` steps of size `delta_t` and
    /// appends a record to the log.
    ///
    /// Nothing is updated or logged when the symmetry row has no sign change
    /// ahead of the last known tip.
    pub fn process(
        &mut self,
        grid: &Grid,
        step: usize,
        psi: &Field,
        delta_t: f64,
    ) -> Result<(), Error> {
        if grid.kind() != GridKind::Quadrant {
            return Ok(());
        }
        let measurement = match self.measure(grid, psi) {
            Some(measurement) => measurement,
            None => return Ok(()),
        };

        self.previous_velocity = self.velocity;
        self.velocity = (measurement.position - self.reference) / delta_t;
        self.position = measurement.position;
        self.k1 = measurement.k1;
        self.k2 = measurement.k2;
        self.kpar = measurement.kpar;

        self.log.add(&TipRecord {
            step,
            time: step as f64 * delta_t,
            position: self.position,
            velocity: self.velocity,
            k1: self.k1,
            k2: self.k2,
            kpar: self.kpar,
        })?;
        self.reference = self.position;

        Ok(())
    }

    /// Locates the tip and its curvatures without touching tracker state.
    pub fn measure(&self, grid: &Grid, psi: &Field) -> Option<TipMeasurement> {
        let nx = grid.nx();
        if nx < WINDOW || grid.ny() < ROWS {
            return None;
        }

        // first non-positive point on the symmetry row
        let mut crossing = grid.i(self.reference);
        if crossing >= nx {
            return None;
        }
        while psi.get(crossing, 0) > 0.0 {
            crossing += 1;
            if crossing == nx {
                return None;
            }
        }
        let first = (crossing + 1).min(nx - 1).saturating_sub(WINDOW - 1);

        let xi: Vec<f64> = (0..WINDOW).map(|k| grid.x(first + k)).collect();
        let y2j: Vec<f64> = (0..ROWS).map(|j| grid.y(j) * grid.y(j)).collect();

        // row-wise crossings and slopes at the axis crossing
        let mut x0j = [0.0; ROWS];
        let mut dxpsij = [0.0; ROWS];
        for j in 0..ROWS {
            let row: Vec<f64> = (0..WINDOW).map(|k| psi.get(first + k, j)).collect();
            let curve = self.method.fit(&xi, &row);
            x0j[j] = curve.root(xi[0], xi[WINDOW - 1]);
            dxpsij[j] = curve.derivative(x0j[0]);
        }
        let position = x0j[0];

        let k2 = 2.0 * self.method.fit(&y2j, &x0j).derivative0();

        // second y derivative of psi at each window column
        let d2ypsi: Vec<f64> = (0..WINDOW)
            .map(|k| {
                let column: Vec<f64> = (0..ROWS).map(|j| psi.get(first + k, j)).collect();
                2.0 * self.method.fit(&y2j, &column).derivative0()
            })
            .collect();
        let numerator = self.method.fit(&xi, &d2ypsi).value(position);
        let slope = self.method.fit(&y2j, &dxpsij).value0();
        let k1 = numerator / slope.abs();

        let kpar = parabola_curvature(grid, psi, position);

        Some(TipMeasurement {
            position,
            k1,
            k2,
            kpar,
        })
    }
}

/// Curvature of the parabola `x = c0 + c1 y^2` fitted to the contour behind
/// the tip, or NaN with fewer than three contour points.
fn parabola_curvature(grid: &Grid, psi: &Field, position: f64) -> f64 {
    let ny = grid.ny();
    let dy = grid.spacing(1);
    let mut xc = Vec::new();
    let mut y2c = Vec::new();

    for i in 0..grid.i(position) {
        let j = match (0..ny).find(|&j| psi.get(i, j) <= 0.0) {
            Some(j) if j > 0 => j,
            _ => continue,
        };
        let z0 = psi.get(i, j - 1);
        let z1 = psi.get(i, j);
        let cx = grid.x(i);
        let cy = grid.y(j - 1) - dy * z0 / (z1 - z0);
        if cy > 0.1 * cx {
            xc.push(cx);
            y2c.push(cy * cy);
            if 2.0 * cy < cx {
                break;
            }
        }
    }

    if xc.len() > 2 {
        let (_, c1) = fit_line(&y2c, &xc);
        2.0 * c1
    } else {
        f64::NAN
    }
}

/// Ordinary least squares `y = c0 + c1 x`, solved through the SVD of the
/// design matrix.
fn fit_line(x: &[f64], y: &[f64]) -> (f64, f64) {
    let design = nalgebra::DMatrix::from_fn(x.len(), 2, |r, c| if c == 0 { 1.0 } else { x[r] });
    let rhs = nalgebra::DVector::from_column_slice(y);
    match design.svd(true, true).solve(&rhs, f64::EPSILON) {
        Ok(c) => (c[0], c[1]),
        Err(_) => (f64::NAN, f64::NAN),
    }
}
