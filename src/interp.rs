//! One-dimensional interpolants used by the tip tracker.

mod cspline;
mod polynomial;

pub use cspline::CubicSpline;
pub use polynomial::Polynomial;

/// Convergence threshold on successive root estimates.
pub const ROOT_TOLERANCE: f64 = 1e-6;
/// Iteration cap for the root solver.
pub const ROOT_MAX_ITERATIONS: usize = 100;

/// A curve fitted through a small ordered set of samples.
///
/// Implementations expect at least two samples with strictly distinct
/// abscissae.
pub trait Interpolant {
    fn value(&self, x: f64) -> f64;

    fn derivative(&self, x: f64) -> f64;

    #[inline]
    fn value0(&self) -> f64 {
        self.value(0.0)
    }

    #[inline]
    fn derivative0(&self) -> f64 {
        self.derivative(0.0)
    }

    /// A zero crossing in `[min, max]`.
    ///
    /// The default runs a Steffensen-accelerated Newton iteration from the
    /// midpoint. Non-convergence is not reported; the last estimate is
    /// returned.
    fn root(&self, min: f64, max: f64) -> f64 {
        steffensen(self, 0.5 * (min + max))
    }
}

/// Selects which interpolant a tracker fits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterpolationMethod {
    /// A single polynomial through every sample.
    Polynomial,
    /// A natural cubic spline.
    CubicSpline,
}

impl InterpolationMethod {
    /// Fits an interpolant of this kind through `(x[k], y[k])`.
    #[inline]
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Box<dyn Interpolant> {
        match self {
            InterpolationMethod::Polynomial => Box::new(Polynomial::new(x, y)),
            InterpolationMethod::CubicSpline => Box::new(CubicSpline::new(x, y)),
        }
    }

    /// Short name used for log file names.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMethod::Polynomial => "polynomial",
            InterpolationMethod::CubicSpline => "cspline",
        }
    }
}

fn steffensen<I: Interpolant + ?Sized>(curve: &I, start: f64) -> f64 {
    let mut x = start;
    let mut x_1 = 0.0;
    let mut f = curve.value(x);
    let mut df = curve.derivative(x);
    let mut count = 1;
    let mut root = x;

    for _ in 0..ROOT_MAX_ITERATIONS {
        if df == 0.0 || !f.is_finite() || !df.is_finite() {
            break;
        }
        let x_new = x - f / df;
        let x_2 = x_1;
        x_1 = x;
        x = x_new;
        f = curve.value(x);
        df = curve.derivative(x);

        let previous = root;
        if count < 3 {
            root = x_new;
            count += 1;
        } else {
            // Aitken extrapolation over the last three iterates
            let u = x_1 - x_2;
            let v = x_new - 2.0 * x_1 + x_2;
            root = if v == 0.0 { x_new } else { x_2 - u * u / v };
        }

        if (root - previous).abs() < ROOT_TOLERANCE {
            break;
        }
    }

    root
}
