use crate::interp::Interpolant;

/// The unique polynomial of degree `n - 1` through `n` samples.
///
/// Built from Newton divided differences and stored in ascending monomial
/// coefficients.
#[derive(Clone, Debug)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(!x.is_empty());

        let n = x.len();
        let mut divided = y.to_vec();
        for order in 1..n {
            for k in (order..n).rev() {
                divided[k] = (divided[k] - divided[k - 1]) / (x[k] - x[k - order]);
            }
        }

        // expand the Newton form from the innermost term outwards
        let mut coefficients = vec![0.0; n];
        coefficients[0] = divided[n - 1];
        for k in (0..n - 1).rev() {
            for p in (0..n - 1).rev() {
                coefficients[p + 1] += coefficients[p];
                coefficients[p] *= -x[k];
            }
            coefficients[0] += divided[k];
        }

        Self { coefficients }
    }

    /// Ascending monomial coefficients.
    #[inline]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// All complex roots, as eigenvalues of the companion matrix.
    fn complex_roots(&self) -> Vec<nalgebra::Complex<f64>> {
        let scale = self
            .coefficients
            .iter()
            .fold(0.0_f64, |accum, c| accum.max(c.abs()));
        let degree = match self
            .coefficients
            .iter()
            .rposition(|c| c.abs() > f64::EPSILON * scale)
        {
            Some(degree) if degree > 0 => degree,
            _ => return Vec::new(),
        };

        let leading = self.coefficients[degree];
        let mut companion = nalgebra::DMatrix::<f64>::zeros(degree, degree);
        for r in 1..degree {
            companion[(r, r - 1)] = 1.0;
        }
        for r in 0..degree {
            companion[(r, degree - 1)] = -self.coefficients[r] / leading;
        }

        companion.complex_eigenvalues().iter().copied().collect()
    }
}

impl Interpolant for Polynomial {
    #[inline]
    fn value(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |accum, &c| accum * x + c)
    }

    #[inline]
    fn derivative(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .enumerate()
            .skip(1)
            .rev()
            .fold(0.0, |accum, (power, &c)| accum * x + power as f64 * c)
    }

    #[inline]
    fn value0(&self) -> f64 {
        self.coefficients[0]
    }

    #[inline]
    fn derivative0(&self) -> f64 {
        self.coefficients.get(1).copied().unwrap_or(0.0)
    }

    /// The first real root lying in `[min, max]`, or NaN when there is none.
    fn root(&self, min: f64, max: f64) -> f64 {
        self.complex_roots()
            .into_iter()
            .find(|z| z.im.abs() <= f64::EPSILON * z.re.abs().max(1.0) && min <= z.re && z.re <= max)
            .map_or(f64::NAN, |z| z.re)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn recovers_monomial_coefficients() {
        // p(x) = 2 - x + 0.5 x^2 + 3 x^3
        let p = |x: f64| 2.0 - x + 0.5 * x * x + 3.0 * x * x * x;
        let x = [-1.0, 0.5, 1.0, 2.5];
        let y: Vec<f64> = x.iter().map(|&x| p(x)).collect();
        let poly = Polynomial::new(&x, &y);
        let expected = [2.0, -1.0, 0.5, 3.0];
        for (c, e) in poly.coefficients().iter().zip(expected.iter()) {
            assert_abs_diff_eq!(c, e, epsilon = 1e-10);
        }
        assert_abs_diff_eq!(poly.value(0.3), p(0.3), epsilon = 1e-12);
        assert_abs_diff_eq!(poly.derivative(0.3), -1.0 + 0.3 + 9.0 * 0.09, epsilon = 1e-12);
        assert_abs_diff_eq!(poly.value0(), 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(poly.derivative0(), -1.0, epsilon = 1e-10);
    }

    #[test]
    fn finds_the_root_inside_the_interval() {
        // (x - 1)(x - 2)(x + 3)
        let p = |x: f64| (x - 1.0) * (x - 2.0) * (x + 3.0);
        let x = [-2.0, 0.0, 1.5, 3.0];
        let y: Vec<f64> = x.iter().map(|&x| p(x)).collect();
        let poly = Polynomial::new(&x, &y);
        assert_abs_diff_eq!(poly.root(1.5, 2.5), 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(poly.root(-4.0, -2.5), -3.0, epsilon = 1e-9);
    }

    #[test]
    fn no_root_in_range_is_nan() {
        // x^2 + 1 has no real roots
        let x = [-1.0, 0.0, 1.0];
        let y = [2.0, 1.0, 2.0];
        let poly = Polynomial::new(&x, &y);
        assert!(poly.root(-10.0, 10.0).is_nan());

        let line = Polynomial::new(&[0.0, 1.0], &[1.0, 3.0]);
        assert!(line.root(0.0, 1.0).is_nan());
        assert_abs_diff_eq!(line.root(-1.0, 0.0), -0.5, epsilon = 1e-12);
    }

    #[test]
    fn constant_samples_have_no_root() {
        let poly = Polynomial::new(&[0.0, 1.0, 2.0], &[4.0, 4.0, 4.0]);
        assert!(poly.root(-1.0, 3.0).is_nan());
        assert_eq!(poly.derivative(1.0), 0.0);
    }
}
