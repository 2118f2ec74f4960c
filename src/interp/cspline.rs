use crate::interp::Interpolant;

/// A natural cubic spline.
///
/// Second derivatives vanish at both end knots. Outside the sampled range the
/// end pieces are extended.
#[derive(Clone, Debug)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    // second derivative at each knot
    m: Vec<f64>,
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64]) -> Self {
        debug_assert_eq!(x.len(), y.len());
        debug_assert!(x.len() >= 2);

        let n = x.len();
        let mut m = vec![0.0; n];

        if n > 2 {
            // Thomas algorithm over the interior knots
            let interior = n - 2;
            let mut diag = vec![0.0; interior];
            let mut rhs = vec![0.0; interior];
            let mut upper = vec![0.0; interior];
            for k in 0..interior {
                let (h0, h1) = (x[k + 1] - x[k], x[k + 2] - x[k + 1]);
                diag[k] = 2.0 * (h0 + h1);
                upper[k] = h1;
                rhs[k] = 6.0 * ((y[k + 2] - y[k + 1]) / h1 - (y[k + 1] - y[k]) / h0);
            }
            for k in 1..interior {
                let lower = x[k + 1] - x[k];
                let w = lower / diag[k - 1];
                diag[k] -= w * upper[k - 1];
                rhs[k] -= w * rhs[k - 1];
            }
            m[interior] = rhs[interior - 1] / diag[interior - 1];
            for k in (0..interior - 1).rev() {
                m[k + 1] = (rhs[k] - upper[k] * m[k + 2]) / diag[k];
            }
        }

        Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m,
        }
    }

    /// Piece index and the cubic coefficients `(a, b, c, d)` of that piece in
    /// powers of `x - x[k]`.
    fn piece(&self, x: f64) -> (usize, [f64; 4]) {
        let last = self.x.len() - 2;
        let k = self
            .x
            .partition_point(|&knot| knot <= x)
            .saturating_sub(1)
            .min(last);
        let h = self.x[k + 1] - self.x[k];
        let (m0, m1) = (self.m[k], self.m[k + 1]);
        let b = (self.y[k + 1] - self.y[k]) / h - h * (2.0 * m0 + m1) / 6.0;
        (k, [self.y[k], b, m0 / 2.0, (m1 - m0) / (6.0 * h)])
    }
}

impl Interpolant for CubicSpline {
    #[inline]
    fn value(&self, x: f64) -> f64 {
        let (k, [a, b, c, d]) = self.piece(x);
        let t = x - self.x[k];
        a + t * (b + t * (c + t * d))
    }

    #[inline]
    fn derivative(&self, x: f64) -> f64 {
        let (k, [_, b, c, d]) = self.piece(x);
        let t = x - self.x[k];
        b + t * (2.0 * c + 3.0 * d * t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn reproduces_a_line_everywhere() {
        let x = [0.0, 0.3, 0.5, 1.2, 2.0];
        let y: Vec<f64> = x.iter().map(|x| 2.0 - 3.0 * x).collect();
        let spline = CubicSpline::new(&x, &y);
        for &t in &[0.1, 0.45, 0.9, 1.7] {
            assert_abs_diff_eq!(spline.value(t), 2.0 - 3.0 * t, epsilon = 1e-12);
            assert_abs_diff_eq!(spline.derivative(t), -3.0, epsilon = 1e-12);
        }
        assert_abs_diff_eq!(spline.root(0.0, 2.0), 2.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn cubic_passes_through_knots_with_smooth_slope() {
        let cubic = |x: f64| x * x * x - x + 0.5;
        let x = [-1.0, -0.5, 0.0, 0.5, 1.0, 1.5];
        let y: Vec<f64> = x.iter().map(|&x| cubic(x)).collect();
        let spline = CubicSpline::new(&x, &y);
        for (&xk, &yk) in x.iter().zip(y.iter()) {
            assert_abs_diff_eq!(spline.value(xk), yk, epsilon = 1e-12);
        }
        for &knot in &x[1..5] {
            let left = spline.derivative(knot - 1e-9);
            let right = spline.derivative(knot + 1e-9);
            assert_abs_diff_eq!(left, right, epsilon = 1e-6);
        }
        // interior values stay close to the underlying cubic
        assert_abs_diff_eq!(spline.value(0.25), cubic(0.25), epsilon = 5e-2);
    }

    #[test]
    fn natural_ends_have_no_curvature() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.0, 1.0, 0.0, 1.0];
        let spline = CubicSpline::new(&x, &y);
        assert_eq!(spline.m[0], 0.0);
        assert_eq!(spline.m[3], 0.0);
        // symmetric data gives symmetric interior curvature
        assert_abs_diff_eq!(spline.m[1], -spline.m[2], epsilon = 1e-12);
    }

    #[test]
    fn two_points_make_a_line() {
        let spline = CubicSpline::new(&[1.0, 3.0], &[-1.0, 3.0]);
        assert_abs_diff_eq!(spline.value0(), -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.derivative0(), 2.0, epsilon = 1e-12);
    }
}
