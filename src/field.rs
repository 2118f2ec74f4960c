//! Scalar fields stored over a [`Grid`].

use crate::grid::Grid;

/// A dense array of values, one per grid point.
///
/// Values are stored row-major with x varying fastest, so the backing array
/// has shape `(ny, nx)` and point `(i, j)` lives at `[[j, i]]`.
///
/// Reads through [`Field::at`] reflect out-of-range indices back into the
/// domain, which gives every stencil a zero normal flux at the edges.
#[derive(Clone, Debug)]
pub struct Field {
    grid: Grid,
    values: ndarray::Array2<f64>,
}

impl Field {
    /// Creates a field with every point set to `value`.
    #[inline]
    pub fn new(grid: &Grid, value: f64) -> Self {
        Self {
            grid: *grid,
            values: ndarray::Array2::from_elem((grid.ny(), grid.nx()), value),
        }
    }

    /// Creates a field by evaluating `f(i, j)` at every point.
    #[inline]
    pub fn from_fn<F>(grid: &Grid, f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut field = Self::new(grid, 0.0);
        field.update(f);
        field
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// The backing array, shape `(ny, nx)`.
    #[inline]
    pub fn values(&self) -> ndarray::ArrayView2<f64> {
        self.values.view()
    }

    #[inline]
    pub fn values_mut(&mut self) -> ndarray::ArrayViewMut2<f64> {
        self.values.view_mut()
    }

    /// Overwrites every point with `f(i, j)`.
    pub fn update<F>(&mut self, mut f: F)
    where
        F: FnMut(usize, usize) -> f64,
    {
        ndarray::Zip::indexed(&mut self.values).for_each(|(j, i), value| *value = f(i, j));
    }

    /// Copies every value of `other` into this field.
    pub fn copy_field(&mut self, other: &Field) {
        debug_assert_eq!(self.grid, other.grid);
        self.values.assign(&other.values);
    }

    /// Adds every value of `other` into this field.
    pub fn add_field(&mut self, other: &Field) {
        debug_assert_eq!(self.grid, other.grid);
        self.values += &other.values;
    }

    /// Replaces the backing array. The shape must match the grid.
    pub(crate) fn assign_values(&mut self, values: ndarray::ArrayView2<f64>) {
        self.values.assign(&values);
    }

    /// Value at an in-range point.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[j, i]]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[[j, i]] = value;
    }

    /// Value at a possibly out-of-range point, mirrored about the edges.
    #[inline]
    pub fn at(&self, i: isize, j: isize) -> f64 {
        let i = reflect(i, self.grid.nx());
        let j = reflect(j, self.grid.ny());
        self.values[[j, i]]
    }

    /// Central difference along x.
    #[inline]
    pub fn dx(&self, i: usize, j: usize) -> f64 {
        let (i, j) = (i as isize, j as isize);
        (self.at(i + 1, j) - self.at(i - 1, j)) / (2.0 * self.grid.spacing(0))
    }

    /// Central difference along y.
    #[inline]
    pub fn dy(&self, i: usize, j: usize) -> f64 {
        let (i, j) = (i as isize, j as isize);
        (self.at(i, j + 1) - self.at(i, j - 1)) / (2.0 * self.grid.spacing(1))
    }

    /// Five-point Laplacian.
    ///
    /// Each second difference is divided by the spacing, not its square.
    #[inline]
    pub fn laplacian(&self, i: usize, j: usize) -> f64 {
        let (i, j) = (i as isize, j as isize);
        let centre = 2.0 * self.at(i, j);
        (self.at(i + 1, j) + self.at(i - 1, j) - centre) / self.grid.spacing(0)
            + (self.at(i, j + 1) + self.at(i, j - 1) - centre) / self.grid.spacing(1)
    }
}

#[inline]
fn reflect(index: isize, size: usize) -> usize {
    let size = size as isize;
    let mut index = index;
    if index < 0 {
        index = -index;
    }
    if index >= size {
        index = 2 * size - index - 2;
    }
    index as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn grid() -> Grid {
        Grid::quadrant([1.0, 0.5], [0.25, 0.25])
    }

    #[test]
    fn from_fn_is_row_major() {
        let grid = grid();
        let field = Field::from_fn(&grid, |i, j| (10 * j + i) as f64);
        assert_eq!(field.get(3, 1), 13.0);
        assert_eq!(field.values().shape(), &[3, 5]);
        assert_eq!(field.values()[[2, 4]], 24.0);
    }

    #[test]
    fn edges_are_mirrored() {
        let grid = grid();
        let field = Field::from_fn(&grid, |i, j| (i * i + 7 * j) as f64);
        let (nx, ny) = (grid.nx() as isize, grid.ny() as isize);
        for j in 0..ny {
            assert_eq!(field.at(-1, j), field.at(1, j));
            assert_eq!(field.at(nx, j), field.at(nx - 2, j));
        }
        for i in 0..nx {
            assert_eq!(field.at(i, -1), field.at(i, 1));
            assert_eq!(field.at(i, ny), field.at(i, ny - 2));
        }
    }

    #[test]
    fn copy_then_add_doubles() {
        let grid = grid();
        let source = Field::from_fn(&grid, |i, j| 0.5 * i as f64 - j as f64);
        let mut target = Field::new(&grid, 3.0);
        target.copy_field(&source);
        target.add_field(&source);
        for j in 0..grid.ny() {
            for i in 0..grid.nx() {
                assert_eq!(target.get(i, j), 2.0 * source.get(i, j));
            }
        }
    }

    #[test]
    fn derivatives_of_a_plane_are_exact_inside() {
        let grid = grid();
        let field = Field::from_fn(&grid, |i, j| 3.0 * grid.x(i) - 2.0 * grid.y(j));
        assert_abs_diff_eq!(field.dx(2, 1), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(field.dy(2, 1), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(field.laplacian(2, 1), 0.0, epsilon = 1e-12);
        // mirrored edge flattens the slope
        assert_abs_diff_eq!(field.dx(0, 1), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn laplacian_divides_by_spacing() {
        let grid = grid();
        let field = Field::from_fn(&grid, |i, _| grid.x(i) * grid.x(i));
        // second difference of x^2 is 2 h^2, divided by h
        assert_abs_diff_eq!(field.laplacian(2, 1), 2.0 * 0.25, epsilon = 1e-12);
    }
}
