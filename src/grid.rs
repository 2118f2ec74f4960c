//! Structured 2-D grids.

/// How the grid's index space maps onto physical coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GridKind {
    /// One quarter of the domain, mirrored about both axes. Index (0, 0) sits
    /// at the physical origin.
    Quadrant,
    /// The whole domain, with the physical origin at the centre of the index
    /// space.
    Full,
}

/// A fixed-size structured grid with uniform spacing along each axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Grid {
    kind: GridKind,
    size: [usize; 2],
    spacing: [f64; 2],
}

impl Grid {
    /// Creates a grid covering `[0, upper]` in each direction.
    #[inline]
    pub fn quadrant(upper: [f64; 2], spacing: [f64; 2]) -> Self {
        Self {
            kind: GridKind::Quadrant,
            size: [
                npoints(upper[0], spacing[0]),
                npoints(upper[1], spacing[1]),
            ],
            spacing,
        }
    }

    /// Creates a grid covering `[lower, upper]` in each direction.
    #[inline]
    pub fn full(upper: [f64; 2], lower: [f64; 2], spacing: [f64; 2]) -> Self {
        Self {
            kind: GridKind::Full,
            size: [
                npoints(upper[0] - lower[0], spacing[0]),
                npoints(upper[1] - lower[1], spacing[1]),
            ],
            spacing,
        }
    }

    #[inline]
    pub fn kind(&self) -> GridKind {
        self.kind
    }

    /// Number of points along dimension `d` (0 for x, 1 for y).
    #[inline]
    pub fn size(&self, d: usize) -> usize {
        self.size[d]
    }

    /// Spacing along dimension `d` (0 for x, 1 for y).
    #[inline]
    pub fn spacing(&self, d: usize) -> f64 {
        self.spacing[d]
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.size[0]
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.size[1]
    }

    /// Total number of grid points.
    #[inline]
    pub fn len(&self) -> usize {
        self.size[0] * self.size[1]
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nearest lower x index of a physical coordinate.
    ///
    /// Floor rounding can land one index low when `x` sits on a grid line
    /// that the spacing cannot represent exactly, so `i(x(i))` may be
    /// `i - 1`.
    #[inline]
    pub fn i(&self, x: f64) -> usize {
        self.index(x, 0)
    }

    /// Nearest lower y index of a physical coordinate. Rounds like
    /// [`Grid::i`].
    #[inline]
    pub fn j(&self, y: f64) -> usize {
        self.index(y, 1)
    }

    /// Physical x coordinate of column `i`.
    #[inline]
    pub fn x(&self, i: usize) -> f64 {
        self.coordinate(i, 0)
    }

    /// Physical y coordinate of row `j`.
    #[inline]
    pub fn y(&self, j: usize) -> f64 {
        self.coordinate(j, 1)
    }

    fn index(&self, position: f64, d: usize) -> usize {
        let shift = match self.kind {
            GridKind::Quadrant => 0.0,
            GridKind::Full => self.size[d] as f64 / 2.0,
        };
        // negative positions saturate to the first index
        (position / self.spacing[d] + shift).floor() as usize
    }

    fn coordinate(&self, index: usize, d: usize) -> f64 {
        let offset = match self.kind {
            GridKind::Quadrant => 0.0,
            GridKind::Full => (self.size[d] as f64 / 2.0).floor(),
        };
        self.spacing[d] * (index as f64 - offset)
    }
}

fn npoints(extent: f64, spacing: f64) -> usize {
    1 + (extent / spacing).ceil() as usize
}
