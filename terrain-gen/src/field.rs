//! Height grids and the rectangles they map onto

use crate::error::{Result, TerrainError};

/// Validated grid resolution (samples along x and y)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    x: usize,
    y: usize,
}

impl Resolution {
    /// Create a resolution, rejecting zero-sized axes
    pub fn new(x: usize, y: usize) -> Result<Self> {
        if x == 0 || y == 0 {
            return Err(TerrainError::InvalidResolution { x, y });
        }
        Ok(Self { x, y })
    }

    /// Resolution with each axis widened to at least one sample
    pub(crate) fn at_least_one(x: usize, y: usize) -> Self {
        Self {
            x: x.max(1),
            y: y.max(1),
        }
    }

    /// Samples along the x axis (rows)
    #[inline]
    pub fn x(&self) -> usize {
        self.x
    }

    /// Samples along the y axis (columns)
    #[inline]
    pub fn y(&self) -> usize {
        self.y
    }

    /// Total number of cells
    #[inline]
    pub fn cells(&self) -> usize {
        self.x * self.y
    }
}

/// Physical rectangle `(xmin, xmax, ymin, ymax)` a height field is laid over
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl Bound {
    /// Create a bound, rejecting empty or inverted ranges
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Result<Self> {
        let finite = [xmin, xmax, ymin, ymax].iter().all(|v| v.is_finite());
        if !finite || xmin >= xmax || ymin >= ymax {
            return Err(TerrainError::InvalidBound {
                xmin,
                xmax,
                ymin,
                ymax,
            });
        }
        Ok(Self {
            xmin,
            xmax,
            ymin,
            ymax,
        })
    }

    /// Bound of a `size` rectangle centred on `position`
    pub fn centered(position: [f64; 2], size: [f64; 2]) -> Result<Self> {
        Self::new(
            position[0] - size[0] / 2.0,
            position[0] + size[0] / 2.0,
            position[1] - size[1] / 2.0,
            position[1] + size[1] / 2.0,
        )
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.ymax - self.ymin
    }
}

/// Row-major 2D array of heights, indexed `(i, j)` with `i` along x
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl HeightField {
    /// Create a field of zeros
    pub fn zeros(resolution: Resolution) -> Self {
        Self::filled(resolution, 0.0)
    }

    /// Create a field with every cell set to `value`
    pub fn filled(resolution: Resolution, value: f64) -> Self {
        Self {
            rows: resolution.x(),
            cols: resolution.y(),
            data: vec![value; resolution.cells()],
        }
    }

    /// Build a field by evaluating `f(i, j)` for every cell
    pub fn from_fn(resolution: Resolution, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(resolution.cells());
        for i in 0..resolution.x() {
            for j in 0..resolution.y() {
                data.push(f(i, j));
            }
        }
        Self {
            rows: resolution.x(),
            cols: resolution.y(),
            data,
        }
    }

    /// Build a field from nested rows; all rows must share one length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let x = rows.len();
        let y = rows.first().map_or(0, Vec::len);
        let resolution = Resolution::new(x, y)?;
        if let Some((row, found)) = rows
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, len)| len != y)
        {
            return Err(TerrainError::RaggedRows {
                row,
                expected: y,
                found,
            });
        }
        Ok(Self {
            rows: resolution.x(),
            cols: resolution.y(),
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// `(rows, cols)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn resolution(&self) -> Resolution {
        Resolution {
            x: self.rows,
            y: self.cols,
        }
    }

    /// Height at `(i, j)`
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    /// Set height at `(i, j)`
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    /// All heights along row `i`
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Raw row-major storage
    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Apply `f` to every height
    pub fn map_in_place(&mut self, f: impl Fn(f64) -> f64) {
        for h in &mut self.data {
            *h = f(*h);
        }
    }

    /// Add a constant offset to every height
    pub fn offset(&mut self, delta: f64) {
        if delta != 0.0 {
            self.map_in_place(|h| h + delta);
        }
    }

    /// Overwrite the block starting at `(start_i, start_j)` with `block`
    ///
    /// Cells falling outside this field are dropped.
    pub fn blit(&mut self, start_i: usize, start_j: usize, block: &HeightField) {
        let end_i = (start_i + block.rows).min(self.rows);
        let end_j = (start_j + block.cols).min(self.cols);
        if start_i >= end_i || start_j >= end_j {
            return;
        }
        let width = end_j - start_j;
        for i in start_i..end_i {
            let src = block.row(i - start_i);
            let dst = i * self.cols + start_j;
            self.data[dst..dst + width].copy_from_slice(&src[..width]);
        }
    }

    /// Lowest height
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Highest height
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// A height field together with the rectangle it covers
#[derive(Debug, Clone, PartialEq)]
pub struct Terrain {
    pub heights: HeightField,
    pub bound: Bound,
}

impl Terrain {
    pub fn new(heights: HeightField, bound: Bound) -> Self {
        Self { heights, bound }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_rejects_zero() {
        assert!(matches!(
            Resolution::new(0, 4),
            Err(TerrainError::InvalidResolution { x: 0, y: 4 })
        ));
        assert!(Resolution::new(4, 0).is_err());
        assert_eq!(Resolution::new(3, 5).unwrap().cells(), 15);
    }

    #[test]
    fn test_bound_validation() {
        assert!(Bound::new(0.0, 1.0, 0.0, 1.0).is_ok());
        assert!(Bound::new(1.0, 1.0, 0.0, 1.0).is_err());
        assert!(Bound::new(0.0, 1.0, 2.0, 1.0).is_err());
        assert!(Bound::new(0.0, f64::NAN, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_bound_centered() {
        let bound = Bound::centered([15.0, 0.0], [10.0, 4.0]).unwrap();
        assert_eq!(bound, Bound::new(10.0, 20.0, -2.0, 2.0).unwrap());
        assert_eq!(bound.width(), 10.0);
        assert_eq!(bound.length(), 4.0);
    }

    #[test]
    fn test_blit_overwrites_and_clips() {
        let mut field = HeightField::zeros(Resolution::new(4, 4).unwrap());
        let block = HeightField::filled(Resolution::new(3, 3).unwrap(), 2.0);
        field.blit(2, 2, &block);

        assert_eq!(field.get(1, 1), 0.0);
        assert_eq!(field.get(2, 2), 2.0);
        assert_eq!(field.get(3, 3), 2.0);
        assert_eq!(field.get(3, 1), 0.0);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(matches!(
            HeightField::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0], vec![4.0]]),
            Err(TerrainError::RaggedRows {
                row: 2,
                expected: 2,
                found: 1
            })
        ));
        let field = HeightField::from_rows(vec![vec![0.0, 1.0], vec![2.0, 3.0]]).unwrap();
        assert_eq!(field.shape(), (2, 2));
        assert_eq!(field.get(1, 0), 2.0);
        assert_eq!(field.min(), 0.0);
        assert_eq!(field.max(), 3.0);
    }
}
