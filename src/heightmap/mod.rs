pub mod loader;

pub use loader::load_grayscale;

use crate::error::ShapeError;

/// Immutable 2D grid of heights in model units
///
/// Row index is Y (row 0 is the top of the source image), column index is X.
/// Values are stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl HeightGrid {
    /// Create a grid from a flat row-major buffer and a dynamic shape
    ///
    /// The shape must have exactly two non-zero dimensions `[rows, cols]`;
    /// anything else is an `InvalidShape` error naming the shape received.
    pub fn from_shape_vec(shape: &[usize], data: Vec<f64>) -> Result<Self, ShapeError> {
        let &[rows, cols] = shape else {
            return Err(ShapeError::InvalidShape {
                shape: shape.to_vec(),
            });
        };
        if rows == 0 || cols == 0 {
            return Err(ShapeError::InvalidShape {
                shape: shape.to_vec(),
            });
        }

        let Some(expected) = rows.checked_mul(cols) else {
            return Err(ShapeError::InvalidShape {
                shape: shape.to_vec(),
            });
        };
        if data.len() != expected {
            return Err(ShapeError::DataLength {
                expected,
                got: data.len(),
            });
        }

        Ok(Self { rows, cols, data })
    }

    /// Create a grid from nested rows, which must all have the same length
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, ShapeError> {
        let cols = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        if let Some((row, ragged)) = rows
            .iter()
            .enumerate()
            .find(|(_, r)| r.as_ref().len() != cols)
        {
            return Err(ShapeError::Ragged {
                row,
                expected: cols,
                got: ragged.as_ref().len(),
            });
        }

        let data = rows.iter().flat_map(|r| r.as_ref().iter().copied()).collect();
        Self::from_shape_vec(&[rows.len(), cols], data)
    }

    /// Number of rows (H)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (W)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Shape as `[rows, cols]`
    pub fn shape(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    /// Height at row `y`, column `x`
    ///
    /// Panics if the cell is outside the grid.
    pub fn get(&self, y: usize, x: usize) -> f64 {
        assert!(y < self.rows && x < self.cols, "cell ({y}, {x}) out of bounds");
        self.data[y * self.cols + x]
    }

    /// Row-major view of all heights
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Smallest and largest finite height, or `None` if no height is finite
    pub fn range(&self) -> Option<(f64, f64)> {
        self.data
            .iter()
            .copied()
            .filter(|h| h.is_finite())
            .fold(None, |acc, h| match acc {
                None => Some((h, h)),
                Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows() {
        let grid = HeightGrid::from_rows(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]).unwrap();
        assert_eq!(grid.shape(), [2, 3]);
        assert_eq!(grid.get(1, 0), 4.0);
        assert_eq!(grid.get(0, 2), 3.0);
    }

    #[test]
    fn test_rejects_3d_shape() {
        let err = HeightGrid::from_shape_vec(&[2, 2, 3], vec![0.0; 12]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::InvalidShape {
                shape: vec![2, 2, 3]
            }
        );
    }

    #[test]
    fn test_rejects_1d_shape() {
        let err = HeightGrid::from_shape_vec(&[5], vec![0.0; 5]).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidShape { .. }));
    }

    #[test]
    fn test_rejects_empty_dimension() {
        let err = HeightGrid::from_shape_vec(&[0, 3], Vec::new()).unwrap_err();
        assert!(matches!(err, ShapeError::InvalidShape { .. }));
    }

    #[test]
    fn test_rejects_wrong_length() {
        let err = HeightGrid::from_shape_vec(&[2, 2], vec![0.0; 3]).unwrap_err();
        assert_eq!(err, ShapeError::DataLength { expected: 4, got: 3 });
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let rows = vec![vec![0.0, 1.0], vec![2.0]];
        let err = HeightGrid::from_rows(&rows).unwrap_err();
        assert_eq!(
            err,
            ShapeError::Ragged {
                row: 1,
                expected: 2,
                got: 1
            }
        );
    }

    #[test]
    fn test_rejects_overflowing_shape() {
        let err = HeightGrid::from_shape_vec(&[usize::MAX, 2], vec![0.0; 4]).unwrap_err();
        assert_eq!(
            err,
            ShapeError::InvalidShape {
                shape: vec![usize::MAX, 2]
            }
        );
    }

    #[test]
    fn test_dimensions() {
        let grid = HeightGrid::from_rows(&[[0.0; 4]; 3]).unwrap();
        assert_eq!((grid.rows(), grid.cols()), (3, 4));
    }

    #[test]
    fn test_range_skips_nan() {
        let grid = HeightGrid::from_rows(&[[f64::NAN, 2.0], [-1.0, 7.5]]).unwrap();
        assert_eq!(grid.range(), Some((-1.0, 7.5)));
    }
}
