//! Dense 2D sample grid.

use super::ComputingBound;

/// Row-major matrix of samples. Rows follow the `x` axis, columns the `y` axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Grid {
    /// Zero-filled grid.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Zero-filled grid sized for sampling the given bounds.
    pub fn for_bounds(x_bound: &ComputingBound, y_bound: &ComputingBound) -> Self {
        Self::new(x_bound.sample_count(), y_bound.sample_count())
    }

    /// Build from nested rows. Returns `None` if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Option<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != cols) {
            return None;
        }
        let n_rows = rows.len();
        Some(Self {
            rows: n_rows,
            cols,
            data: rows.into_iter().flatten().collect(),
        })
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn dims(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.cols + j]
    }

    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[i * self.cols + j] = value;
    }

    /// Flat row-major view.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Whether the grid has the shape required by the bounds.
    pub fn matches(&self, x_bound: &ComputingBound, y_bound: &ComputingBound) -> bool {
        self.dims() == (x_bound.sample_count(), y_bound.sample_count())
    }
}
