//! Dense row-major coefficient matrix.

use crate::error::RoutingError;

/// A dense, row-major matrix of `f64` coefficients.
///
/// All routing coefficient data (cover, maintenance flow, count, delay and
/// robust cover) is stored in this form and indexed `[row][col]`. The
/// constraint builder reads rows through [`Matrix::nonzeros`], so a mostly
/// zero matrix still produces sparse constraint rows.
///
/// # Examples
///
/// ```
/// use u_aircraft_routing::data::Matrix;
///
/// let cover = Matrix::from_rows(vec![vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 1.0]]).unwrap();
/// assert_eq!(cover.shape(), (2, 3));
/// assert_eq!(cover.get(1, 2), 1.0);
/// assert_eq!(cover.nonzeros(0).collect::<Vec<_>>(), vec![(0, 1.0), (2, 1.0)]);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Matrix {
    rows: usize,
    cols: usize,
    values: Vec<f64>,
}

impl Matrix {
    /// Creates a matrix from a flat row-major buffer.
    pub fn new(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, RoutingError> {
        let expected = rows.checked_mul(cols).ok_or_else(|| {
            RoutingError::dimension("matrix", format!("{rows}x{cols} overflows"))
        })?;
        if values.len() != expected {
            return Err(RoutingError::dimension(
                "matrix",
                format!(
                    "{rows}x{cols} needs {expected} values, got {}",
                    values.len()
                ),
            ));
        }
        Ok(Self { rows, cols, values })
    }

    /// Creates an all-zero matrix.
    ///
    /// # Panics
    /// Panics if `rows * cols` overflows `usize`.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        let Some(len) = rows.checked_mul(cols) else {
            panic!("{rows}x{cols} matrix overflows usize");
        };
        Self {
            rows,
            cols,
            values: vec![0.0; len],
        }
    }

    /// Creates a 1×n matrix.
    pub fn row_vector(values: Vec<f64>) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            values,
        }
    }

    /// Creates a matrix from nested rows. All rows must have the same length.
    ///
    /// An empty outer vector yields a 0×0 matrix.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, RoutingError> {
        let cols = rows.first().map_or(0, Vec::len);
        let n_rows = rows.len();
        if let Some((r, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != cols) {
            return Err(RoutingError::dimension(
                "matrix",
                format!("row {r} has {} columns, expected {cols}", row.len()),
            ));
        }
        let values = rows.into_iter().flatten().collect();
        Ok(Self {
            rows: n_rows,
            cols,
            values,
        })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Whether the matrix holds no elements (either dimension is zero).
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element at `[row][col]`.
    ///
    /// # Panics
    /// Panics if the index is out of bounds.
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        self.values[row * self.cols + col]
    }

    /// Row `row` as a slice.
    ///
    /// # Panics
    /// Panics if `row >= rows()`.
    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row {row} out of bounds ({})", self.rows);
        let start = row * self.cols;
        &self.values[start..start + self.cols]
    }

    /// Non-zero entries of row `row` as `(col, value)`, in column order.
    pub fn nonzeros(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.row(row)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, v)| v != 0.0)
    }

    /// Whether every entry of row `row` is zero.
    pub fn is_zero_row(&self, row: usize) -> bool {
        self.nonzeros(row).next().is_none()
    }
}
