//! Dense row-major matrix arithmetic for normal-equations least squares.
//!
//! Deliberately small: multiply, transpose, and Gauss-Jordan inversion with
//! partial pivoting are everything the solver needs. Operations return new
//! matrices and never mutate their operands.

use std::ops::{Index, IndexMut};

/// Pivot magnitudes below this are treated as zero during inversion.
///
/// Systems whose best remaining pivot falls under this threshold are
/// rejected as singular outright, with no near-singular warning tier.
pub const PIVOT_EPS: f64 = 1e-10;

// ── Error type ───────────────────────────────────────────────────────────

/// Errors raised by matrix operations.
#[derive(Debug, Clone, PartialEq)]
pub enum MatrixError {
    /// Operand shapes are incompatible for the requested product.
    DimensionMismatch {
        /// Shape of the left operand as (rows, cols).
        left: (usize, usize),
        /// Shape of the right operand as (rows, cols).
        right: (usize, usize),
    },
    /// Inversion requested on a non-square matrix.
    NotSquare {
        /// Row count of the offending matrix.
        rows: usize,
        /// Column count of the offending matrix.
        cols: usize,
    },
    /// No usable pivot remains; the matrix has no inverse.
    Singular,
}

impl std::fmt::Display for MatrixError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch { left, right } => {
                write!(
                    f,
                    "dimension mismatch: {}x{} * {}x{}",
                    left.0, left.1, right.0, right.1
                )
            }
            Self::NotSquare { rows, cols } => {
                write!(f, "cannot invert non-square {}x{} matrix", rows, cols)
            }
            Self::Singular => write!(f, "matrix is singular"),
        }
    }
}

impl std::error::Error for MatrixError {}

// ── Matrix ───────────────────────────────────────────────────────────────

/// Dense `rows × cols` matrix of f64 in row-major storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// All-zero matrix of the given shape.
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Identity matrix of order `n`.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for i in 0..n {
            m[(i, i)] = 1.0;
        }
        m
    }

    /// Build a matrix from explicit rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows are ragged or empty.
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let n_rows = rows.len();
        assert!(n_rows > 0, "from_rows requires at least one row");
        let n_cols = rows[0].len();
        let mut m = Self::zeros(n_rows, n_cols);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.len(), n_cols, "ragged row {} in from_rows", i);
            for (j, &v) in row.iter().enumerate() {
                m[(i, j)] = v;
            }
        }
        m
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Matrix product `self * other`.
    ///
    /// Requires `self.cols == other.rows`.
    pub fn multiply(&self, other: &Matrix) -> Result<Matrix, MatrixError> {
        if self.cols != other.rows {
            return Err(MatrixError::DimensionMismatch {
                left: (self.rows, self.cols),
                right: (other.rows, other.cols),
            });
        }
        let mut result = Matrix::zeros(self.rows, other.cols);
        for i in 0..self.rows {
            for j in 0..other.cols {
                let mut acc = 0.0;
                for k in 0..self.cols {
                    acc += self[(i, k)] * other[(k, j)];
                }
                result[(i, j)] = acc;
            }
        }
        Ok(result)
    }

    /// Transposed copy of `self`.
    pub fn transpose(&self) -> Matrix {
        let mut result = Matrix::zeros(self.cols, self.rows);
        for i in 0..self.rows {
            for j in 0..self.cols {
                result[(j, i)] = self[(i, j)];
            }
        }
        result
    }

    /// Inverse via Gauss-Jordan elimination with partial pivoting.
    ///
    /// A pivot below [`PIVOT_EPS`] triggers a downward search for the first
    /// row with a usable entry in the pivot column; the row swap is applied
    /// to both the working copy and the accumulating identity. If no usable
    /// pivot exists the matrix is singular.
    pub fn invert(&self) -> Result<Matrix, MatrixError> {
        if self.rows != self.cols {
            return Err(MatrixError::NotSquare {
                rows: self.rows,
                cols: self.cols,
            });
        }
        let n = self.rows;
        let mut work = self.clone();
        let mut inv = Matrix::identity(n);

        for i in 0..n {
            if work[(i, i)].abs() < PIVOT_EPS {
                let swap = (i + 1..n).find(|&r| work[(r, i)].abs() > PIVOT_EPS);
                match swap {
                    Some(r) => {
                        work.swap_rows(i, r);
                        inv.swap_rows(i, r);
                    }
                    None => return Err(MatrixError::Singular),
                }
            }

            let pivot = work[(i, i)];
            for j in 0..n {
                work[(i, j)] /= pivot;
                inv[(i, j)] /= pivot;
            }

            for k in 0..n {
                if k == i {
                    continue;
                }
                let factor = work[(k, i)];
                for j in 0..n {
                    work[(k, j)] -= factor * work[(i, j)];
                    inv[(k, j)] -= factor * inv[(i, j)];
                }
            }
        }

        Ok(inv)
    }

    fn swap_rows(&mut self, a: usize, b: usize) {
        for j in 0..self.cols {
            self.data.swap(a * self.cols + j, b * self.cols + j);
        }
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.cols + col]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
