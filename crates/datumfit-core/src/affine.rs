//! Six-parameter affine estimation via normal-equations least squares.
//!
//! Each source/target pair contributes two observation equations:
//!
//! ```text
//! a·e + b·n + c = e'
//! d·e + e·n + f = n'
//! ```
//!
//! Stacked over all pairs this gives a 2n×6 design matrix A and a 2n×1
//! observation vector L, solved as `x = (AᵗA)⁻¹ Aᵗ L`.

use serde::{Deserialize, Serialize};

use crate::matrix::{Matrix, MatrixError};
use crate::record::CoordinateRecord;

/// Minimum number of point pairs for a solvable system.
pub const MIN_POINTS: usize = 3;

// ── Error type ───────────────────────────────────────────────────────────

/// Errors raised while estimating the transformation.
#[derive(Debug, Clone, PartialEq)]
pub enum AffineError {
    /// Source and target lists must pair up index by index.
    LengthMismatch {
        /// Number of source records supplied.
        source: usize,
        /// Number of target records supplied.
        target: usize,
    },
    /// Too few point pairs to determine six parameters.
    InsufficientPoints {
        /// Required minimum number of pairs.
        needed: usize,
        /// Provided number of pairs.
        got: usize,
    },
    /// Point geometry is degenerate (collinear or coincident); the normal
    /// matrix has no inverse. Expected outcome for bad field data, not a
    /// bug — ask for more or better-distributed points.
    SingularSystem,
    /// Matrix engine misuse surfaced from below. Indicates a bug in the
    /// caller, never a data problem.
    Matrix(MatrixError),
}

impl std::fmt::Display for AffineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LengthMismatch { source, target } => {
                write!(
                    f,
                    "source/target lists differ in length: {} vs {}",
                    source, target
                )
            }
            Self::InsufficientPoints { needed, got } => {
                write!(f, "too few point pairs: need {}, got {}", needed, got)
            }
            Self::SingularSystem => {
                write!(f, "cannot compute transformation with the given points")
            }
            Self::Matrix(err) => write!(f, "matrix engine error: {}", err),
        }
    }
}

impl std::error::Error for AffineError {}

impl From<MatrixError> for AffineError {
    fn from(err: MatrixError) -> Self {
        match err {
            MatrixError::Singular => Self::SingularSystem,
            other => Self::Matrix(other),
        }
    }
}

// ── Parameters ───────────────────────────────────────────────────────────

/// Parameters of the 2-D affine transformation
/// `e' = a·e + b·n + c`, `n' = d·e + e·n + f`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineParameters {
    /// Easting scale/rotation term.
    pub a: f64,
    /// Easting shear term.
    pub b: f64,
    /// Easting translation in metres.
    pub c: f64,
    /// Northing shear term.
    pub d: f64,
    /// Northing scale/rotation term.
    pub e: f64,
    /// Northing translation in metres.
    pub f: f64,
}

impl AffineParameters {
    /// Uniform scale plus per-axis offsets, no rotation or shear.
    ///
    /// Matches the shape of a small datum shift between two metric TM
    /// frames; used to generate simulated target frames.
    pub fn scaled_offset(scale: f64, easting_offset: f64, northing_offset: f64) -> Self {
        Self {
            a: scale,
            b: 0.0,
            c: easting_offset,
            d: 0.0,
            e: scale,
            f: northing_offset,
        }
    }

    /// Map a source-frame point into the target frame.
    pub fn apply(&self, easting: f64, northing: f64) -> [f64; 2] {
        [
            self.a * easting + self.b * northing + self.c,
            self.d * easting + self.e * northing + self.f,
        ]
    }
}

// ── Estimation ───────────────────────────────────────────────────────────

/// Estimate the affine parameters from index-paired source/target records.
///
/// Requires equally long lists with at least [`MIN_POINTS`] pairs.
/// Degenerate geometry (collinear or coincident points) fails with
/// [`AffineError::SingularSystem`]; no partial result is returned.
pub fn estimate(
    source: &[CoordinateRecord],
    target: &[CoordinateRecord],
) -> Result<AffineParameters, AffineError> {
    if source.len() != target.len() {
        return Err(AffineError::LengthMismatch {
            source: source.len(),
            target: target.len(),
        });
    }
    let n = source.len();
    if n < MIN_POINTS {
        return Err(AffineError::InsufficientPoints {
            needed: MIN_POINTS,
            got: n,
        });
    }

    let mut a = Matrix::zeros(2 * n, 6);
    let mut l = Matrix::zeros(2 * n, 1);
    for (i, (s, t)) in source.iter().zip(target).enumerate() {
        a[(2 * i, 0)] = s.easting;
        a[(2 * i, 1)] = s.northing;
        a[(2 * i, 2)] = 1.0;
        l[(2 * i, 0)] = t.easting;

        a[(2 * i + 1, 3)] = s.easting;
        a[(2 * i + 1, 4)] = s.northing;
        a[(2 * i + 1, 5)] = 1.0;
        l[(2 * i + 1, 0)] = t.northing;
    }

    let at = a.transpose();
    let ata = at.multiply(&a)?;
    let atl = at.multiply(&l)?;
    let x = ata.invert()?.multiply(&atl)?;

    Ok(AffineParameters {
        a: x[(0, 0)],
        b: x[(1, 0)],
        c: x[(2, 0)],
        d: x[(3, 0)],
        e: x[(4, 0)],
        f: x[(5, 0)],
    })
}

// ── Tests ────────────────────────────────────────────────────────────────
