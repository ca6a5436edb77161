//! Residual analysis and the unit-weight standard error (m0).

use serde::{Deserialize, Serialize};

use crate::affine::{AffineError, AffineParameters};
use crate::record::CoordinateRecord;

/// Number of estimated parameters in the affine model.
const PARAM_COUNT: usize = 6;

/// Discrepancy at one point, predicted minus actual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Residual {
    /// Identifier of the source point.
    pub id: String,
    /// Easting residual in metres.
    pub d_easting: f64,
    /// Northing residual in metres.
    pub d_northing: f64,
}

/// Per-point residuals of the fitted transformation, in input order.
pub fn residuals(
    source: &[CoordinateRecord],
    target: &[CoordinateRecord],
    params: &AffineParameters,
) -> Result<Vec<Residual>, AffineError> {
    if source.len() != target.len() {
        return Err(AffineError::LengthMismatch {
            source: source.len(),
            target: target.len(),
        });
    }
    Ok(source
        .iter()
        .zip(target)
        .map(|(s, t)| {
            let [pred_e, pred_n] = params.apply(s.easting, s.northing);
            Residual {
                id: s.id.clone(),
                d_easting: pred_e - t.easting,
                d_northing: pred_n - t.northing,
            }
        })
        .collect())
}

/// Unit-weight standard error `m0 = sqrt(vᵗv / (2n − 6))`.
///
/// `None` when the degrees of freedom are not positive (n ≤ 3): the
/// parameters then fit the observations exactly and the error estimate is
/// undefined. Parameters themselves remain valid in that case.
pub fn unit_weight_error(residuals: &[Residual]) -> Option<f64> {
    let dof = 2 * residuals.len() as i64 - PARAM_COUNT as i64;
    if dof <= 0 {
        return None;
    }
    let vv: f64 = residuals
        .iter()
        .map(|r| r.d_easting * r.d_easting + r.d_northing * r.d_northing)
        .sum();
    Some((vv / dof as f64).sqrt())
}

// ── Tests ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn record(id: &str, easting: f64, northing: f64) -> CoordinateRecord {
        CoordinateRecord {
            id: id.to_string(),
            easting,
            northing,
        }
    }

    fn residual(id: &str, d_easting: f64, d_northing: f64) -> Residual {
        Residual {
            id: id.to_string(),
            d_easting,
            d_northing,
        }
    }

    #[test]
    fn identity_parameters_leave_zero_residuals() {
        let source = vec![
            record("P1", 100.0, 200.0),
            record("P2", 300.0, 50.0),
            record("P3", 250.0, 400.0),
            record("P4", 120.0, 330.0),
        ];
        let identity = AffineParameters {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        };
        let res = residuals(&source, &source, &identity).unwrap();
        assert_eq!(res.len(), 4);
        for r in &res {
            assert_relative_eq!(r.d_easting, 0.0, epsilon = 1e-9);
            assert_relative_eq!(r.d_northing, 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn residual_is_predicted_minus_actual() {
        let source = vec![record("P1", 10.0, 20.0)];
        // Target sits 0.5 m east of the prediction, so the residual is -0.5.
        let target = vec![record("P1", 10.5, 20.0)];
        let identity = AffineParameters {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        };
        let res = residuals(&source, &target, &identity).unwrap();
        assert_relative_eq!(res[0].d_easting, -0.5);
        assert_relative_eq!(res[0].d_northing, 0.0);
    }

    #[test]
    fn mismatched_lists_are_rejected() {
        let source = vec![record("P1", 0.0, 0.0)];
        let identity = AffineParameters {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 0.0,
            e: 1.0,
            f: 0.0,
        };
        assert_eq!(
            residuals(&source, &[], &identity),
            Err(AffineError::LengthMismatch {
                source: 1,
                target: 0,
            })
        );
    }

    #[test]
    fn m0_from_known_residuals() {
        // Four points, vtv = 4 * 0.01 = 0.04, dof = 2.
        let res = vec![
            residual("P1", 0.1, 0.0),
            residual("P2", 0.1, 0.0),
            residual("P3", 0.1, 0.0),
            residual("P4", 0.1, 0.0),
        ];
        let m0 = unit_weight_error(&res).unwrap();
        assert_relative_eq!(m0, (0.02f64).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn m0_undefined_without_redundancy() {
        let res = vec![
            residual("P1", 0.0, 0.0),
            residual("P2", 0.0, 0.0),
            residual("P3", 0.0, 0.0),
        ];
        assert_eq!(unit_weight_error(&res), None);
        assert_eq!(unit_weight_error(&[]), None);
    }
}
