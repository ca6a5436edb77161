//! datumfit-core — estimation engine for 2-D affine datum transformations.
//!
//! Reconciles survey point lists between two planar reference frames
//! (e.g. a legacy TM datum and a modern one). The pipeline stages are:
//!
//! 1. **Record** – tolerant parsing of raw coordinate lines with
//!    magnitude-based easting/northing disambiguation.
//! 2. **Matrix** – dense matrix kernel for the normal equations: multiply,
//!    transpose, Gauss-Jordan inverse with partial pivoting.
//! 3. **Affine** – six-parameter least-squares estimation from index-paired
//!    source/target records.
//! 4. **Accuracy** – per-point residuals and the unit-weight standard
//!    error (m0).
//!
//! Every stage is a pure function over immutable inputs producing new owned
//! outputs; there is no shared mutable state and no I/O.

pub mod accuracy;
pub mod affine;
pub mod matrix;
pub mod record;

pub use accuracy::{residuals, unit_weight_error, Residual};
pub use affine::{estimate, AffineError, AffineParameters};
pub use matrix::{Matrix, MatrixError};
pub use record::{
    parse_line, parse_line_with, parse_records, parse_records_with, AxisPolicy, CoordinateRecord,
    MagnitudeAxisPolicy,
};

/// Complete fit outcome for one source/target pairing.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FitReport {
    /// Estimated transformation parameters.
    pub parameters: AffineParameters,
    /// Per-point residuals, predicted minus actual, in input order.
    pub residuals: Vec<Residual>,
    /// Unit-weight standard error in metres; absent when the fit leaves no
    /// redundancy (2n − 6 ≤ 0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m0: Option<f64>,
    /// Number of point pairs used.
    pub point_count: usize,
}

/// Run the full pipeline: estimate parameters, derive residuals, compute m0.
///
/// Parameters are still returned when m0 is undefined (exactly three
/// pairs); the report then carries `m0: None`.
pub fn fit(
    source: &[CoordinateRecord],
    target: &[CoordinateRecord],
) -> Result<FitReport, AffineError> {
    let parameters = affine::estimate(source, target)?;
    tracing::info!(
        "estimated affine parameters from {} point pairs",
        source.len()
    );

    let residuals = accuracy::residuals(source, target, &parameters)?;
    let m0 = accuracy::unit_weight_error(&residuals);
    match m0 {
        Some(m0) => tracing::info!("unit-weight standard error m0 = {:.6} m", m0),
        None => tracing::warn!(
            "m0 undefined: {} point pairs leave no redundancy",
            source.len()
        ),
    }

    Ok(FitReport {
        parameters,
        residuals,
        m0,
        point_count: source.len(),
    })
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

    fn spread_points() -> Vec<CoordinateRecord> {
        vec![
            record("P1", 100.0, 200.0),
            record("P2", 300.0, 50.0),
            record("P3", 250.0, 400.0),
            record("P4", 120.0, 330.0),
            record("P5", 410.0, 260.0),
        ]
    }

    #[test]
    fn identity_fit_has_zero_error() {
        let source = spread_points();
        let report = fit(&source, &source).unwrap();

        assert_eq!(report.point_count, 5);
        assert_relative_eq!(report.parameters.a, 1.0, epsilon = 1e-9);
        assert_relative_eq!(report.parameters.e, 1.0, epsilon = 1e-9);
        for r in &report.residuals {
            assert_relative_eq!(r.d_easting, 0.0, epsilon = 1e-9);
            assert_relative_eq!(r.d_northing, 0.0, epsilon = 1e-9);
        }
        let m0 = report.m0.unwrap();
        assert_relative_eq!(m0, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn simulated_datum_shift_roundtrips() {
        let truth = AffineParameters::scaled_offset(1.00005, 100.00, 50.00);
        let source = spread_points();
        let target: Vec<CoordinateRecord> = source
            .iter()
            .map(|s| {
                let [e, n] = truth.apply(s.easting, s.northing);
                record(&s.id, e, n)
            })
            .collect();

        let report = fit(&source, &target).unwrap();
        assert_relative_eq!(report.parameters.a, truth.a, epsilon = 1e-6);
        assert_relative_eq!(report.parameters.c, truth.c, epsilon = 1e-6);
        assert_relative_eq!(report.parameters.e, truth.e, epsilon = 1e-6);
        assert_relative_eq!(report.parameters.f, truth.f, epsilon = 1e-6);
        assert!(report.m0.unwrap() < 1e-6);
    }

    #[test]
    fn parse_then_fit_survey_scale_coordinates() {
        // Frame-realistic magnitudes: eastings ~5e5, northings ~4e6.
        let text = "\
# Nokta No   Saga(Y)        Yukari(X)
P1           500100.00      4000100.00
P2           500200.00      4000200.00
P3           500150.00      4000300.00
P4           500300.00      4000150.00
";
        let source = parse_records(text);
        assert_eq!(source.len(), 4);

        let truth = AffineParameters::scaled_offset(1.00005, 100.00, 50.00);
        let target: Vec<CoordinateRecord> = source
            .iter()
            .map(|s| {
                let [e, n] = truth.apply(s.easting, s.northing);
                record(&s.id, e, n)
            })
            .collect();

        let report = fit(&source, &target).unwrap();

        // At these magnitudes the normal equations are ill-conditioned, so
        // only field-survey accuracy is asserted, matching the acceptance
        // threshold used for real adjustments.
        let m0 = report.m0.unwrap();
        assert!(m0 < 0.1, "m0 too large: {}", m0);
        for r in &report.residuals {
            assert!(r.d_easting.abs() < 0.1, "vE too large: {}", r.d_easting);
            assert!(r.d_northing.abs() < 0.1, "vN too large: {}", r.d_northing);
        }
        assert_eq!(report.residuals[0].id, "P1");
    }

    #[test]
    fn three_pairs_fit_without_m0() {
        let source = vec![
            record("A", 0.0, 0.0),
            record("B", 10.0, 0.0),
            record("C", 0.0, 10.0),
        ];
        let report = fit(&source, &source).unwrap();
        assert_eq!(report.m0, None);
        assert_relative_eq!(report.parameters.a, 1.0, epsilon = 1e-9);
        assert_eq!(report.residuals.len(), 3);
    }

    #[test]
    fn degenerate_input_is_a_typed_failure() {
        let source: Vec<CoordinateRecord> = (0..4)
            .map(|i| record(&format!("L{}", i), i as f64, 3.0 * i as f64))
            .collect();
        assert_eq!(fit(&source, &source), Err(AffineError::SingularSystem));
    }
}
