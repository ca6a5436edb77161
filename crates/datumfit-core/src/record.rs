//! Tolerant coordinate-record parsing with easting/northing disambiguation.
//!
//! Survey field files are noisy: header comments, blank lines, truncated
//! rows. Parsing therefore never fails — a line either yields a record or
//! nothing at all, and the caller keeps whatever parsed.
//!
//! Column order varies between exports. In a metric transverse-Mercator
//! frame northings run to several million metres while eastings stay in the
//! hundreds of thousands, so the two columns can be told apart by magnitude
//! alone. The comparison lives behind [`AxisPolicy`] so frames with other
//! value ranges can supply their own thresholds.

use serde::{Deserialize, Serialize};

/// First numeric column must exceed this to be read as a northing.
pub const NORTHING_FLOOR: f64 = 3_000_000.0;

/// Second numeric column must stay below this for the pair to be swapped.
pub const EASTING_CEIL: f64 = 1_000_000.0;

/// A single parsed survey point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateRecord {
    /// Point identifier as written in the file. Uniqueness is not enforced;
    /// duplicate ids are kept as distinct observations.
    pub id: String,
    /// Right-value (easting) in metres.
    pub easting: f64,
    /// Up-value (northing) in metres.
    pub northing: f64,
}

/// Decides whether a numeric column pair is written northing-first.
pub trait AxisPolicy {
    /// True when `first` is the northing and `second` the easting, i.e. the
    /// columns are swapped relative to the easting-first convention.
    fn swapped(&self, first: f64, second: f64) -> bool;
}

/// Magnitude heuristic for metric TM frames.
///
/// A pair is swapped only when the first value is unmistakably a northing
/// and the second unmistakably an easting. Pairs where both values are
/// small (local or low-order systems) stay in easting-first order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagnitudeAxisPolicy;

impl AxisPolicy for MagnitudeAxisPolicy {
    fn swapped(&self, first: f64, second: f64) -> bool {
        first > NORTHING_FLOOR && second < EASTING_CEIL
    }
}

/// Parse one line into a record using the default [`MagnitudeAxisPolicy`].
pub fn parse_line(line: &str) -> Option<CoordinateRecord> {
    parse_line_with(line, &MagnitudeAxisPolicy)
}

/// Parse one line into a record with an explicit axis policy.
///
/// The line must carry at least three whitespace-separated tokens: an id
/// followed by two numeric values. Anything else yields no record; tokens
/// past the third are ignored.
pub fn parse_line_with(line: &str, policy: &dyn AxisPolicy) -> Option<CoordinateRecord> {
    let mut tokens = line.split_whitespace();
    let id = tokens.next()?;
    let v1: f64 = tokens.next()?.parse().ok()?;
    let v2: f64 = tokens.next()?.parse().ok()?;

    let (easting, northing) = if policy.swapped(v1, v2) {
        (v2, v1)
    } else {
        (v1, v2)
    };

    Some(CoordinateRecord {
        id: id.to_string(),
        easting,
        northing,
    })
}

/// Parse a whole buffer using the default [`MagnitudeAxisPolicy`].
pub fn parse_records(text: &str) -> Vec<CoordinateRecord> {
    parse_records_with(text, &MagnitudeAxisPolicy)
}

/// Parse a whole buffer, skipping `#` comment lines; blank and malformed
/// lines drop out in [`parse_line_with`].
pub fn parse_records_with(text: &str, policy: &dyn AxisPolicy) -> Vec<CoordinateRecord> {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| parse_line_with(line, policy))
        .collect()
}

// ── Tests ────────────────────────────────────────────────────────────────
