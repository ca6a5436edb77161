//! datumfit CLI — fit a 2-D affine datum transformation from coordinate files.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use datumfit_core::{fit, parse_records, AffineParameters, CoordinateRecord, FitReport};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "datumfit")]
#[command(about = "Estimate the 2-D affine transformation between two survey coordinate lists")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit parameters from a source file and an index-aligned target file.
    Fit {
        /// Path to the source-frame coordinate file.
        #[arg(long)]
        source: PathBuf,

        /// Path to the target-frame coordinate file, paired with the source
        /// file line by line.
        #[arg(long)]
        target: PathBuf,

        /// Path to write the fit report (JSON). Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,

        /// m0 threshold in metres for the pass/fail verdict.
        #[arg(long, default_value = "0.1")]
        tolerance: f64,
    },

    /// Fit against a simulated target frame generated from the source file.
    Simulate {
        /// Path to the source-frame coordinate file.
        #[arg(long)]
        source: PathBuf,

        /// Uniform scale applied to both axes.
        #[arg(long, default_value = "1.00005")]
        scale: f64,

        /// Easting offset in metres.
        #[arg(long, default_value = "100.0")]
        easting_offset: f64,

        /// Northing offset in metres.
        #[arg(long, default_value = "50.0")]
        northing_offset: f64,

        /// Path to write the fit report (JSON). Prints to stdout when omitted.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fit {
            source,
            target,
            out,
            tolerance,
        } => run_fit(&source, &target, out.as_deref(), tolerance),

        Commands::Simulate {
            source,
            scale,
            easting_offset,
            northing_offset,
            out,
        } => run_simulate(&source, scale, easting_offset, northing_offset, out.as_deref()),
    }
}

// ── fit ──────────────────────────────────────────────────────────────────

fn run_fit(
    source_path: &Path,
    target_path: &Path,
    out: Option<&Path>,
    tolerance: f64,
) -> CliResult<()> {
    let source = load_records(source_path)?;
    let target = load_records(target_path)?;

    let report = fit(&source, &target)?;
    log_report(&report);

    match report.m0 {
        Some(m0) if m0 < tolerance => {
            tracing::info!("fit accepted: m0 = {:.6} m < {} m", m0, tolerance)
        }
        Some(m0) => tracing::warn!("fit rejected: m0 = {:.6} m >= {} m", m0, tolerance),
        None => tracing::warn!("no verdict: m0 unavailable with {} pairs", report.point_count),
    }

    write_report(&report, out)
}

// ── simulate ─────────────────────────────────────────────────────────────

fn run_simulate(
    source_path: &Path,
    scale: f64,
    easting_offset: f64,
    northing_offset: f64,
    out: Option<&Path>,
) -> CliResult<()> {
    let source = load_records(source_path)?;

    let truth = AffineParameters::scaled_offset(scale, easting_offset, northing_offset);
    let target: Vec<CoordinateRecord> = source
        .iter()
        .map(|s| {
            let [easting, northing] = truth.apply(s.easting, s.northing);
            CoordinateRecord {
                id: s.id.clone(),
                easting,
                northing,
            }
        })
        .collect();
    tracing::info!(
        "simulated target frame: scale {}, offsets ({} m, {} m)",
        scale,
        easting_offset,
        northing_offset
    );

    let report = fit(&source, &target)?;
    log_report(&report);

    write_report(&report, out)
}

// ── shared ───────────────────────────────────────────────────────────────

fn load_records(path: &Path) -> CliResult<Vec<CoordinateRecord>> {
    let text = std::fs::read_to_string(path)?;
    let records = parse_records(&text);
    if records.is_empty() {
        return Err(format!("no coordinate records in {}", path.display()).into());
    }
    tracing::info!("{} records parsed from {}", records.len(), path.display());
    Ok(records)
}

fn log_report(report: &FitReport) {
    let p = &report.parameters;
    tracing::info!(
        "parameters: a={:.6} b={:.6} c={:.3} d={:.6} e={:.6} f={:.3}",
        p.a,
        p.b,
        p.c,
        p.d,
        p.e,
        p.f,
    );
    for r in &report.residuals {
        tracing::info!("{:>8}  vE={:+.5} m  vN={:+.5} m", r.id, r.d_easting, r.d_northing);
    }
}

fn write_report(report: &FitReport, out: Option<&Path>) -> CliResult<()> {
    let json = serde_json::to_string_pretty(report)?;
    match out {
        Some(path) => {
            std::fs::write(path, &json)?;
            tracing::info!("report written to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
