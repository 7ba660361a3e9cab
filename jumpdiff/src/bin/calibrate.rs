//! `jumpdiff-calibrate`: fit Merton parameters to one CSV column.
//!
//! ```text
//! jumpdiff-calibrate --csv spx.csv --col close --dt 0.003968 --seed 42
//! jumpdiff-calibrate --csv rets.csv --col r --kind log-returns --bound lam=0:5
//! ```
//!
//! Log output goes to stderr (`RUST_LOG`, default `info`); the fitted
//! parameters go to stdout.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use jumpdiff::core::Real;
use jumpdiff::math::{Powell, Simplex};
use jumpdiff::models::{Bound, CalibrationConfig, MertonCalibrator, ParameterBounds};
use jumpdiff::processes::MertonParameter;
use jumpdiff::series;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SeriesKind {
    /// The column holds prices.
    Prices,
    /// The column holds per-step log-returns.
    LogReturns,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Method {
    Powell,
    Simplex,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Calibrate a Merton jump-diffusion to an observed series")]
struct Args {
    /// CSV file with a header row.
    #[arg(long)]
    csv: std::path::PathBuf,
    /// Column to read.
    #[arg(long, default_value = "close")]
    col: String,
    /// What the column holds.
    #[arg(long, value_enum, default_value_t = SeriesKind::Prices)]
    kind: SeriesKind,
    /// Time step between observations.
    #[arg(long, default_value_t = 1.0 / 252.0)]
    dt: Real,
    /// Number of optimizer restarts.
    #[arg(long, default_value_t = 5)]
    restarts: usize,
    /// Iteration cap per restart.
    #[arg(long, default_value_t = 200)]
    maxiter: usize,
    /// Paths simulated per objective evaluation.
    #[arg(long, default_value_t = 500)]
    paths: usize,
    /// Cap on jumps per step.
    #[arg(long = "k-max", default_value_t = 40)]
    k_max: u32,
    /// Simulation seed (random when omitted).
    #[arg(long)]
    seed: Option<u64>,
    /// Use the risk-neutral drift.
    #[arg(long)]
    risk_neutral: bool,
    /// Run restarts one after another.
    #[arg(long)]
    sequential: bool,
    /// Local search.
    #[arg(long, value_enum, default_value_t = Method::Powell)]
    method: Method,
    /// Override a default bound, e.g. `lam=0:5`. Repeatable.
    #[arg(long = "bound", value_parser = parse_bound)]
    bounds: Vec<(MertonParameter, Bound)>,
}

fn parse_bound(s: &str) -> Result<(MertonParameter, Bound), String> {
    let (name, range) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LOW:HIGH, got `{s}`"))?;
    let (low, high) = range
        .split_once(':')
        .ok_or_else(|| format!("expected LOW:HIGH after `{name}=`, got `{range}`"))?;
    let parameter = name.trim().parse::<MertonParameter>().map_err(|e| e.to_string())?;
    let low = low.trim().parse::<Real>().map_err(|e| format!("{low}: {e}"))?;
    let high = high.trim().parse::<Real>().map_err(|e| format!("{high}: {e}"))?;
    Ok((parameter, Bound::new(low, high)))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let column = series::read_column_from_path(&args.csv, &args.col)
        .with_context(|| format!("reading column `{}` of {}", args.col, args.csv.display()))?;
    let prices = match args.kind {
        SeriesKind::Prices => column,
        SeriesKind::LogReturns => series::prices_from_log_returns(1.0, &column)
            .context("rebuilding prices from log-returns")?,
    };
    if prices.len() < 2 {
        bail!(
            "{} holds {} usable observations; at least 2 prices are needed",
            args.csv.display(),
            prices.len()
        );
    }
    info!(observations = prices.len(), kind = ?args.kind, "loaded series");

    let mut bounds = ParameterBounds::merton_default();
    for &(parameter, bound) in &args.bounds {
        bounds = bounds
            .with_bound(parameter, bound)
            .with_context(|| format!("bound for {parameter}"))?;
    }

    let mut config = CalibrationConfig::default()
        .with_paths(args.paths)
        .with_restarts(args.restarts)
        .with_max_iterations(args.maxiter)
        .with_max_jumps(args.k_max)
        .risk_neutral(args.risk_neutral)
        .parallel(!args.sequential);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let calibrator = MertonCalibrator::new(config);
    let result = match args.method {
        Method::Powell => calibrator.with_method(Powell::new()).calibrate(&prices, &bounds, args.dt),
        Method::Simplex => calibrator
            .with_method(Simplex::default())
            .calibrate(&prices, &bounds, args.dt),
    }
    .context("calibration")?;

    print!("{result}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bound_syntax() {
        let (p, b) = parse_bound("lambda=0:5").unwrap();
        assert_eq!(p, MertonParameter::Lam);
        assert_eq!(b, Bound::new(0.0, 5.0));
        assert!(parse_bound("lam").is_err());
        assert!(parse_bound("lam=1").is_err());
        assert!(parse_bound("kappa=0:1").is_err());
        assert!(parse_bound("sigma=a:1").is_err());
    }

    #[test]
    fn cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn parses_arguments() {
        let args = Args::try_parse_from([
            "jumpdiff-calibrate",
            "--csv",
            "x.csv",
            "--kind",
            "log-returns",
            "--k-max",
            "10",
            "--bound",
            "mu=-0.5:0.5",
            "--bound",
            "sigma_j=0.001:1",
        ])
        .unwrap();
        assert_eq!(args.kind, SeriesKind::LogReturns);
        assert_eq!(args.k_max, 10);
        assert_eq!(args.bounds.len(), 2);
        assert_eq!(args.col, "close");
        assert_eq!(args.method, Method::Powell);
    }
}
