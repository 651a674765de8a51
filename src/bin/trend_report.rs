//! Trend report - normalize a risk status trend payload offline
//!
//! Reads a `RiskStatusTrendPayload` JSON document and prints the aligned
//! payload together with its reconciliation report.
//!
//! # Usage
//!
//! ```bash
//! # From a file
//! trend-report payload.json
//!
//! # From stdin, as percentages
//! curl -s $BACKEND/trend | trend-report --percent
//!
//! # Inspect the bundled mock payload
//! trend-report --mock
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;

use sentinel::analytics::normalize_as;
use sentinel::config::SentinelConfig;
use sentinel::mock::MockDataset;
use sentinel::types::{RiskStatusTrendPayload, TrendUnit};

#[derive(Parser, Debug)]
#[command(name = "trend-report")]
#[command(about = "Normalize a risk status trend payload and report what was reconciled")]
#[command(version)]
struct Args {
    /// Payload JSON file; reads stdin when omitted
    #[arg(value_name = "FILE", conflicts_with = "mock")]
    input: Option<PathBuf>,

    /// Convert counters to percentages of each bucket
    #[arg(long)]
    percent: bool,

    /// Use the bundled mock dataset's payload
    #[arg(long)]
    mock: bool,

    /// Print only the reconciliation report
    #[arg(long)]
    report_only: bool,

    /// Exit with status 2 when anything had to be reconciled
    #[arg(long)]
    strict: bool,
}

fn read_payload(args: &Args) -> Result<RiskStatusTrendPayload> {
    if args.mock {
        let dataset = MockDataset::from_config(&SentinelConfig::load());
        return Ok(dataset.risk_trend_payload());
    }
    let text = match &args.input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            buf
        }
    };
    serde_json::from_str(&text).context("Invalid trend payload JSON")
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();
    let payload = read_payload(&args)?;
    let unit = if args.percent { TrendUnit::Percent } else { TrendUnit::Count };
    let normalized = normalize_as(&payload, unit);

    let out = if args.report_only {
        serde_json::to_string_pretty(&normalized.report)?
    } else {
        serde_json::to_string_pretty(&normalized)?
    };
    println!("{out}");

    if args.strict && !normalized.report.is_clean() {
        warn!("Payload needed reconciliation");
        std::process::exit(2);
    }
    Ok(())
}
