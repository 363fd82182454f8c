//! # V2X Spectrum Simulation Runtime
//!
//! ```text
//! sim-runtime [SCENARIO.json] [--json] [--metrics]
//! ```
//!
//! Without a scenario file the built-in highway scenario runs. `--json`
//! prints the report as JSON; `--metrics` appends the Prometheus text
//! exposition of the run's metrics.
//!
//! Logging is configured through the `VS_*` environment variables.

use anyhow::{Context, Result};
use tracing::info;

use sim_runtime::{ScenarioConfig, SimRuntime};
use vs_telemetry::{encode_metrics, init_telemetry, TelemetryConfig};

struct Args {
    scenario: Option<String>,
    json: bool,
    metrics: bool,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        scenario: None,
        json: false,
        metrics: false,
    };
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--json" => args.json = true,
            "--metrics" => args.metrics = true,
            flag if flag.starts_with("--") => anyhow::bail!("Unknown flag {flag}"),
            path if args.scenario.is_none() => args.scenario = Some(path.to_string()),
            extra => anyhow::bail!("Unexpected argument {extra}"),
        }
    }
    Ok(args)
}

fn main() -> Result<()> {
    let args = parse_args()?;

    let telemetry = TelemetryConfig::from_env();
    telemetry.validate()?;
    let _telemetry = init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = match &args.scenario {
        Some(path) => ScenarioConfig::from_file(path)
            .with_context(|| format!("Failed to load scenario {path}"))?,
        None => {
            info!("No scenario file given, running the built-in highway scenario");
            ScenarioConfig::default()
        }
    };

    let runtime = SimRuntime::new(config).context("Failed to build simulation")?;
    let report = runtime.run().context("Simulation aborted")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }
    if args.metrics {
        print!("{}", encode_metrics()?);
    }
    Ok(())
}
