//! Societrics strain engine CLI.
//!
//! Runs one scenario from a preset, optionally under a scripted plan, writes
//! the step history as JSON lines and prints an analysis report.

use analyst::{export_rows, Analyst, AnalystConfig};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use societrics_core::config::{default_config_toml, ConfigError, EngineConfig, DEFAULT_CONFIG_PATH};
use societrics_core::indices::{CapacityScheme, WsiPreset, ZoneScheme};
use societrics_core::output::{HistoryWriter, WriterError};
use societrics_core::{EngineError, Plan, Preset, Scenario};

/// Command line arguments for the engine
#[derive(Parser, Debug)]
#[command(name = "societrics")]
#[command(about = "Societrics system-stress simulation engine")]
struct Args {
    /// Engine configuration file (TOML); `societrics.toml` is used when present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Analyst configuration file (TOML)
    #[arg(long)]
    analyst_config: Option<PathBuf>,

    /// Preset file (TOML); defaults to the built-in custom scenario
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Scripted plan of shock and phase activations (TOML)
    #[arg(long)]
    plan: Option<PathBuf>,

    /// Number of steps to run
    #[arg(long)]
    steps: Option<u64>,

    /// Shock ids to activate before the first step
    #[arg(long = "shock")]
    shocks: Vec<String>,

    /// WSI weight set
    #[arg(long, value_enum)]
    weights: Option<WeightsArg>,

    /// Effective-capacity scheme
    #[arg(long, value_enum)]
    capacity: Option<CapacityArg>,

    /// Zone classification scheme
    #[arg(long, value_enum)]
    zones: Option<ZonesArg>,

    /// Milliseconds between steps (playback mode)
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Write step records as JSON lines
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write export rows as JSON lines
    #[arg(long)]
    export: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WeightsArg {
    Balanced,
    EducationWeighted,
    PowerWeighted,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CapacityArg {
    Multiplicative,
    Additive,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ZonesArg {
    OneSided,
    ElasticMiddle,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    AnalystConfig(#[from] analyst::ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Writer(#[from] WriterError),
    #[error("failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut config = load_config(&args)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let preset = match &args.preset {
        Some(path) => Preset::from_file(path)?,
        None => Preset::custom(),
    };
    let plan = match &args.plan {
        Some(path) => Plan::from_file(path)?,
        None => Plan::default(),
    };
    let analyst = match &args.analyst_config {
        Some(path) => Analyst::from_config_file(path)?,
        None => Analyst::new(AnalystConfig::default()),
    };

    let steps = args.steps.unwrap_or(config.simulation.default_steps);
    let delay_ms = args.delay_ms.unwrap_or(config.simulation.playback_delay_ms);

    info!(preset = %preset.id, steps, "starting scenario");
    let mut scenario = Scenario::new(&config, preset)?;
    for id in &args.shocks {
        scenario.apply_shock(id)?;
    }

    for _ in 0..steps {
        plan.apply_due(&mut scenario)?;
        let record = scenario.step()?;
        if delay_ms > 0 {
            info!(
                step = record.step,
                theta = record.metrics.theta,
                zone = %record.metrics.zone,
                phase = record.phase_label(),
                "step"
            );
            thread::sleep(Duration::from_millis(delay_ms));
        }
    }

    let metrics = scenario.current_metrics();
    info!(
        steps = scenario.elapsed(),
        theta = metrics.theta,
        zone = %metrics.zone,
        "scenario complete"
    );

    if let Some(path) = &args.output {
        let mut writer = HistoryWriter::new(path)?;
        writer.write_all(scenario.history())?;
        writer.flush()?;
        info!("wrote {} records to {}", writer.row_count(), path.display());
    }
    if let Some(path) = &args.export {
        let mut writer = HistoryWriter::new(path)?;
        writer.write_all(&export_rows(scenario.history()))?;
        writer.flush()?;
        info!("wrote {} rows to {}", writer.row_count(), path.display());
    }

    let report = analyst.report(
        metrics,
        scenario.active_phase(),
        scenario.history(),
        scenario.log(),
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn load_config(args: &Args) -> Result<EngineConfig, ConfigError> {
    match &args.config {
        Some(path) => EngineConfig::from_file(path),
        None => {
            let default_path = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_path.exists() {
                EngineConfig::from_file(&default_path)
            } else {
                Ok(EngineConfig::default())
            }
        }
    }
}

fn apply_overrides(config: &mut EngineConfig, args: &Args) {
    if let Some(weights) = args.weights {
        let preset = match weights {
            WeightsArg::Balanced => WsiPreset::Balanced,
            WeightsArg::EducationWeighted => WsiPreset::EducationWeighted,
            WeightsArg::PowerWeighted => WsiPreset::PowerWeighted,
        };
        config.indices.wsi_weights = preset.weights();
    }
    if let Some(capacity) = args.capacity {
        config.indices.capacity = match capacity {
            CapacityArg::Multiplicative => CapacityScheme::Multiplicative,
            CapacityArg::Additive => CapacityScheme::Additive,
        };
    }
    if let Some(zones) = args.zones {
        config.indices.zones = match zones {
            ZonesArg::OneSided => ZoneScheme::OneSided,
            ZonesArg::ElasticMiddle => ZoneScheme::ElasticMiddle,
        };
    }
}
