//! meter-sim entry point: CLI wiring, config loading, and the run loop.

use std::process;

use anyhow::Result;
use chrono::Duration;
use tracing_subscriber::EnvFilter;

use meter_sim::cli;
use meter_sim::config::Config;
use meter_sim::ingest;
use meter_sim::report::Report;
use meter_sim::sim::battery::BatteryState;
use meter_sim::sim::engine::Engine;
use meter_sim::sim::tariff::TariffSchedule;

/// Builds the engine from a validated config.
fn build_engine(config: &Config) -> Engine {
    let b = &config.battery;
    // Assume the battery starts the run already charged to one hour's worth
    // of discharge capacity.
    let battery = BatteryState::new(b.size, b.discharge, b.discharge, b.recharge, b.overcharge);
    let tariffs = TariffSchedule::new(config.cost.clone());
    let max_interval = Duration::minutes(config.simulation.max_interval_minutes);
    Engine::new(tariffs, battery, max_interval)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let opts = cli::parse_args().unwrap_or_else(|e| {
        eprintln!("error: {e}");
        cli::print_usage();
        process::exit(1);
    });

    let mut config = Config::from_toml_file(&opts.config)?;

    // CLI overrides take priority over the config file.
    if let Some(dir) = opts.dir {
        config.simulation.base_dir = dir;
    }
    if let Some(minutes) = opts.interval_minutes {
        config.simulation.max_interval_minutes = minutes;
    }

    let errors = config.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let files = ingest::discover_files(&config.simulation.base_dir, &config.years)?;

    let mut engine = build_engine(&config);
    ingest::ingest_all(&files, &mut engine);

    let report = Report::from_engine(&engine);
    print!("{report}");

    Ok(())
}
