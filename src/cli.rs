use std::env;
use std::path::PathBuf;

/// Parsed command-line options.
pub struct CliOptions {
    /// TOML configuration file path.
    pub config: PathBuf,
    /// Base-directory override for CSV discovery.
    pub dir: Option<PathBuf>,
    /// Maximum inter-sample interval override (minutes).
    pub interval_minutes: Option<i64>,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut dir = None;
    let mut interval_minutes = None;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.get(i).ok_or_else(|| {
                    "missing value for --config (expected a TOML file path)".to_string()
                })?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--dir" => {
                i += 1;
                let path = args.get(i).ok_or_else(|| {
                    "missing value for --dir (expected a directory path)".to_string()
                })?;
                if dir.replace(PathBuf::from(path)).is_some() {
                    return Err("--dir provided more than once".to_string());
                }
            }
            "--interval" => {
                i += 1;
                let raw = args.get(i).ok_or_else(|| {
                    "missing value for --interval (expected minutes)".to_string()
                })?;
                let minutes: i64 = raw
                    .parse()
                    .map_err(|_| format!("--interval value \"{raw}\" is not a valid number"))?;
                if interval_minutes.replace(minutes).is_some() {
                    return Err("--interval provided more than once".to_string());
                }
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(CliOptions {
        config: config.unwrap_or_else(|| PathBuf::from("costs.toml")),
        dir,
        interval_minutes,
    })
}

pub fn print_usage() {
    eprintln!("meter-sim: replay meter history under no-solar, solar, and solar+battery tariffs");
    eprintln!();
    eprintln!("Usage: meter-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>      TOML config file (default: costs.toml)");
    eprintln!("  --dir <path>         Base directory for CSV files (overrides config)");
    eprintln!("  --interval <mins>    Max interval between samples (overrides config)");
    eprintln!("  --help               Show this help message");
}
