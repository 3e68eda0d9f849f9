//! Congestion tax CLI
//!
//! ```sh
//! # Run the REST API with default config (~/.config/congestion-tax/config.toml)
//! congestion-tax serve
//!
//! # Custom config path and port
//! congestion-tax serve --config /etc/congestion-tax/config.toml --api-port 8080
//!
//! # Validate config and rule files without starting
//! congestion-tax serve --check
//!
//! # Write a config file with the defaults and the given overrides
//! congestion-tax serve --init --api-port 9090
//!
//! # One-off calculation, printed as JSON
//! congestion-tax calculate --vehicle car "2013-02-08 06:27:00" "2013-02-08 15:47:00"
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use congestion_tax::config::{config_path_from_env, AppConfig, CONFIG_ENV};
use congestion_tax::interfaces::http::modules::tax::TaxResponse;
use congestion_tax::server::{build_tax_service, init_tracing, ServerHandle, ServerOptions};
use congestion_tax::VehicleType;

/// Congestion tax calculator and REST API server.
#[derive(Parser, Debug)]
#[command(name = "congestion-tax", version, about)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, global = true, env = CONFIG_ENV)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the REST API server.
    Serve(ServeArgs),
    /// Calculate the tax for one vehicle and print it as JSON.
    Calculate(CalculateArgs),
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Override the REST API listen port.
    #[arg(long)]
    api_port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and rules, then exit without serving.
    #[arg(long)]
    check: bool,

    /// Write the effective configuration to the config path, then exit.
    #[arg(long, conflicts_with = "check")]
    init: bool,

    /// Do not install the Prometheus recorder or serve /metrics.
    #[arg(long)]
    no_metrics: bool,
}

#[derive(Args, Debug)]
struct CalculateArgs {
    /// Vehicle type (CAR, MOTORCYCLE, BUS, EMERGENCY, DIPLOMAT, MILITARY, FOREIGN).
    #[arg(long)]
    vehicle: VehicleType,

    /// City whose rules apply. Defaults to rules.default_city.
    #[arg(long)]
    city: Option<String>,

    /// Extra rule files or directories, loaded after the configured ones.
    #[arg(long = "rules")]
    rules: Vec<PathBuf>,

    /// Pretty-print the JSON output.
    #[arg(long)]
    pretty: bool,

    /// Passage timestamps, `yyyy-MM-dd HH:mm:ss`.
    #[arg(required = true, num_args = 1..)]
    dates: Vec<String>,
}

/// A missing config file means defaults; an unreadable or invalid one is an error.
fn load_config(explicit: Option<PathBuf>) -> Result<(PathBuf, AppConfig), String> {
    let path = explicit.unwrap_or_else(config_path_from_env);
    if !path.exists() {
        return Ok((path, AppConfig::default()));
    }

    AppConfig::load(&path)
        .map(|cfg| (path.clone(), cfg))
        .map_err(|e| format!("Failed to load config from {}: {}", path.display(), e))
}

async fn serve(mut config: AppConfig, config_path: PathBuf, args: ServeArgs) -> ExitCode {
    if let Some(port) = args.api_port {
        config.server.api_port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    if args.init {
        return match config.save(&config_path) {
            Ok(()) => {
                println!("✅ Configuration written to {}", config_path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        };
    }

    init_tracing(&config);
    info!("Configuration from {}", config_path.display());

    if args.check {
        return match build_tax_service(&config.rules) {
            Ok(service) => {
                println!("✅ Configuration is valid");
                println!("   Config file  : {}", config_path.display());
                println!("   API address  : {}", config.server.address());
                println!("   Log level    : {}", config.logging.level);
                println!("   Cities       : {}", service.cities().join(", "));
                println!("   Default city : {}", service.default_city());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("❌ {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let handle = match ServerHandle::start(ServerOptions {
        config,
        metrics: !args.no_metrics,
    })
    .await
    {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start: {}", e);
            return ExitCode::FAILURE;
        }
    };

    handle.install_signal_handler();
    info!("🚀 Press Ctrl+C to shutdown gracefully.");

    handle.shutdown_signal().wait().await;
    handle.wait().await;

    ExitCode::SUCCESS
}

fn calculate(mut config: AppConfig, args: CalculateArgs) -> ExitCode {
    // stdout carries the JSON result only
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    config.rules.paths.extend(args.rules);

    let service = match build_tax_service(&config.rules) {
        Ok(service) => service,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let assessment = match service.calculate(args.vehicle, &args.dates, args.city.as_deref()) {
        Ok(assessment) => assessment,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let response = TaxResponse::from(assessment);
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };

    match rendered {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config_path, config) = match load_config(cli.config) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Serve(args) => serve(config, config_path, args).await,
        Command::Calculate(args) => calculate(config, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_calculate_with_case_insensitive_vehicle() {
        let cli = Cli::try_parse_from([
            "congestion-tax",
            "calculate",
            "--vehicle",
            "motorcycle",
            "--city",
            "Gothenburg",
            "2013-02-08 06:27:00",
        ])
        .unwrap();

        match cli.command {
            Command::Calculate(args) => {
                assert_eq!(args.vehicle, VehicleType::Motorcycle);
                assert_eq!(args.city.as_deref(), Some("Gothenburg"));
                assert_eq!(args.dates, vec!["2013-02-08 06:27:00"]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn calculate_requires_dates() {
        assert!(Cli::try_parse_from(["congestion-tax", "calculate", "--vehicle", "car"]).is_err());
    }

    #[test]
    fn rejects_unknown_vehicle() {
        assert!(Cli::try_parse_from([
            "congestion-tax",
            "calculate",
            "--vehicle",
            "tractor",
            "2013-02-08 06:27:00",
        ])
        .is_err());
    }

    #[test]
    fn init_and_check_are_exclusive() {
        assert!(Cli::try_parse_from(["congestion-tax", "serve", "--init", "--check"]).is_err());
    }

    #[test]
    fn parses_serve_overrides() {
        let cli = Cli::try_parse_from([
            "congestion-tax",
            "serve",
            "--api-port",
            "9090",
            "--check",
            "--config",
            "/tmp/c.toml",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        match cli.command {
            Command::Serve(args) => {
                assert_eq!(args.api_port, Some(9090));
                assert!(args.check);
                assert!(!args.init);
                assert!(!args.no_metrics);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
