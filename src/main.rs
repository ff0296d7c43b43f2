// src/main.rs — windowbench entry point

use clap::Parser;

use windowbench::cli::analyze::{self, AnalyzeOptions};
use windowbench::cli::{inspect, list, Cli, Commands};
use windowbench::infra::config::Config;
use windowbench::infra::errors::ScoreError;
use windowbench::infra::logger;

fn main() {
    let cli = Cli::parse();

    // Initialize logging (respects RUST_LOG)
    logger::init_logging(if cli.verbose { "debug" } else { "warn" });

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        if e
            .downcast_ref::<ScoreError>()
            .is_some_and(ScoreError::is_config_error)
        {
            eprintln!("hint: run `windowbench list` to see configured detectors");
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };
    let root = cli.root.as_deref();

    match cli.command {
        Commands::Analyze {
            detector,
            profile,
            format,
            ranking,
            calibrate,
        } => analyze::run_analyze(
            &config,
            root,
            &AnalyzeOptions {
                detector,
                profile,
                format,
                ranking,
                calibrate,
            },
        ),
        Commands::Inspect {
            detector,
            series,
            profile,
            calibrate,
        } => inspect::run_inspect(
            &config,
            root,
            &detector,
            &series,
            profile.as_deref(),
            calibrate,
        ),
        Commands::List => list::run_list(&config, root),
    }
}
