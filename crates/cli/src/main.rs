//! Waterfall CLI
//!
//! Runs the waterfall layout engine inside a simulated list host.
//!
//! Logs go to stderr, results to stdout as JSON.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use waterfall_cli::config::{config_paths, Config};
use waterfall_cli::engine::ListEngine;
use waterfall_cli::engine_from_config;
use waterfall_cli::replay::run_script;
use waterfall_protocol::{encode_response, HostCommand};

#[derive(Parser)]
#[command(name = "waterfall")]
#[command(author, version, about = "Simulate a multi-column waterfall list")]
struct Cli {
    /// Path to a config file (overrides the standard locations)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the list, optionally scroll it, and print the realized children
    Simulate {
        /// Pixels to scroll per step
        #[arg(short, long, default_value = "0")]
        scroll: i32,
        /// Number of scroll steps
        #[arg(long, default_value = "1")]
        steps: usize,
        /// Re-layout from this position before scrolling
        #[arg(short, long)]
        jump: Option<usize>,
        /// Print column geometry after every step
        #[arg(long)]
        columns: bool,
    },
    /// Execute a JSON-lines command script ("-" reads stdin)
    Replay {
        /// Script path
        script: String,
    },
    /// Show the resolved configuration
    Config {
        /// Only list the config search paths
        #[arg(long)]
        paths: bool,
    },
}

fn init_logging(level: &str) -> Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_response(
    out: &mut impl Write,
    engine: &mut ListEngine,
    command: HostCommand,
) -> Result<()> {
    let response = engine.execute(command);
    writeln!(out, "{}", encode_response(&response)?)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logging is not up yet while the config loads.
    let mut config = Config::load(cli.config.as_deref()).unwrap_or_else(|e| {
        eprintln!("Failed to load configuration: {:#}. Using defaults.", e);
        Config::default()
    });
    if let Some(level) = &cli.log_level {
        config.behavior.log_level = level.clone();
    }

    let warnings = config.validate();
    init_logging(&config.behavior.log_level)?;
    for w in &warnings {
        warn!("Config: {} - {}", w.field, w.message);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Simulate {
            scroll,
            steps,
            jump,
            columns,
        } => {
            let mut engine = engine_from_config(&config)?;
            info!(
                "Simulating {} items in {} columns",
                engine.item_count(),
                engine.layout().column_count()
            );
            if let Some(position) = jump {
                print_response(&mut out, &mut engine, HostCommand::JumpTo { position })?;
            }
            if columns {
                print_response(&mut out, &mut engine, HostCommand::QueryColumns)?;
            }
            if scroll != 0 {
                for _ in 0..steps {
                    engine.scroll_by(scroll);
                    if columns {
                        print_response(&mut out, &mut engine, HostCommand::QueryColumns)?;
                    }
                }
            }
            print_response(&mut out, &mut engine, HostCommand::QueryPlacements)?;
        }
        Commands::Replay { script } => {
            let mut engine = engine_from_config(&config)?;
            let summary = if script == "-" {
                run_script(&mut engine, io::stdin().lock(), &mut out)?
            } else {
                let file = File::open(&script)
                    .with_context(|| format!("Failed to open script: {}", script))?;
                run_script(&mut engine, BufReader::new(file), &mut out)?
            };
            info!(
                "Replayed {} commands ({} errors)",
                summary.commands, summary.errors
            );
        }
        Commands::Config { paths } => {
            if paths {
                for path in config_paths() {
                    let marker = if path.exists() { "*" } else { " " };
                    writeln!(out, "{} {}", marker, path.display())?;
                }
            } else {
                let rendered =
                    toml::to_string_pretty(&config).context("Failed to render configuration")?;
                write!(out, "{}", rendered)?;
            }
        }
    }

    Ok(())
}
