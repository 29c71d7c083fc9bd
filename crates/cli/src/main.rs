//! Cogwheel command line tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod format;
mod settings;

use format::FormatKind;
use settings::{LoggingSettings, SettingsLoader};

#[derive(Parser)]
#[command(name = "cogwheel")]
#[command(version)]
#[command(about = "Convert and check configuration documents", long_about = None)]
struct Cli {
    /// Settings file for the tool
    #[arg(
        long,
        global = true,
        env = "COGWHEEL_SETTINGS",
        default_value = "cogwheel.yaml",
        value_name = "PATH"
    )]
    settings: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-encode a document in another format
    Convert {
        input: PathBuf,
        /// Output file; prints to stdout when omitted
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,
        /// Input format, inferred from the extension by default
        #[arg(long, value_enum)]
        from: Option<FormatKind>,
        /// Output format, inferred from the output extension by default
        #[arg(long, value_enum)]
        to: Option<FormatKind>,
    },
    /// Decode a document and print a summary
    Check {
        input: PathBuf,
        #[arg(long, value_enum)]
        from: Option<FormatKind>,
    },
    /// Write an example settings file
    InitSettings {
        #[arg(default_value = "cogwheel.yaml")]
        path: PathBuf,
    },
}

fn main() -> Result<()> {
    let dotenv_result = dotenv::dotenv();
    let cli = Cli::parse();

    let settings = SettingsLoader::load(&cli.settings)
        .with_context(|| format!("Failed to load settings from {}", cli.settings.display()))?;

    init_logging(&settings.logging)?;

    match dotenv_result {
        Ok(path) => debug!("Loaded environment variables from {}", path.display()),
        Err(e) if !e.not_found() => warn!("Could not load .env file: {}", e),
        Err(_) => {}
    }
    debug!(settings = %cli.settings.display(), "Settings loaded");

    match cli.command {
        Commands::Convert {
            input,
            output,
            from,
            to,
        } => {
            let text = commands::convert(&settings, &input, output.as_deref(), from, to)?;
            if output.is_none() {
                print!("{}", text);
                if !text.ends_with('\n') {
                    println!();
                }
            }
        }
        Commands::Check { input, from } => {
            let summary = commands::check(&settings, &input, from)?;
            println!("{}: {}", input.display(), summary);
        }
        Commands::InitSettings { path } => {
            SettingsLoader::create_example(&path)?;
            info!(path = %path.display(), "Example settings written");
            println!("Wrote example settings to {}", path.display());
        }
    }

    Ok(())
}

/// Initialize logging from the settings, letting `RUST_LOG` override the level
fn init_logging(logging: &LoggingSettings) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);

    match logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize JSON logging")?;
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .try_init()
                .context("Failed to initialize pretty logging")?;
        }
    }

    debug!(level = %logging.level, format = %logging.format, "Logging initialized");
    Ok(())
}
