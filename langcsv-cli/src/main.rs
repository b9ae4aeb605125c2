use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use langcsv_cli::{
    Config, ExitStatus, ExportCommand, ImportCommand, load_config, run_export, run_import,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of the nearest langcsv.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root of the translation tree
    #[arg(long, global = true, env = "LANGCSV_LANG_PATH")]
    lang_path: Option<PathBuf>,

    /// Locale exported when no locale flag is given
    #[arg(long, global = true, env = "LANGCSV_DEFAULT_LOCALE")]
    default_locale: Option<String>,

    /// Log progress (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    commands: Commands,
}

/// Supported subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Export translation files to a CSV table.
    Export {
        /// The CSV file to write (defaults to the configured export path)
        path: Option<PathBuf>,

        /// Comma separated locales to export
        #[arg(short, long, conflicts_with = "all")]
        locales: Option<String>,

        /// Export every locale
        #[arg(short, long)]
        all: bool,

        /// Read JSON translation files instead of PHP ones
        #[arg(long)]
        json: bool,
    },

    /// Import an edited CSV table back into translation files.
    Import {
        /// The CSV file to read (defaults to the configured export path)
        path: Option<PathBuf>,

        /// Write JSON files instead of PHP ones
        #[arg(long)]
        json: bool,

        /// Only import rows of this locale
        #[arg(long)]
        locale: Option<String>,

        /// Print the files that would be written without writing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &Args) -> Result<Config, langcsv::Error> {
    let cwd = std::env::current_dir()?;
    let loaded = load_config(args.config.as_deref(), &cwd)?;
    match &loaded.source {
        Some(path) => debug!("Using config {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }
    Ok(loaded
        .config
        .with_overrides(args.lang_path.clone(), args.default_locale.clone()))
}

fn run(args: Args) -> ExitStatus {
    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ {}", e);
            return ExitStatus::Error;
        }
    };

    match args.commands {
        Commands::Export {
            path,
            locales,
            all,
            json,
        } => run_export(
            &config,
            &ExportCommand {
                path,
                locales,
                all,
                json,
            },
        ),
        Commands::Import {
            path,
            json,
            locale,
            dry_run,
        } => run_import(
            &config,
            &ImportCommand {
                path,
                json,
                locale,
                dry_run,
            },
        ),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);
    run(args).into()
}
