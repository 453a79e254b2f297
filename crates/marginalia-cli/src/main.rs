//! Marginalia CLI
//!
//! Formats sources with their comments kept, and inspects how comments and
//! directives are spliced into the syntax tree.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

use commands::*;

/// Keeps comments and directives attached to the syntax tree
#[derive(Parser)]
#[command(
    name = "marginalia",
    version,
    about = "Keeps comments and directives attached to the syntax tree",
    long_about = "marginalia parses sources, splices every comment back into the syntax tree \
                  (recognising pragma and preprocessor-style directives), and renders the \
                  tree as source again with the comments in place."
)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(short = 'j', long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Re-render files with their comments attached
    Fmt {
        /// Files or directories to format
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Report files that would change, without writing them
        #[arg(long)]
        check: bool,

        /// Show a unified diff for every changed file
        #[arg(long)]
        diff: bool,
    },

    /// Print the spliced syntax tree of a file
    Dump {
        file: PathBuf,

        /// Emit the tree as JSON
        #[arg(long)]
        json: bool,

        /// Dump the tree without trivia
        #[arg(long)]
        plain: bool,
    },

    /// List the trivia tokens of a file and where each one was anchored
    Tokens {
        file: PathBuf,

        /// Emit the splice events as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify that files survive a render and re-parse unchanged
    Check {
        /// Files or directories to check
        #[arg(default_value = ".")]
        paths: Vec<PathBuf>,

        /// Print the expected and actual dumps of failing files
        #[arg(long)]
        details: bool,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show version information
    Version {
        /// Show detailed version information
        #[arg(long)]
        detailed: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved configuration
    Show {
        /// Also print where it was loaded from
        #[arg(long)]
        resolved: bool,
    },
    /// Print the JSON schema of the configuration file
    Schema,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Failed to initialize logging: {e}");
        process::exit(1);
    }

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to configure thread pool: {}", e);
        process::exit(1);
    }

    let result = match cli.command {
        Commands::Fmt { paths, check, diff } => {
            format_command(paths, check, diff, cli.config.as_deref())
        }
        Commands::Dump { file, json, plain } => dump_command(file, json, plain, cli.config.as_deref()),
        Commands::Tokens { file, json } => tokens_command(file, json, cli.config.as_deref()),
        Commands::Check { paths, details } => check_command(paths, details, cli.config.as_deref()),
        Commands::Config { action } => match action {
            ConfigAction::Show { resolved } => config_show_command(resolved, cli.config.as_deref()),
            ConfigAction::Schema => config_schema_command(),
        },
        Commands::Version { detailed } => version_command(detailed),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {e:#}");
            process::exit(2);
        }
    }
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("marginalia_core={level},marginalia={level}"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    Ok(())
}
