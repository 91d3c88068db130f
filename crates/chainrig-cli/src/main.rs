//! chainrig CLI - procedural control rigs from metarigs
//!
//! Generates, validates and inspects rigs described by a metarig JSON file.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use chainrig_cli::commands;

/// chainrig - procedural control rigs from metarigs
#[derive(Parser)]
#[command(name = "chainrig")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log generation details to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate every rig of a metarig
    Generate {
        /// Path to the metarig JSON file
        #[arg(short, long)]
        metarig: String,

        /// Write the generated armature as JSON
        #[arg(short, long)]
        out: Option<String>,

        /// Write the generation report as JSON
        #[arg(short, long)]
        report: Option<String>,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Run discovery on a metarig without generating anything
    Validate {
        /// Path to the metarig JSON file
        #[arg(short, long)]
        metarig: String,

        /// Output machine-readable JSON diagnostics (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Show the chains and sub-chains of every rig
    Inspect {
        /// Path to the metarig JSON file
        #[arg(short, long)]
        metarig: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            metarig,
            out,
            report,
            json,
        } => commands::generate::run(&metarig, out.as_deref(), report.as_deref(), json),
        Commands::Validate { metarig, json } => commands::validate::run(&metarig, json),
        Commands::Inspect { metarig } => commands::inspect::run(&metarig),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", colored::Colorize::red("error"), e);
            ExitCode::from(1)
        }
    }
}
