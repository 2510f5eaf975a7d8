use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod common;

use common::Globals;

#[derive(Parser)]
#[command(name = "healthdash", version, about = "Healthdash CLI")]
struct Cli {
    /// Directory holding the JSON record files (overrides data.dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Evaluate as of this local time, YYYY-MM-DDTHH:MM[:SS]
    #[arg(long, global = true)]
    now: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Today's dashboard summary
    Status {
        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Adherence figures
    Adherence {
        #[command(subcommand)]
        action: commands::adherence::AdherenceAction,
    },
    /// Active alerts, most urgent first
    Alerts,
    /// The next dose due
    Next {
        #[arg(long)]
        json: bool,
    },
    /// Symptom insights and trends
    Insights,
    /// Protocol schedule and plan
    Protocol {
        #[command(subcommand)]
        action: commands::protocol::ProtocolAction,
    },
    /// Summary reports
    Report {
        #[command(subcommand)]
        action: commands::report::ReportAction,
    },
    /// Die-off, SIFO and treatment-history assessments
    Risk {
        #[command(subcommand)]
        action: commands::risk::RiskAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let globals = Globals {
        data_dir: cli.data_dir,
        now: cli.now,
    };
    let result = match cli.command {
        Commands::Status { json } => commands::status::run(&globals, json),
        Commands::Adherence { action } => commands::adherence::run(&globals, action),
        Commands::Alerts => commands::status::alerts(&globals),
        Commands::Next { json } => commands::status::next(&globals, json),
        Commands::Insights => commands::status::insights(&globals),
        Commands::Protocol { action } => commands::protocol::run(&globals, action),
        Commands::Report { action } => commands::report::run(&globals, action),
        Commands::Risk { action } => commands::risk::run(&globals, action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
