mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "pipewright",
    version,
    about = "Resolve streaming-ETL pipeline wiring and derive its least-privilege policy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a pipeline configuration file
    Check {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
    },
    /// Resolve the pipeline without side effects and print the plan
    Plan {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
        /// Emit the plan as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Resolve the pipeline and print the derived policy document
    Policy {
        /// Path to pipeline YAML file
        pipeline: PathBuf,
        /// Write the policy JSON to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Check { pipeline } => commands::check::execute(&pipeline),
        Commands::Plan { pipeline, json } => commands::plan::execute(&pipeline, json),
        Commands::Policy { pipeline, output } => {
            commands::policy::execute(&pipeline, output.as_deref())
        }
    }
}
