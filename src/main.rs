#![forbid(unsafe_code)]
//! ExportScore Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use exportscore::commands::{
    execute_dashboard, execute_init, execute_score, execute_validate, parse_fill,
    DashboardOptions, InitOptions, ScoreOptions, ValidateOptions,
};
use exportscore::config::CONFIG_FILE;
use exportscore::{Alignment, Config, Indicator, ReportFormat};

#[derive(Parser)]
#[command(name = "exportscore")]
#[command(about = "ExportScore - Success probability of candidate export products")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize an ExportScore configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,

        /// Classifier artifact path
        #[arg(long)]
        model: Option<PathBuf>,

        /// Fitted scaler artifact path
        #[arg(long)]
        scaler: Option<PathBuf>,

        /// Report output path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Report format (xlsx, csv)
        #[arg(long)]
        format: Option<ReportFormat>,

        /// Skip interactive prompts (use defaults + CLI args)
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Validate a prediction dataset
    Validate {
        /// File to validate
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score one product without prompts
    Score {
        /// Training dataset
        #[arg(long)]
        train: PathBuf,

        /// Prediction dataset
        #[arg(long)]
        predict: PathBuf,

        /// Product name to score
        #[arg(long, conflicts_with = "code")]
        product: Option<String>,

        /// HS code filter; the first match is scored
        #[arg(long)]
        code: Option<String>,

        /// Strategic alignment (yes/no)
        #[arg(short, long)]
        alignment: Alignment,

        /// Value for a missing indicator, as COLUMN=VALUE (repeatable)
        #[arg(long, value_parser = parse_fill)]
        fill: Vec<(Indicator, f64)>,

        /// Append the result to the report and write it
        #[arg(long)]
        add_to_report: bool,

        /// Report output path
        #[arg(long)]
        report: Option<PathBuf>,

        /// Report format (xlsx, csv)
        #[arg(long)]
        format: Option<ReportFormat>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Start the interactive dashboard
    Dashboard {
        /// Training dataset (prompted if omitted)
        #[arg(long)]
        train: Option<PathBuf>,

        /// Prediction dataset (prompted if omitted)
        #[arg(long)]
        predict: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Load config
    let config = if cli.config.exists() {
        Config::load(&cli.config)?
    } else {
        Config::default()
    };

    match cli.command {
        Commands::Init {
            force,
            model,
            scaler,
            report,
            format,
            yes,
        } => {
            let options = InitOptions {
                path: Some(cli.config),
                force,
                model,
                scaler,
                report,
                format,
                yes,
            };
            execute_init(options)?;
        }

        Commands::Validate { file, json } => {
            execute_validate(ValidateOptions { file, json })?;
        }

        Commands::Score {
            train,
            predict,
            product,
            code,
            alignment,
            fill,
            add_to_report,
            report,
            format,
            json,
        } => {
            let options = ScoreOptions {
                training: train,
                prediction: predict,
                product,
                code,
                alignment,
                fill,
                add_to_report,
                report,
                format,
                json,
            };
            execute_score(options, &config)?;
        }

        Commands::Dashboard { train, predict } => {
            let options = DashboardOptions {
                training: train,
                prediction: predict,
            };
            execute_dashboard(options, &config)?;
        }
    }

    Ok(())
}
