//! @acp:module "Init Command"
//! @acp:summary "Create an ExportScore configuration file"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Implements `exportscore init`.

use std::path::PathBuf;

use anyhow::Result;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::config::{Config, CONFIG_FILE};
use crate::report::ReportFormat;

/// Options for the init command
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Config file to write
    pub path: Option<PathBuf>,
    /// Force overwrite existing config
    pub force: bool,
    /// Classifier artifact path
    pub model: Option<PathBuf>,
    /// Scaler artifact path
    pub scaler: Option<PathBuf>,
    /// Report output path
    pub report: Option<PathBuf>,
    /// Report format
    pub format: Option<ReportFormat>,
    /// Skip interactive prompts
    pub yes: bool,
}

/// Execute the init command
pub fn execute_init(options: InitOptions) -> Result<()> {
    let config_path = options
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if config_path.exists() && !options.force {
        eprintln!(
            "{} Config file already exists. Use --force to overwrite.",
            style("✗").red()
        );
        std::process::exit(1);
    }

    let mut config = Config::default();

    // Interactive mode if no CLI options and not using --yes
    let interactive = !options.yes
        && options.model.is_none()
        && options.scaler.is_none()
        && options.report.is_none()
        && options.format.is_none();

    if interactive {
        run_interactive_init(&mut config)?;
    } else {
        apply_cli_options(&mut config, &options);
    }

    config.save(&config_path)?;
    println!("{} Created {}", style("✓").green(), config_path.display());

    if !config.model.classifier.exists() {
        println!(
            "{} Model artifact {} not found yet; it is required before starting a session",
            style("⚠").yellow(),
            config.model.classifier.display()
        );
    }

    println!("\n{}", style("Next steps:").bold());
    println!(
        "  1. Run {} to check your prediction file",
        style("exportscore validate <prediction.csv>").cyan()
    );
    println!(
        "  2. Run {} to start scoring",
        style("exportscore dashboard").cyan()
    );

    Ok(())
}

fn run_interactive_init(config: &mut Config) -> Result<()> {
    let theme = ColorfulTheme::default();
    println!("{} ExportScore Setup\n", style("→").cyan());

    let classifier: String = Input::with_theme(&theme)
        .with_prompt("Classifier artifact")
        .default(config.model.classifier.display().to_string())
        .interact_text()?;
    config.model.classifier = PathBuf::from(classifier);

    let use_scaler = Confirm::with_theme(&theme)
        .with_prompt("Apply a fitted feature scaler before scoring?")
        .default(false)
        .interact()?;
    if use_scaler {
        let scaler: String = Input::with_theme(&theme)
            .with_prompt("Scaler artifact")
            .default("scaler.json".to_string())
            .interact_text()?;
        config.model.scaler = Some(PathBuf::from(scaler));
    }

    let formats = [ReportFormat::Xlsx, ReportFormat::Csv];
    let labels = vec!["xlsx (Excel)", "csv"];
    let selection = Select::with_theme(&theme)
        .with_prompt("Report format")
        .items(&labels)
        .default(0)
        .interact()?;
    config.report.format = formats[selection];

    let default_report = config
        .report
        .path
        .with_extension(config.report.format.extension());
    let report: String = Input::with_theme(&theme)
        .with_prompt("Report output path")
        .default(default_report.display().to_string())
        .interact_text()?;
    config.report.path = PathBuf::from(report);

    Ok(())
}

fn apply_cli_options(config: &mut Config, options: &InitOptions) {
    if let Some(model) = &options.model {
        config.model.classifier = model.clone();
    }
    if let Some(scaler) = &options.scaler {
        config.model.scaler = Some(scaler.clone());
    }
    if let Some(format) = options.format {
        config.report.format = format;
        config.report.path = config.report.path.with_extension(format.extension());
    }
    if let Some(report) = &options.report {
        config.report.path = report.clone();
    }
}
