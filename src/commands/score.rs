//! @acp:module "Score Command"
//! @acp:summary "Non-interactive scoring of one product"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Replays the dashboard events for a single product: configure, select,
//! set alignment, optionally fill missing indicators, score, and optionally
//! append to a report file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use console::style;

use crate::commands::output::{render_prediction, render_report};
use crate::config::Config;
use crate::dataset::{Alignment, DataSource, Indicator};
use crate::error::ExportScoreError;
use crate::report::ReportFormat;
use crate::session::{Event, Session};

/// Options for the score command
#[derive(Debug, Clone)]
pub struct ScoreOptions {
    /// Training source (accepted, unused by the pre-trained model)
    pub training: PathBuf,
    /// Prediction dataset
    pub prediction: PathBuf,
    /// Product name to select
    pub product: Option<String>,
    /// HS code filter; the first matching product is selected
    pub code: Option<String>,
    pub alignment: Alignment,
    /// Values for missing indicators
    pub fill: Vec<(Indicator, f64)>,
    /// Append the result to the report and export it
    pub add_to_report: bool,
    /// Report output path (default from config)
    pub report: Option<PathBuf>,
    /// Report format (default from config)
    pub format: Option<ReportFormat>,
    /// Output as JSON
    pub json: bool,
}

/// Parse a `COLUMN=VALUE` fill argument
pub fn parse_fill(arg: &str) -> std::result::Result<(Indicator, f64), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{}'", arg))?;
    let indicator = Indicator::from_name(name)
        .ok_or_else(|| format!("unknown indicator '{}'", name.trim()))?;
    let value: f64 = value
        .trim()
        .replace(',', ".")
        .parse()
        .map_err(|_| format!("'{}' is not a number", value.trim()))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", value));
    }
    Ok((indicator, value))
}

/// Execute the score command
pub fn execute_score(options: ScoreOptions, config: &Config) -> Result<()> {
    let mut session = Session::new(Arc::new(config.model_loader()));

    session.dispatch(Event::SubmitConfig {
        training: Some(DataSource::path(&options.training)),
        prediction: Some(DataSource::path(&options.prediction)),
    })?;

    if let Some(code) = &options.code {
        session.dispatch(Event::FilterByCode(code.clone()))?;
        if session.selected_id().is_none() {
            bail!("no product with an HS code containing '{}'", code);
        }
    }
    if let Some(product) = &options.product {
        session.dispatch(Event::SelectProduct(product.clone()))?;
    }
    session.dispatch(Event::SetAlignment(options.alignment))?;

    if !options.fill.is_empty() {
        session.dispatch(Event::SupplyMissing(options.fill.clone()))?;
    }

    let prediction = match session.predict() {
        Ok(prediction) => prediction,
        Err(ExportScoreError::MissingFields(missing)) => {
            eprintln!(
                "{} Données manquantes pour {}:",
                style("✗").red(),
                session.selected_product_name().unwrap_or_default()
            );
            for indicator in missing.indicators() {
                eprintln!("    {}", style(indicator.column()).yellow());
            }
            eprintln!(
                "  Provide them with {}",
                style("--fill \"PCI=0.5\"").cyan()
            );
            bail!(ExportScoreError::MissingFields(missing));
        }
        Err(e) => return Err(e.into()),
    };

    if options.json {
        let json = serde_json::json!({
            "product": prediction.product_name,
            "hs_code": prediction.hs_code,
            "alignment": prediction.alignment.label(),
            "probability": prediction.probability,
            "score": prediction.score_percent(),
            "verdict": prediction.verdict().label(),
            "features": prediction.features.named().collect::<std::collections::BTreeMap<_, _>>(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!(
            "{} {} (Code SH: {}) - alignement {}",
            style("●").cyan(),
            style(&prediction.product_name).bold(),
            prediction.hs_code,
            prediction.alignment
        );
        println!();
        render_prediction(&prediction);
    }

    if options.add_to_report {
        session.dispatch(Event::AddToReport)?;
        let format = options.format.unwrap_or(config.report.format);
        let path = options
            .report
            .clone()
            .unwrap_or_else(|| config.report_path_for(format));
        let bytes = session.report().export(format)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        if !options.json {
            render_report(session.report());
            println!(
                "\n{} Rapport écrit dans {} ({})",
                style("✓").green(),
                path.display(),
                format.mime()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fill() {
        assert_eq!(
            parse_fill("PCI=0.5").unwrap(),
            (Indicator::ProductComplexity, 0.5)
        );
        assert_eq!(
            parse_fill("Taille Marche (millier USD) = 1200,5").unwrap(),
            (Indicator::MarketSize, 1200.5)
        );
        assert!(parse_fill("PCI").is_err());
        assert!(parse_fill("XYZ=1").is_err());
        assert!(parse_fill("ACR=abc").is_err());
        assert!(parse_fill("ACR=inf").is_err());
    }
}
