//! @acp:module "Validate Command"
//! @acp:summary "Check a prediction dataset before starting a session"
//! @acp:domain cli
//! @acp:layer handler

use std::path::PathBuf;

use anyhow::Result;
use console::style;

use crate::dataset::{load_dataset, DataSource};
use crate::error::ExportScoreError;

/// Options for the validate command
#[derive(Debug, Clone)]
pub struct ValidateOptions {
    /// Prediction dataset to validate
    pub file: PathBuf,
    /// Output as JSON
    pub json: bool,
}

/// Execute the validate command
pub fn execute_validate(options: ValidateOptions) -> Result<()> {
    let source = DataSource::path(&options.file);
    let dataset = match load_dataset(&source) {
        Ok(dataset) => dataset,
        Err(e @ ExportScoreError::SchemaValidation { .. }) => {
            eprintln!("{} {}", style("✗").red(), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let incomplete: Vec<_> = dataset
        .incomplete()
        .map(|r| (r, r.absent_indicators()))
        .collect();

    if options.json {
        let json = serde_json::json!({
            "file": options.file.display().to_string(),
            "records": dataset.len(),
            "incomplete": incomplete
                .iter()
                .map(|(r, missing)| serde_json::json!({
                    "product": r.product_name,
                    "hs_code": r.hs_code,
                    "missing": missing.iter().map(|m| m.column()).collect::<Vec<_>>(),
                }))
                .collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    println!(
        "{} {} is valid: {} produits chargés",
        style("✓").green(),
        options.file.display(),
        dataset.len()
    );

    if incomplete.is_empty() {
        println!("{} All indicators present", style("✓").green());
    } else {
        println!(
            "{} {} products have missing indicators (values will be requested at scoring time):",
            style("!").yellow(),
            incomplete.len()
        );
        for (record, missing) in &incomplete {
            let columns: Vec<_> = missing.iter().map(|m| m.column()).collect();
            println!(
                "    {} ({}) - {}",
                style(&record.product_name).cyan(),
                record.hs_code,
                columns.join(", ")
            );
        }
    }

    Ok(())
}
