//! @acp:module "Dashboard Command"
//! @acp:summary "Interactive scoring session driven by terminal prompts"
//! @acp:domain cli
//! @acp:layer handler
//!
//! Each prompt produces one session event; the session settles before the
//! screen is rendered again. Errors are printed and the loop continues, so
//! every recovery (re-upload, missing values, reset) is user-initiated.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};

use crate::commands::output::{render_header, render_prediction, render_report};
use crate::config::Config;
use crate::dataset::{Alignment, DataSource, Indicator};
use crate::error::ExportScoreError;
use crate::features::MissingFields;
use crate::session::{Event, ManualEntry, Outcome, Phase, Session};

/// Options for the dashboard command
#[derive(Debug, Clone, Default)]
pub struct DashboardOptions {
    /// Training source used for the first configuration attempt
    pub training: Option<PathBuf>,
    /// Prediction source used for the first configuration attempt
    pub prediction: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Select,
    Filter,
    Alignment,
    ManualEntry,
    AddToReport,
    ShowReport,
    ExportReport,
    Reset,
    Quit,
}

impl Action {
    const MENU: [Action; 9] = [
        Action::Select,
        Action::Filter,
        Action::Alignment,
        Action::ManualEntry,
        Action::AddToReport,
        Action::ShowReport,
        Action::ExportReport,
        Action::Reset,
        Action::Quit,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Select => "Sélectionner un produit",
            Self::Filter => "Filtrer par Code SH",
            Self::Alignment => "Alignement stratégique",
            Self::ManualEntry => "Ajouter un produit manuellement",
            Self::AddToReport => "➕ Ajouter au Rapport",
            Self::ShowReport => "Voir le rapport",
            Self::ExportReport => "📥 Télécharger le Rapport",
            Self::Reset => "Recharger de nouveaux fichiers",
            Self::Quit => "Quitter",
        }
    }
}

/// Execute the dashboard command
pub fn execute_dashboard(mut options: DashboardOptions, config: &Config) -> Result<()> {
    let mut session = Session::new(Arc::new(config.model_loader()));
    let theme = ColorfulTheme::default();

    loop {
        let keep_going = match session.phase() {
            Phase::Config => configure(&mut session, &mut options, &theme)?,
            Phase::Dashboard => dashboard_step(&mut session, config, &theme)?,
        };
        if !keep_going {
            break;
        }
    }

    if !session.report().is_empty() {
        println!(
            "{} Session closed with {} unsaved report entries",
            style("!").yellow(),
            session.report().len()
        );
    }
    Ok(())
}

/// CONFIG phase: collect both sources and submit. Returns false to quit.
fn configure(
    session: &mut Session,
    options: &mut DashboardOptions,
    theme: &ColorfulTheme,
) -> Result<bool> {
    println!("{}", style("ExportScore").bold().red());
    println!("{}", style("Configuration du Modèle").bold());
    println!("Importez vos données pour initialiser le modèle\n");

    let training = match options.training.take() {
        Some(path) => Some(path),
        None => prompt_path(theme, "1. Base d'Apprentissage (.csv)")?,
    };
    let prediction = match options.prediction.take() {
        Some(path) => Some(path),
        None => prompt_path(theme, "2. Base de Prédiction (.csv)")?,
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message("Initialisation du modèle et chargement des données...");
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = session.dispatch(Event::SubmitConfig {
        training: training.map(DataSource::Path),
        prediction: prediction.map(DataSource::Path),
    });
    spinner.finish_and_clear();

    match result {
        Ok(Outcome::Initialized { records }) => {
            println!(
                "{} Initialisation réussie ! {} produits chargés\n",
                style("✓").green(),
                records
            );
            Ok(true)
        }
        Ok(_) => Ok(true),
        Err(e) => {
            report_error(&e);
            Ok(Confirm::with_theme(theme)
                .with_prompt("Réessayer ?")
                .default(true)
                .interact()?)
        }
    }
}

fn prompt_path(theme: &ColorfulTheme, prompt: &str) -> Result<Option<PathBuf>> {
    let raw: String = Input::with_theme(theme)
        .with_prompt(prompt)
        .allow_empty(true)
        .interact_text()?;
    let raw = raw.trim();
    Ok(if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    })
}

/// DASHBOARD phase: render, resolve missing data, then run one menu action.
/// Returns false to quit.
fn dashboard_step(session: &mut Session, config: &Config, theme: &ColorfulTheme) -> Result<bool> {
    render_header(session);

    match session.predict() {
        Ok(prediction) => render_prediction(&prediction),
        Err(ExportScoreError::MissingFields(missing)) => {
            if fill_missing(session, &missing, theme)? {
                // Re-render with the filled values
                return Ok(true);
            }
        }
        // Banners already cover these
        Err(ExportScoreError::AlignmentRequired) | Err(ExportScoreError::NoSelection) => {}
        Err(e) => report_error(&e),
    }

    if !session.report().is_empty() {
        render_report(session.report());
        println!();
    }

    let labels: Vec<&str> = Action::MENU.iter().map(|a| a.label()).collect();
    let choice = Select::with_theme(theme)
        .with_prompt("Action")
        .items(&labels)
        .default(0)
        .interact()?;

    let result = match Action::MENU[choice] {
        Action::Select => select_product(session, theme),
        Action::Filter => filter(session, theme),
        Action::Alignment => set_alignment(session, theme),
        Action::ManualEntry => manual_entry(session, theme),
        Action::AddToReport => add_to_report(session),
        Action::ShowReport => {
            render_report(session.report());
            Ok(())
        }
        Action::ExportReport => export_report(session, config),
        Action::Reset => {
            session.dispatch(Event::Reset)?;
            println!("{} Session réinitialisée\n", style("↩").yellow());
            Ok(())
        }
        Action::Quit => return Ok(false),
    };

    if let Err(e) = result {
        match e.downcast_ref::<ExportScoreError>() {
            Some(inner) => report_error(inner),
            None => return Err(e),
        }
    }
    println!();
    Ok(true)
}

/// Ask for exactly the missing indicators and write them into the record
fn fill_missing(session: &mut Session, missing: &MissingFields, theme: &ColorfulTheme) -> Result<bool> {
    println!(
        "{} Données manquantes pour {} : {}",
        style("!").yellow(),
        style(session.selected_product_name().unwrap_or_default()).bold(),
        missing
    );
    let proceed = Confirm::with_theme(theme)
        .with_prompt("Renseigner les valeurs manquantes ?")
        .default(true)
        .interact()?;
    if !proceed {
        return Ok(false);
    }

    let mut values = Vec::with_capacity(missing.len());
    for indicator in missing.indicators() {
        let value: f64 = Input::with_theme(theme)
            .with_prompt(indicator.column())
            .validate_with(|v: &f64| {
                if v.is_finite() {
                    Ok(())
                } else {
                    Err("valeur numérique requise")
                }
            })
            .interact_text()?;
        values.push((*indicator, value));
    }

    session.dispatch(Event::SupplyMissing(values))?;
    println!("{} Valeurs enregistrées\n", style("✓").green());
    Ok(true)
}

fn select_product(session: &mut Session, theme: &ColorfulTheme) -> Result<()> {
    let candidates: Vec<_> = session
        .candidates()
        .into_iter()
        .map(|r| (r.id, format!("{} ({})", r.product_name, r.hs_code)))
        .collect();
    if candidates.is_empty() {
        println!("{} Aucun produit ne correspond au filtre", style("○").dim());
        return Ok(());
    }

    let default = session
        .selected_id()
        .and_then(|id| candidates.iter().position(|(cid, _)| *cid == id))
        .unwrap_or(0);
    let labels: Vec<&str> = candidates.iter().map(|(_, l)| l.as_str()).collect();
    let choice = Select::with_theme(theme)
        .with_prompt("1. SÉLECTIONNER")
        .items(&labels)
        .default(default)
        .max_length(15)
        .interact()?;

    session.dispatch(Event::SelectRecord(candidates[choice].0))?;
    Ok(())
}

fn filter(session: &mut Session, theme: &ColorfulTheme) -> Result<()> {
    let query: String = Input::with_theme(theme)
        .with_prompt("Filtrer par Code SH (vide = tous)")
        .allow_empty(true)
        .interact_text()?;
    if let Outcome::Filtered { matches, .. } = session.dispatch(Event::FilterByCode(query))? {
        println!("{} {} produits correspondants", style("→").cyan(), matches);
    }
    Ok(())
}

fn prompt_alignment(theme: &ColorfulTheme, prompt: &str) -> Result<Alignment> {
    let labels = vec!["Non (0)", "Oui (1)"];
    let choice = Select::with_theme(theme)
        .with_prompt(prompt)
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(if choice == 1 { Alignment::Yes } else { Alignment::No })
}

fn set_alignment(session: &mut Session, theme: &ColorfulTheme) -> Result<()> {
    let alignment = prompt_alignment(theme, "2. ALIGNEMENT STRATÉGIQUE")?;
    session.dispatch(Event::SetAlignment(alignment))?;
    Ok(())
}

fn manual_entry(session: &mut Session, theme: &ColorfulTheme) -> Result<()> {
    session.dispatch(Event::ShowManualForm)?;

    let product_name: String = Input::with_theme(theme)
        .with_prompt("Produit")
        .allow_empty(true)
        .interact_text()?;
    if product_name.trim().is_empty() {
        session.dispatch(Event::HideManualForm)?;
        println!("{} Saisie annulée", style("○").dim());
        return Ok(());
    }
    let hs_code: String = Input::with_theme(theme).with_prompt("CODE SH").interact_text()?;

    let alignment = prompt_alignment(theme, "Alignement stratégique")?;
    let mut entry = ManualEntry::new(product_name, hs_code, alignment);

    for indicator in Indicator::ALL {
        let raw: String = Input::with_theme(theme)
            .with_prompt(format!("{} (vide = 0)", indicator.column()))
            .allow_empty(true)
            .validate_with(|v: &String| -> std::result::Result<(), &'static str> {
                let v = v.trim();
                if v.is_empty() || v.replace(',', ".").parse::<f64>().is_ok_and(f64::is_finite) {
                    Ok(())
                } else {
                    Err("valeur numérique requise")
                }
            })
            .interact_text()?;
        let raw = raw.trim().replace(',', ".");
        if !raw.is_empty() {
            let value: f64 = raw
                .parse()
                .with_context(|| format!("invalid value for {}", indicator.column()))?;
            entry = entry.with_indicator(indicator, value);
        }
    }

    if let Err(e) = session.dispatch(Event::SubmitManualEntry(entry)) {
        session.dispatch(Event::HideManualForm)?;
        return Err(e.into());
    }
    println!("{} Produit ajouté et sélectionné", style("✓").green());
    Ok(())
}

fn add_to_report(session: &mut Session) -> Result<()> {
    if let Outcome::Reported { entry, total } = session.dispatch(Event::AddToReport)? {
        println!(
            "{} '{}' ajouté au rapport ! ({} entrées)",
            style("✓").green(),
            entry.product_name(),
            total
        );
    }
    Ok(())
}

fn export_report(session: &Session, config: &Config) -> Result<()> {
    let report = session.report();
    if report.is_empty() {
        println!("{} Le rapport est vide", style("○").dim());
        return Ok(());
    }

    let format = config.report.format;
    let path = config.report_path();
    let bytes = report.export(format)?;
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    println!(
        "{} Rapport exporté: {} ({} lignes, {})",
        style("✓").green(),
        path.display(),
        report.len(),
        format.mime()
    );
    Ok(())
}

fn report_error(error: &ExportScoreError) {
    eprintln!("{} {}", style("✗").red(), error);
    if let ExportScoreError::ArtifactNotFound(_) = error {
        eprintln!("  Check the model path in the configuration (exportscore init)");
    } else if !error.is_recoverable() {
        eprintln!("  Reload the input files to start over");
    }
}
