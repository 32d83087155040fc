//! @acp:module "Output Rendering"
//! @acp:summary "Terminal rendering of session state, predictions and reports"
//! @acp:domain cli
//! @acp:layer presentation

use console::style;

use crate::detail::{indicator_details, DetailRow, DETAIL_COLUMNS};
use crate::report::{Report, REPORT_COLUMNS};
use crate::scoring::{Prediction, Verdict};
use crate::session::Session;

const GAUGE_WIDTH: usize = 40;

/// Horizontal gauge for a 0-100 value
pub fn gauge_bar(value: u8) -> String {
    let filled = (value as usize * GAUGE_WIDTH) / 100;
    format!(
        "[{}{}] {:>3}",
        "█".repeat(filled),
        "░".repeat(GAUGE_WIDTH - filled),
        value
    )
}

/// Dashboard header: model, dataset size, filter, selection and alignment
pub fn render_header(session: &Session) {
    println!("{}", style("Tableau de Bord Prédictif").bold());
    println!("Évaluation des opportunités d'exportation pour le Maroc.");

    if let Some(info) = session.model_info() {
        let fingerprint = info.fingerprint.as_deref().unwrap_or("-");
        println!(
            "{} Modèle: {} ({}){}",
            style("→").dim(),
            style(&info.classifier).cyan(),
            fingerprint,
            if info.scaled { ", normalisé" } else { "" }
        );
    }
    if let Some(dataset) = session.dataset() {
        println!(
            "{} MODE PRÉDICTIF: {} produits chargés",
            style("→").dim(),
            dataset.len()
        );
    }
    if let Some(filter) = session.hs_filter() {
        println!(
            "{} Filtre Code SH: '{}' ({} résultats)",
            style("→").dim(),
            filter,
            session.candidates().len()
        );
    }

    match session.selected_record() {
        Some(record) => println!(
            "{} Produit sélectionné : {} (Code SH: {})",
            style("●").cyan(),
            style(&record.product_name).bold(),
            record.hs_code
        ),
        None => println!("{} Aucun produit sélectionné", style("○").dim()),
    }

    match session.strategic_alignment() {
        Some(alignment) => println!(
            "{} Alignement sélectionné : {}",
            style("✓").green(),
            style(alignment.label()).bold()
        ),
        None => println!(
            "{} Pour obtenir un score prédictif fiable, vous devez obligatoirement valider l'alignement stratégique.",
            style("!").yellow()
        ),
    }
    println!();
}

/// Gauge, verdict and indicator detail for one prediction
pub fn render_prediction(prediction: &Prediction) {
    let verdict = prediction.verdict();
    let gauge = gauge_bar(prediction.gauge_value());

    println!("{}", style("RÉSULTAT DE LA PRÉDICTION").bold());
    println!("Probabilité de Succès");
    match verdict {
        Verdict::High => {
            println!("  {}", style(gauge).green());
            println!("  {} {}", style("✔").green(), style(verdict.headline()).green().bold());
        }
        Verdict::Low => {
            println!("  {}", style(gauge).red());
            println!("  {} {}", style("✗").red(), style(verdict.headline()).red().bold());
        }
    }
    println!();

    println!("{}", style("Détails des Indicateurs").bold());
    render_details(&indicator_details(prediction));
    println!();
}

pub fn render_details(rows: &[DetailRow]) {
    let table: Vec<Vec<String>> = rows
        .iter()
        .map(|r| {
            vec![
                r.criterion.to_string(),
                r.value.clone(),
                r.description.to_string(),
            ]
        })
        .collect();
    render_table(&DETAIL_COLUMNS, &table);
}

/// Report table, in insertion order
pub fn render_report(report: &Report) {
    if report.is_empty() {
        println!("{} Le rapport est vide", style("○").dim());
        return;
    }
    println!(
        "{}",
        style(format!("Rapport d'Opportunités ({})", report.len())).bold()
    );
    let table: Vec<Vec<String>> = report
        .entries()
        .iter()
        .map(|e| e.cells().iter().map(|c| c.to_string()).collect())
        .collect();
    render_table(&REPORT_COLUMNS, &table);
}

/// Left-aligned text table with a header rule
pub fn render_table(header: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<String>| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, width)| pad(cell, *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    println!(
        "  {}",
        style(line(header.iter().map(|h| h.to_string()).collect())).bold()
    );
    println!(
        "  {}",
        style("─".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1))).dim()
    );
    for row in rows {
        println!("  {}", line(row.clone()));
    }
}

fn pad(cell: &str, width: usize) -> String {
    let len = cell.chars().count();
    format!("{}{}", cell, " ".repeat(width.saturating_sub(len)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gauge_bar_bounds() {
        assert!(gauge_bar(0).starts_with(&format!("[{}]", "░".repeat(GAUGE_WIDTH))));
        assert!(gauge_bar(100).starts_with(&format!("[{}]", "█".repeat(GAUGE_WIDTH))));
        assert!(gauge_bar(50).ends_with(" 50"));
    }

    #[test]
    fn test_pad_counts_chars() {
        assert_eq!(pad("Marché", 8), "Marché  ");
        assert_eq!(pad("toolong", 3), "toolong");
    }
}
