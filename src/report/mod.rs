//! @acp:module "Report Accumulator"
//! @acp:summary "Append-only collection of scored decisions and its spreadsheet export"
//! @acp:domain report
//! @acp:layer model
//!
//! Entries are snapshots: they are created by "add to report" and never
//! modified or removed for the lifetime of the session. Adding the same
//! product twice yields two entries. Exports are pure functions of the
//! current entries, so exporting twice without an intervening `add`
//! produces identical bytes.

pub mod xlsx;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::Alignment;
use crate::error::Result;
use crate::scoring::{format_percent, Verdict};

/// Exported column order
pub const REPORT_COLUMNS: [&str; 5] = ["PRODUIT", "CODE SH", "ALIGNEMENT", "SCORE FINAL", "VERDICT"];

/// Worksheet name of the xlsx export
pub const REPORT_SHEET: &str = "Rapport";

/// MIME type of spreadsheet documents
pub const SPREADSHEET_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// @acp:summary "Immutable snapshot of one scored decision"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    product_name: String,
    hs_code: String,
    alignment_label: String,
    score_percent: String,
    verdict_label: String,
}

impl ReportEntry {
    pub fn new(product_name: &str, hs_code: &str, alignment: Alignment, probability: f64) -> Self {
        Self {
            product_name: product_name.to_string(),
            hs_code: hs_code.to_string(),
            alignment_label: alignment.label().to_string(),
            score_percent: format_percent(probability),
            verdict_label: Verdict::from_probability(probability).label().to_string(),
        }
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn hs_code(&self) -> &str {
        &self.hs_code
    }

    pub fn alignment_label(&self) -> &str {
        &self.alignment_label
    }

    pub fn score_percent(&self) -> &str {
        &self.score_percent
    }

    pub fn verdict_label(&self) -> &str {
        &self.verdict_label
    }

    /// Cells in [`REPORT_COLUMNS`] order
    pub fn cells(&self) -> [&str; 5] {
        [
            self.product_name.as_str(),
            self.hs_code.as_str(),
            self.alignment_label.as_str(),
            self.score_percent.as_str(),
            self.verdict_label.as_str(),
        ]
    }
}

/// @acp:summary "Output format of a report export"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Xlsx => SPREADSHEET_MIME,
            Self::Csv => "text/csv",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "xlsx" => Ok(Self::Xlsx),
            "csv" => Ok(Self::Csv),
            other => Err(format!("unknown report format: {}", other)),
        }
    }
}

/// @acp:summary "Ordered, append-only report"
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<ReportEntry>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a snapshot; duplicates are kept
    pub fn add(
        &mut self,
        product_name: &str,
        hs_code: &str,
        alignment: Alignment,
        probability: f64,
    ) -> &ReportEntry {
        self.entries
            .push(ReportEntry::new(product_name, hs_code, alignment, probability));
        tracing::info!(product = product_name, total = self.entries.len(), "added to report");
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn export(&self, format: ReportFormat) -> Result<Vec<u8>> {
        match format {
            ReportFormat::Xlsx => self.export_xlsx(),
            ReportFormat::Csv => self.export_csv(),
        }
    }

    /// Single-sheet workbook, header row then entries in insertion order
    pub fn export_xlsx(&self) -> Result<Vec<u8>> {
        let rows: Vec<Vec<&str>> = std::iter::once(REPORT_COLUMNS.to_vec())
            .chain(self.entries.iter().map(|e| e.cells().to_vec()))
            .collect();
        xlsx::write_workbook(REPORT_SHEET, &rows)
    }

    pub fn export_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(REPORT_COLUMNS)?;
        for entry in &self.entries {
            writer.write_record(entry.cells())?;
        }
        writer
            .into_inner()
            .map_err(|e| crate::error::ExportScoreError::Io(e.into_error()))
    }
}
