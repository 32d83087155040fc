//! @acp:module "Dataset Loader"
//! @acp:summary "Parse prediction sources (CSV) into opportunity records"
//! @acp:domain dataset
//! @acp:layer io
//!
//! The prediction source must carry the identifier columns `Produit` and
//! `CODE SH`. Indicator columns are optional at load time: a missing column
//! or an empty cell leaves the indicator absent, to be resolved when the
//! record is scored.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::{ExportScoreError, Result};

use super::record::{
    Alignment, Indicator, OpportunityRecord, ALIGNMENT_COLUMN, HS_CODE_COLUMN, PRODUCT_COLUMN,
};
use super::Dataset;

/// @acp:summary "Tabular input supplied at configuration time"
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// File on disk
    Path(PathBuf),
    /// Already-read content (uploads, tests)
    Inline { name: String, content: String },
}

impl DataSource {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn inline(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Inline {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Display name used in messages
    pub fn name(&self) -> String {
        match self {
            Self::Path(path) => path.display().to_string(),
            Self::Inline { name, .. } => name.clone(),
        }
    }

    /// Read the full content of the source
    pub fn read_to_string(&self) -> Result<String> {
        match self {
            Self::Path(path) => read_file(path),
            Self::Inline { content, .. } => Ok(content.clone()),
        }
    }
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| ExportScoreError::Load(format!("{}: {}", path.display(), e)))
}

/// Load a dataset from a prediction source
pub fn load_dataset(source: &DataSource) -> Result<Dataset> {
    let content = source.read_to_string()?;
    let dataset = parse_dataset(content.as_bytes()).map_err(|e| match e {
        ExportScoreError::Csv(inner) => {
            ExportScoreError::Load(format!("{}: {}", source.name(), inner))
        }
        other => other,
    })?;
    tracing::info!(
        source = %source.name(),
        records = dataset.len(),
        "prediction dataset loaded"
    );
    Ok(dataset)
}

/// Parse CSV content (comma or semicolon separated) into a dataset
pub fn parse_dataset<R: Read>(mut reader: R) -> Result<Dataset> {
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| ExportScoreError::Load(e.to_string()))?;
    let content = content.trim_start_matches('\u{feff}');

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(detect_delimiter(content))
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let columns = ColumnMap::from_headers(csv_reader.headers()?)?;
    let mut dataset = Dataset::new();

    for (index, result) in csv_reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row = result?;
        dataset.push(columns.record_from_row(&row, line)?);
    }

    Ok(dataset)
}

fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.contains(';') && !header.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Column positions resolved from the header row
struct ColumnMap {
    product: usize,
    hs_code: usize,
    /// Indexed by [`Indicator::index`]
    indicators: [Option<usize>; 5],
    alignment: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h.trim() == name);

        let product = position(PRODUCT_COLUMN);
        let hs_code = position(HS_CODE_COLUMN);
        let (product, hs_code) = match (product, hs_code) {
            (Some(p), Some(h)) => (p, h),
            (p, h) => {
                let mut missing = Vec::new();
                if p.is_none() {
                    missing.push(PRODUCT_COLUMN.to_string());
                }
                if h.is_none() {
                    missing.push(HS_CODE_COLUMN.to_string());
                }
                return Err(ExportScoreError::SchemaValidation { missing });
            }
        };

        let mut indicators = [None; 5];
        for indicator in Indicator::ALL {
            match position(indicator.column()) {
                Some(idx) => indicators[indicator.index()] = Some(idx),
                None => tracing::warn!(
                    column = indicator.column(),
                    "indicator column absent; records will need manual values before scoring"
                ),
            }
        }

        Ok(Self {
            product,
            hs_code,
            indicators,
            alignment: position(ALIGNMENT_COLUMN),
        })
    }

    fn record_from_row(&self, row: &csv::StringRecord, line: usize) -> Result<OpportunityRecord> {
        let product_name = row.get(self.product).unwrap_or_default();
        if product_name.is_empty() {
            return Err(ExportScoreError::Load(format!(
                "line {}: empty '{}' value",
                line, PRODUCT_COLUMN
            )));
        }
        let hs_code = row.get(self.hs_code).unwrap_or_default();

        let mut record = OpportunityRecord::new(product_name, hs_code);
        // Feature order
        for indicator in Indicator::ALL {
            let Some(idx) = self.indicators[indicator.index()] else {
                continue;
            };
            let cell = row.get(idx).unwrap_or_default();
            if let Some(value) = parse_cell(cell).map_err(|reason| {
                ExportScoreError::Load(format!(
                    "line {}, column '{}': {}",
                    line,
                    indicator.column(),
                    reason
                ))
            })? {
                record.set_indicator(indicator, value);
            }
        }

        if let Some(idx) = self.alignment {
            let cell = row.get(idx).unwrap_or_default();
            record.strategic_alignment = parse_alignment_cell(cell).map_err(|reason| {
                ExportScoreError::Load(format!(
                    "line {}, column '{}': {}",
                    line, ALIGNMENT_COLUMN, reason
                ))
            })?;
        }

        Ok(record)
    }
}

/// Parse a numeric cell. Empty and NaN cells are absent.
fn parse_cell(cell: &str) -> std::result::Result<Option<f64>, String> {
    let cell = cell.trim();
    if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }

    // Decimal comma, as exported by French-locale spreadsheets
    let normalized = if cell.contains(',') && !cell.contains('.') {
        cell.replace(',', ".")
    } else {
        cell.to_string()
    };

    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) => Err(format!("non-finite value '{}'", cell)),
        Err(_) => Err(format!("'{}' is not a number", cell)),
    }
}

fn parse_alignment_cell(cell: &str) -> std::result::Result<Option<Alignment>, String> {
    match parse_cell(cell)? {
        None => Ok(None),
        Some(v) if v == 0.0 || v == 1.0 => Ok(Alignment::from_flag(v as u8)),
        Some(v) => Err(format!("alignment must be 0 or 1, got {}", v)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Produit,CODE SH,Croissance Maroc (% p.a.),ACR,PCI,Croissance Monde (% p.a.),Taille Marche (millier USD),Alignement stratégique";

    #[test]
    fn test_parse_complete_rows() {
        let csv = format!("{}\nTomates,070200,4.5,2.1,-0.3,3.2,85000,1\n", HEADER);
        let dataset = parse_dataset(csv.as_bytes()).unwrap();

        assert_eq!(dataset.len(), 1);
        let record = dataset.first().unwrap();
        assert_eq!(record.product_name, "Tomates");
        assert_eq!(record.hs_code, "070200");
        assert_eq!(record.revealed_comparative_advantage, Some(2.1));
        assert_eq!(record.product_complexity_index, Some(-0.3));
        assert_eq!(record.market_size_thousand_usd, Some(85000.0));
        assert_eq!(record.strategic_alignment, Some(Alignment::Yes));
        assert!(record.absent_indicators().is_empty());
    }

    #[test]
    fn test_empty_and_nan_cells_are_absent() {
        let csv = format!("{}\nAgrumes,080510,1.0,NaN,,2.0,100,\n", HEADER);
        let dataset = parse_dataset(csv.as_bytes()).unwrap();
        let record = dataset.first().unwrap();

        assert_eq!(
            record.absent_indicators(),
            vec![Indicator::ComparativeAdvantage, Indicator::ProductComplexity]
        );
        assert_eq!(record.strategic_alignment, None);
    }

    #[test]
    fn test_missing_identifier_column_fails_schema() {
        let csv = "Produit,ACR\nTomates,1.0\n";
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        match err {
            ExportScoreError::SchemaValidation { missing } => {
                assert_eq!(missing, vec![HS_CODE_COLUMN.to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_indicator_columns_tolerated() {
        let csv = "Produit,CODE SH\nTomates,070200\n";
        let dataset = parse_dataset(csv.as_bytes()).unwrap();
        assert_eq!(dataset.first().unwrap().absent_indicators().len(), 5);
    }

    #[test]
    fn test_semicolon_and_decimal_comma() {
        let csv = "\u{feff}Produit;CODE SH;ACR;PCI\nHuile d'olive;150910;3,4;0,25\n";
        let dataset = parse_dataset(csv.as_bytes()).unwrap();
        let record = dataset.first().unwrap();
        assert_eq!(record.revealed_comparative_advantage, Some(3.4));
        assert_eq!(record.product_complexity_index, Some(0.25));
    }

    #[test]
    fn test_non_numeric_indicator_is_load_error() {
        let csv = format!("{}\nTomates,070200,abc,1,1,1,1,0\n", HEADER);
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ExportScoreError::Load(ref msg) if msg.contains("line 2")));
    }

    #[test]
    fn test_first_bad_cell_in_feature_order_is_reported() {
        let csv = format!("{}\nTomates,070200,1,x,y,z,w,0\n", HEADER);
        for _ in 0..5 {
            let err = parse_dataset(csv.as_bytes()).unwrap_err();
            assert_eq!(
                err.to_string(),
                "failed to process input files: line 2, column 'ACR': 'x' is not a number"
            );
        }
    }

    #[test]
    fn test_invalid_alignment_flag_is_load_error() {
        let csv = format!("{}\nTomates,070200,1,1,1,1,1,2\n", HEADER);
        let err = parse_dataset(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ExportScoreError::Load(ref msg) if msg.contains("Alignement")));
    }

    #[test]
    fn test_load_dataset_reports_unreadable_path() {
        let source = DataSource::path("/nonexistent/prediction.csv");
        let err = load_dataset(&source).unwrap_err();
        assert!(matches!(err, ExportScoreError::Load(_)));
    }
}
