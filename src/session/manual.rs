//! @acp:module "Manual Entry"
//! @acp:summary "Merge a user-authored record at the front of the dataset"
//! @acp:domain session
//! @acp:layer logic

use serde::{Deserialize, Serialize};

use crate::dataset::{Alignment, Dataset, Indicator, OpportunityRecord, RecordId};
use crate::error::{ExportScoreError, Result};

/// @acp:summary "Values submitted through the manual-entry form"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManualEntry {
    pub product_name: String,
    pub hs_code: String,
    /// Indexed by [`Indicator::index`]; omitted values become 0
    pub indicators: [Option<f64>; 5],
    pub alignment: Alignment,
}

impl ManualEntry {
    pub fn new(
        product_name: impl Into<String>,
        hs_code: impl Into<String>,
        alignment: Alignment,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            hs_code: hs_code.into(),
            indicators: [None; 5],
            alignment,
        }
    }

    pub fn with_indicator(mut self, indicator: Indicator, value: f64) -> Self {
        self.indicators[indicator.index()] = Some(value);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.product_name.trim().is_empty() {
            return Err(ExportScoreError::InvalidValue {
                field: "product_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        if self.hs_code.trim().is_empty() {
            return Err(ExportScoreError::InvalidValue {
                field: "hs_code".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        for indicator in Indicator::ALL {
            if let Some(value) = self.indicators[indicator.index()] {
                if !value.is_finite() {
                    return Err(ExportScoreError::InvalidValue {
                        field: indicator.column().to_string(),
                        reason: format!("{} is not a finite number", value),
                    });
                }
            }
        }
        Ok(())
    }

    /// Unlike imported rows, a manual record never has absent indicators
    pub fn into_record(self) -> OpportunityRecord {
        let mut record =
            OpportunityRecord::new(self.product_name.trim(), self.hs_code.trim());
        for indicator in Indicator::ALL {
            record.set_indicator(indicator, self.indicators[indicator.index()].unwrap_or(0.0));
        }
        record.strategic_alignment = Some(self.alignment);
        record
    }
}

/// Insert the entry at position 0 of the dataset
pub fn merge(dataset: &mut Dataset, entry: ManualEntry) -> Result<RecordId> {
    entry.validate()?;
    let id = dataset.insert_front(entry.into_record());
    tracing::info!(record = %id, "manual entry merged");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_inserts_front_with_zero_defaults() {
        let mut dataset = Dataset::from_records(vec![OpportunityRecord::new("Tomates", "070200")]);

        let entry = ManualEntry::new("Widget X", "999999", Alignment::Yes)
            .with_indicator(Indicator::ComparativeAdvantage, 1.8);
        let id = merge(&mut dataset, entry).unwrap();

        let first = &dataset.records()[0];
        assert_eq!(first.id, id);
        assert_eq!(first.product_name, "Widget X");
        assert_eq!(first.revealed_comparative_advantage, Some(1.8));
        assert_eq!(first.growth_domestic_pct, Some(0.0));
        assert_eq!(first.market_size_thousand_usd, Some(0.0));
        assert!(first.absent_indicators().is_empty());
        assert_eq!(first.strategic_alignment, Some(Alignment::Yes));
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_merge_rejects_blank_name() {
        let mut dataset = Dataset::new();
        let err = merge(&mut dataset, ManualEntry::new("  ", "0101", Alignment::No)).unwrap_err();
        assert!(matches!(err, ExportScoreError::InvalidValue { .. }));
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_merge_rejects_non_finite() {
        let mut dataset = Dataset::new();
        let entry = ManualEntry::new("Widget", "0101", Alignment::No)
            .with_indicator(Indicator::GrowthWorld, f64::NAN);
        assert!(merge(&mut dataset, entry).is_err());
    }
}
