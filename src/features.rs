//! @acp:module "Feature Assembler"
//! @acp:summary "Build ordered classifier inputs and detect missing indicators"
//! @acp:domain scoring
//! @acp:layer logic
//!
//! The classifier consumes six values in a fixed order:
//! `[growth_domestic_pct, ACR, PCI, growth_world_pct, market_size, alignment]`.
//! Values are never defaulted here: an absent indicator is reported back so
//! the caller can ask the user for it.

use std::fmt;

use crate::dataset::{Alignment, Indicator, OpportunityRecord, FEATURE_COLUMNS};

/// Number of classifier inputs
pub const FEATURE_COUNT: usize = 6;

/// Position of the alignment flag in the vector
pub const ALIGNMENT_INDEX: usize = 5;

/// @acp:summary "Unscaled classifier inputs in trained feature order"
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn indicator(&self, indicator: Indicator) -> f64 {
        self.0[indicator.index()]
    }

    pub fn alignment(&self) -> f64 {
        self.0[ALIGNMENT_INDEX]
    }

    /// Column names paired with values
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_COLUMNS.iter().copied().zip(self.0.iter().copied())
    }
}

/// @acp:summary "Indicators absent from a record, in feature order"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingFields(Vec<Indicator>);

impl MissingFields {
    pub fn indicators(&self) -> &[Indicator] {
        &self.0
    }

    /// Column names of the absent indicators
    pub fn column_names(&self) -> Vec<&'static str> {
        self.0.iter().map(|ind| ind.column()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.column_names().join(", "))
    }
}

/// Assemble the feature vector for `record`, using the session's alignment
/// in place of any alignment stored on the record.
pub fn assemble(
    record: &OpportunityRecord,
    alignment: Alignment,
) -> Result<FeatureVector, MissingFields> {
    let mut values = [0.0; FEATURE_COUNT];
    let mut missing = Vec::new();

    for indicator in Indicator::ALL {
        match record.indicator(indicator) {
            Some(value) => values[indicator.index()] = value,
            None => missing.push(indicator),
        }
    }

    if !missing.is_empty() {
        return Err(MissingFields(missing));
    }

    values[ALIGNMENT_INDEX] = alignment.as_feature();
    Ok(FeatureVector(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_record() -> OpportunityRecord {
        OpportunityRecord::new("Tomates", "070200")
            .with_indicator(Indicator::GrowthDomestic, 4.5)
            .with_indicator(Indicator::ComparativeAdvantage, 2.1)
            .with_indicator(Indicator::ProductComplexity, -0.3)
            .with_indicator(Indicator::GrowthWorld, 3.2)
            .with_indicator(Indicator::MarketSize, 85_000.0)
    }

    #[test]
    fn test_assemble_fixed_order() {
        let features = assemble(&complete_record(), Alignment::Yes).unwrap();
        assert_eq!(features.values(), &[4.5, 2.1, -0.3, 3.2, 85_000.0, 1.0]);
    }

    #[test]
    fn test_session_alignment_overrides_record() {
        let mut record = complete_record();
        record.strategic_alignment = Some(Alignment::Yes);

        let features = assemble(&record, Alignment::No).unwrap();
        assert_eq!(features.alignment(), 0.0);
    }

    #[test]
    fn test_missing_fields_reported_in_feature_order() {
        let mut record = OpportunityRecord::new("Agrumes", "080510")
            .with_indicator(Indicator::ComparativeAdvantage, 1.0)
            .with_indicator(Indicator::GrowthWorld, 2.0);
        record.strategic_alignment = Some(Alignment::Yes);

        let missing = assemble(&record, Alignment::Yes).unwrap_err();
        assert_eq!(
            missing.column_names(),
            vec!["Croissance Maroc (% p.a.)", "PCI", "Taille Marche (millier USD)"]
        );
        assert_eq!(
            missing.to_string(),
            "Croissance Maroc (% p.a.), PCI, Taille Marche (millier USD)"
        );
    }

    #[test]
    fn test_named_pairs_follow_columns() {
        let features = assemble(&complete_record(), Alignment::No).unwrap();
        let names: Vec<_> = features.named().map(|(name, _)| name).collect();
        assert_eq!(names, FEATURE_COLUMNS.to_vec());
    }
}
