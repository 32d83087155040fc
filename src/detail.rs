//! @acp:module "Indicator Detail"
//! @acp:summary "Tabular indicator breakdown for a scored product"
//! @acp:domain report
//! @acp:layer logic

use serde::Serialize;

use crate::dataset::Indicator;
use crate::scoring::Prediction;

/// @acp:summary "One row of the indicator detail table"
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailRow {
    pub criterion: &'static str,
    pub value: String,
    pub description: &'static str,
}

/// Header of the detail table
pub const DETAIL_COLUMNS: [&str; 3] = ["CRITERE", "VALEUR", "DESCRIPTION"];

/// Rows shown next to the gauge, using the values the score was computed from
pub fn indicator_details(prediction: &Prediction) -> Vec<DetailRow> {
    let f = &prediction.features;
    let row = |indicator: Indicator, value: String| DetailRow {
        criterion: indicator.label(),
        value,
        description: indicator.description(),
    };

    vec![
        DetailRow {
            criterion: "Code SH",
            value: prediction.hs_code.clone(),
            description: "Classification internationale des produits",
        },
        row(
            Indicator::ComparativeAdvantage,
            format!("{:.1}", f.indicator(Indicator::ComparativeAdvantage)),
        ),
        row(
            Indicator::ProductComplexity,
            format!("{:.2}", f.indicator(Indicator::ProductComplexity)),
        ),
        row(
            Indicator::GrowthDomestic,
            format!("{:.1}%", f.indicator(Indicator::GrowthDomestic)),
        ),
        row(
            Indicator::GrowthWorld,
            format!("{:.1}%", f.indicator(Indicator::GrowthWorld)),
        ),
        // Thousands of USD shown in millions
        row(
            Indicator::MarketSize,
            format!("{:.1}M $", f.indicator(Indicator::MarketSize) / 1000.0),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Alignment, RecordId};
    use crate::features::FeatureVector;

    #[test]
    fn test_detail_formatting() {
        let prediction = Prediction {
            record_id: RecordId(1),
            product_name: "Tomates".into(),
            hs_code: "070200".into(),
            alignment: Alignment::Yes,
            features: FeatureVector::from_values([4.56, 2.14, -0.333, 3.2, 85_300.0, 1.0]),
            probability: 0.7,
        };

        let values: Vec<_> = indicator_details(&prediction)
            .into_iter()
            .map(|r| (r.criterion, r.value))
            .collect();
        assert_eq!(
            values,
            vec![
                ("Code SH", "070200".to_string()),
                ("ACR", "2.1".to_string()),
                ("PCI", "-0.33".to_string()),
                ("Croissance Maroc", "4.6%".to_string()),
                ("Croissance Monde", "3.2%".to_string()),
                ("Taille Marché", "85.3M $".to_string()),
            ]
        );
    }
}
