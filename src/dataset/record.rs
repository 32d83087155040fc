//! @acp:module "Opportunity Records"
//! @acp:summary "Candidate export products, indicators and alignment flag"
//! @acp:domain dataset
//! @acp:layer types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Column holding the product display name
pub const PRODUCT_COLUMN: &str = "Produit";

/// Column holding the Harmonized System code
pub const HS_CODE_COLUMN: &str = "CODE SH";

/// Column holding the record's own alignment flag (overridden at scoring time)
pub const ALIGNMENT_COLUMN: &str = "Alignement stratégique";

/// Feature names exactly as the classifier was trained on them, in order
pub const FEATURE_COLUMNS: [&str; 6] = [
    "Croissance Maroc (% p.a.)",
    "ACR",
    "PCI",
    "Croissance Monde (% p.a.)",
    "Taille Marche (millier USD)",
    ALIGNMENT_COLUMN,
];

/// @acp:summary "Stable row identifier, assigned on insertion into a dataset"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// @acp:summary "Binary strategic-alignment flag"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    No,
    Yes,
}

impl Alignment {
    /// Build from the 0/1 encoding used in datasets
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::No),
            1 => Some(Self::Yes),
            _ => None,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Self::No => 0,
            Self::Yes => 1,
        }
    }

    /// Feature value fed to the classifier
    pub fn as_feature(self) -> f64 {
        f64::from(self.flag())
    }

    /// Label used in reports and banners
    pub fn label(self) -> &'static str {
        match self {
            Self::No => "NON",
            Self::Yes => "OUI",
        }
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Alignment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "yes" | "y" | "oui" | "o" | "true" => Ok(Self::Yes),
            "0" | "no" | "n" | "non" | "false" => Ok(Self::No),
            other => Err(format!(
                "invalid alignment '{}': expected yes/no (oui/non, 1/0)",
                other
            )),
        }
    }
}

/// @acp:summary "The five measured indicators of a record, in feature order"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Indicator {
    GrowthDomestic,
    ComparativeAdvantage,
    ProductComplexity,
    GrowthWorld,
    MarketSize,
}

impl Indicator {
    pub const ALL: [Indicator; 5] = [
        Indicator::GrowthDomestic,
        Indicator::ComparativeAdvantage,
        Indicator::ProductComplexity,
        Indicator::GrowthWorld,
        Indicator::MarketSize,
    ];

    /// Position in the feature vector
    pub fn index(self) -> usize {
        match self {
            Self::GrowthDomestic => 0,
            Self::ComparativeAdvantage => 1,
            Self::ProductComplexity => 2,
            Self::GrowthWorld => 3,
            Self::MarketSize => 4,
        }
    }

    /// Dataset column name
    pub fn column(self) -> &'static str {
        FEATURE_COLUMNS[self.index()]
    }

    /// Short label for detail tables and prompts
    pub fn label(self) -> &'static str {
        match self {
            Self::GrowthDomestic => "Croissance Maroc",
            Self::ComparativeAdvantage => "ACR",
            Self::ProductComplexity => "PCI",
            Self::GrowthWorld => "Croissance Monde",
            Self::MarketSize => "Taille Marché",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::GrowthDomestic => "Taux de croissance annuel des exportations",
            Self::ComparativeAdvantage => "Mesure la spécialisation du Maroc (> 1 = fort)",
            Self::ProductComplexity => "Niveau technologique (Positif = haute valeur)",
            Self::GrowthWorld => "Taux de croissance annuel du marché mondial",
            Self::MarketSize => "Valeur totale du marché mondial",
        }
    }

    /// Resolve a column name or short label, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let needle = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|ind| {
            ind.column().to_lowercase() == needle || ind.label().to_lowercase() == needle
        })
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// @acp:summary "One candidate export product"
/// @acp:lock normal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpportunityRecord {
    /// Assigned by the owning dataset
    pub id: RecordId,
    pub product_name: String,
    pub hs_code: String,
    pub growth_domestic_pct: Option<f64>,
    /// ACR
    pub revealed_comparative_advantage: Option<f64>,
    /// PCI
    pub product_complexity_index: Option<f64>,
    pub growth_world_pct: Option<f64>,
    pub market_size_thousand_usd: Option<f64>,
    pub strategic_alignment: Option<Alignment>,
}

impl OpportunityRecord {
    /// Create a record with every indicator absent
    pub fn new(product_name: impl Into<String>, hs_code: impl Into<String>) -> Self {
        Self {
            id: RecordId(0),
            product_name: product_name.into(),
            hs_code: hs_code.into(),
            growth_domestic_pct: None,
            revealed_comparative_advantage: None,
            product_complexity_index: None,
            growth_world_pct: None,
            market_size_thousand_usd: None,
            strategic_alignment: None,
        }
    }

    pub fn with_indicator(mut self, indicator: Indicator, value: f64) -> Self {
        self.set_indicator(indicator, value);
        self
    }

    pub fn indicator(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::GrowthDomestic => self.growth_domestic_pct,
            Indicator::ComparativeAdvantage => self.revealed_comparative_advantage,
            Indicator::ProductComplexity => self.product_complexity_index,
            Indicator::GrowthWorld => self.growth_world_pct,
            Indicator::MarketSize => self.market_size_thousand_usd,
        }
    }

    /// Overwrite an indicator in place; the previous value (or absence) is lost
    pub fn set_indicator(&mut self, indicator: Indicator, value: f64) {
        let slot = match indicator {
            Indicator::GrowthDomestic => &mut self.growth_domestic_pct,
            Indicator::ComparativeAdvantage => &mut self.revealed_comparative_advantage,
            Indicator::ProductComplexity => &mut self.product_complexity_index,
            Indicator::GrowthWorld => &mut self.growth_world_pct,
            Indicator::MarketSize => &mut self.market_size_thousand_usd,
        };
        *slot = Some(value);
    }

    /// Indicators currently absent, in feature order
    pub fn absent_indicators(&self) -> Vec<Indicator> {
        Indicator::ALL
            .into_iter()
            .filter(|ind| self.indicator(*ind).is_none())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_parsing() {
        assert_eq!("oui".parse::<Alignment>().unwrap(), Alignment::Yes);
        assert_eq!("YES".parse::<Alignment>().unwrap(), Alignment::Yes);
        assert_eq!("0".parse::<Alignment>().unwrap(), Alignment::No);
        assert_eq!("Non".parse::<Alignment>().unwrap(), Alignment::No);
        assert!("maybe".parse::<Alignment>().is_err());
        assert_eq!(Alignment::from_flag(2), None);
    }

    #[test]
    fn test_indicator_columns_follow_feature_order() {
        for (i, ind) in Indicator::ALL.iter().enumerate() {
            assert_eq!(ind.index(), i);
            assert_eq!(ind.column(), FEATURE_COLUMNS[i]);
        }
    }

    #[test]
    fn test_indicator_from_name() {
        assert_eq!(Indicator::from_name("pci"), Some(Indicator::ProductComplexity));
        assert_eq!(
            Indicator::from_name("Croissance Monde (% p.a.)"),
            Some(Indicator::GrowthWorld)
        );
        assert_eq!(Indicator::from_name("taille marché"), Some(Indicator::MarketSize));
        assert_eq!(Indicator::from_name(ALIGNMENT_COLUMN), None);
    }

    #[test]
    fn test_set_indicator_overwrites() {
        let mut record = OpportunityRecord::new("Tomates", "0702");
        assert_eq!(record.absent_indicators().len(), 5);

        record.set_indicator(Indicator::ProductComplexity, 0.5);
        assert_eq!(record.product_complexity_index, Some(0.5));
        assert!(!record.absent_indicators().contains(&Indicator::ProductComplexity));
    }
}
