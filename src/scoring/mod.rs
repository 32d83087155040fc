//! @acp:module "Scoring Adapter"
//! @acp:summary "Success-probability scoring over assembled feature vectors"
//! @acp:domain scoring
//! @acp:layer service
//!
//! # Scoring
//!
//! A [`ModelLoader`] produces a [`SuccessScorer`] once, when the session
//! enters the dashboard. The scorer is immutable afterwards and is reused for
//! every prediction of the session.
//!
//! - [`LogisticModel`]: JSON-backed binary classifier with optional scaling
//! - [`ArtifactLoader`]: loads the classifier (and scaler) from disk
//! - [`Verdict`]: fixed 0.5 threshold over the success probability

pub mod model;

pub use model::{ArtifactLoader, LogisticModel, ModelArtifact, ScalerArtifact, StandardScaler};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::{Alignment, RecordId};
use crate::error::Result;
use crate::features::FeatureVector;

/// Probabilities strictly above this value are a HIGH verdict
pub const SUCCESS_THRESHOLD: f64 = 0.5;

/// @acp:summary "Loaded scoring capability"
pub trait SuccessScorer: fmt::Debug + Send + Sync {
    /// Probability of the positive ("success") class, in `[0, 1]`
    fn predict_success_probability(&self, features: &FeatureVector) -> Result<f64>;

    /// Description shown in the dashboard header
    fn info(&self) -> ModelInfo {
        ModelInfo::default()
    }
}

/// @acp:summary "Produces the scoring capability at dashboard entry"
pub trait ModelLoader: Send + Sync {
    fn load(&self) -> Result<Box<dyn SuccessScorer>>;
}

/// @acp:summary "Identification of a loaded model"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Artifact name the classifier was loaded from
    pub classifier: String,
    /// Short SHA-256 of the classifier artifact
    pub fingerprint: Option<String>,
    /// Whether a scaling transform is applied before scoring
    pub scaled: bool,
}

/// @acp:summary "Binary verdict derived from the success probability"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    High,
    Low,
}

impl Verdict {
    /// HIGH iff `probability > 0.5`; exactly 0.5 is LOW
    pub fn from_probability(probability: f64) -> Self {
        if probability > SUCCESS_THRESHOLD {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Label written to reports
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "ÉLEVÉ",
            Self::Low => "FAIBLE",
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::High => "POTENTIEL ÉLEVÉ",
            Self::Low => "POTENTIEL FAIBLE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Format a probability as a percentage with one decimal (`0.734` → `"73.4%"`)
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}

/// @acp:summary "One computed score for the selected record"
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub record_id: RecordId,
    pub product_name: String,
    pub hs_code: String,
    pub alignment: Alignment,
    /// Unscaled inputs actually used
    pub features: FeatureVector,
    pub probability: f64,
}

impl Prediction {
    pub fn verdict(&self) -> Verdict {
        Verdict::from_probability(self.probability)
    }

    /// Gauge position on a 0-100 scale (truncated)
    pub fn gauge_value(&self) -> u8 {
        (self.probability * 100.0).floor().clamp(0.0, 100.0) as u8
    }

    pub fn score_percent(&self) -> String {
        format_percent(self.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(probability: f64) -> Prediction {
        Prediction {
            record_id: RecordId(1),
            product_name: "Tomates".into(),
            hs_code: "070200".into(),
            alignment: Alignment::Yes,
            features: FeatureVector::from_values([0.0; 6]),
            probability,
        }
    }

    #[test]
    fn test_verdict_threshold_boundary() {
        assert_eq!(Verdict::from_probability(0.5), Verdict::Low);
        assert_eq!(Verdict::from_probability(0.500_001), Verdict::High);
        assert_eq!(Verdict::from_probability(0.0), Verdict::Low);
        assert_eq!(Verdict::from_probability(1.0), Verdict::High);
    }

    #[test]
    fn test_gauge_and_percent() {
        let p = prediction(0.7349);
        assert_eq!(p.gauge_value(), 73);
        assert_eq!(p.score_percent(), "73.5%");
        assert_eq!(p.verdict(), Verdict::High);

        assert_eq!(prediction(1.0).gauge_value(), 100);
        assert_eq!(prediction(0.0).score_percent(), "0.0%");
    }
}
