//! @acp:module "Model Artifacts"
//! @acp:summary "Logistic classifier and standard scaler loaded from JSON artifacts"
//! @acp:domain scoring
//! @acp:layer io
//!
//! Artifact layout (`best_export_model.json`):
//!
//! ```json
//! {
//!   "feature_names": ["Croissance Maroc (% p.a.)", "ACR", "PCI",
//!                     "Croissance Monde (% p.a.)", "Taille Marche (millier USD)",
//!                     "Alignement stratégique"],
//!   "coefficients": [0.12, 0.85, 0.4, 0.05, 0.00001, 1.3],
//!   "intercept": -1.7
//! }
//! ```
//!
//! The optional scaler artifact carries `mean` and `scale` arrays of the same
//! length, applied as `(x - mean) / scale` before the linear term.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ModelInfo, ModelLoader, SuccessScorer};
use crate::dataset::FEATURE_COLUMNS;
use crate::error::{ExportScoreError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};

/// @acp:summary "Serialized classifier parameters"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Training-time feature order; checked against the assembler's order when present
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

/// @acp:summary "Serialized scaling transform parameters"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerArtifact {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_names: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// @acp:summary "Fitted standardisation transform"
#[derive(Debug, Clone, PartialEq)]
pub struct StandardScaler {
    mean: [f64; FEATURE_COUNT],
    scale: [f64; FEATURE_COUNT],
}

impl StandardScaler {
    pub fn from_artifact(name: &str, artifact: ScalerArtifact) -> Result<Self> {
        check_feature_names(name, &artifact.feature_names)?;
        let mean = to_array(name, "mean", &artifact.mean)?;
        let scale = to_array(name, "scale", &artifact.scale)?;
        Ok(Self { mean, scale })
    }

    pub fn transform(&self, features: &FeatureVector) -> FeatureVector {
        let mut out = *features.values();
        for (i, value) in out.iter_mut().enumerate() {
            // Constant features were fitted with zero variance
            let scale = if self.scale[i] == 0.0 { 1.0 } else { self.scale[i] };
            *value = (*value - self.mean[i]) / scale;
        }
        FeatureVector::from_values(out)
    }
}

/// @acp:summary "Binary logistic-regression classifier"
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticModel {
    coefficients: [f64; FEATURE_COUNT],
    intercept: f64,
    scaler: Option<StandardScaler>,
    info: ModelInfo,
}

impl LogisticModel {
    pub fn new(coefficients: [f64; FEATURE_COUNT], intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
            scaler: None,
            info: ModelInfo::default(),
        }
    }

    pub fn from_artifact(name: &str, artifact: ModelArtifact) -> Result<Self> {
        check_feature_names(name, &artifact.feature_names)?;
        let coefficients = to_array(name, "coefficients", &artifact.coefficients)?;
        if !artifact.intercept.is_finite() {
            return Err(ExportScoreError::InvalidValue {
                field: format!("{}: intercept", name),
                reason: "must be finite".to_string(),
            });
        }
        let mut model = Self::new(coefficients, artifact.intercept);
        model.info.classifier = name.to_string();
        Ok(model)
    }

    pub fn with_scaler(mut self, scaler: StandardScaler) -> Self {
        self.scaler = Some(scaler);
        self.info.scaled = true;
        self
    }

    fn with_fingerprint(mut self, fingerprint: String) -> Self {
        self.info.fingerprint = Some(fingerprint);
        self
    }

    /// Linear term before the sigmoid
    pub fn decision_function(&self, features: &FeatureVector) -> f64 {
        let scaled = match &self.scaler {
            Some(scaler) => scaler.transform(features),
            None => *features,
        };
        scaled
            .values()
            .iter()
            .zip(self.coefficients.iter())
            .map(|(x, w)| x * w)
            .sum::<f64>()
            + self.intercept
    }
}

impl SuccessScorer for LogisticModel {
    fn predict_success_probability(&self, features: &FeatureVector) -> Result<f64> {
        let z = self.decision_function(features);
        if z.is_nan() {
            return Err(ExportScoreError::InvalidValue {
                field: "features".to_string(),
                reason: "classifier produced NaN".to_string(),
            });
        }
        let probability = (1.0 / (1.0 + (-z).exp())).clamp(0.0, 1.0);
        tracing::debug!(decision = z, probability, "scored feature vector");
        Ok(probability)
    }

    fn info(&self) -> ModelInfo {
        self.info.clone()
    }
}

/// @acp:summary "Loads the classifier and optional scaler from fixed paths"
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactLoader {
    pub classifier: PathBuf,
    pub scaler: Option<PathBuf>,
}

impl ArtifactLoader {
    pub fn new(classifier: impl Into<PathBuf>) -> Self {
        Self {
            classifier: classifier.into(),
            scaler: None,
        }
    }

    pub fn with_scaler(mut self, scaler: impl Into<PathBuf>) -> Self {
        self.scaler = Some(scaler.into());
        self
    }
}

impl ModelLoader for ArtifactLoader {
    fn load(&self) -> Result<Box<dyn SuccessScorer>> {
        let (name, bytes) = read_artifact(&self.classifier)?;
        let artifact: ModelArtifact = serde_json::from_slice(&bytes)
            .map_err(|e| ExportScoreError::Load(format!("{}: {}", name, e)))?;
        let mut model = LogisticModel::from_artifact(&name, artifact)?
            .with_fingerprint(fingerprint(&bytes));

        if let Some(path) = &self.scaler {
            let (scaler_name, scaler_bytes) = read_artifact(path)?;
            let artifact: ScalerArtifact = serde_json::from_slice(&scaler_bytes)
                .map_err(|e| ExportScoreError::Load(format!("{}: {}", scaler_name, e)))?;
            model = model.with_scaler(StandardScaler::from_artifact(&scaler_name, artifact)?);
        }

        tracing::info!(
            classifier = %name,
            scaled = model.info.scaled,
            "scoring model loaded"
        );
        Ok(Box::new(model))
    }
}

fn read_artifact(path: &Path) -> Result<(String, Vec<u8>)> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match std::fs::read(path) {
        Ok(bytes) => Ok((name, bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ExportScoreError::ArtifactNotFound(name)),
        Err(e) => Err(ExportScoreError::Load(format!("{}: {}", name, e))),
    }
}

/// First 12 hex digits of the SHA-256 of an artifact
fn fingerprint(bytes: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(bytes));
    digest[..12].to_string()
}

fn check_feature_names(artifact: &str, names: &[String]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let matches = names.len() == FEATURE_COUNT
        && names
            .iter()
            .zip(FEATURE_COLUMNS.iter())
            .all(|(found, expected)| found == expected);
    if matches {
        Ok(())
    } else {
        Err(ExportScoreError::ShapeMismatch {
            artifact: artifact.to_string(),
            expected: format!("[{}]", FEATURE_COLUMNS.join(", ")),
            found: format!("[{}]", names.join(", ")),
        })
    }
}

fn to_array(artifact: &str, field: &str, values: &[f64]) -> Result<[f64; FEATURE_COUNT]> {
    let array: [f64; FEATURE_COUNT] =
        values
            .try_into()
            .map_err(|_| ExportScoreError::ShapeMismatch {
                artifact: artifact.to_string(),
                expected: format!("{} with {} values", field, FEATURE_COUNT),
                found: format!("{} with {} values", field, values.len()),
            })?;
    if array.iter().any(|v| !v.is_finite()) {
        return Err(ExportScoreError::InvalidValue {
            field: format!("{}: {}", artifact, field),
            reason: "values must be finite".to_string(),
        });
    }
    Ok(array)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn features(values: [f64; 6]) -> FeatureVector {
        FeatureVector::from_values(values)
    }

    #[test]
    fn test_zero_model_scores_one_half() {
        let model = LogisticModel::new([0.0; 6], 0.0);
        let p = model
            .predict_success_probability(&features([1.0, 2.0, 3.0, 4.0, 5.0, 1.0]))
            .unwrap();
        assert_eq!(p, 0.5);
    }

    #[test]
    fn test_probability_stays_in_unit_interval() {
        let model = LogisticModel::new([1.0, 1.0, 1.0, 1.0, 1.0, 1.0], 0.0);
        for x in [-1e6, -50.0, 0.0, 50.0, 1e6] {
            let p = model
                .predict_success_probability(&features([x, x, x, x, x, 1.0]))
                .unwrap();
            assert!((0.0..=1.0).contains(&p), "p = {p}");
        }
    }

    #[test]
    fn test_scaler_applied_before_linear_term() {
        let scaler = StandardScaler::from_artifact(
            "scaler.json",
            ScalerArtifact {
                feature_names: vec![],
                mean: vec![10.0, 0.0, 0.0, 0.0, 0.0, 0.0],
                scale: vec![2.0, 1.0, 1.0, 1.0, 1.0, 0.0],
            },
        )
        .unwrap();
        let model = LogisticModel::new([1.0, 0.0, 0.0, 0.0, 0.0, 0.0], 0.0).with_scaler(scaler);

        // (10 - 10) / 2 = 0 → sigmoid(0)
        let z = model.decision_function(&features([10.0, 5.0, 5.0, 5.0, 5.0, 1.0]));
        assert_eq!(z, 0.0);
        assert!(model.info().scaled);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = LogisticModel::from_artifact(
            "model.json",
            ModelArtifact {
                feature_names: vec![],
                coefficients: vec![1.0, 2.0],
                intercept: 0.0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ExportScoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_feature_order_mismatch_rejected() {
        let mut names: Vec<String> = FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect();
        names.swap(1, 2);
        let err = LogisticModel::from_artifact(
            "model.json",
            ModelArtifact {
                feature_names: names,
                coefficients: vec![0.0; 6],
                intercept: 0.0,
            },
        )
        .unwrap_err();
        assert!(matches!(err, ExportScoreError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_loader_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let loader = ArtifactLoader::new(dir.path().join("best_export_model.json"));
        match loader.load() {
            Err(ExportScoreError::ArtifactNotFound(name)) => {
                assert_eq!(name, "best_export_model.json")
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_loader_reads_model_and_scaler() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        let scaler_path = dir.path().join("scaler.json");
        fs::write(
            &model_path,
            r#"{"coefficients": [0, 0, 0, 0, 0, 2.0], "intercept": -1.0}"#,
        )
        .unwrap();
        fs::write(
            &scaler_path,
            r#"{"mean": [0, 0, 0, 0, 0, 0], "scale": [1, 1, 1, 1, 1, 1]}"#,
        )
        .unwrap();

        let scorer = ArtifactLoader::new(&model_path)
            .with_scaler(&scaler_path)
            .load()
            .unwrap();
        let info = scorer.info();
        assert_eq!(info.classifier, "model.json");
        assert!(info.scaled);
        assert_eq!(info.fingerprint.as_ref().map(|f| f.len()), Some(12));

        let p = scorer
            .predict_success_probability(&features([0.0, 0.0, 0.0, 0.0, 0.0, 1.0]))
            .unwrap();
        // sigmoid(1.0)
        assert!((p - 0.731_058_578_6).abs() < 1e-9);
    }

    #[test]
    fn test_loader_missing_scaler_is_artifact_error() {
        let dir = tempfile::tempdir().unwrap();
        let model_path = dir.path().join("model.json");
        fs::write(&model_path, r#"{"coefficients": [0, 0, 0, 0, 0, 0], "intercept": 0}"#)
            .unwrap();

        let err = ArtifactLoader::new(&model_path)
            .with_scaler(dir.path().join("scaler.json"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ExportScoreError::ArtifactNotFound(ref n) if n == "scaler.json"));
    }
}
