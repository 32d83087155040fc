//! @acp:module "Configuration"
//! @acp:summary "Project configuration loading and defaults"
//! @acp:domain cli
//! @acp:layer config

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::report::ReportFormat;
use crate::scoring::ArtifactLoader;

/// Default configuration file name
pub const CONFIG_FILE: &str = ".exportscore.config.json";

fn default_version() -> String {
    "1.0.0".to_string()
}

/// @acp:summary "Main ExportScore configuration structure"
/// @acp:lock normal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration format version
    #[serde(default = "default_version")]
    pub version: String,

    /// Model artifact locations
    #[serde(default)]
    pub model: ModelConfig,

    /// Report export settings
    #[serde(default)]
    pub report: ReportConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            model: ModelConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Config {
    /// @acp:summary "Load config from a JSON file"
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// @acp:summary "Save config to a file"
    pub fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// @acp:summary "Load from default location or create default config"
    pub fn load_or_default() -> Self {
        Self::load(CONFIG_FILE).unwrap_or_default()
    }

    /// Loader for the configured classifier and scaler
    pub fn model_loader(&self) -> ArtifactLoader {
        let loader = ArtifactLoader::new(self.model.classifier.clone());
        match &self.model.scaler {
            Some(scaler) => loader.with_scaler(scaler.clone()),
            None => loader,
        }
    }

    /// Report output path, with the extension of the configured format
    pub fn report_path(&self) -> PathBuf {
        self.report_path_for(self.report.format)
    }

    /// Report output path for an explicit format
    pub fn report_path_for(&self, format: ReportFormat) -> PathBuf {
        self.report.path.with_extension(format.extension())
    }
}

/// @acp:summary "Model artifact configuration"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Classifier artifact, loaded at dashboard entry
    #[serde(default = "default_classifier_path")]
    pub classifier: PathBuf,

    /// Optional fitted scaler, applied before scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaler: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            classifier: default_classifier_path(),
            scaler: None,
        }
    }
}

fn default_classifier_path() -> PathBuf {
    PathBuf::from("best_export_model.json")
}

/// @acp:summary "Report export configuration"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Where exports are written
    #[serde(default = "default_report_path")]
    pub path: PathBuf,

    #[serde(default)]
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: default_report_path(),
            format: ReportFormat::default(),
        }
    }
}

fn default_report_path() -> PathBuf {
    PathBuf::from("rapport_opportunites.xlsx")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"model": {"scaler": "scaler.json"}}"#).unwrap();
        assert_eq!(config.model.classifier, PathBuf::from("best_export_model.json"));
        assert_eq!(config.model.scaler, Some(PathBuf::from("scaler.json")));
        assert_eq!(config.report.format, ReportFormat::Xlsx);

        let loader = config.model_loader();
        assert_eq!(loader.scaler, Some(PathBuf::from("scaler.json")));
    }

    #[test]
    fn test_report_path_follows_format() {
        let mut config = Config::default();
        assert_eq!(config.report_path(), PathBuf::from("rapport_opportunites.xlsx"));
        assert_eq!(
            config.report_path_for(ReportFormat::Csv),
            PathBuf::from("rapport_opportunites.csv")
        );

        config.report.format = ReportFormat::Csv;
        assert_eq!(config.report_path(), PathBuf::from("rapport_opportunites.csv"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);

        let mut config = Config::default();
        config.report.format = ReportFormat::Csv;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
