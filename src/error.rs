//! @acp:module "Errors"
//! @acp:summary "Error taxonomy for session transitions, scoring and export"
//! @acp:domain scoring
//! @acp:layer types

use thiserror::Error;

use crate::features::MissingFields;

/// @acp:summary "All errors surfaced by the ExportScore library"
#[derive(Debug, Error)]
pub enum ExportScoreError {
    /// Model or scaler artifact absent at dashboard entry
    #[error("model artifact '{0}' not found; train the model and place it next to the application")]
    ArtifactNotFound(String),

    /// Required identifier columns absent from the prediction source
    #[error("prediction source must contain the columns {}", format_columns(.missing))]
    SchemaValidation { missing: Vec<String> },

    /// One or more numeric features absent for the selected record
    #[error("missing indicator values: {0}")]
    MissingFields(MissingFields),

    /// Any other parse/load failure during initialisation
    #[error("failed to process input files: {0}")]
    Load(String),

    #[error("both the training and the prediction sources are required ({0} is missing)")]
    MissingSource(&'static str),

    #[error("artifact '{artifact}' has shape {found}, expected {expected}")]
    ShapeMismatch {
        artifact: String,
        expected: String,
        found: String,
    },

    #[error("event '{event}' is not valid in phase {phase}")]
    InvalidTransition { event: &'static str, phase: String },

    #[error("no product selected")]
    NoSelection,

    #[error("strategic alignment must be set before scoring")]
    AlignmentRequired,

    #[error("unknown product: {0}")]
    UnknownProduct(String),

    #[error("unknown record id: {0}")]
    UnknownRecord(u64),

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

fn format_columns(columns: &[String]) -> String {
    columns
        .iter()
        .map(|c| format!("'{}'", c))
        .collect::<Vec<_>>()
        .join(" and ")
}

impl ExportScoreError {
    /// Whether the user can recover without restarting the configuration step
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MissingFields(_)
                | Self::NoSelection
                | Self::AlignmentRequired
                | Self::UnknownProduct(_)
                | Self::UnknownRecord(_)
                | Self::InvalidValue { .. }
        )
    }
}

/// Result type alias for ExportScore operations
pub type Result<T> = std::result::Result<T, ExportScoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_names_columns() {
        let err = ExportScoreError::SchemaValidation {
            missing: vec!["Produit".to_string(), "CODE SH".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "prediction source must contain the columns 'Produit' and 'CODE SH'"
        );
    }

    #[test]
    fn test_recoverable_classes() {
        assert!(ExportScoreError::AlignmentRequired.is_recoverable());
        assert!(ExportScoreError::NoSelection.is_recoverable());
        assert!(!ExportScoreError::Load("bad".into()).is_recoverable());
        assert!(!ExportScoreError::SchemaValidation { missing: vec![] }.is_recoverable());
    }

    #[test]
    fn test_artifact_error_is_fatal() {
        let err = ExportScoreError::ArtifactNotFound("best_export_model.json".into());
        assert!(!err.is_recoverable());
        assert!(err.to_string().contains("best_export_model.json"));
    }
}
