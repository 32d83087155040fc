#![forbid(unsafe_code)]

//! @acp:module "ExportScore Library"
//! @acp:summary "Success-probability scoring of candidate export products"
//! @acp:domain scoring
//! @acp:layer api
//! @acp:stability stable
//!
//! # ExportScore
//!
//! Decision support for trade promotion: load a prediction dataset, pick a
//! candidate product, set its strategic alignment, and get a success
//! probability from a pre-trained classifier. Scored products accumulate into
//! a downloadable report.
//!
//! ## Features
//!
//! - **Explicit session**: one [`Session`] per user, driven by [`Event`]s
//! - **Missing-data resolution**: absent indicators are reported, filled in
//!   place, and scoring is retried
//! - **Pluggable scoring**: [`SuccessScorer`] / [`ModelLoader`] seam, with a
//!   JSON-backed logistic model and optional scaler
//! - **Report export**: order-preserving, deterministic xlsx or CSV
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use exportscore::{Alignment, Config, DataSource, Event, Session};
//!
//! fn main() -> exportscore::Result<()> {
//!     let config = Config::load_or_default();
//!     let mut session = Session::new(Arc::new(config.model_loader()));
//!
//!     session.dispatch(Event::SubmitConfig {
//!         training: Some(DataSource::path("base_apprentissage.csv")),
//!         prediction: Some(DataSource::path("base_prediction.csv")),
//!     })?;
//!     session.dispatch(Event::SetAlignment(Alignment::Yes))?;
//!     session.dispatch(Event::AddToReport)?;
//!
//!     std::fs::write("rapport.xlsx", session.report().export_xlsx()?)?;
//!     Ok(())
//! }
//! ```

pub mod commands;
pub mod config;
pub mod dataset;
pub mod detail;
pub mod error;
pub mod features;
pub mod report;
pub mod scoring;
pub mod session;

// Re-exports
pub use config::Config;
pub use dataset::{
    Alignment, DataSource, Dataset, Indicator, OpportunityRecord, RecordId, FEATURE_COLUMNS,
};
pub use detail::{indicator_details, DetailRow};
pub use error::{ExportScoreError, Result};
pub use features::{assemble, FeatureVector, MissingFields};
pub use report::{Report, ReportEntry, ReportFormat, REPORT_COLUMNS, SPREADSHEET_MIME};
pub use scoring::{
    ArtifactLoader, LogisticModel, ModelInfo, ModelLoader, Prediction, SuccessScorer, Verdict,
};
pub use session::{Event, ManualEntry, Outcome, Phase, Session};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
