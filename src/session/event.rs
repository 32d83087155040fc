//! @acp:module "Session Events"
//! @acp:summary "External events accepted by the session and their outcomes"
//! @acp:domain session
//! @acp:layer types

use crate::dataset::{Alignment, DataSource, Indicator, RecordId};
use crate::report::ReportEntry;
use crate::scoring::Prediction;

use super::manual::ManualEntry;

/// @acp:summary "One user action, applied to completion before the next"
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Configuration submit; the training source is accepted but unused
    SubmitConfig {
        training: Option<DataSource>,
        prediction: Option<DataSource>,
    },
    /// Destroy all session state and return to configuration
    Reset,
    /// Restrict selectable records to HS codes containing the query; empty clears
    FilterByCode(String),
    /// Select the first record with this name among the filtered candidates
    SelectProduct(String),
    SelectRecord(RecordId),
    SetAlignment(Alignment),
    ShowManualForm,
    HideManualForm,
    SubmitManualEntry(ManualEntry),
    /// Overwrite indicators of the selected record in place
    SupplyMissing(Vec<(Indicator, f64)>),
    /// Score the selected record
    Score,
    /// Score the selected record and append it to the report
    AddToReport,
}

impl Event {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitConfig { .. } => "submit-config",
            Self::Reset => "reset",
            Self::FilterByCode(_) => "filter-by-code",
            Self::SelectProduct(_) => "select-product",
            Self::SelectRecord(_) => "select-record",
            Self::SetAlignment(_) => "set-alignment",
            Self::ShowManualForm => "show-manual-form",
            Self::HideManualForm => "hide-manual-form",
            Self::SubmitManualEntry(_) => "submit-manual-entry",
            Self::SupplyMissing(_) => "supply-missing",
            Self::Score => "score",
            Self::AddToReport => "add-to-report",
        }
    }
}

/// @acp:summary "Settled result of an event, handed to the renderer"
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Initialized { records: usize },
    Reset,
    Filtered {
        matches: usize,
        selected: Option<RecordId>,
    },
    Selected(RecordId),
    AlignmentSet(Alignment),
    ManualForm { visible: bool },
    ManualEntryMerged(RecordId),
    ValuesSupplied {
        record: RecordId,
        filled: Vec<Indicator>,
    },
    Scored(Prediction),
    Reported { entry: ReportEntry, total: usize },
}
