//! @acp:module "Session State Machine"
//! @acp:summary "Single-session context driven by explicit event dispatch"
//! @acp:domain session
//! @acp:layer service
//!
//! # Session
//!
//! A [`Session`] starts in [`Phase::Config`]. A successful
//! [`Event::SubmitConfig`] loads the scoring capability and the prediction
//! dataset together and moves to [`Phase::Dashboard`]; both only exist inside
//! the dashboard payload, so the dashboard phase always has them.
//! [`Event::Reset`] returns every field to its initial value.
//!
//! Each call to [`Session::dispatch`] runs to completion and either mutates
//! the state or fails without partial changes. Rendering reads the settled
//! state through the accessors.

pub mod event;
pub mod manual;

pub use event::{Event, Outcome};
pub use manual::{merge, ManualEntry};

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dataset::{
    self, Alignment, DataSource, Dataset, Indicator, OpportunityRecord, RecordId,
};
use crate::error::{ExportScoreError, Result};
use crate::features::{assemble, MissingFields};
use crate::report::Report;
use crate::scoring::{ModelInfo, ModelLoader, Prediction, SuccessScorer};

/// @acp:summary "Application phase"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Config,
    Dashboard,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => f.write_str("CONFIG"),
            Self::Dashboard => f.write_str("DASHBOARD"),
        }
    }
}

/// State that only exists once the dashboard has been entered
#[derive(Debug)]
struct Dashboard {
    scorer: Box<dyn SuccessScorer>,
    dataset: Dataset,
    selected: Option<RecordId>,
    hs_filter: Option<String>,
}

impl Dashboard {
    fn candidates(&self) -> Vec<&OpportunityRecord> {
        match &self.hs_filter {
            Some(query) => self.dataset.filter_by_code(query),
            None => self.dataset.iter().collect(),
        }
    }

    fn selected_record(&self) -> Option<&OpportunityRecord> {
        self.selected.and_then(|id| self.dataset.get(id))
    }
}

#[derive(Debug, Default)]
struct SessionState {
    dashboard: Option<Dashboard>,
    strategic_alignment: Option<Alignment>,
    report: Report,
    manual_form_visible: bool,
}

/// @acp:summary "One user's interaction context"
pub struct Session {
    loader: Arc<dyn ModelLoader>,
    state: SessionState,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session").field("state", &self.state).finish()
    }
}

impl Session {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            loader,
            state: SessionState::default(),
        }
    }

    /// Apply one event to completion
    pub fn dispatch(&mut self, event: Event) -> Result<Outcome> {
        tracing::debug!(event = event.name(), phase = %self.phase(), "dispatch");
        match event {
            Event::SubmitConfig {
                training,
                prediction,
            } => self.submit_config(training, prediction),
            Event::Reset => {
                self.reset();
                Ok(Outcome::Reset)
            }
            Event::FilterByCode(query) => self.filter_by_code(query),
            Event::SelectProduct(name) => self.select_product(&name),
            Event::SelectRecord(id) => self.select_record(id),
            Event::SetAlignment(alignment) => {
                self.dashboard_mut("set-alignment")?;
                self.state.strategic_alignment = Some(alignment);
                Ok(Outcome::AlignmentSet(alignment))
            }
            Event::ShowManualForm => self.set_manual_form("show-manual-form", true),
            Event::HideManualForm => self.set_manual_form("hide-manual-form", false),
            Event::SubmitManualEntry(entry) => self.submit_manual_entry(entry),
            Event::SupplyMissing(values) => self.supply_missing(values),
            Event::Score => self.predict().map(Outcome::Scored),
            Event::AddToReport => self.add_to_report(),
        }
    }

    pub fn phase(&self) -> Phase {
        if self.state.dashboard.is_some() {
            Phase::Dashboard
        } else {
            Phase::Config
        }
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        self.state.dashboard.as_ref().map(|d| &d.dataset)
    }

    /// Records offered for selection under the current HS filter
    pub fn candidates(&self) -> Vec<&OpportunityRecord> {
        self.state
            .dashboard
            .as_ref()
            .map(|d| d.candidates())
            .unwrap_or_default()
    }

    pub fn hs_filter(&self) -> Option<&str> {
        self.state
            .dashboard
            .as_ref()
            .and_then(|d| d.hs_filter.as_deref())
    }

    pub fn selected_id(&self) -> Option<RecordId> {
        self.state.dashboard.as_ref().and_then(|d| d.selected)
    }

    pub fn selected_record(&self) -> Option<&OpportunityRecord> {
        self.state
            .dashboard
            .as_ref()
            .and_then(|d| d.selected_record())
    }

    /// Display name of the current selection
    pub fn selected_product_name(&self) -> Option<&str> {
        self.selected_record().map(|r| r.product_name.as_str())
    }

    pub fn strategic_alignment(&self) -> Option<Alignment> {
        self.state.strategic_alignment
    }

    pub fn report(&self) -> &Report {
        &self.state.report
    }

    pub fn manual_form_visible(&self) -> bool {
        self.state.manual_form_visible
    }

    pub fn model_info(&self) -> Option<ModelInfo> {
        self.state.dashboard.as_ref().map(|d| d.scorer.info())
    }

    /// Indicators the selected record still lacks, if any
    pub fn missing_fields(&self) -> Option<MissingFields> {
        let record = self.selected_record()?;
        assemble(record, Alignment::No).err()
    }

    /// Score the current selection without changing state
    pub fn predict(&self) -> Result<Prediction> {
        let dashboard = self.dashboard("score")?;
        let alignment = self
            .state
            .strategic_alignment
            .ok_or(ExportScoreError::AlignmentRequired)?;
        let record = dashboard
            .selected_record()
            .ok_or(ExportScoreError::NoSelection)?;

        let features = assemble(record, alignment).map_err(ExportScoreError::MissingFields)?;
        let probability = dashboard.scorer.predict_success_probability(&features)?;

        Ok(Prediction {
            record_id: record.id,
            product_name: record.product_name.clone(),
            hs_code: record.hs_code.clone(),
            alignment,
            features,
            probability,
        })
    }

    fn reset(&mut self) {
        self.state = SessionState::default();
        tracing::info!("session reset");
    }

    fn submit_config(
        &mut self,
        training: Option<DataSource>,
        prediction: Option<DataSource>,
    ) -> Result<Outcome> {
        if self.state.dashboard.is_some() {
            return Err(self.invalid("submit-config"));
        }
        let training = training.ok_or(ExportScoreError::MissingSource("training"))?;
        let prediction = prediction.ok_or(ExportScoreError::MissingSource("prediction"))?;

        tracing::info!(
            training = %training.name(),
            "training source accepted; using the pre-trained model"
        );

        let scorer = self.loader.load()?;
        let dataset = dataset::load_dataset(&prediction)?;
        let records = dataset.len();
        let selected = dataset.first().map(|r| r.id);

        self.state.dashboard = Some(Dashboard {
            scorer,
            dataset,
            selected,
            hs_filter: None,
        });
        tracing::info!(records, "entered dashboard");
        Ok(Outcome::Initialized { records })
    }

    fn filter_by_code(&mut self, query: String) -> Result<Outcome> {
        let dashboard = self.dashboard_mut("filter-by-code")?;
        let query = query.trim().to_string();
        dashboard.hs_filter = if query.is_empty() { None } else { Some(query) };

        let candidates = dashboard.candidates();
        let matches = candidates.len();
        let still_visible = dashboard
            .selected
            .is_some_and(|id| candidates.iter().any(|r| r.id == id));
        let first = candidates.first().map(|r| r.id);

        if !still_visible {
            dashboard.selected = first;
        }
        Ok(Outcome::Filtered {
            matches,
            selected: dashboard.selected,
        })
    }

    fn select_product(&mut self, name: &str) -> Result<Outcome> {
        let dashboard = self.dashboard_mut("select-product")?;
        let id = dashboard
            .candidates()
            .into_iter()
            .find(|r| r.product_name == name)
            .map(|r| r.id)
            .ok_or_else(|| ExportScoreError::UnknownProduct(name.to_string()))?;
        dashboard.selected = Some(id);
        Ok(Outcome::Selected(id))
    }

    fn select_record(&mut self, id: RecordId) -> Result<Outcome> {
        let dashboard = self.dashboard_mut("select-record")?;
        if !dashboard.dataset.contains(id) {
            return Err(ExportScoreError::UnknownRecord(id.0));
        }
        dashboard.selected = Some(id);
        Ok(Outcome::Selected(id))
    }

    fn set_manual_form(&mut self, event: &'static str, visible: bool) -> Result<Outcome> {
        self.dashboard_mut(event)?;
        self.state.manual_form_visible = visible;
        Ok(Outcome::ManualForm { visible })
    }

    fn submit_manual_entry(&mut self, entry: ManualEntry) -> Result<Outcome> {
        let alignment = entry.alignment;
        let dashboard = self.dashboard_mut("submit-manual-entry")?;
        let id = merge(&mut dashboard.dataset, entry)?;
        // The new record must stay selectable
        dashboard.hs_filter = None;
        dashboard.selected = Some(id);

        self.state.strategic_alignment = Some(alignment);
        self.state.manual_form_visible = false;
        Ok(Outcome::ManualEntryMerged(id))
    }

    fn supply_missing(&mut self, values: Vec<(Indicator, f64)>) -> Result<Outcome> {
        let dashboard = self.dashboard_mut("supply-missing")?;
        let id = dashboard.selected.ok_or(ExportScoreError::NoSelection)?;

        if let Some((indicator, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ExportScoreError::InvalidValue {
                field: indicator.column().to_string(),
                reason: format!("{} is not a finite number", value),
            });
        }

        let record = dashboard
            .dataset
            .get_mut(id)
            .ok_or(ExportScoreError::UnknownRecord(id.0))?;

        // Only absent indicators may be filled
        let absent = record.absent_indicators();
        if let Some((indicator, _)) = values.iter().find(|(ind, _)| !absent.contains(ind)) {
            return Err(ExportScoreError::InvalidValue {
                field: indicator.column().to_string(),
                reason: "already has a value".to_string(),
            });
        }

        let mut filled = Vec::with_capacity(values.len());
        for (indicator, value) in values {
            record.set_indicator(indicator, value);
            filled.push(indicator);
        }
        tracing::info!(record = %id, filled = filled.len(), "indicator values supplied");
        Ok(Outcome::ValuesSupplied { record: id, filled })
    }

    fn add_to_report(&mut self) -> Result<Outcome> {
        let prediction = self.predict()?;
        let entry = self
            .state
            .report
            .add(
                &prediction.product_name,
                &prediction.hs_code,
                prediction.alignment,
                prediction.probability,
            )
            .clone();
        Ok(Outcome::Reported {
            entry,
            total: self.state.report.len(),
        })
    }

    fn dashboard(&self, event: &'static str) -> Result<&Dashboard> {
        self.state
            .dashboard
            .as_ref()
            .ok_or_else(|| self.invalid(event))
    }

    fn dashboard_mut(&mut self, event: &'static str) -> Result<&mut Dashboard> {
        let phase = self.phase();
        self.state
            .dashboard
            .as_mut()
            .ok_or_else(|| ExportScoreError::InvalidTransition {
                event,
                phase: phase.to_string(),
            })
    }

    fn invalid(&self, event: &'static str) -> ExportScoreError {
        ExportScoreError::InvalidTransition {
            event,
            phase: self.phase().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureVector;

    #[derive(Debug)]
    struct Constant(f64);

    impl SuccessScorer for Constant {
        fn predict_success_probability(&self, _features: &FeatureVector) -> Result<f64> {
            Ok(self.0)
        }
    }

    struct ConstantLoader(f64);

    impl ModelLoader for ConstantLoader {
        fn load(&self) -> Result<Box<dyn SuccessScorer>> {
            Ok(Box::new(Constant(self.0)))
        }
    }

    const CSV: &str = "Produit,CODE SH,Croissance Maroc (% p.a.),ACR,PCI,Croissance Monde (% p.a.),Taille Marche (millier USD)\n\
        Tomates,070200,4.5,2.1,-0.3,3.2,85000\n\
        Agrumes,080510,1.0,1.5,,2.0,40000\n";

    fn dashboard_session() -> Session {
        let mut session = Session::new(Arc::new(ConstantLoader(0.7)));
        session
            .dispatch(Event::SubmitConfig {
                training: Some(DataSource::inline("train.csv", "")),
                prediction: Some(DataSource::inline("predict.csv", CSV)),
            })
            .unwrap();
        session
    }

    #[test]
    fn test_dashboard_entry_selects_first_record() {
        let session = dashboard_session();
        assert_eq!(session.phase(), Phase::Dashboard);
        assert_eq!(session.selected_product_name(), Some("Tomates"));
        assert_eq!(session.model_info(), Some(ModelInfo::default()));
    }

    #[test]
    fn test_dashboard_events_rejected_in_config() {
        let mut session = Session::new(Arc::new(ConstantLoader(0.7)));
        let err = session.dispatch(Event::SetAlignment(Alignment::Yes)).unwrap_err();
        assert!(matches!(
            err,
            ExportScoreError::InvalidTransition { event: "set-alignment", .. }
        ));
        assert_eq!(session.strategic_alignment(), None);
    }

    #[test]
    fn test_submit_config_twice_is_invalid() {
        let mut session = dashboard_session();
        let err = session
            .dispatch(Event::SubmitConfig {
                training: None,
                prediction: None,
            })
            .unwrap_err();
        assert!(matches!(err, ExportScoreError::InvalidTransition { .. }));
        assert_eq!(session.phase(), Phase::Dashboard);
    }

    #[test]
    fn test_filter_reselects_first_visible() {
        let mut session = dashboard_session();
        let outcome = session
            .dispatch(Event::FilterByCode("0805".to_string()))
            .unwrap();
        assert!(matches!(outcome, Outcome::Filtered { matches: 1, .. }));
        assert_eq!(session.selected_product_name(), Some("Agrumes"));

        session.dispatch(Event::FilterByCode("zzz".to_string())).unwrap();
        assert_eq!(session.selected_id(), None);
        assert!(session.candidates().is_empty());

        session.dispatch(Event::FilterByCode(String::new())).unwrap();
        assert_eq!(session.hs_filter(), None);
        assert_eq!(session.candidates().len(), 2);
        assert_eq!(session.dataset().map(|d| d.len()), Some(2));
    }

    #[test]
    fn test_score_requires_alignment() {
        let session = dashboard_session();
        assert!(matches!(
            session.predict().unwrap_err(),
            ExportScoreError::AlignmentRequired
        ));
    }

    #[test]
    fn test_missing_fields_helper() {
        let mut session = dashboard_session();
        assert_eq!(session.missing_fields(), None);
        session
            .dispatch(Event::SelectProduct("Agrumes".to_string()))
            .unwrap();
        let missing = session.missing_fields().unwrap();
        assert_eq!(missing.indicators(), &[Indicator::ProductComplexity]);
    }

    #[test]
    fn test_supply_missing_rejects_present_indicator() {
        let mut session = dashboard_session();
        let err = session
            .dispatch(Event::SupplyMissing(vec![(Indicator::ComparativeAdvantage, 99.0)]))
            .unwrap_err();
        assert!(matches!(err, ExportScoreError::InvalidValue { .. }));
        assert_eq!(
            session.selected_record().unwrap().revealed_comparative_advantage,
            Some(2.1)
        );

        // A mixed batch is rejected as a whole
        session
            .dispatch(Event::SelectProduct("Agrumes".to_string()))
            .unwrap();
        let err = session
            .dispatch(Event::SupplyMissing(vec![
                (Indicator::ProductComplexity, 0.5),
                (Indicator::GrowthWorld, 9.0),
            ]))
            .unwrap_err();
        assert!(matches!(err, ExportScoreError::InvalidValue { .. }));
        let record = session.selected_record().unwrap();
        assert_eq!(record.product_complexity_index, None);
        assert_eq!(record.growth_world_pct, Some(2.0));
    }

    #[test]
    fn test_manual_form_toggle() {
        let mut session = dashboard_session();
        session.dispatch(Event::ShowManualForm).unwrap();
        assert!(session.manual_form_visible());
        session.dispatch(Event::HideManualForm).unwrap();
        assert!(!session.manual_form_visible());
    }
}
