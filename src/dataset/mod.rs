//! @acp:module "Dataset"
//! @acp:summary "Ordered, in-memory collection of opportunity records"
//! @acp:domain dataset
//! @acp:layer model
//!
//! Records keep their insertion order. Each record receives a stable
//! [`RecordId`] when it enters the dataset; display names are not unique,
//! so name lookups resolve to the first match.

pub mod loader;
pub mod record;

pub use loader::{load_dataset, parse_dataset, DataSource};
pub use record::{
    Alignment, Indicator, OpportunityRecord, RecordId, ALIGNMENT_COLUMN, FEATURE_COLUMNS,
    HS_CODE_COLUMN, PRODUCT_COLUMN,
};

/// @acp:summary "Ordered records with stable identifiers"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<OpportunityRecord>,
    next_id: u64,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from records in the given order
    pub fn from_records(records: impl IntoIterator<Item = OpportunityRecord>) -> Self {
        let mut dataset = Self::new();
        for record in records {
            dataset.push(record);
        }
        dataset
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[OpportunityRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpportunityRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&OpportunityRecord> {
        self.records.first()
    }

    /// Append a record, assigning it a fresh id
    pub fn push(&mut self, mut record: OpportunityRecord) -> RecordId {
        record.id = self.allocate_id();
        let id = record.id;
        self.records.push(record);
        id
    }

    /// Insert a record at position 0 (most-recent-first), assigning it a fresh id
    pub fn insert_front(&mut self, mut record: OpportunityRecord) -> RecordId {
        record.id = self.allocate_id();
        let id = record.id;
        self.records.insert(0, record);
        id
    }

    pub fn get(&self, id: RecordId) -> Option<&OpportunityRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn get_mut(&mut self, id: RecordId) -> Option<&mut OpportunityRecord> {
        self.records.iter_mut().find(|r| r.id == id)
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.get(id).is_some()
    }

    /// Records whose HS code contains `query`; never mutates the dataset
    pub fn filter_by_code(&self, query: &str) -> Vec<&OpportunityRecord> {
        self.records
            .iter()
            .filter(|r| r.hs_code.contains(query))
            .collect()
    }

    /// Records with at least one absent indicator
    pub fn incomplete(&self) -> impl Iterator<Item = &OpportunityRecord> {
        self.records
            .iter()
            .filter(|r| !r.absent_indicators().is_empty())
    }

    fn allocate_id(&mut self) -> RecordId {
        self.next_id += 1;
        RecordId(self.next_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::from_records(vec![
            OpportunityRecord::new("Tomates", "070200"),
            OpportunityRecord::new("Agrumes", "080510"),
            OpportunityRecord::new("Tomates", "200290"),
        ])
    }

    #[test]
    fn test_ids_are_unique_and_stable() {
        let mut dataset = sample();
        let ids: Vec<_> = dataset.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![RecordId(1), RecordId(2), RecordId(3)]);

        let new_id = dataset.insert_front(OpportunityRecord::new("Olives", "070992"));
        assert_eq!(new_id, RecordId(4));
        assert_eq!(dataset.records()[0].id, new_id);
        assert_eq!(dataset.get(RecordId(2)).unwrap().product_name, "Agrumes");
    }

    #[test]
    fn test_filter_by_code_is_substring_projection() {
        let dataset = sample();
        let before = dataset.clone();

        let matches = dataset.filter_by_code("0702");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].product_name, "Tomates");

        assert_eq!(dataset.filter_by_code("0").len(), 3);
        assert!(dataset.filter_by_code("9999").is_empty());
        assert_eq!(dataset, before);
    }
}
