//! In-memory [`RecordStore`] for embedding hosts and tests.
//!
//! Keeps records in a `BTreeMap` and counts every field write, which makes
//! it convenient for asserting that a no-op move touches nothing.

use anyhow::{Result, anyhow};
use std::collections::BTreeMap;

use super::{FieldUpdate, RecordStore, SiblingPage, SiblingQuery, surviving_ancestor};
use crate::model::{Record, RecordId, Status};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: BTreeMap<RecordId, Record>,
    writes: usize,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record.
    pub fn insert(&mut self, record: Record) {
        self.records.insert(record.id, record);
    }

    /// Number of `update_record_fields` calls that reached a record.
    #[must_use]
    pub const fn writes(&self) -> usize {
        self.writes
    }

    /// Borrow a record without going through the trait.
    #[must_use]
    pub fn record(&self, id: RecordId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Every record, in id order.
    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }
}

impl FromIterator<Record> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = Record>>(iter: I) -> Self {
        let mut store = Self::new();
        for record in iter {
            store.insert(record);
        }
        store
    }
}

impl RecordStore for MemoryStore {
    fn get_record(&self, id: RecordId) -> Result<Option<Record>> {
        Ok(self.records.get(&id).cloned())
    }

    fn get_parent_id(&self, id: RecordId) -> Result<Option<RecordId>> {
        Ok(self.records.get(&id).and_then(|r| r.parent_id))
    }

    fn query_siblings(&self, query: &SiblingQuery<'_>) -> Result<SiblingPage> {
        let mut matches: Vec<&Record> = self
            .records
            .values()
            .filter(|r| {
                r.record_type == query.record_type
                    && r.parent_id == query.parent_id
                    && query.statuses.contains(&r.status)
                    && !query.excluded.contains(&r.id)
            })
            .collect();
        matches.sort_by(|a, b| query.order.compare(a, b));

        let remaining = matches.len().saturating_sub(query.offset);
        let take = query.limit.unwrap_or(remaining);
        let records: Vec<Record> = matches
            .into_iter()
            .skip(query.offset)
            .take(take)
            .cloned()
            .collect();

        Ok(SiblingPage {
            has_more: remaining > records.len(),
            records,
        })
    }

    fn update_record_fields(&mut self, id: RecordId, update: &FieldUpdate) -> Result<()> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or_else(|| anyhow!("update_record_fields: record {id} does not exist"))?;
        if let Some(position) = update.position {
            record.position = position;
        }
        if let Some(parent_id) = update.parent_id {
            record.parent_id = parent_id;
        }
        self.writes += 1;
        Ok(())
    }

    fn has_descendants(
        &self,
        record_type: &str,
        parent_id: RecordId,
        statuses: &[Status],
    ) -> Result<bool> {
        Ok(self.records.values().any(|r| {
            r.record_type == record_type
                && r.parent_id == Some(parent_id)
                && statuses.contains(&r.status)
        }))
    }

    fn reset_positions(&mut self, record_type: &str) -> Result<usize> {
        let mut touched = 0;
        for record in self
            .records
            .values_mut()
            .filter(|r| r.record_type == record_type)
        {
            record.position = 0;
            touched += 1;
        }
        Ok(touched)
    }

    fn purge_trash(&mut self, record_type: &str) -> Result<usize> {
        let trashed: BTreeMap<RecordId, Option<RecordId>> = self
            .records
            .values()
            .filter(|r| r.record_type == record_type && r.status == Status::Trash)
            .map(|r| (r.id, r.parent_id))
            .collect();

        for record in self.records.values_mut() {
            if let Some(parent) = record.parent_id.filter(|p| trashed.contains_key(p)) {
                record.parent_id = surviving_ancestor(&trashed, parent);
            }
        }

        self.records.retain(|id, _| !trashed.contains_key(id));
        Ok(trashed.len())
    }
}
