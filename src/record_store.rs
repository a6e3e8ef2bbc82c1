//! The in-memory mirror of one persistent collection.
//!
//! Both stores sit on top of [`RecordStore`]: it owns the records, mints ids
//! and writes the full collection back after each mutation. If a write fails
//! the mutation is undone in memory so the mirror never drifts from the slot.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::id_source::{IdSource, RecordId};
use crate::persistent_collection::PersistentCollection;
use crate::slot_storage::SlotStorage;

pub trait Record: Serialize + DeserializeOwned + Clone {
    fn id(&self) -> RecordId;
}

/// Records carrying a single categorical tag that views can filter on.
pub trait Categorized {
    fn category(&self) -> &str;
}

/// Where newly created records land in storage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

pub struct RecordStore<R, S> {
    slots: S,
    collection: PersistentCollection<R>,
    records: Vec<R>,
    ids: IdSource,
    placement: Placement,
}

impl<R: Record, S: SlotStorage> RecordStore<R, S> {
    pub fn hydrate(slots: S, key: impl Into<String>, placement: Placement) -> Self {
        let collection = PersistentCollection::new(key);
        let records = collection.load(&slots);
        let ids = IdSource::seeded(records.iter().map(Record::id));
        Self { slots, collection, records, ids, placement }
    }

    /// Discards the in-memory mirror and reads the slot again.
    pub fn reload(&mut self) {
        self.records = self.collection.load(&self.slots);
        self.ids = IdSource::seeded(self.records.iter().map(Record::id));
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn slot_key(&self) -> &str {
        self.collection.key()
    }

    pub fn slots(&self) -> &S {
        &self.slots
    }

    pub fn next_id(&mut self) -> RecordId {
        self.ids.next_id()
    }

    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.records.iter().find(|r| r.id() == id)
    }

    fn persist(&self) -> Result<(), AppResponse> {
        self.collection.save(&self.slots, &self.records)
    }

    pub fn insert(&mut self, record: R) -> Result<R, AppResponse> {
        match self.placement {
            Placement::Front => self.records.insert(0, record.clone()),
            Placement::Back => self.records.push(record.clone()),
        }

        if let Err(e) = self.persist() {
            match self.placement {
                Placement::Front => self.records.remove(0),
                Placement::Back => self.records.remove(self.records.len() - 1),
            };
            return Err(e);
        }
        Ok(record)
    }

    /// Removes the record with `id`, returning it. `Ok(None)` when absent.
    pub fn remove(&mut self, id: RecordId) -> Result<Option<R>, AppResponse> {
        let Some(index) = self.records.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };

        let removed = self.records.remove(index);
        if let Err(e) = self.persist() {
            self.records.insert(index, removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    /// Empties the collection and deletes the slot rather than writing `[]`.
    pub fn clear(&mut self) -> Result<usize, AppResponse> {
        self.collection.erase(&self.slots)?;
        let cleared = self.records.len();
        self.records.clear();
        Ok(cleared)
    }
}

/// Keeps records whose category equals `category` exactly. `None` or an empty
/// string keeps everything, in the original order.
pub fn filter<'a, R: Categorized>(records: &'a [R], category: Option<&str>) -> Vec<&'a R> {
    match category {
        Some(wanted) if !wanted.is_empty() => records.iter().filter(|r| r.category() == wanted).collect(),
        _ => records.iter().collect(),
    }
}

/// Distinct categories in order of first appearance.
pub fn categories<R: Categorized>(records: &[R]) -> Vec<&str> {
    let mut seen: Vec<&str> = Vec::new();
    for record in records {
        if !seen.contains(&record.category()) {
            seen.push(record.category());
        }
    }
    seen
}
