//! A whole collection serialized as one JSON array under one slot key.

use std::marker::PhantomData;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::slot_storage::SlotStorage;

#[derive(Debug, Clone)]
pub struct PersistentCollection<R> {
    key: String,
    _records: PhantomData<fn() -> R>,
}

impl<R: Serialize + DeserializeOwned> PersistentCollection<R> {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), _records: PhantomData }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the slot. A missing, unreadable or unparsable slot yields an empty
    /// collection; the caller is never told apart from a `warn!` in the log.
    pub fn load<S: SlotStorage + ?Sized>(&self, slots: &S) -> Vec<R> {
        let raw = match slots.read_slot(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("Slot '{}' is empty", self.key);
                return Vec::new();
            }
            Err(e) => {
                warn!("Could not read slot '{}', starting empty: {}", self.key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<R>>(&raw) {
            Ok(records) => {
                debug!("Loaded {} records from slot '{}'", records.len(), self.key);
                records
            }
            Err(e) => {
                warn!("Slot '{}' holds malformed data, starting empty: {}", self.key, e);
                Vec::new()
            }
        }
    }

    /// Overwrites the slot with the full collection.
    pub fn save<S: SlotStorage + ?Sized>(&self, slots: &S, records: &[R]) -> Result<(), AppResponse> {
        let json = serde_json::to_string(records)?;
        slots.write_slot(&self.key, &json)
    }

    /// Removes the slot entirely.
    pub fn erase<S: SlotStorage + ?Sized>(&self, slots: &S) -> Result<(), AppResponse> {
        slots.remove_slot(&self.key)
    }
}
