//! The durable string-keyed slot every store persists into.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::app_response::AppResponse;

/// A key-value backend holding one serialized collection per key.
///
/// `write_slot` must replace the whole value at once; readers never observe a
/// partially written collection.
pub trait SlotStorage {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse>;
    fn write_slot(&self, key: &str, value: &str) -> Result<(), AppResponse>;
    /// Removing an absent slot is not an error.
    fn remove_slot(&self, key: &str) -> Result<(), AppResponse>;
}

impl<T: SlotStorage + ?Sized> SlotStorage for Rc<T> {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).write_slot(key, value)
    }

    fn remove_slot(&self, key: &str) -> Result<(), AppResponse> {
        (**self).remove_slot(key)
    }
}

impl<T: SlotStorage + ?Sized> SlotStorage for &T {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse> {
        (**self).read_slot(key)
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        (**self).write_slot(key, value)
    }

    fn remove_slot(&self, key: &str) -> Result<(), AppResponse> {
        (**self).remove_slot(key)
    }
}

/// In-process slots, for embedding without a filesystem and for tests.
#[derive(Debug, Default)]
pub struct MemorySlots {
    slots: RefCell<HashMap<String, String>>,
}

impl MemorySlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.borrow().contains_key(key)
    }
}

impl SlotStorage for MemorySlots {
    fn read_slot(&self, key: &str) -> Result<Option<String>, AppResponse> {
        Ok(self.slots.borrow().get(key).cloned())
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.slots.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_slot(&self, key: &str) -> Result<(), AppResponse> {
        self.slots.borrow_mut().remove(key);
        Ok(())
    }
}
