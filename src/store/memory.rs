use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{KeyValueStore, StoreError};

#[derive(Debug, Default)]
struct Slots {
    values: BTreeMap<String, String>,
    writes: usize,
}

/// In-process key-value store.
///
/// Clones share the same slots, so a test can keep a handle while the
/// pipeline owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: Rc<RefCell<Slots>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls made through any handle.
    pub fn write_count(&self) -> usize {
        self.slots.borrow().writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.slots.borrow().values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut slots = self.slots.borrow_mut();
        slots.values.insert(key.to_string(), value.to_string());
        slots.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.slots.borrow_mut().values.remove(key);
        Ok(())
    }
}
