use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::catalog::PropValue;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize)]
pub struct PropMeta {
    pub dirty: bool,
    pub touched: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PropsSnapshot {
    pub values: BTreeMap<String, PropValue>,
    pub is_dirty: bool,
    pub meta: BTreeMap<String, PropMeta>,
}

/// Live prop values of the selected component, tracked against the values it was seeded with.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractiveProps {
    initial: BTreeMap<String, PropValue>,
    values: BTreeMap<String, PropValue>,
    dirty: BTreeSet<String>,
    meta: BTreeMap<String, PropMeta>,
}

impl InteractiveProps {
    pub fn seeded(initial: BTreeMap<String, PropValue>) -> Self {
        Self {
            values: initial.clone(),
            initial,
            dirty: BTreeSet::new(),
            meta: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.values.get(name)
    }

    pub fn values(&self) -> &BTreeMap<String, PropValue> {
        &self.values
    }

    pub fn initial(&self) -> &BTreeMap<String, PropValue> {
        &self.initial
    }

    pub fn meta(&self, name: &str) -> Option<PropMeta> {
        self.meta.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Writes one key and leaves every other key untouched.
    pub fn set(&mut self, name: &str, value: PropValue) {
        let dirty = self.initial.get(name) != Some(&value);
        self.values.insert(name.to_string(), value);
        if dirty {
            self.dirty.insert(name.to_string());
        } else {
            self.dirty.remove(name);
        }
        let meta = self.meta.entry(name.to_string()).or_default();
        meta.dirty = dirty;
        meta.touched = true;
    }

    /// Restores the seeded value, or unsets the key if it had none.
    pub fn reset(&mut self, name: &str) {
        match self.initial.get(name) {
            Some(value) => {
                self.values.insert(name.to_string(), value.clone());
            }
            None => {
                self.values.remove(name);
            }
        }
        self.dirty.remove(name);
        self.meta.remove(name);
    }

    pub fn reset_all(&mut self) {
        self.values = self.initial.clone();
        self.dirty.clear();
        self.meta.clear();
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn dirty_names(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    /// Current values with `name` replaced by `value`.
    pub fn with_override(&self, name: &str, value: PropValue) -> BTreeMap<String, PropValue> {
        let mut values = self.values.clone();
        values.insert(name.to_string(), value);
        values
    }

    pub fn snapshot(&self) -> PropsSnapshot {
        PropsSnapshot {
            values: self.values.clone(),
            is_dirty: self.is_dirty(),
            meta: self.meta.clone(),
        }
    }
}
