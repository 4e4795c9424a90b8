//! Key-value store adapter.
//!
//! JSON (de)serialization of whole collections on top of the raw backend.
//! A stored collection is a JSON array and each element is decoded on its
//! own. An element that does not match the record type is skipped by reads
//! and kept verbatim by writes, so one malformed record never takes its
//! neighbours down with it.
//!
//! Reads never fail: a missing key, a backend read error or a value that is
//! not an array all come back as an empty collection. Mutations load the
//! collection with [`Database::load_collection`], which refuses a value that
//! is not an array instead of replacing it.

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::database::Database;
use crate::error::{Result, StoreError};

enum Slot<T> {
    Parsed(T),
    Raw(Value),
}

/// A collection loaded for modification, in stored order.
pub(crate) struct Loaded<T> {
    slots: Vec<Slot<T>>,
}

impl<T> Loaded<T> {
    fn empty() -> Self {
        Self { slots: Vec::new() }
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Parsed(record) => Some(record),
            Slot::Raw(_) => None,
        })
    }

    pub(crate) fn records_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Parsed(record) => Some(record),
            Slot::Raw(_) => None,
        })
    }

    /// Elements kept verbatim because they did not decode.
    pub(crate) fn raw(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter().filter_map(|slot| match slot {
            Slot::Raw(value) => Some(value),
            Slot::Parsed(_) => None,
        })
    }

    pub(crate) fn push(&mut self, record: T) {
        self.slots.push(Slot::Parsed(record));
    }

    pub(crate) fn push_front(&mut self, record: T) {
        self.slots.insert(0, Slot::Parsed(record));
    }

    /// Remove the first record matching `predicate`.
    pub(crate) fn take_first<F>(&mut self, mut predicate: F) -> Option<T>
    where
        F: FnMut(&T) -> bool,
    {
        let index = self
            .slots
            .iter()
            .position(|slot| matches!(slot, Slot::Parsed(record) if predicate(record)))?;
        match self.slots.remove(index) {
            Slot::Parsed(record) => Some(record),
            Slot::Raw(_) => None,
        }
    }

    /// Remove every record matching `predicate`. Raw elements stay.
    pub(crate) fn take_where<F>(&mut self, mut predicate: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut taken = Vec::new();
        for slot in std::mem::take(&mut self.slots) {
            match slot {
                Slot::Parsed(record) if predicate(&record) => taken.push(record),
                other => self.slots.push(other),
            }
        }
        taken
    }

    /// Sort the decoded records among themselves. Raw elements keep their
    /// positions.
    pub(crate) fn sort_records_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        let positions: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, Slot::Parsed(_)))
            .map(|(i, _)| i)
            .collect();

        let mut records = Vec::with_capacity(positions.len());
        for &i in &positions {
            if let Slot::Parsed(record) = std::mem::replace(&mut self.slots[i], Slot::Raw(Value::Null)) {
                records.push(record);
            }
        }
        records.sort_by(compare);

        for (i, record) in positions.into_iter().zip(records) {
            self.slots[i] = Slot::Parsed(record);
        }
    }

    pub(crate) fn into_records(self) -> Vec<T> {
        self.slots
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Parsed(record) => Some(record),
                Slot::Raw(_) => None,
            })
            .collect()
    }
}

fn decode<T: DeserializeOwned>(key: &str, raw: &str) -> serde_json::Result<Loaded<T>> {
    let values: Vec<Value> = serde_json::from_str(raw)?;
    let slots = values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match T::deserialize(&value) {
            Ok(record) => Slot::Parsed(record),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "malformed record kept as-is");
                Slot::Raw(value)
            }
        })
        .collect();
    Ok(Loaded { slots })
}

impl Database {
    /// Read the collection stored under `key`.
    pub fn read_collection<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        let raw = match self.backend().get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!(key, error = %e, "collection read failed, treating as empty");
                return Vec::new();
            }
        };

        match decode::<T>(key, &raw) {
            Ok(loaded) => loaded.into_records(),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt collection, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replace the collection stored under `key` and fire the change signal.
    pub fn write_collection<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        self.write_collection_quiet(key, items)?;
        self.notify_changed();
        Ok(())
    }

    /// Seed `key` with `default` unless something is already stored there.
    /// Returns `true` when a value was written.
    pub fn initialize_key_if_absent<T: Serialize>(&self, key: &str, default: &[T]) -> Result<bool> {
        if self.backend().get(key)?.is_some() {
            return Ok(false);
        }
        self.write_collection_quiet(key, default)?;
        Ok(true)
    }

    pub(crate) fn write_collection_quiet<T: Serialize>(&self, key: &str, items: &[T]) -> Result<()> {
        let raw = serde_json::to_string(items)?;
        self.backend().set(key, &raw)?;
        Ok(())
    }

    /// Load `key` for modification. Unlike [`Database::read_collection`]
    /// this fails when the backend cannot be read or the stored value is not
    /// an array, so a write never replaces data it could not see.
    pub(crate) fn load_collection<T: DeserializeOwned>(&self, key: &str) -> Result<Loaded<T>> {
        match self.backend().get(key)? {
            None => Ok(Loaded::empty()),
            Some(raw) => decode(key, &raw).map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
        }
    }

    /// Write a loaded collection back, raw elements included. Does not
    /// signal.
    pub(crate) fn save_collection<T: Serialize>(&self, key: &str, loaded: &Loaded<T>) -> Result<()> {
        let mut elements = Vec::with_capacity(loaded.slots.len());
        for slot in &loaded.slots {
            elements.push(match slot {
                Slot::Parsed(record) => serde_json::to_string(record)?,
                Slot::Raw(value) => value.to_string(),
            });
        }
        let raw = format!("[{}]", elements.join(","));
        self.backend().set(key, &raw)?;
        Ok(())
    }
}
