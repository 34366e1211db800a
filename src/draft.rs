//! Local drafts: unsynced layout snapshots keyed by hall.
//!
//! DESIGN
//! ======
//! A draft exists only while the in-memory layout differs from the server.
//! It is written by the autosave debouncer, read back when a hall is opened,
//! and deleted once a save succeeds or the user discards it.
//!
//! ERROR HANDLING
//! ==============
//! Anything in the store that does not look like a draft for the requested
//! hall (bad JSON, wrong hall, missing canvas size, objects not a list) is
//! treated as absent and deleted, so a corrupt entry cannot resurface on
//! every load. Store I/O failures are returned to the caller.

#[cfg(test)]
#[path = "draft_test.rs"]
mod draft_test;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::model::{HallId, HallLayout, PlanObject};
use crate::store::{LocalStore, StoreError};

/// An unsynced snapshot of one hall's layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub hall_id: HallId,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub objects: Vec<PlanObject>,
    /// When the draft was written, in epoch milliseconds.
    pub saved_at: i64,
    /// Server `updated_at` the draft was derived from, if the hall had one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_updated_at: Option<i64>,
}

impl Draft {
    /// Snapshot a layout at `saved_at`. The layout's `updated_at` becomes the
    /// draft's base version.
    #[must_use]
    pub fn from_layout(layout: &HallLayout, saved_at: i64) -> Self {
        Self {
            hall_id: layout.hall_id,
            canvas_width: layout.canvas_width,
            canvas_height: layout.canvas_height,
            objects: layout.objects.clone(),
            saved_at,
            base_updated_at: layout.updated_at,
        }
    }

    /// The layout this draft describes, carrying its base version.
    #[must_use]
    pub fn into_layout(self) -> HallLayout {
        HallLayout {
            hall_id: self.hall_id,
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            objects: self.objects,
            updated_at: self.base_updated_at,
        }
    }
}

/// Draft persistence on top of a [`LocalStore`].
#[derive(Debug, Clone)]
pub struct Drafts<S> {
    store: S,
    prefix: String,
}

impl<S: LocalStore> Drafts<S> {
    #[must_use]
    pub fn new(store: S, prefix: impl Into<String>) -> Self {
        Self { store, prefix: prefix.into() }
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Store key for a hall's draft.
    #[must_use]
    pub fn key(&self, hall_id: &HallId) -> String {
        format!("{}{hall_id}", self.prefix)
    }

    /// Read and validate the draft for `hall_id`. Invalid entries are removed
    /// and reported as absent.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read or the corrupt
    /// entry cannot be removed.
    pub fn read(&mut self, hall_id: &HallId) -> Result<Option<Draft>, StoreError> {
        let key = self.key(hall_id);
        let Some(raw) = self.store.get(&key)? else {
            return Ok(None);
        };
        match parse_draft(&raw, hall_id) {
            Ok(draft) => Ok(Some(draft)),
            Err(reason) => {
                warn!(%hall_id, reason, "discarding corrupt draft");
                self.store.remove(&key)?;
                Ok(None)
            }
        }
    }

    /// Write (or overwrite) the draft for its hall.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if encoding or the store write fails.
    pub fn write(&mut self, draft: &Draft) -> Result<(), StoreError> {
        let raw = serde_json::to_string(draft)?;
        self.store.set(&self.key(&draft.hall_id), &raw)?;
        debug!(hall_id = %draft.hall_id, objects = draft.objects.len(), saved_at = draft.saved_at, "draft written");
        Ok(())
    }

    /// Delete the draft for `hall_id`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store write fails.
    pub fn clear(&mut self, hall_id: &HallId) -> Result<(), StoreError> {
        self.store.remove(&self.key(hall_id))
    }

    /// Whether a raw entry exists for `hall_id`, without validating it.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be read.
    pub fn exists(&self, hall_id: &HallId) -> Result<bool, StoreError> {
        Ok(self.store.get(&self.key(hall_id))?.is_some())
    }

    /// Hall ids that have an entry under this prefix.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the store cannot be listed.
    pub fn hall_ids(&self) -> Result<Vec<HallId>, StoreError> {
        let mut ids = Vec::new();
        for key in self.store.keys()? {
            let Some(rest) = key.strip_prefix(&self.prefix) else {
                continue;
            };
            if let Ok(id) = Uuid::parse_str(rest) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// Structural check, then typed decode.
fn parse_draft(raw: &str, hall_id: &HallId) -> Result<Draft, &'static str> {
    let value: Value = serde_json::from_str(raw).map_err(|_| "malformed json")?;
    let Some(fields) = value.as_object() else {
        return Err("not an object");
    };
    let hall_matches = fields
        .get("hall_id")
        .and_then(Value::as_str)
        .is_some_and(|s| Uuid::parse_str(s).is_ok_and(|id| id == *hall_id));
    if !hall_matches {
        return Err("hall id mismatch");
    }
    if !fields.get("canvas_width").is_some_and(Value::is_number)
        || !fields.get("canvas_height").is_some_and(Value::is_number)
    {
        return Err("canvas size not numeric");
    }
    if !fields.get("objects").is_some_and(Value::is_array) {
        return Err("objects not a list");
    }
    serde_json::from_value(value).map_err(|_| "schema mismatch")
}

/// Trailing-edge debounce for autosave.
///
/// Each [`touch`](Self::touch) pushes the deadline out to `now + delay`; the
/// deadline is replaced, never stacked, so a burst of mutations yields one
/// write after the burst settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: i64,
    deadline: Option<i64>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay_ms: i64) -> Self {
        Self { delay_ms, deadline: None }
    }

    /// Record a mutation at `now`.
    pub fn touch(&mut self, now: i64) {
        self.deadline = Some(now.saturating_add(self.delay_ms));
    }

    #[must_use]
    pub fn deadline(&self) -> Option<i64> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Consume the pending deadline if it has passed.
    pub fn fire_if_due(&mut self, now: i64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
