//! Hall and layout gateway: the authoritative store the editor reconciles with.
//!
//! DESIGN
//! ======
//! The editor consumes halls and layouts through [`HallGateway`]; the hosted
//! backend behind it is outside this crate. Every call is a single
//! request/response with no retry. Expected failures (missing hall, bad name,
//! version conflict) come back as [`GatewayError`] values.
//!
//! Layout saves are wholesale replacements guarded by [`SaveGuard`]: the
//! caller states which server version it edited, and the gateway refuses the
//! write if the stored layout has moved on since.
//!
//! [`MemoryGateway`] is a complete in-process implementation used by tests
//! and the replay tool.

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};
use crate::model::{Hall, HallId, HallLayout, PlanObject, VenueId};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("layout changed on the server: expected version {expected:?}, found {actual:?}")]
    Conflict { expected: Option<i64>, actual: Option<i64> },
    #[error("gateway unavailable: {0}")]
    Unavailable(String),
}

impl GatewayError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Validation(_) => "E_VALIDATION",
            Self::Conflict { .. } => "E_CONFLICT",
            Self::Unavailable(_) => "E_UNAVAILABLE",
        }
    }
}

/// Body of a layout save: everything except identity and version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutPayload {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub objects: Vec<PlanObject>,
}

impl From<&HallLayout> for LayoutPayload {
    fn from(layout: &HallLayout) -> Self {
        Self {
            canvas_width: layout.canvas_width,
            canvas_height: layout.canvas_height,
            objects: layout.objects.clone(),
        }
    }
}

/// Server acknowledgement of a layout save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedLayout {
    pub updated_at: i64,
}

/// Optimistic-concurrency condition for a layout save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveGuard {
    /// Write only if the stored `updated_at` still equals this value
    /// (`None` meaning no layout is stored yet).
    IfUnchanged(Option<i64>),
    /// Write unconditionally.
    Overwrite,
}

/// Hall and layout persistence consumed by the editor.
#[async_trait]
pub trait HallGateway: Send + Sync {
    /// Halls of a venue, in any order.
    async fn list_halls(&self, venue_id: VenueId) -> Result<Vec<Hall>, GatewayError>;

    /// Create a hall and return it as stored.
    async fn create_hall(&self, venue_id: VenueId, name: &str) -> Result<Hall, GatewayError>;

    async fn rename_hall(&self, hall_id: HallId, name: &str) -> Result<(), GatewayError>;

    /// Delete a hall together with its layout.
    async fn delete_hall(&self, hall_id: HallId) -> Result<(), GatewayError>;

    /// Stored layout for a hall; `None` when the hall has never been saved.
    async fn get_layout(&self, hall_id: HallId) -> Result<Option<HallLayout>, GatewayError>;

    /// Replace the stored layout wholesale.
    async fn save_layout(
        &self,
        hall_id: HallId,
        payload: &LayoutPayload,
        guard: SaveGuard,
    ) -> Result<SavedLayout, GatewayError>;
}

// =============================================================================
// MEMORY GATEWAY
// =============================================================================

#[derive(Debug, Default)]
struct MemoryState {
    halls: Vec<Hall>,
    layouts: HashMap<HallId, HallLayout>,
    last_stamp: i64,
    failure: Option<String>,
    requests: usize,
}

/// In-process gateway holding halls and layouts in memory.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a hall directly, bypassing validation.
    pub fn seed_hall(&self, venue_id: VenueId, name: &str, sort_order: i32) -> Hall {
        let hall = Hall { id: Uuid::new_v4(), venue_id, name: name.to_string(), sort_order };
        self.lock().halls.push(hall.clone());
        hall
    }

    /// Store a layout directly, bypassing the version guard.
    pub fn seed_layout(&self, layout: HallLayout) {
        let mut state = self.lock();
        if let Some(stamp) = layout.updated_at {
            state.last_stamp = state.last_stamp.max(stamp);
        }
        state.layouts.insert(layout.hall_id, layout);
    }

    /// Current stored layout, if any.
    #[must_use]
    pub fn layout(&self, hall_id: &HallId) -> Option<HallLayout> {
        self.lock().layouts.get(hall_id).cloned()
    }

    /// Make every subsequent request fail with `Unavailable(reason)`.
    pub fn fail_with(&self, reason: &str) {
        self.lock().failure = Some(reason.to_string());
    }

    pub fn recover(&self) {
        self.lock().failure = None;
    }

    /// Number of requests received, including failed ones.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.lock().requests
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Count the request and return the guard, or the injected failure.
    fn begin(&self) -> Result<std::sync::MutexGuard<'_, MemoryState>, GatewayError> {
        let mut state = self.lock();
        state.requests += 1;
        if let Some(reason) = &state.failure {
            return Err(GatewayError::Unavailable(reason.clone()));
        }
        Ok(state)
    }
}

fn validate_name(name: &str) -> Result<String, GatewayError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::Validation("hall name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

impl MemoryState {
    fn hall_mut(&mut self, hall_id: HallId) -> Result<&mut Hall, GatewayError> {
        self.halls
            .iter_mut()
            .find(|h| h.id == hall_id)
            .ok_or_else(|| GatewayError::NotFound(format!("hall {hall_id}")))
    }

    /// Strictly increasing wall-clock stamp.
    fn next_stamp(&mut self) -> i64 {
        let stamp = SystemClock.now_ms().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        stamp
    }
}

#[async_trait]
impl HallGateway for MemoryGateway {
    async fn list_halls(&self, venue_id: VenueId) -> Result<Vec<Hall>, GatewayError> {
        let state = self.begin()?;
        Ok(state.halls.iter().filter(|h| h.venue_id == venue_id).cloned().collect())
    }

    async fn create_hall(&self, venue_id: VenueId, name: &str) -> Result<Hall, GatewayError> {
        let name = validate_name(name)?;
        let mut state = self.begin()?;
        let sort_order = state
            .halls
            .iter()
            .filter(|h| h.venue_id == venue_id)
            .map(|h| h.sort_order)
            .max()
            .map_or(0, |m| m + 1);
        let hall = Hall { id: Uuid::new_v4(), venue_id, name, sort_order };
        state.halls.push(hall.clone());
        Ok(hall)
    }

    async fn rename_hall(&self, hall_id: HallId, name: &str) -> Result<(), GatewayError> {
        let name = validate_name(name)?;
        let mut state = self.begin()?;
        state.hall_mut(hall_id)?.name = name;
        Ok(())
    }

    async fn delete_hall(&self, hall_id: HallId) -> Result<(), GatewayError> {
        let mut state = self.begin()?;
        let before = state.halls.len();
        state.halls.retain(|h| h.id != hall_id);
        if state.halls.len() == before {
            return Err(GatewayError::NotFound(format!("hall {hall_id}")));
        }
        state.layouts.remove(&hall_id);
        Ok(())
    }

    async fn get_layout(&self, hall_id: HallId) -> Result<Option<HallLayout>, GatewayError> {
        let mut state = self.begin()?;
        state.hall_mut(hall_id)?;
        Ok(state.layouts.get(&hall_id).cloned())
    }

    async fn save_layout(
        &self,
        hall_id: HallId,
        payload: &LayoutPayload,
        guard: SaveGuard,
    ) -> Result<SavedLayout, GatewayError> {
        let mut state = self.begin()?;
        state.hall_mut(hall_id)?;
        let actual = state.layouts.get(&hall_id).and_then(|l| l.updated_at);
        if let SaveGuard::IfUnchanged(expected) = guard {
            if expected != actual {
                return Err(GatewayError::Conflict { expected, actual });
            }
        }
        let updated_at = state.next_stamp();
        state.layouts.insert(
            hall_id,
            HallLayout {
                hall_id,
                canvas_width: payload.canvas_width,
                canvas_height: payload.canvas_height,
                objects: payload.objects.clone(),
                updated_at: Some(updated_at),
            },
        );
        Ok(SavedLayout { updated_at })
    }
}
