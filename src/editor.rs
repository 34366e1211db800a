//! Editor shell: one venue's halls, the open layout, and its persistence.
//!
//! DESIGN
//! ======
//! `Editor` ties the layout model, the interaction controller and the draft
//! store together and is the only type a host UI talks to. Pointer handlers
//! and inspector edits are synchronous and mutate the model immediately;
//! every mutation pushes the autosave deadline out, and the host calls
//! [`Editor::tick`] from its timer to write the draft once edits settle.
//!
//! RECONCILIATION
//! ==============
//! The open layout comes either from the server or from a local draft
//! ([`LayoutSource`]); the two are never merged. They are reconciled only at
//! hall load (draft preferred when valid), save (draft cleared on success)
//! and reset (draft deleted, server layout reloaded).
//!
//! Gateway round-trips are split into `begin_*` / `complete_*` halves around
//! a ticket so a host that keeps handling pointer events while a request is
//! in flight can apply the response safely: a load response older than the
//! latest load is dropped, and a save response only marks the layout clean if
//! nothing was edited after the request was issued. The `async` methods chain
//! both halves for hosts that simply await.

#[cfg(test)]
#[path = "editor_test.rs"]
mod editor_test;

use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::EditorConfig;
use crate::draft::{Debouncer, Draft, Drafts};
use crate::gateway::{GatewayError, HallGateway, LayoutPayload, SaveGuard, SavedLayout};
use crate::geometry::Point;
use crate::interaction::{Interaction, InteractionController, InteractionUpdate};
use crate::model::{Hall, HallId, HallLayout, LayoutModel, ObjectId, ObjectKind, PlanObject, PlanObjectPatch, Shape, VenueId};
use crate::store::{LocalStore, StoreError};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("no hall is open")]
    NoHallSelected,
    #[error("unknown hall: {0}")]
    UnknownHall(HallId),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EditorError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NoHallSelected => "E_NO_HALL",
            Self::UnknownHall(_) => "E_UNKNOWN_HALL",
            Self::Gateway(e) => e.error_code(),
            Self::Store(e) => e.error_code(),
        }
    }
}

/// Where the open layout came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    /// Nothing stored yet; a default empty canvas.
    Empty,
    /// The server's stored layout.
    FromServer { updated_at: Option<i64> },
    /// A local draft, derived from server version `base_updated_at`.
    FromDraft { saved_at: i64, base_updated_at: Option<i64> },
}

/// User-facing messages the host should surface, drained by
/// [`Editor::take_notices`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    DraftRestored { hall_id: HallId, saved_at: i64 },
    DraftDiscarded { hall_id: HallId },
    Saved { hall_id: HallId, updated_at: i64 },
    SaveConflict { hall_id: HallId },
    SaveFailed { hall_id: HallId, message: String },
    GatewayFailed { message: String },
    /// The selected hall no longer exists on the server.
    HallMissing { hall_id: HallId },
}

/// Result of a hall switch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    Switched,
    AlreadyOpen,
    /// The open layout has unsaved edits; call again with `confirmed`.
    NeedsConfirmation,
}

/// Whether a save respects the server version the edits were based on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    Checked,
    Overwrite,
}

/// Outcome of [`Editor::begin_load`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStep {
    /// A draft was restored; nothing to fetch.
    Ready,
    /// Fetch the layout and pass the result to [`Editor::complete_load`].
    Fetch(LoadTicket),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub hall_id: HallId,
    generation: u64,
}

/// A save in flight. The host sends `payload` with `guard` for `hall_id`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub hall_id: HallId,
    pub payload: LayoutPayload,
    pub guard: SaveGuard,
    epoch: u64,
    revision: u64,
}

/// The layout that was open when a fetch began, reopened if the fetch fails.
struct Parked {
    model: LayoutModel,
    source: LayoutSource,
    selected_object: Option<ObjectId>,
}

// =============================================================================
// EDITOR
// =============================================================================

pub struct Editor<S> {
    config: EditorConfig,
    venue_id: VenueId,
    clock: Box<dyn Clock>,
    drafts: Drafts<S>,
    halls: Vec<Hall>,
    selected_hall: Option<HallId>,
    model: Option<LayoutModel>,
    /// Bumped whenever a freshly loaded model replaces the open one.
    epoch: u64,
    parked: Option<Parked>,
    source: LayoutSource,
    selected_object: Option<ObjectId>,
    interaction: InteractionController,
    autosave: Debouncer,
    generation: u64,
    notices: Vec<Notice>,
}

impl<S: LocalStore> Editor<S> {
    #[must_use]
    pub fn new(venue_id: VenueId, store: S, config: EditorConfig) -> Self {
        let drafts = Drafts::new(store, config.draft_key_prefix.clone());
        let autosave = Debouncer::new(config.autosave_delay_ms);
        Self {
            config,
            venue_id,
            clock: Box::new(SystemClock),
            drafts,
            halls: Vec::new(),
            selected_hall: None,
            model: None,
            epoch: 0,
            parked: None,
            source: LayoutSource::Empty,
            selected_object: None,
            interaction: InteractionController::new(),
            autosave,
            generation: 0,
            notices: Vec::new(),
        }
    }

    /// Replace the wall clock (tests, replay).
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    // --- Queries ---

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn venue_id(&self) -> VenueId {
        self.venue_id
    }

    /// Cached halls, ordered by `(sort_order, name)`.
    #[must_use]
    pub fn halls(&self) -> &[Hall] {
        &self.halls
    }

    #[must_use]
    pub fn selected_hall(&self) -> Option<HallId> {
        self.selected_hall
    }

    #[must_use]
    pub fn model(&self) -> Option<&LayoutModel> {
        self.model.as_ref()
    }

    #[must_use]
    pub fn layout(&self) -> Option<&HallLayout> {
        self.model.as_ref().map(LayoutModel::layout)
    }

    #[must_use]
    pub fn source(&self) -> LayoutSource {
        self.source
    }

    /// A hall is selected but its layout has not arrived yet.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.selected_hall.is_some() && self.model.is_none()
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.model.as_ref().is_some_and(LayoutModel::is_dirty)
    }

    #[must_use]
    pub fn selection(&self) -> Option<ObjectId> {
        self.selected_object
    }

    /// The selected object, for the inspector.
    #[must_use]
    pub fn selected(&self) -> Option<&PlanObject> {
        let id = self.selected_object?;
        self.model.as_ref()?.object(&id)
    }

    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        self.interaction.active()
    }

    /// Whether the rotation alignment guide should be highlighted.
    #[must_use]
    pub fn snap_active(&self) -> bool {
        self.interaction.snap_active()
    }

    /// When the pending autosave is due, in epoch milliseconds.
    #[must_use]
    pub fn autosave_deadline(&self) -> Option<i64> {
        self.autosave.deadline()
    }

    #[must_use]
    pub fn drafts(&self) -> &Drafts<S> {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut Drafts<S> {
        &mut self.drafts
    }

    /// Drain queued user notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // --- Palette / inspector ---

    /// Drop a new object on the canvas and select it.
    ///
    /// # Errors
    ///
    /// Returns `NoHallSelected` if no layout is open.
    pub fn add_object(&mut self, kind: ObjectKind, shape: Shape) -> Result<ObjectId, EditorError> {
        let model = self.model.as_mut().ok_or(EditorError::NoHallSelected)?;
        let id = model.add_object(kind, shape);
        self.selected_object = Some(id);
        self.after_mutation();
        Ok(id)
    }

    /// Apply an inspector edit. Returns false if the object is unknown.
    pub fn update_object(&mut self, id: &ObjectId, patch: &PlanObjectPatch) -> bool {
        let Some(model) = self.model.as_mut() else {
            return false;
        };
        if !model.update_object(id, patch) {
            return false;
        }
        self.after_mutation();
        true
    }

    /// Delete an object, clearing the selection and any gesture that targets it.
    pub fn delete_object(&mut self, id: &ObjectId) -> bool {
        let Some(model) = self.model.as_mut() else {
            return false;
        };
        if model.remove_object(id).is_none() {
            return false;
        }
        if self.selected_object == Some(*id) {
            self.selected_object = None;
        }
        if self.interaction.active().target() == Some(*id) {
            self.interaction.end();
        }
        self.after_mutation();
        true
    }

    /// Select an object by id, or clear the selection. Unknown ids clear it.
    pub fn select_object(&mut self, id: Option<ObjectId>) {
        self.selected_object = id.filter(|id| self.model.as_ref().is_some_and(|m| m.object(id).is_some()));
    }

    // --- Pointer input ---

    /// Pointer-down on an object's body: select it and start dragging.
    pub fn pointer_down_body(&mut self, id: ObjectId, pointer: Point) -> bool {
        let Some(model) = self.model.as_ref() else {
            return false;
        };
        let started = self.interaction.start_drag(model, id, pointer);
        if started {
            self.selected_object = Some(id);
        }
        started
    }

    /// Pointer-down on an object's resize handle.
    pub fn pointer_down_resize(&mut self, id: ObjectId, pointer: Point) -> bool {
        let Some(model) = self.model.as_ref() else {
            return false;
        };
        let started = self.interaction.start_resize(model, id, pointer);
        if started {
            self.selected_object = Some(id);
        }
        started
    }

    /// Pointer-down on an object's rotate handle. `canvas_origin` is the
    /// screen position of the canvas's top-left corner.
    pub fn pointer_down_rotate(&mut self, id: ObjectId, pointer: Point, canvas_origin: Point) -> bool {
        let Some(model) = self.model.as_ref() else {
            return false;
        };
        let started = self.interaction.start_rotate(model, id, pointer, canvas_origin);
        if started {
            self.selected_object = Some(id);
        }
        started
    }

    /// Window-level pointer-move.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<InteractionUpdate> {
        let model = self.model.as_mut()?;
        let update = self.interaction.pointer_move(model, pointer)?;
        self.after_mutation();
        Some(update)
    }

    /// Window-level pointer-up.
    pub fn pointer_up(&mut self) -> bool {
        self.interaction.end()
    }

    // --- Autosave ---

    /// Write the draft if the autosave deadline has passed. Returns whether a
    /// draft was written.
    ///
    /// # Errors
    ///
    /// Returns a store error if the draft cannot be written.
    pub fn tick(&mut self) -> Result<bool, EditorError> {
        let now = self.clock.now_ms();
        if !self.autosave.fire_if_due(now) {
            return Ok(false);
        }
        self.write_draft(now).map_err(Into::into)
    }

    /// Write the draft now, cancelling any pending autosave.
    ///
    /// # Errors
    ///
    /// Returns a store error if the draft cannot be written.
    pub fn flush_draft(&mut self) -> Result<bool, EditorError> {
        self.autosave.cancel();
        let now = self.clock.now_ms();
        self.write_draft(now).map_err(Into::into)
    }

    fn write_draft(&mut self, now: i64) -> Result<bool, StoreError> {
        let Some(model) = self.model.as_ref().filter(|m| m.is_dirty()) else {
            return Ok(false);
        };
        self.drafts.write(&Draft::from_layout(model.layout(), now))?;
        Ok(true)
    }

    fn after_mutation(&mut self) {
        self.autosave.touch(self.clock.now_ms());
    }

    // --- Layout loading ---

    /// First half of a hall load. Sets the open layout aside (writing its
    /// draft first if dirty), then either restores a valid draft for `hall_id`
    /// when `prefer_draft` is set or asks the caller to fetch from the gateway.
    ///
    /// # Errors
    ///
    /// Returns a store error if the outgoing draft cannot be written or the
    /// incoming one cannot be read.
    pub fn begin_load(&mut self, hall_id: HallId, prefer_draft: bool) -> Result<LoadStep, EditorError> {
        self.flush_draft()?;
        if let Some(model) = self.model.take() {
            self.parked = Some(Parked { model, source: self.source, selected_object: self.selected_object });
        }
        self.close_layout();
        self.generation += 1;
        self.selected_hall = Some(hall_id);

        if prefer_draft {
            if let Some(draft) = self.drafts.read(&hall_id)? {
                let saved_at = draft.saved_at;
                let base_updated_at = draft.base_updated_at;
                let mut model = LayoutModel::new(draft.into_layout());
                model.mark_dirty();
                info!(%hall_id, saved_at, objects = model.objects().len(), "restored local draft");
                self.install(model, LayoutSource::FromDraft { saved_at, base_updated_at });
                self.notices.push(Notice::DraftRestored { hall_id, saved_at });
                return Ok(LoadStep::Ready);
            }
        }
        Ok(LoadStep::Fetch(LoadTicket { hall_id, generation: self.generation }))
    }

    /// Second half of a hall load. Returns false if the response was stale
    /// and ignored.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the fetch failed. The previously open
    /// layout is reopened; with none, the hall stays selected with no layout
    /// so the host can retry.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Option<HallLayout>, GatewayError>,
    ) -> Result<bool, EditorError> {
        if ticket.generation != self.generation {
            warn!(hall_id = %ticket.hall_id, "dropping stale layout response");
            return Ok(false);
        }
        let stored = match result {
            Ok(stored) => stored,
            Err(e) => {
                warn!(hall_id = %ticket.hall_id, error = %e, "layout fetch failed");
                self.notices.push(Notice::GatewayFailed { message: e.to_string() });
                self.unpark();
                return Err(e.into());
            }
        };

        let (layout, source) = match stored {
            Some(mut layout) => {
                layout.hall_id = ticket.hall_id;
                let source = LayoutSource::FromServer { updated_at: layout.updated_at };
                (layout, source)
            }
            None => (
                HallLayout::empty(ticket.hall_id, self.config.default_canvas_width, self.config.default_canvas_height),
                LayoutSource::Empty,
            ),
        };
        info!(hall_id = %ticket.hall_id, objects = layout.objects.len(), ?source, "layout loaded");
        self.install(LayoutModel::new(layout), source);
        Ok(true)
    }

    fn install(&mut self, model: LayoutModel, source: LayoutSource) {
        self.epoch += 1;
        self.parked = None;
        self.model = Some(model);
        self.source = source;
    }

    /// Reopen the layout that was open before a failed fetch, if any.
    fn unpark(&mut self) {
        let Some(parked) = self.parked.take() else {
            return;
        };
        debug!(hall_id = %parked.model.hall_id(), "reopening previous layout");
        self.selected_hall = Some(parked.model.hall_id());
        self.model = Some(parked.model);
        self.source = parked.source;
        self.selected_object = parked.selected_object;
    }

    /// Open `hall_id`, preferring its local draft when `prefer_draft` is set,
    /// else the server layout, else an empty default canvas.
    ///
    /// # Errors
    ///
    /// Returns store or gateway errors from either half of the load.
    pub async fn resolve_hall_layout<G: HallGateway + ?Sized>(
        &mut self,
        gateway: &G,
        hall_id: HallId,
        prefer_draft: bool,
    ) -> Result<(), EditorError> {
        match self.begin_load(hall_id, prefer_draft)? {
            LoadStep::Ready => Ok(()),
            LoadStep::Fetch(ticket) => {
                let result = gateway.get_layout(hall_id).await;
                self.complete_load(ticket, result)?;
                Ok(())
            }
        }
    }

    /// Open `hall_id`, restoring its draft if one is stored.
    ///
    /// # Errors
    ///
    /// Returns store or gateway errors from the load.
    pub async fn open_hall<G: HallGateway + ?Sized>(&mut self, gateway: &G, hall_id: HallId) -> Result<(), EditorError> {
        self.resolve_hall_layout(gateway, hall_id, true).await
    }

    /// Switch to another hall. A dirty layout needs `confirmed`; its draft is
    /// kept locally, not sent to the server.
    ///
    /// # Errors
    ///
    /// Returns `UnknownHall` for halls not in the cached list, plus any load
    /// error.
    pub async fn switch_hall<G: HallGateway + ?Sized>(
        &mut self,
        gateway: &G,
        hall_id: HallId,
        confirmed: bool,
    ) -> Result<SwitchOutcome, EditorError> {
        if !self.halls.iter().any(|h| h.id == hall_id) {
            return Err(EditorError::UnknownHall(hall_id));
        }
        if self.selected_hall == Some(hall_id) && self.model.is_some() {
            return Ok(SwitchOutcome::AlreadyOpen);
        }
        if self.is_dirty() && !confirmed {
            return Ok(SwitchOutcome::NeedsConfirmation);
        }
        self.open_hall(gateway, hall_id).await?;
        Ok(SwitchOutcome::Switched)
    }

    fn close_layout(&mut self) {
        self.interaction.end();
        self.autosave.cancel();
        self.model = None;
        self.source = LayoutSource::Empty;
        self.selected_object = None;
    }

    fn clear_selection_state(&mut self) {
        self.close_layout();
        self.parked = None;
        self.selected_hall = None;
        self.generation += 1;
    }

    // --- Save / reset ---

    /// First half of a save: snapshot the open layout.
    ///
    /// # Errors
    ///
    /// Returns `NoHallSelected` if no layout is open.
    pub fn begin_save(&mut self, mode: SaveMode) -> Result<SaveTicket, EditorError> {
        let model = self.model.as_ref().ok_or(EditorError::NoHallSelected)?;
        let guard = match mode {
            SaveMode::Checked => SaveGuard::IfUnchanged(model.layout().updated_at),
            SaveMode::Overwrite => SaveGuard::Overwrite,
        };
        Ok(SaveTicket {
            hall_id: model.hall_id(),
            payload: LayoutPayload::from(model.layout()),
            guard,
            epoch: self.epoch,
            revision: model.revision(),
        })
    }

    /// Second half of a save. On success the draft is cleared unless the
    /// layout was edited after the request was issued, in which case it is
    /// kept and based on the new server version. On failure nothing local
    /// changes.
    ///
    /// # Errors
    ///
    /// Returns the gateway error on failure, or a store error if the draft
    /// cannot be cleared.
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<SavedLayout, GatewayError>,
    ) -> Result<i64, EditorError> {
        let hall_id = ticket.hall_id;
        let saved = match result {
            Ok(saved) => saved,
            Err(e) => {
                warn!(%hall_id, error = %e, "layout save failed");
                let notice = match e {
                    GatewayError::Conflict { .. } => Notice::SaveConflict { hall_id },
                    _ => Notice::SaveFailed { hall_id, message: e.to_string() },
                };
                self.notices.push(notice);
                return Err(e.into());
            }
        };
        info!(%hall_id, updated_at = saved.updated_at, objects = ticket.payload.objects.len(), "layout saved");
        self.notices.push(Notice::Saved { hall_id, updated_at: saved.updated_at });

        if ticket.epoch == self.epoch {
            if let Some(model) = self.model.as_mut().filter(|m| m.hall_id() == hall_id) {
                let settled = settle_saved(model, &ticket, saved.updated_at);
                self.source = LayoutSource::FromServer { updated_at: Some(saved.updated_at) };
                self.autosave.cancel();
                if settled {
                    self.drafts.clear(&hall_id)?;
                } else {
                    debug!(%hall_id, "layout edited during save; rewriting draft on the new version");
                    let now = self.clock.now_ms();
                    self.write_draft(now)?;
                }
                return Ok(saved.updated_at);
            }
            if let Some(parked) = self.parked.as_mut().filter(|p| p.model.hall_id() == hall_id) {
                settle_saved(&mut parked.model, &ticket, saved.updated_at);
                parked.source = LayoutSource::FromServer { updated_at: Some(saved.updated_at) };
            }
        }
        self.settle_stored_draft(&ticket, saved.updated_at)?;
        Ok(saved.updated_at)
    }

    /// Reconcile the stored draft of a hall that is no longer open with a
    /// save of it: drop it if it is what was saved, otherwise move it onto
    /// the new server version when it was based on the version just replaced.
    fn settle_stored_draft(&mut self, ticket: &SaveTicket, updated_at: i64) -> Result<(), StoreError> {
        let Some(mut draft) = self.drafts.read(&ticket.hall_id)? else {
            return Ok(());
        };
        if draft.objects == ticket.payload.objects
            && draft.canvas_width == ticket.payload.canvas_width
            && draft.canvas_height == ticket.payload.canvas_height
        {
            return self.drafts.clear(&ticket.hall_id);
        }
        let same_base = match ticket.guard {
            SaveGuard::IfUnchanged(base) => draft.base_updated_at == base,
            SaveGuard::Overwrite => true,
        };
        if same_base {
            debug!(hall_id = %ticket.hall_id, updated_at, "rebasing draft onto saved version");
            draft.base_updated_at = Some(updated_at);
            self.drafts.write(&draft)?;
        }
        Ok(())
    }

    /// Save the open layout, refusing if the server copy changed since it
    /// was loaded.
    ///
    /// # Errors
    ///
    /// Returns `NoHallSelected`, a gateway error (including `Conflict`), or a
    /// store error.
    pub async fn save<G: HallGateway + ?Sized>(&mut self, gateway: &G) -> Result<i64, EditorError> {
        self.save_with(gateway, SaveMode::Checked).await
    }

    /// Save the open layout over whatever the server holds.
    ///
    /// # Errors
    ///
    /// Returns `NoHallSelected`, a gateway error, or a store error.
    pub async fn force_save<G: HallGateway + ?Sized>(&mut self, gateway: &G) -> Result<i64, EditorError> {
        self.save_with(gateway, SaveMode::Overwrite).await
    }

    async fn save_with<G: HallGateway + ?Sized>(&mut self, gateway: &G, mode: SaveMode) -> Result<i64, EditorError> {
        let ticket = self.begin_save(mode)?;
        let result = gateway.save_layout(ticket.hall_id, &ticket.payload, ticket.guard).await;
        self.complete_save(ticket, result)
    }

    /// Throw away local edits: delete the draft and reload the server layout.
    /// The server layout is fetched first; if that fails nothing is discarded.
    ///
    /// # Errors
    ///
    /// Returns `NoHallSelected`, a store error, or a gateway error from the
    /// fetch.
    pub async fn reset<G: HallGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), EditorError> {
        let hall_id = self.selected_hall.ok_or(EditorError::NoHallSelected)?;
        let stored = match gateway.get_layout(hall_id).await {
            Ok(stored) => stored,
            Err(e) => {
                warn!(%hall_id, error = %e, "reset fetch failed; keeping local edits");
                self.notices.push(Notice::GatewayFailed { message: e.to_string() });
                return Err(e.into());
            }
        };
        self.drafts.clear(&hall_id)?;
        if let Some(model) = self.model.as_mut() {
            model.mark_clean();
        }
        info!(%hall_id, "local draft discarded");
        self.notices.push(Notice::DraftDiscarded { hall_id });
        if let LoadStep::Fetch(ticket) = self.begin_load(hall_id, false)? {
            self.complete_load(ticket, Ok(stored))?;
        }
        Ok(())
    }

    // --- Halls ---

    /// Refresh the cached hall list. If the selected hall has disappeared,
    /// fall back to the first remaining hall or the empty state; if nothing
    /// is selected yet, open the first hall.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if listing fails (the cache is untouched),
    /// or any error from opening the fallback hall.
    pub async fn load_halls<G: HallGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), EditorError> {
        let mut halls = match gateway.list_halls(self.venue_id).await {
            Ok(halls) => halls,
            Err(e) => {
                self.notices.push(Notice::GatewayFailed { message: e.to_string() });
                return Err(e.into());
            }
        };
        sort_halls(&mut halls);
        info!(venue_id = %self.venue_id, count = halls.len(), "halls loaded");
        self.halls = halls;

        match self.selected_hall {
            Some(id) if self.halls.iter().any(|h| h.id == id) => Ok(()),
            Some(id) => {
                warn!(hall_id = %id, "selected hall no longer exists");
                self.notices.push(Notice::HallMissing { hall_id: id });
                self.clear_selection_state();
                self.drafts.clear(&id)?;
                self.fall_back_to_first_hall(gateway).await
            }
            None => self.fall_back_to_first_hall(gateway).await,
        }
    }

    /// Create a hall and add it to the cache. Does not open it.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank name (no request is sent) or the
    /// gateway error.
    pub async fn create_hall<G: HallGateway + ?Sized>(&mut self, gateway: &G, name: &str) -> Result<Hall, EditorError> {
        let name = validate_hall_name(name)?;
        let hall = match gateway.create_hall(self.venue_id, &name).await {
            Ok(hall) => hall,
            Err(e) => {
                self.notices.push(Notice::GatewayFailed { message: e.to_string() });
                return Err(e.into());
            }
        };
        info!(hall_id = %hall.id, name = %hall.name, "hall created");
        self.halls.push(hall.clone());
        sort_halls(&mut self.halls);
        Ok(hall)
    }

    /// Rename a cached hall.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for a blank name, `UnknownHall` for halls not in
    /// the cache (no request is sent in either case), or the gateway error.
    pub async fn rename_hall<G: HallGateway + ?Sized>(
        &mut self,
        gateway: &G,
        hall_id: HallId,
        name: &str,
    ) -> Result<(), EditorError> {
        let name = validate_hall_name(name)?;
        if !self.halls.iter().any(|h| h.id == hall_id) {
            return Err(EditorError::UnknownHall(hall_id));
        }
        if let Err(e) = gateway.rename_hall(hall_id, &name).await {
            self.notices.push(Notice::GatewayFailed { message: e.to_string() });
            return Err(e.into());
        }
        info!(%hall_id, %name, "hall renamed");
        if let Some(hall) = self.halls.iter_mut().find(|h| h.id == hall_id) {
            hall.name = name;
        }
        sort_halls(&mut self.halls);
        Ok(())
    }

    /// Delete a hall and its local draft. If it was open, fall back to the
    /// first remaining hall or the empty state.
    ///
    /// # Errors
    ///
    /// Returns the gateway error (nothing local changes), a store error, or
    /// any error from opening the fallback hall.
    pub async fn delete_hall<G: HallGateway + ?Sized>(&mut self, gateway: &G, hall_id: HallId) -> Result<(), EditorError> {
        if let Err(e) = gateway.delete_hall(hall_id).await {
            self.notices.push(Notice::GatewayFailed { message: e.to_string() });
            return Err(e.into());
        }
        info!(%hall_id, "hall deleted");
        self.halls.retain(|h| h.id != hall_id);
        self.drafts.clear(&hall_id)?;
        if self.selected_hall == Some(hall_id) {
            self.clear_selection_state();
            self.fall_back_to_first_hall(gateway).await?;
        }
        Ok(())
    }

    async fn fall_back_to_first_hall<G: HallGateway + ?Sized>(&mut self, gateway: &G) -> Result<(), EditorError> {
        match self.halls.first().map(|h| h.id) {
            Some(first) => self.open_hall(gateway, first).await,
            None => {
                self.clear_selection_state();
                Ok(())
            }
        }
    }
}

fn validate_hall_name(name: &str) -> Result<String, EditorError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(EditorError::Validation("hall name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

fn sort_halls(halls: &mut [Hall]) {
    halls.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.name.cmp(&b.name)));
}

/// Apply a save acknowledgement to the model it was taken from. Returns
/// whether the model is now clean.
fn settle_saved(model: &mut LayoutModel, ticket: &SaveTicket, updated_at: i64) -> bool {
    model.set_updated_at(Some(updated_at));
    if model.revision() != ticket.revision {
        return false;
    }
    model.mark_clean();
    true
}
