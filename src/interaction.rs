//! Interaction model: the single-slot drag/resize/rotate state machine.
//!
//! `Interaction` is the active gesture being tracked between pointer-down and
//! pointer-up, carrying the anchor captured at pointer-down so every
//! pointer-move can be computed from absolute deltas rather than accumulated
//! increments. Exactly one `Interaction` exists for the whole canvas, held by
//! `InteractionController`; starting a gesture overwrites the slot.
//!
//! Pointer-move and pointer-up are expected from a window-level listener, not
//! from the object element, so nothing here hit-tests the move events: a fast
//! drag that outruns the object keeps tracking until pointer-up.

#[cfg(test)]
#[path = "interaction_test.rs"]
mod interaction_test;

use tracing::debug;

use crate::geometry::{Point, angle_between, round_px, snap_to_right_angles};
use crate::model::{LayoutModel, ObjectId, PlanObjectPatch};

/// The active gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Interaction {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// Moving an object by its body.
    Dragging {
        id: ObjectId,
        /// Pointer position at pointer-down.
        start_pointer: Point,
        /// Object position at pointer-down.
        origin_x: i32,
        origin_y: i32,
    },
    /// Resizing an object from its resize handle.
    Resizing {
        id: ObjectId,
        start_pointer: Point,
        origin_width: i32,
        origin_height: i32,
        min_width: i32,
        min_height: i32,
    },
    /// Rotating an object from its rotate handle.
    Rotating {
        id: ObjectId,
        /// Screen-space pivot, fixed for the whole gesture.
        center: Point,
        /// Pointer angle at pointer-down minus the object's rotation then.
        pointer_angle_offset: f64,
    },
}

impl Interaction {
    /// The object targeted by the active gesture.
    #[must_use]
    pub fn target(&self) -> Option<ObjectId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } | Self::Resizing { id, .. } | Self::Rotating { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

/// The mutation produced by one pointer-move.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionUpdate {
    pub id: ObjectId,
    /// Fields written to the object.
    pub patch: PlanObjectPatch,
    /// Whether a rotation landed on a right angle (always false otherwise).
    pub snapped: bool,
}

/// Owner of the one interaction slot.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    active: Interaction,
    snap_active: bool,
}

impl InteractionController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn active(&self) -> &Interaction {
        &self.active
    }

    /// Whether the rotation alignment guide should be highlighted.
    #[must_use]
    pub fn snap_active(&self) -> bool {
        self.snap_active
    }

    /// Pointer-down on an object body. Returns false if the object is unknown.
    pub fn start_drag(&mut self, model: &LayoutModel, id: ObjectId, pointer: Point) -> bool {
        let Some(obj) = model.object(&id) else {
            return false;
        };
        self.begin(Interaction::Dragging { id, start_pointer: pointer, origin_x: obj.x, origin_y: obj.y });
        true
    }

    /// Pointer-down on a resize handle. Returns false if the object is unknown.
    pub fn start_resize(&mut self, model: &LayoutModel, id: ObjectId, pointer: Point) -> bool {
        let Some(obj) = model.object(&id) else {
            return false;
        };
        let min = obj.kind.min_size();
        self.begin(Interaction::Resizing {
            id,
            start_pointer: pointer,
            origin_width: obj.width,
            origin_height: obj.height,
            min_width: min.width,
            min_height: min.height,
        });
        true
    }

    /// Pointer-down on a rotate handle. `canvas_origin` is the screen position
    /// of the canvas's top-left corner. Returns false if the object is unknown.
    pub fn start_rotate(&mut self, model: &LayoutModel, id: ObjectId, pointer: Point, canvas_origin: Point) -> bool {
        let Some(obj) = model.object(&id) else {
            return false;
        };
        let local = obj.center();
        let center = Point::new(canvas_origin.x + local.x, canvas_origin.y + local.y);
        let pointer_angle_offset = angle_between(center, pointer) - obj.rotation;
        self.begin(Interaction::Rotating { id, center, pointer_angle_offset });
        true
    }

    /// Pointer-move anywhere on the page. Applies the active gesture to the
    /// model and returns what changed, or `None` when idle.
    pub fn pointer_move(&mut self, model: &mut LayoutModel, pointer: Point) -> Option<InteractionUpdate> {
        let (id, patch, snapped) = match self.active {
            Interaction::Idle => return None,
            Interaction::Dragging { id, start_pointer, origin_x, origin_y } => {
                let x = round_px(f64::from(origin_x) + (pointer.x - start_pointer.x));
                let y = round_px(f64::from(origin_y) + (pointer.y - start_pointer.y));
                (id, PlanObjectPatch::position(x, y), false)
            }
            Interaction::Resizing { id, start_pointer, origin_width, origin_height, min_width, min_height } => {
                let width = round_px(f64::from(origin_width) + (pointer.x - start_pointer.x)).max(min_width);
                let height = round_px(f64::from(origin_height) + (pointer.y - start_pointer.y)).max(min_height);
                (id, PlanObjectPatch::size(width, height), false)
            }
            Interaction::Rotating { id, center, pointer_angle_offset } => {
                let snap = snap_to_right_angles(angle_between(center, pointer) - pointer_angle_offset);
                (id, PlanObjectPatch::rotation(snap.angle), snap.snapped)
            }
        };

        if !model.update_object(&id, &patch) {
            debug!(object_id = %id, "interaction target vanished; ending gesture");
            self.end();
            return None;
        }
        self.snap_active = snapped;
        Some(InteractionUpdate { id, patch, snapped })
    }

    /// Pointer-up. Clears the slot and the snap indicator. Returns whether a
    /// gesture was active.
    pub fn end(&mut self) -> bool {
        let was_active = !self.active.is_idle();
        if was_active {
            debug!(object_id = ?self.active.target(), "interaction ended");
        }
        self.active = Interaction::Idle;
        self.snap_active = false;
        was_active
    }

    fn begin(&mut self, interaction: Interaction) {
        if !self.active.is_idle() {
            debug!(previous = ?self.active.target(), "replacing unfinished interaction");
        }
        debug!(object_id = ?interaction.target(), "interaction started");
        self.active = interaction;
        self.snap_active = false;
    }
}
