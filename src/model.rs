//! Layout model: plan objects, halls, and the in-memory layout store.
//!
//! This module defines the data that describes a hall's floor plan
//! (`PlanObject`, `ObjectKind`, `Shape`, `HallLayout`, `Hall`), a sparse update
//! type for incremental edits (`PlanObjectPatch`), and the runtime store that
//! owns the layout being edited (`LayoutModel`).
//!
//! Data flows into this layer from the gateway and the draft store (whole
//! layouts via `replace_all`) and from the interaction controller and the
//! inspector (per-object patches). Every mutation bumps the model revision and
//! raises the dirty flag that drives autosave. `updated_at` is only ever
//! written from a server response.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::consts::{
    NEW_OBJECT_X, NEW_OBJECT_Y, NEW_PARTITION_HEIGHT, NEW_PARTITION_WIDTH, NEW_TABLE_CAPACITY_COMFORTABLE,
    NEW_TABLE_CAPACITY_MAX, NEW_TABLE_HEIGHT, NEW_TABLE_WIDTH, PARTITION_MIN_HEIGHT, PARTITION_MIN_WIDTH,
    TABLE_MIN_HEIGHT, TABLE_MIN_WIDTH,
};
use crate::geometry::{Point, Size, clamp_min_size, normalize_angle};

/// Unique identifier for a plan object.
pub type ObjectId = Uuid;
/// Unique identifier for a hall.
pub type HallId = Uuid;
/// Unique identifier for a venue.
pub type VenueId = Uuid;

/// What a plan object represents. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// A seating table with a number and capacities.
    Table,
    /// A wall, screen or divider.
    Partition,
}

impl ObjectKind {
    /// Smallest size an object of this kind may be resized to.
    #[must_use]
    pub fn min_size(self) -> Size {
        match self {
            Self::Table => Size { width: TABLE_MIN_WIDTH, height: TABLE_MIN_HEIGHT },
            Self::Partition => Size { width: PARTITION_MIN_WIDTH, height: PARTITION_MIN_HEIGHT },
        }
    }
}

/// Outline drawn for a plan object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Rect,
    Circle,
}

/// An object placed on a hall's canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanObject {
    /// Client-generated identifier, stable for the object's lifetime.
    pub id: ObjectId,
    pub kind: ObjectKind,
    pub shape: Shape,
    /// Left edge in canvas pixels.
    pub x: i32,
    /// Top edge in canvas pixels.
    pub y: i32,
    pub width: i32,
    pub height: i32,
    /// Clockwise rotation in degrees around the object center, in `[0, 360)`.
    pub rotation: f64,
    /// Table label made of digits. Tables only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_comfortable: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl PlanObject {
    /// A new table at the palette drop position.
    #[must_use]
    pub fn new_table(shape: Shape, table_number: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ObjectKind::Table,
            shape,
            x: NEW_OBJECT_X,
            y: NEW_OBJECT_Y,
            width: NEW_TABLE_WIDTH,
            height: NEW_TABLE_HEIGHT,
            rotation: 0.0,
            table_number: Some(table_number.to_string()),
            capacity_comfortable: Some(NEW_TABLE_CAPACITY_COMFORTABLE),
            capacity_max: Some(NEW_TABLE_CAPACITY_MAX),
            name: None,
            comment: None,
        }
    }

    /// A new partition at the palette drop position.
    #[must_use]
    pub fn new_partition(shape: Shape) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: ObjectKind::Partition,
            shape,
            x: NEW_OBJECT_X,
            y: NEW_OBJECT_Y,
            width: NEW_PARTITION_WIDTH,
            height: NEW_PARTITION_HEIGHT,
            rotation: 0.0,
            table_number: None,
            capacity_comfortable: None,
            capacity_max: None,
            name: None,
            comment: None,
        }
    }

    /// Center of the bounding box in canvas coordinates.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }

    /// Parsed table number, if this is a table with a numeric label.
    #[must_use]
    pub fn table_number_value(&self) -> Option<u32> {
        if self.kind != ObjectKind::Table {
            return None;
        }
        let Ok(n) = self.table_number.as_deref()?.trim().parse::<u32>() else {
            return None;
        };
        Some(n)
    }

    /// Bring size and rotation back inside the model invariants.
    fn sanitize(&mut self) {
        let size = clamp_min_size(self.kind, self.width, self.height);
        self.width = size.width;
        self.height = size.height;
        self.rotation = normalize_angle(self.rotation);
    }
}

/// Sparse update for a plan object. Only present fields are applied.
///
/// Table-only fields are ignored when the target is a partition. Empty
/// strings clear optional text fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanObjectPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Shape>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_comfortable: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_max: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl PlanObjectPatch {
    /// Patch that moves an object.
    #[must_use]
    pub fn position(x: i32, y: i32) -> Self {
        Self { x: Some(x), y: Some(y), ..Self::default() }
    }

    /// Patch that resizes an object.
    #[must_use]
    pub fn size(width: i32, height: i32) -> Self {
        Self { width: Some(width), height: Some(height), ..Self::default() }
    }

    /// Patch that rotates an object.
    #[must_use]
    pub fn rotation(rotation: f64) -> Self {
        Self { rotation: Some(rotation), ..Self::default() }
    }

    fn apply_to(&self, obj: &mut PlanObject) {
        if let Some(x) = self.x {
            obj.x = x;
        }
        if let Some(y) = self.y {
            obj.y = y;
        }
        if let Some(w) = self.width {
            obj.width = w;
        }
        if let Some(h) = self.height {
            obj.height = h;
        }
        if let Some(r) = self.rotation {
            obj.rotation = r;
        }
        if let Some(shape) = self.shape {
            obj.shape = shape;
        }
        if obj.kind == ObjectKind::Table {
            if let Some(ref n) = self.table_number {
                obj.table_number = non_empty(n);
            }
            if let Some(c) = self.capacity_comfortable {
                obj.capacity_comfortable = Some(c);
            }
            if let Some(c) = self.capacity_max {
                obj.capacity_max = Some(c);
            }
            if let Some(ref name) = self.name {
                obj.name = non_empty(name);
            }
            if let Some(ref comment) = self.comment {
                obj.comment = non_empty(comment);
            }
        }
        obj.sanitize();
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
}

/// A named sub-area of a venue that owns one floor plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hall {
    pub id: HallId,
    pub venue_id: VenueId,
    pub name: String,
    pub sort_order: i32,
}

/// The full floor plan of one hall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HallLayout {
    pub hall_id: HallId,
    pub canvas_width: u32,
    pub canvas_height: u32,
    #[serde(default)]
    pub objects: Vec<PlanObject>,
    /// Milliseconds since the epoch of the last server-side save, if any.
    #[serde(default)]
    pub updated_at: Option<i64>,
}

impl HallLayout {
    /// An unsaved layout with no objects.
    #[must_use]
    pub fn empty(hall_id: HallId, canvas_width: u32, canvas_height: u32) -> Self {
        Self { hall_id, canvas_width, canvas_height, objects: Vec::new(), updated_at: None }
    }
}

/// In-memory store for the layout being edited.
#[derive(Debug, Clone)]
pub struct LayoutModel {
    layout: HallLayout,
    dirty: bool,
    revision: u64,
}

impl LayoutModel {
    /// Wrap a loaded layout. The model starts clean.
    #[must_use]
    pub fn new(mut layout: HallLayout) -> Self {
        let objects = std::mem::take(&mut layout.objects);
        let mut model = Self { layout, dirty: false, revision: 0 };
        model.replace_all(objects);
        model
    }

    #[must_use]
    pub fn layout(&self) -> &HallLayout {
        &self.layout
    }

    #[must_use]
    pub fn hall_id(&self) -> HallId {
        self.layout.hall_id
    }

    #[must_use]
    pub fn objects(&self) -> &[PlanObject] {
        &self.layout.objects
    }

    /// Look up an object by id.
    #[must_use]
    pub fn object(&self, id: &ObjectId) -> Option<&PlanObject> {
        self.layout.objects.iter().find(|o| o.id == *id)
    }

    /// Whether the layout differs from the last known server state.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Counter bumped by every mutation of the object collection.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Record the server's persistence timestamp after a successful save.
    pub fn set_updated_at(&mut self, updated_at: Option<i64>) {
        self.layout.updated_at = updated_at;
    }

    /// Smallest positive integer not used as a table number.
    #[must_use]
    pub fn next_table_number(&self) -> u32 {
        let used: HashSet<u32> = self.layout.objects.iter().filter_map(PlanObject::table_number_value).collect();
        (1..).find(|n| !used.contains(n)).unwrap_or(1)
    }

    /// Place a new object at the default position and return its id.
    pub fn add_object(&mut self, kind: ObjectKind, shape: Shape) -> ObjectId {
        let obj = match kind {
            ObjectKind::Table => PlanObject::new_table(shape, self.next_table_number()),
            ObjectKind::Partition => PlanObject::new_partition(shape),
        };
        let id = obj.id;
        self.layout.objects.push(obj);
        self.touch();
        id
    }

    /// Merge `patch` into the object with `id`. Returns false if absent.
    pub fn update_object(&mut self, id: &ObjectId, patch: &PlanObjectPatch) -> bool {
        let Some(obj) = self.layout.objects.iter_mut().find(|o| o.id == *id) else {
            return false;
        };
        patch.apply_to(obj);
        self.touch();
        true
    }

    /// Remove an object by id, returning it if it was present.
    pub fn remove_object(&mut self, id: &ObjectId) -> Option<PlanObject> {
        let index = self.layout.objects.iter().position(|o| o.id == *id)?;
        let removed = self.layout.objects.remove(index);
        self.touch();
        Some(removed)
    }

    /// Replace the whole collection. Objects with an id already seen are
    /// dropped. Leaves the dirty flag to the caller.
    pub fn replace_all(&mut self, objects: Vec<PlanObject>) {
        let mut seen = HashSet::with_capacity(objects.len());
        let mut kept = Vec::with_capacity(objects.len());
        for mut obj in objects {
            if !seen.insert(obj.id) {
                warn!(hall_id = %self.layout.hall_id, object_id = %obj.id, "dropping duplicate object id");
                continue;
            }
            obj.sanitize();
            kept.push(obj);
        }
        self.layout.objects = kept;
        self.revision += 1;
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}
