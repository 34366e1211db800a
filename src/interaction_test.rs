#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;
use crate::model::{HallLayout, ObjectKind, Shape};

// =============================================================
// Helpers
// =============================================================

fn model_with(kind: ObjectKind, x: i32, y: i32) -> (LayoutModel, ObjectId) {
    let mut model = LayoutModel::new(HallLayout::empty(Uuid::new_v4(), 1200, 760));
    let id = model.add_object(kind, Shape::Rect);
    model.update_object(&id, &PlanObjectPatch::position(x, y));
    model.mark_clean();
    (model, id)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

fn polar(center: Point, deg: f64, r: f64) -> Point {
    let rad = deg.to_radians();
    pt(center.x + r * rad.cos(), center.y + r * rad.sin())
}

// =============================================================
// Idle
// =============================================================

#[test]
fn controller_starts_idle() {
    let c = InteractionController::new();
    assert!(c.active().is_idle());
    assert!(!c.snap_active());
}

#[test]
fn move_while_idle_does_nothing() {
    let (mut model, _) = model_with(ObjectKind::Table, 0, 0);
    let mut c = InteractionController::new();
    assert!(c.pointer_move(&mut model, pt(10.0, 10.0)).is_none());
    assert!(!model.is_dirty());
}

#[test]
fn start_on_unknown_object_stays_idle() {
    let (model, _) = model_with(ObjectKind::Table, 0, 0);
    let mut c = InteractionController::new();
    assert!(!c.start_drag(&model, Uuid::new_v4(), pt(0.0, 0.0)));
    assert!(!c.start_resize(&model, Uuid::new_v4(), pt(0.0, 0.0)));
    assert!(!c.start_rotate(&model, Uuid::new_v4(), pt(0.0, 0.0), pt(0.0, 0.0)));
    assert!(c.active().is_idle());
}

// =============================================================
// Drag
// =============================================================

#[test]
fn drag_moves_by_pointer_delta() {
    let (mut model, id) = model_with(ObjectKind::Table, 100, 100);
    let mut c = InteractionController::new();
    assert!(c.start_drag(&model, id, pt(50.0, 50.0)));
    assert!(matches!(c.active(), Interaction::Dragging { .. }));

    let update = c.pointer_move(&mut model, pt(120.0, 95.0)).unwrap();
    assert_eq!(update.id, id);
    assert!(!update.snapped);
    let obj = model.object(&id).unwrap();
    assert_eq!((obj.x, obj.y), (170, 145));
}

#[test]
fn drag_is_computed_from_anchor_not_accumulated() {
    let (mut model, id) = model_with(ObjectKind::Table, 100, 100);
    let mut c = InteractionController::new();
    c.start_drag(&model, id, pt(0.0, 0.0));
    c.pointer_move(&mut model, pt(30.0, 30.0));
    c.pointer_move(&mut model, pt(10.0, -5.0));
    let obj = model.object(&id).unwrap();
    assert_eq!((obj.x, obj.y), (110, 95));
}

#[test]
fn drag_rounds_each_axis() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let mut c = InteractionController::new();
    c.start_drag(&model, id, pt(0.0, 0.0));
    c.pointer_move(&mut model, pt(10.6, -3.4));
    let obj = model.object(&id).unwrap();
    assert_eq!((obj.x, obj.y), (11, -3));
}

#[test]
fn drag_marks_dirty_on_every_move() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let mut c = InteractionController::new();
    c.start_drag(&model, id, pt(0.0, 0.0));
    let r0 = model.revision();
    c.pointer_move(&mut model, pt(1.0, 0.0));
    assert!(model.is_dirty());
    let r1 = model.revision();
    c.pointer_move(&mut model, pt(2.0, 0.0));
    assert!(r1 > r0);
    assert!(model.revision() > r1);
}

// =============================================================
// Resize
// =============================================================

#[test]
fn resize_grows_axes_independently() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let mut c = InteractionController::new();
    c.start_resize(&model, id, pt(200.0, 200.0));
    c.pointer_move(&mut model, pt(250.0, 210.0));
    let obj = model.object(&id).unwrap();
    assert_eq!((obj.width, obj.height), (146, 106));
}

#[test]
fn resize_partition_clamps_to_minimum() {
    let (mut model, id) = model_with(ObjectKind::Partition, 0, 0);
    let mut c = InteractionController::new();
    let start_w = model.object(&id).unwrap().width;
    c.start_resize(&model, id, pt(500.0, 500.0));
    c.pointer_move(&mut model, pt(500.0 - f64::from(start_w - 10), 500.0));
    let obj = model.object(&id).unwrap();
    assert_eq!(obj.width, 40);
    assert_eq!(obj.height, 12);
}

#[test]
fn resize_never_goes_below_minimum_for_any_delta() {
    for kind in [ObjectKind::Table, ObjectKind::Partition] {
        let (mut model, id) = model_with(kind, 0, 0);
        let mut c = InteractionController::new();
        c.start_resize(&model, id, pt(0.0, 0.0));
        let min = kind.min_size();
        for d in [-10_000.0, -500.0, -97.0, -1.0, 0.0, 3.0] {
            c.pointer_move(&mut model, pt(d, d));
            let obj = model.object(&id).unwrap();
            assert!(obj.width >= min.width && obj.height >= min.height, "{kind:?} {d}");
        }
    }
}

// =============================================================
// Rotate
// =============================================================

#[test]
fn rotate_snaps_near_right_angle() {
    let (mut model, id) = model_with(ObjectKind::Table, 100, 100);
    model.update_object(&id, &PlanObjectPatch::rotation(10.0));
    let origin = pt(20.0, 30.0);
    let local = model.object(&id).unwrap().center();
    let center = pt(origin.x + local.x, origin.y + local.y);

    let mut c = InteractionController::new();
    assert!(c.start_rotate(&model, id, polar(center, 0.0, 100.0), origin));

    // Offset is -10°, so a pointer at 78° corrects to 88°.
    let update = c.pointer_move(&mut model, polar(center, 78.0, 100.0)).unwrap();
    assert!(update.snapped);
    assert!(c.snap_active());
    assert_eq!(model.object(&id).unwrap().rotation, 90.0);
}

#[test]
fn rotate_outside_threshold_rounds() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let center = model.object(&id).unwrap().center();
    let mut c = InteractionController::new();
    c.start_rotate(&model, id, polar(center, 0.0, 50.0), pt(0.0, 0.0));
    let update = c.pointer_move(&mut model, polar(center, 45.3, 50.0)).unwrap();
    assert!(!update.snapped);
    assert!(!c.snap_active());
    assert_eq!(model.object(&id).unwrap().rotation, 45.0);
}

#[test]
fn rotate_result_is_normalized() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let center = model.object(&id).unwrap().center();
    let mut c = InteractionController::new();
    c.start_rotate(&model, id, polar(center, 0.0, 50.0), pt(0.0, 0.0));
    c.pointer_move(&mut model, polar(center, -40.0, 50.0));
    assert_eq!(model.object(&id).unwrap().rotation, 320.0);
}

#[test]
fn rotate_starting_position_keeps_rotation() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    model.update_object(&id, &PlanObjectPatch::rotation(33.0));
    let center = model.object(&id).unwrap().center();
    let mut c = InteractionController::new();
    let start = polar(center, 120.0, 80.0);
    c.start_rotate(&model, id, start, pt(0.0, 0.0));
    c.pointer_move(&mut model, start);
    assert_eq!(model.object(&id).unwrap().rotation, 33.0);
}

// =============================================================
// End / single slot
// =============================================================

#[test]
fn end_returns_to_idle_and_clears_snap() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let center = model.object(&id).unwrap().center();
    let mut c = InteractionController::new();
    c.start_rotate(&model, id, polar(center, 0.0, 50.0), pt(0.0, 0.0));
    c.pointer_move(&mut model, polar(center, 1.0, 50.0));
    assert!(c.snap_active());

    assert!(c.end());
    assert!(c.active().is_idle());
    assert!(!c.snap_active());
    assert!(!c.end());
}

#[test]
fn new_start_replaces_active_gesture() {
    let (mut model, a) = model_with(ObjectKind::Table, 0, 0);
    let b = model.add_object(ObjectKind::Table, Shape::Rect);
    let mut c = InteractionController::new();
    c.start_drag(&model, a, pt(0.0, 0.0));
    c.start_resize(&model, b, pt(0.0, 0.0));
    assert_eq!(c.active().target(), Some(b));

    let before_a = model.object(&a).unwrap().clone();
    c.pointer_move(&mut model, pt(10.0, 10.0));
    assert_eq!(model.object(&a).unwrap(), &before_a);
}

#[test]
fn vanished_target_ends_gesture() {
    let (mut model, id) = model_with(ObjectKind::Table, 0, 0);
    let mut c = InteractionController::new();
    c.start_drag(&model, id, pt(0.0, 0.0));
    model.remove_object(&id);
    assert!(c.pointer_move(&mut model, pt(5.0, 5.0)).is_none());
    assert!(c.active().is_idle());
}
