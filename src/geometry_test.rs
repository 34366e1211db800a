#![allow(clippy::float_cmp)]

use super::*;

// =============================================================
// normalize_angle
// =============================================================

#[test]
fn normalize_keeps_in_range_values() {
    assert_eq!(normalize_angle(0.0), 0.0);
    assert_eq!(normalize_angle(45.5), 45.5);
    assert_eq!(normalize_angle(359.0), 359.0);
}

#[test]
fn normalize_wraps_full_turns() {
    assert_eq!(normalize_angle(360.0), 0.0);
    assert_eq!(normalize_angle(720.0), 0.0);
    assert_eq!(normalize_angle(450.0), 90.0);
}

#[test]
fn normalize_corrects_negative_results() {
    assert_eq!(normalize_angle(-90.0), 270.0);
    assert_eq!(normalize_angle(-360.0), 0.0);
    assert_eq!(normalize_angle(-725.0), 355.0);
}

#[test]
fn normalize_always_lands_in_half_open_range() {
    let mut deg = -1000.0;
    while deg < 1000.0 {
        let n = normalize_angle(deg);
        assert!((0.0..360.0).contains(&n), "{deg} -> {n}");
        deg += 7.3;
    }
    let tiny = normalize_angle(-1e-20);
    assert!((0.0..360.0).contains(&tiny));
}

#[test]
fn normalize_non_finite_is_zero() {
    assert_eq!(normalize_angle(f64::NAN), 0.0);
    assert_eq!(normalize_angle(f64::INFINITY), 0.0);
    assert_eq!(normalize_angle(f64::NEG_INFINITY), 0.0);
}

// =============================================================
// angular_distance
// =============================================================

#[test]
fn angular_distance_takes_shorter_arc() {
    assert_eq!(angular_distance(10.0, 350.0), 20.0);
    assert_eq!(angular_distance(350.0, 10.0), 20.0);
    assert_eq!(angular_distance(0.0, 180.0), 180.0);
    assert_eq!(angular_distance(90.0, 90.0), 0.0);
}

// =============================================================
// snap_to_right_angles
// =============================================================

#[test]
fn snap_pulls_near_right_angles() {
    for (raw, target) in [(88.0, 90.0), (95.0, 90.0), (184.0, 180.0), (266.5, 270.0), (3.0, 0.0)] {
        let r = snap_to_right_angles(raw);
        assert_eq!(r.angle, target, "raw {raw}");
        assert!(r.snapped);
    }
}

#[test]
fn snap_handles_wraparound_near_zero() {
    let r = snap_to_right_angles(358.0);
    assert_eq!(r.angle, 0.0);
    assert!(r.snapped);

    let r = snap_to_right_angles(-2.0);
    assert_eq!(r.angle, 0.0);
    assert!(r.snapped);

    let r = snap_to_right_angles(361.0);
    assert_eq!(r.angle, 0.0);
    assert!(r.snapped);
}

#[test]
fn snap_threshold_is_inclusive() {
    let r = snap_to_right_angles(96.0);
    assert_eq!(r.angle, 90.0);
    assert!(r.snapped);

    let r = snap_to_right_angles(354.0);
    assert_eq!(r.angle, 0.0);
    assert!(r.snapped);
}

#[test]
fn snap_beyond_threshold_rounds_raw() {
    let r = snap_to_right_angles(97.0);
    assert_eq!(r.angle, 97.0);
    assert!(!r.snapped);

    let r = snap_to_right_angles(45.4);
    assert_eq!(r.angle, 45.0);
    assert!(!r.snapped);

    let r = snap_to_right_angles(-40.0);
    assert_eq!(r.angle, 320.0);
    assert!(!r.snapped);
}

#[test]
fn snap_result_always_normalized() {
    let mut deg = -720.0;
    while deg < 720.0 {
        let r = snap_to_right_angles(deg);
        assert!((0.0..360.0).contains(&r.angle), "{deg} -> {}", r.angle);
        deg += 1.7;
    }
}

// =============================================================
// clamp_min_size
// =============================================================

#[test]
fn clamp_floors_table_at_72() {
    let s = clamp_min_size(ObjectKind::Table, 10, -40);
    assert_eq!(s, Size { width: 72, height: 72 });
}

#[test]
fn clamp_floors_partition_at_40_by_10() {
    let s = clamp_min_size(ObjectKind::Partition, 10, 2);
    assert_eq!(s, Size { width: 40, height: 10 });
}

#[test]
fn clamp_never_changes_larger_values() {
    let s = clamp_min_size(ObjectKind::Table, 300, 90);
    assert_eq!(s, Size { width: 300, height: 90 });
    let s = clamp_min_size(ObjectKind::Partition, 41, 11);
    assert_eq!(s, Size { width: 41, height: 11 });
}

// =============================================================
// angle_between / round_px
// =============================================================

#[test]
fn angle_between_cardinal_directions() {
    let c = Point::new(100.0, 100.0);
    assert_eq!(angle_between(c, Point::new(200.0, 100.0)), 0.0);
    assert_eq!(angle_between(c, Point::new(100.0, 200.0)), 90.0);
    assert_eq!(angle_between(c, Point::new(0.0, 100.0)), 180.0);
    assert_eq!(angle_between(c, Point::new(100.0, 0.0)), -90.0);
}

#[test]
fn round_px_rounds_half_away_from_zero() {
    assert_eq!(round_px(1.5), 2);
    assert_eq!(round_px(-1.5), -2);
    assert_eq!(round_px(2.49), 2);
}

#[test]
fn round_px_saturates_and_zeroes_non_finite() {
    assert_eq!(round_px(1e12), i32::MAX);
    assert_eq!(round_px(-1e12), i32::MIN);
    assert_eq!(round_px(f64::NAN), 0);
}
