//! Geometry and snap engine: pure angle and size math.
//!
//! Everything here is deterministic and side-effect free. Non-finite inputs
//! are folded to a neutral value rather than rejected so that pointer math
//! can never poison the layout with `NaN`.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

use crate::consts::{RIGHT_ANGLES_DEG, SNAP_THRESHOLD_DEG};
use crate::model::ObjectKind;

/// A point in screen or canvas space, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Integer pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

/// Outcome of [`snap_to_right_angles`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// Resulting angle in `[0, 360)`.
    pub angle: f64,
    /// Whether the angle was pulled onto a right angle.
    pub snapped: bool,
}

/// Fold any angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_angle(deg: f64) -> f64 {
    if !deg.is_finite() {
        return 0.0;
    }
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Shortest unsigned angular distance between two angles, in `[0, 180]`.
#[must_use]
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let delta = normalize_angle(a - b);
    delta.min(360.0 - delta)
}

/// Snap an angle onto the nearest of 0/90/180/270 when within
/// [`SNAP_THRESHOLD_DEG`]; otherwise round it to a whole degree.
#[must_use]
pub fn snap_to_right_angles(raw_deg: f64) -> SnapResult {
    let deg = normalize_angle(raw_deg);

    let mut best = RIGHT_ANGLES_DEG[0];
    let mut best_dist = angular_distance(deg, best);
    for target in &RIGHT_ANGLES_DEG[1..] {
        let dist = angular_distance(deg, *target);
        if dist < best_dist {
            best = *target;
            best_dist = dist;
        }
    }

    if best_dist <= SNAP_THRESHOLD_DEG {
        SnapResult { angle: best, snapped: true }
    } else {
        SnapResult { angle: normalize_angle(deg.round()), snapped: false }
    }
}

/// Floor each dimension at the kind minimum. Values above the minimum pass
/// through unchanged.
#[must_use]
pub fn clamp_min_size(kind: ObjectKind, width: i32, height: i32) -> Size {
    let min = kind.min_size();
    Size { width: width.max(min.width), height: height.max(min.height) }
}

/// Angle in degrees of `point` as seen from `center`, measured like `atan2`
/// (0° along +x, positive toward +y, which is clockwise on screen).
#[must_use]
pub fn angle_between(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x).to_degrees()
}

/// Round a pixel value to the nearest integer, saturating at the `i32` range.
#[must_use]
pub fn round_px(value: f64) -> i32 {
    if !value.is_finite() {
        return 0;
    }
    #[allow(clippy::cast_possible_truncation)]
    {
        value.round().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32
    }
}
