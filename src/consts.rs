//! Shared numeric constants for the floor-plan editor.

// ── Rotation ────────────────────────────────────────────────────

/// Angular window, in degrees, within which a rotation snaps to a right angle.
pub const SNAP_THRESHOLD_DEG: f64 = 6.0;

/// Right-angle snap targets. 360° is folded onto 0° by normalization.
pub const RIGHT_ANGLES_DEG: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

// ── Minimum sizes ───────────────────────────────────────────────

/// Smallest width a table may have, in canvas pixels.
pub const TABLE_MIN_WIDTH: i32 = 72;
/// Smallest height a table may have, in canvas pixels.
pub const TABLE_MIN_HEIGHT: i32 = 72;
/// Smallest width a partition may have, in canvas pixels.
pub const PARTITION_MIN_WIDTH: i32 = 40;
/// Smallest height a partition may have, in canvas pixels.
pub const PARTITION_MIN_HEIGHT: i32 = 10;

// ── New objects ─────────────────────────────────────────────────

/// Where the palette drops a new object.
pub const NEW_OBJECT_X: i32 = 80;
pub const NEW_OBJECT_Y: i32 = 80;

pub const NEW_TABLE_WIDTH: i32 = 96;
pub const NEW_TABLE_HEIGHT: i32 = 96;
pub const NEW_TABLE_CAPACITY_COMFORTABLE: u32 = 4;
pub const NEW_TABLE_CAPACITY_MAX: u32 = 6;

pub const NEW_PARTITION_WIDTH: i32 = 160;
pub const NEW_PARTITION_HEIGHT: i32 = 12;

// ── Canvas / persistence ────────────────────────────────────────

/// Canvas size used when a hall has no stored layout.
pub const DEFAULT_CANVAS_WIDTH: u32 = 1200;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 760;

/// Quiet period after the last mutation before a draft is written.
pub const AUTOSAVE_DELAY_MS: i64 = 800;

/// Namespace prepended to the hall id to form a draft key.
pub const DRAFT_KEY_PREFIX: &str = "floorplan:draft:";
