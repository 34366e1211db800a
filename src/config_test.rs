use super::*;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: i64 = env_parse("__FLOORPLAN_TEST_MISSING__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__FLOORPLAN_TEST_VALID__", " 99 ") };
    let val: u32 = env_parse("__FLOORPLAN_TEST_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__FLOORPLAN_TEST_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__FLOORPLAN_TEST_INVALID__", "wide") };
    let val: u32 = env_parse("__FLOORPLAN_TEST_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__FLOORPLAN_TEST_INVALID__") };
}

// =============================================================================
// EditorConfig
// =============================================================================

#[test]
fn default_matches_constants() {
    let config = EditorConfig::default();
    assert_eq!(config.autosave_delay_ms, 800);
    assert_eq!(config.default_canvas_width, 1200);
    assert_eq!(config.default_canvas_height, 760);
    assert_eq!(config.draft_key_prefix, "floorplan:draft:");
}

#[test]
fn from_env_overrides_then_falls_back() {
    unsafe {
        std::env::set_var("FLOORPLAN_AUTOSAVE_MS", "250");
        std::env::set_var("FLOORPLAN_CANVAS_WIDTH", "1600");
        std::env::set_var("FLOORPLAN_CANVAS_HEIGHT", "0");
        std::env::set_var("FLOORPLAN_DRAFT_PREFIX", "test:");
    }
    let config = EditorConfig::from_env();
    assert_eq!(config.autosave_delay_ms, 250);
    assert_eq!(config.default_canvas_width, 1600);
    assert_eq!(config.default_canvas_height, 1);
    assert_eq!(config.draft_key_prefix, "test:");

    unsafe {
        std::env::remove_var("FLOORPLAN_AUTOSAVE_MS");
        std::env::remove_var("FLOORPLAN_CANVAS_WIDTH");
        std::env::remove_var("FLOORPLAN_CANVAS_HEIGHT");
        std::env::remove_var("FLOORPLAN_DRAFT_PREFIX");
    }
    assert_eq!(EditorConfig::from_env(), EditorConfig::default());
}
