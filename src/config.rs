//! Editor configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use crate::consts::{AUTOSAVE_DELAY_MS, DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, DRAFT_KEY_PREFIX};

/// Tuning knobs for the editor shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Quiet period after the last mutation before the draft is written.
    pub autosave_delay_ms: i64,
    /// Canvas size given to halls without a stored layout.
    pub default_canvas_width: u32,
    pub default_canvas_height: u32,
    /// Namespace for draft keys in the local store.
    pub draft_key_prefix: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: AUTOSAVE_DELAY_MS,
            default_canvas_width: DEFAULT_CANVAS_WIDTH,
            default_canvas_height: DEFAULT_CANVAS_HEIGHT,
            draft_key_prefix: DRAFT_KEY_PREFIX.to_string(),
        }
    }
}

impl EditorConfig {
    /// Build config from environment variables, falling back to defaults for
    /// anything absent or unparseable.
    ///
    /// - `FLOORPLAN_AUTOSAVE_MS`: default 800
    /// - `FLOORPLAN_CANVAS_WIDTH`: default 1200
    /// - `FLOORPLAN_CANVAS_HEIGHT`: default 760
    /// - `FLOORPLAN_DRAFT_PREFIX`: default `floorplan:draft:`
    #[must_use]
    pub fn from_env() -> Self {
        let prefix = match std::env::var("FLOORPLAN_DRAFT_PREFIX") {
            Ok(p) if !p.trim().is_empty() => p,
            _ => DRAFT_KEY_PREFIX.to_string(),
        };
        Self {
            autosave_delay_ms: env_parse("FLOORPLAN_AUTOSAVE_MS", AUTOSAVE_DELAY_MS).max(0),
            default_canvas_width: env_parse("FLOORPLAN_CANVAS_WIDTH", DEFAULT_CANVAS_WIDTH).max(1),
            default_canvas_height: env_parse("FLOORPLAN_CANVAS_HEIGHT", DEFAULT_CANVAS_HEIGHT).max(1),
            draft_key_prefix: prefix,
        }
    }
}

pub(crate) fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => v,
        Err(_) => default,
    }
}
