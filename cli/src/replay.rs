//! Scripted editor sessions.
//!
//! A script is a JSON object with a `steps` array. Each step is tagged by
//! `op`; objects are addressed by their index in the current layout:
//!
//! ```json
//! { "steps": [
//!   { "op": "add", "kind": "table", "shape": "circle" },
//!   { "op": "down", "handle": "body", "object": 0, "x": 50, "y": 50 },
//!   { "op": "move", "x": 120, "y": 95 },
//!   { "op": "up" },
//!   { "op": "wait", "ms": 900 },
//!   { "op": "save" }
//! ] }
//! ```
//!
//! The session runs against an in-memory gateway holding one hall, seeded
//! with the optional starting layout, and a manual clock that only moves on
//! `wait` steps. The hall exists only for the session, so its draft is
//! reported in the outcome and then removed from the store.

#[cfg(test)]
#[path = "replay_test.rs"]
mod replay_test;

use floorplan::clock::{Clock, ManualClock, SystemClock};
use floorplan::config::EditorConfig;
use floorplan::draft::Draft;
use floorplan::editor::{Editor, Notice};
use floorplan::gateway::{HallGateway, LayoutPayload, MemoryGateway, SaveGuard};
use floorplan::geometry::Point;
use floorplan::model::{HallId, HallLayout, ObjectId, ObjectKind, PlanObjectPatch, Shape};
use floorplan::store::LocalStore;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::CliError;

#[derive(Debug, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    Body,
    Resize,
    Rotate,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Add {
        kind: ObjectKind,
        shape: Shape,
    },
    Update {
        object: usize,
        patch: PlanObjectPatch,
    },
    Delete {
        object: usize,
    },
    Down {
        handle: Handle,
        object: usize,
        x: f64,
        y: f64,
        /// Screen position of the canvas origin, for rotation.
        #[serde(default)]
        origin_x: f64,
        #[serde(default)]
        origin_y: f64,
    },
    Move {
        x: f64,
        y: f64,
    },
    Up,
    Wait {
        ms: i64,
    },
    Save {
        #[serde(default)]
        force: bool,
    },
}

/// What a replay leaves behind.
#[derive(Debug, Serialize)]
pub struct Outcome {
    pub hall_id: HallId,
    pub dirty: bool,
    /// The draft autosave had written for the hall when the script ended.
    pub draft: Option<Draft>,
    pub layout: Option<HallLayout>,
    pub notices: Vec<String>,
}

/// Run `script` in a fresh editor session over `store`.
pub async fn run<S: LocalStore>(
    store: S,
    config: EditorConfig,
    script: &Script,
    layout: Option<LayoutPayload>,
) -> Result<Outcome, CliError> {
    let venue_id = Uuid::new_v4();
    let gateway = MemoryGateway::new();
    let hall = gateway.seed_hall(venue_id, "Replay", 0);
    if let Some(payload) = layout {
        gateway.save_layout(hall.id, &payload, SaveGuard::Overwrite).await?;
    }

    let clock = ManualClock::new(SystemClock.now_ms());
    let mut editor = Editor::new(venue_id, store, config).with_clock(clock.clone());
    editor.load_halls(&gateway).await?;
    let mut notices = Vec::new();

    for (index, step) in script.steps.iter().enumerate() {
        apply(&mut editor, &gateway, &clock, index, step).await?;
        notices.extend(editor.take_notices().iter().map(describe));
    }
    info!(hall_id = %hall.id, steps = script.steps.len(), "replay finished");

    let draft = editor.drafts_mut().read(&hall.id)?;
    editor.drafts_mut().clear(&hall.id)?;

    Ok(Outcome {
        hall_id: hall.id,
        dirty: editor.is_dirty(),
        draft,
        layout: editor.layout().cloned(),
        notices,
    })
}

async fn apply<S: LocalStore>(
    editor: &mut Editor<S>,
    gateway: &MemoryGateway,
    clock: &ManualClock,
    index: usize,
    step: &Step,
) -> Result<(), CliError> {
    match *step {
        Step::Add { kind, shape } => {
            editor.add_object(kind, shape)?;
        }
        Step::Update { object, ref patch } => {
            let id = object_at(editor, index, object)?;
            editor.update_object(&id, patch);
        }
        Step::Delete { object } => {
            let id = object_at(editor, index, object)?;
            editor.delete_object(&id);
        }
        Step::Down { handle, object, x, y, origin_x, origin_y } => {
            let id = object_at(editor, index, object)?;
            let pointer = Point::new(x, y);
            match handle {
                Handle::Body => editor.pointer_down_body(id, pointer),
                Handle::Resize => editor.pointer_down_resize(id, pointer),
                Handle::Rotate => editor.pointer_down_rotate(id, pointer, Point::new(origin_x, origin_y)),
            };
        }
        Step::Move { x, y } => {
            editor.pointer_move(Point::new(x, y));
        }
        Step::Up => {
            editor.pointer_up();
        }
        Step::Wait { ms } => {
            clock.advance(ms);
            editor.tick()?;
        }
        Step::Save { force } => {
            if force {
                editor.force_save(gateway).await?;
            } else {
                editor.save(gateway).await?;
            }
        }
    }
    Ok(())
}

fn object_at<S: LocalStore>(editor: &Editor<S>, step: usize, index: usize) -> Result<ObjectId, CliError> {
    editor
        .layout()
        .and_then(|layout| layout.objects.get(index))
        .map(|obj| obj.id)
        .ok_or(CliError::NoSuchObject { step, index })
}

fn describe(notice: &Notice) -> String {
    match notice {
        Notice::DraftRestored { saved_at, .. } => format!("draft restored (saved_at={saved_at})"),
        Notice::DraftDiscarded { .. } => "draft discarded".to_string(),
        Notice::Saved { updated_at, .. } => format!("saved (updated_at={updated_at})"),
        Notice::SaveConflict { .. } => "save conflict".to_string(),
        Notice::SaveFailed { message, .. } => format!("save failed: {message}"),
        Notice::GatewayFailed { message } => format!("gateway failed: {message}"),
        Notice::HallMissing { hall_id } => format!("hall {hall_id} missing"),
    }
}
