use floorplan::model::PlanObject;
use floorplan::store::{FileStore, LocalStore, MemoryStore};
use serde_json::json;

use super::*;

fn script(steps: serde_json::Value) -> Script {
    serde_json::from_value(json!({ "steps": steps })).unwrap()
}

#[tokio::test]
async fn drag_then_save_leaves_clean_layout() {
    let steps = script(json!([
        { "op": "add", "kind": "table", "shape": "circle" },
        { "op": "down", "handle": "body", "object": 0, "x": 50, "y": 50 },
        { "op": "move", "x": 120, "y": 95 },
        { "op": "up" },
        { "op": "wait", "ms": 900 },
        { "op": "save" }
    ]));
    let outcome = run(MemoryStore::new(), EditorConfig::default(), &steps, None).await.unwrap();

    let layout = outcome.layout.unwrap();
    assert_eq!((layout.objects[0].x, layout.objects[0].y), (150, 125));
    assert!(layout.updated_at.is_some());
    assert!(!outcome.dirty);
    assert!(outcome.draft.is_none());
    assert_eq!(outcome.notices.len(), 1);
}

#[tokio::test]
async fn unsaved_edits_leave_a_draft() {
    let steps = script(json!([
        { "op": "add", "kind": "partition", "shape": "rect" },
        { "op": "wait", "ms": 800 }
    ]));
    let outcome = run(MemoryStore::new(), EditorConfig::default(), &steps, None).await.unwrap();
    assert!(outcome.dirty);
    let draft = outcome.draft.unwrap();
    assert_eq!(draft.hall_id, outcome.hall_id);
    assert_eq!(draft.objects.len(), 1);
}

#[tokio::test]
async fn session_draft_is_removed_from_draft_dir() {
    let dir = std::env::temp_dir().join(format!("floorplan-replay-{}", Uuid::new_v4()));
    let steps = script(json!([
        { "op": "add", "kind": "table", "shape": "rect" },
        { "op": "wait", "ms": 800 }
    ]));
    let outcome = run(FileStore::open(&dir).unwrap(), EditorConfig::default(), &steps, None).await.unwrap();

    assert!(outcome.draft.is_some());
    assert!(FileStore::open(&dir).unwrap().keys().unwrap().is_empty());
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn starting_layout_is_loaded() {
    let payload = LayoutPayload {
        canvas_width: 640,
        canvas_height: 480,
        objects: vec![PlanObject::new_table(Shape::Rect, 7)],
    };
    let steps = script(json!([{ "op": "add", "kind": "table", "shape": "rect" }]));
    let outcome = run(MemoryStore::new(), EditorConfig::default(), &steps, Some(payload)).await.unwrap();

    let layout = outcome.layout.unwrap();
    assert_eq!(layout.canvas_width, 640);
    assert_eq!(layout.objects[1].table_number.as_deref(), Some("1"));
}

#[tokio::test]
async fn unknown_object_index_fails() {
    let steps = script(json!([{ "op": "delete", "object": 3 }]));
    let err = run(MemoryStore::new(), EditorConfig::default(), &steps, None).await.unwrap_err();
    assert!(matches!(err, CliError::NoSuchObject { step: 0, index: 3 }));
}
