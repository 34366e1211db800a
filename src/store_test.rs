use uuid::Uuid;

use super::*;

fn temp_store() -> FileStore {
    let dir = std::env::temp_dir().join(format!("floorplan-store-{}", Uuid::new_v4()));
    FileStore::open(dir).unwrap()
}

// =============================================================
// MemoryStore
// =============================================================

#[test]
fn memory_get_missing_is_none() {
    let store = MemoryStore::new();
    assert!(store.get("nope").unwrap().is_none());
}

#[test]
fn memory_set_get_remove() {
    let mut store = MemoryStore::new();
    store.set("a", "1").unwrap();
    store.set("a", "2").unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
    assert_eq!(store.len(), 1);
    store.remove("a").unwrap();
    assert!(store.is_empty());
    store.remove("a").unwrap();
}

#[test]
fn memory_keys_are_sorted() {
    let mut store = MemoryStore::new();
    store.set("b", "").unwrap();
    store.set("a", "").unwrap();
    assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
}

// =============================================================
// FileStore
// =============================================================

#[test]
fn file_roundtrips_namespaced_keys() {
    let mut store = temp_store();
    let key = format!("floorplan:draft:{}", Uuid::new_v4());
    store.set(&key, "{\"x\":1}").unwrap();
    assert_eq!(store.get(&key).unwrap().as_deref(), Some("{\"x\":1}"));
    assert_eq!(store.keys().unwrap(), vec![key.clone()]);
    fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn file_get_missing_is_none() {
    let store = temp_store();
    assert!(store.get("missing").unwrap().is_none());
    fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn file_remove_missing_is_ok() {
    let mut store = temp_store();
    store.remove("missing").unwrap();
    store.set("k", "v").unwrap();
    store.remove("k").unwrap();
    assert!(store.get("k").unwrap().is_none());
    assert!(store.keys().unwrap().is_empty());
    fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn file_keys_ignore_foreign_files() {
    let mut store = temp_store();
    store.set("one", "1").unwrap();
    fs::write(store.root().join("notes.txt"), "x").unwrap();
    assert_eq!(store.keys().unwrap(), vec!["one".to_string()]);
    fs::remove_dir_all(store.root()).unwrap();
}

#[test]
fn key_encoding_roundtrips() {
    for key in ["plain", "a:b:c", "with space", "üñí", "%25"] {
        assert_eq!(decode_key(&encode_key(key)).as_deref(), Some(key));
    }
    assert!(encode_key("a:b").chars().all(|c| c.is_ascii_alphanumeric() || c == '%' || c == '_' || c == '-'));
}

#[test]
fn decode_rejects_truncated_escape() {
    assert!(decode_key("abc%4").is_none());
    assert!(decode_key("abc%zz").is_none());
}

#[test]
fn decode_rejects_invalid_utf8() {
    assert!(decode_key("%ff%fe").is_none());
    assert_eq!(decode_key("%c3%bc").as_deref(), Some("ü"));
}
