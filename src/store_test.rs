use super::*;
use crate::stroke::StrokePoint;

fn stroke(id: &str) -> Stroke {
    Stroke::new(id, vec![StrokePoint::new(0.0, 0.0, 0.0)])
}

fn ids(store: &StrokeStore) -> Vec<&str> {
    store.strokes().iter().map(|s| s.id.as_str()).collect()
}

// =============================================================
// Basic CRUD
// =============================================================

#[test]
fn new_store_is_empty() {
    let store = StrokeStore::new();
    assert!(store.is_empty());
    assert_eq!(store.len(), 0);
    assert_eq!(store.active_layer(), Layer::Start);
}

#[test]
fn insert_and_get() {
    let mut store = StrokeStore::new();
    assert!(store.insert(stroke("a")).is_none());
    assert_eq!(store.get("a").map(|s| s.id.as_str()), Some("a"));
    assert!(store.contains("a"));
    assert!(store.get("b").is_none());
}

#[test]
fn insert_keeps_order() {
    let mut store = StrokeStore::new();
    for id in ["c", "a", "b"] {
        store.insert(stroke(id));
    }
    assert_eq!(ids(&store), ["c", "a", "b"]);
}

#[test]
fn replace_keeps_position() {
    let mut store = StrokeStore::new();
    for id in ["a", "b", "c"] {
        store.insert(stroke(id));
    }
    let previous = store.insert(stroke("b").with_size(9.0));
    assert_eq!(previous.map(|s| s.size), Some(2.0));
    assert_eq!(ids(&store), ["a", "b", "c"]);
    assert_eq!(store.get("b").map(|s| s.size), Some(9.0));
    assert_eq!(store.len(), 3);
}

#[test]
fn remove_reindexes_tail() {
    let mut store = StrokeStore::new();
    for id in ["a", "b", "c", "d"] {
        store.insert(stroke(id));
    }
    assert_eq!(store.remove("b").map(|s| s.id), Some("b".to_owned()));
    assert_eq!(ids(&store), ["a", "c", "d"]);
    assert_eq!(store.get("d").map(|s| s.id.as_str()), Some("d"));
    assert_eq!(store.get("c").map(|s| s.id.as_str()), Some("c"));
    assert!(store.remove("b").is_none());
}

#[test]
fn clear_keeps_layer() {
    let mut store = StrokeStore::new();
    store.insert(stroke("a"));
    store.set_active_layer(Layer::End);
    store.clear();
    assert!(store.is_empty());
    assert!(!store.contains("a"));
    assert_eq!(store.active_layer(), Layer::End);
}

// =============================================================
// Snapshots and layers
// =============================================================

#[test]
fn load_snapshot_replaces_everything() {
    let mut store = StrokeStore::new();
    store.insert(stroke("old"));
    store.load_snapshot(vec![stroke("x"), stroke("y")]);
    assert_eq!(ids(&store), ["x", "y"]);
    assert!(store.get("old").is_none());
}

#[test]
fn load_snapshot_collapses_duplicates() {
    let mut store = StrokeStore::new();
    store.load_snapshot(vec![stroke("x"), stroke("y"), stroke("x").with_size(5.0)]);
    assert_eq!(ids(&store), ["x", "y"]);
    assert_eq!(store.get("x").map(|s| s.size), Some(5.0));
}

#[test]
fn active_strokes_filter_by_layer() {
    let mut store = StrokeStore::new();
    store.insert(stroke("s1"));
    store.insert(stroke("e1").with_layer(Layer::End));
    store.insert(stroke("s2"));
    store.insert(stroke("b1").with_layer(Layer::Background));

    let start: Vec<_> = store.active_strokes().into_iter().map(|s| s.id).collect();
    assert_eq!(start, ["s1", "s2"]);

    store.set_active_layer(Layer::End);
    let end: Vec<_> = store.active_strokes().into_iter().map(|s| s.id).collect();
    assert_eq!(end, ["e1"]);

    store.set_active_layer(Layer::Final);
    assert!(store.active_strokes().is_empty());
    assert_eq!(store.len(), 4);
}
