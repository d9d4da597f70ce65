//! Caller-side stroke collection feeding the grouping engine.
//!
//! `StrokeStore` owns every live stroke on the board, keeps them in the order
//! they were first drawn, and hands the engine the subset on the active
//! layer. Replacing a stroke keeps its original position so that repeated
//! edits do not reshuffle the input order.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::HashMap;

use crate::stroke::{Layer, Stroke, StrokeId};

/// In-memory, insertion-ordered stroke store with an active layer.
#[derive(Debug, Clone, Default)]
pub struct StrokeStore {
    strokes: Vec<Stroke>,
    index: HashMap<StrokeId, usize>,
    active_layer: Layer,
}

impl StrokeStore {
    /// Create an empty store on the default layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a stroke. A replaced stroke keeps its position.
    /// Returns the previous stroke with the same id, if any.
    pub fn insert(&mut self, stroke: Stroke) -> Option<Stroke> {
        if let Some(&pos) = self.index.get(&stroke.id) {
            return Some(std::mem::replace(&mut self.strokes[pos], stroke));
        }
        self.index.insert(stroke.id.clone(), self.strokes.len());
        self.strokes.push(stroke);
        None
    }

    /// Remove a stroke by id, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<Stroke> {
        let pos = self.index.remove(id)?;
        let removed = self.strokes.remove(pos);
        for stroke in &self.strokes[pos..] {
            if let Some(slot) = self.index.get_mut(&stroke.id) {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Stroke> {
        self.index.get(id).map(|&pos| &self.strokes[pos])
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Drop every stroke. The active layer is kept.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.index.clear();
    }

    /// Replace all strokes with a full snapshot (undo/redo).
    pub fn load_snapshot(&mut self, strokes: Vec<Stroke>) {
        self.clear();
        for stroke in strokes {
            self.insert(stroke);
        }
    }

    /// Every stroke, in insertion order.
    #[must_use]
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Strokes on the active layer, in insertion order.
    #[must_use]
    pub fn active_strokes(&self) -> Vec<Stroke> {
        self.strokes
            .iter()
            .filter(|s| s.layer == self.active_layer)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn active_layer(&self) -> Layer {
        self.active_layer
    }

    pub fn set_active_layer(&mut self, layer: Layer) {
        self.active_layer = layer;
    }

    /// Number of strokes across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }
}
