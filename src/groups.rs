//! Grouping output and the query surface over it.
//!
//! A `GroupingResult` is an immutable partition of the input stroke ids.
//! Group ids come from transient union-find roots and change between
//! recomputes; callers that need an identity that survives a recompute use
//! [`GroupingResult::stable_group_id`] or [`GroupingResult::with_stable_ids`].

#[cfg(test)]
#[path = "groups_test.rs"]
mod groups_test;

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;

use crate::stroke::StrokeId;

/// Opaque group identifier. Not stable across recomputes.
pub type GroupId = String;

/// Partition of a stroke set into groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingResult {
    stroke_to_group: HashMap<StrokeId, GroupId>,
    groups: HashMap<GroupId, BTreeSet<StrokeId>>,
}

impl GroupingResult {
    /// Empty result (no strokes).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Put `stroke_id` into `group_id`, creating the group if needed.
    ///
    /// A stroke already assigned elsewhere is moved, so the maps stay exact inverses.
    pub(crate) fn assign(&mut self, stroke_id: StrokeId, group_id: GroupId) {
        if let Some(previous) = self.stroke_to_group.get(&stroke_id).cloned() {
            if let Some(members) = self.groups.get_mut(&previous) {
                members.remove(&stroke_id);
                if members.is_empty() {
                    self.groups.remove(&previous);
                }
            }
        }
        self.groups.entry(group_id.clone()).or_default().insert(stroke_id.clone());
        self.stroke_to_group.insert(stroke_id, group_id);
    }

    /// Stroke id → group id. Total over the strokes that were grouped.
    #[must_use]
    pub fn stroke_to_group(&self) -> &HashMap<StrokeId, GroupId> {
        &self.stroke_to_group
    }

    /// Group id → member stroke ids.
    #[must_use]
    pub fn groups(&self) -> &HashMap<GroupId, BTreeSet<StrokeId>> {
        &self.groups
    }

    #[must_use]
    pub fn group_id_for_stroke(&self, stroke_id: &str) -> Option<&GroupId> {
        self.stroke_to_group.get(stroke_id)
    }

    /// Member ids of a group, sorted. Empty for an unknown group.
    #[must_use]
    pub fn stroke_ids_in_group(&self, group_id: &str) -> Vec<StrokeId> {
        self.groups
            .get(group_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every stroke in the same group as `stroke_id`, including itself.
    ///
    /// A stroke the result does not know about is treated as its own object.
    #[must_use]
    pub fn group_members_for_stroke(&self, stroke_id: &str) -> Vec<StrokeId> {
        match self.stroke_to_group.get(stroke_id) {
            Some(group_id) => self.stroke_ids_in_group(group_id),
            None => vec![stroke_id.to_owned()],
        }
    }

    /// Identity for a group that survives recomputes: its smallest member id.
    #[must_use]
    pub fn stable_group_id(&self, group_id: &str) -> Option<&StrokeId> {
        self.groups.get(group_id).and_then(BTreeSet::first)
    }

    /// Copy of this result relabelled with stable group ids.
    #[must_use]
    pub fn with_stable_ids(&self) -> Self {
        let mut out = Self::new();
        for members in self.groups.values() {
            let Some(stable) = members.first() else {
                continue;
            };
            for id in members {
                out.assign(id.clone(), stable.clone());
            }
        }
        out
    }

    /// Canonical, label-free form: sorted groups of sorted ids.
    #[must_use]
    pub fn partition(&self) -> Vec<Vec<StrokeId>> {
        let mut parts: Vec<Vec<StrokeId>> = self
            .groups
            .values()
            .map(|members| members.iter().cloned().collect())
            .collect();
        parts.sort();
        parts
    }

    /// Both results group the same ids the same way, regardless of labels.
    #[must_use]
    pub fn same_partition(&self, other: &GroupingResult) -> bool {
        self.partition() == other.partition()
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of grouped strokes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stroke_to_group.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stroke_to_group.is_empty()
    }
}

/// Selection after the user picks `stroke_id` with group selection on.
///
/// Replacing mode selects exactly the stroke's group. Additive mode toggles
/// the group: it is removed when all members are already selected and added
/// otherwise. Order of the existing selection is preserved.
#[must_use]
pub fn select_group(result: &GroupingResult, selection: &[StrokeId], stroke_id: &str, additive: bool) -> Vec<StrokeId> {
    let members = result.group_members_for_stroke(stroke_id);
    if !additive {
        return members;
    }

    let current: HashSet<&str> = selection.iter().map(String::as_str).collect();
    let all_selected = members.iter().all(|id| current.contains(id.as_str()));
    if all_selected {
        let drop: HashSet<&str> = members.iter().map(String::as_str).collect();
        return selection
            .iter()
            .filter(|id| !drop.contains(id.as_str()))
            .cloned()
            .collect();
    }

    let mut out = selection.to_vec();
    for id in members {
        if !current.contains(id.as_str()) {
            out.push(id);
        }
    }
    out
}
