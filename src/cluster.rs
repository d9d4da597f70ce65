//! Cluster building: turn pair scores into a partition.
//!
//! DESIGN
//! ======
//! Strokes are indexed by position in the feature list and merged with a
//! flat-array union-find. Every unordered pair is scored once (O(n²)); a pair
//! is merged when its score clears a per-pair adaptive threshold, or when it
//! qualifies as a burst (rapid consecutive strokes of one gesture that land
//! just under the bar).
//!
//! Before scoring, the whole session is summarised into a behavior-flow
//! value in `[0, 1]`: steady drawing speed and short pauses mean high flow.
//! High flow relaxes the threshold slightly; low flow stretches the idle
//! window so that hesitant drawing is not split apart.
//!
//! Strokes without points have no features; they are appended afterwards as
//! singleton groups so that the result covers every input stroke.

#[cfg(test)]
#[path = "cluster_test.rs"]
mod cluster_test;

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::consts::*;
use crate::features::{StrokeFeatures, extract_features};
use crate::groups::{GroupId, GroupingResult};
use crate::scoring::{PairScore, clamp01, score_pair, temporal_delta_ms, temporal_tau_ms};
use crate::settings::GroupingSettings;
use crate::stroke::Stroke;

// =============================================================================
// UNION-FIND
// =============================================================================

/// Disjoint-set forest over `0..n` with path halving.
#[derive(Debug, Clone)]
pub(crate) struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    pub(crate) fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    pub(crate) fn find(&mut self, i: usize) -> usize {
        let mut curr = i;
        while self.parent[curr] != curr {
            self.parent[curr] = self.parent[self.parent[curr]];
            curr = self.parent[curr];
        }
        curr
    }

    /// Merge the sets of `a` and `b`; `a`'s root becomes the root. Returns
    /// `false` when they were already joined.
    pub(crate) fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        self.parent[rb] = ra;
        true
    }
}

// =============================================================================
// SESSION BEHAVIOR
// =============================================================================

/// Aggregate drawing behavior over every stroke in one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SessionBehavior {
    pub mean_speed: f64,
    /// Coefficient of variation of stroke speed; 0 when strokes barely move.
    pub speed_cv: f64,
    /// Mean pause between consecutive strokes, ordered by start time.
    pub mean_gap_ms: f64,
    pub mean_brush: f64,
    pub mean_length: f64,
}

impl SessionBehavior {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn summarize(features: &[StrokeFeatures]) -> Self {
        if features.is_empty() {
            return Self::default();
        }
        let n = features.len() as f64;

        let mut sum_speed = 0.0;
        let mut sum_speed_sq = 0.0;
        let mut sum_brush = 0.0;
        let mut sum_length = 0.0;
        for f in features {
            sum_speed += f.speed;
            sum_speed_sq += f.speed * f.speed;
            sum_brush += f.brush_size;
            sum_length += f.length;
        }
        let mean_speed = sum_speed / n;
        let variance = (sum_speed_sq / n - mean_speed * mean_speed).max(0.0);
        let speed_cv = if mean_speed > MIN_SPEED_SCALE { variance.sqrt() / mean_speed } else { 0.0 };

        let mut by_start: Vec<&StrokeFeatures> = features.iter().collect();
        by_start.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        let gap_sum: f64 = by_start
            .windows(2)
            .map(|w| (w[1].start_time - w[0].end_time).max(0.0))
            .sum();
        let mean_gap_ms = if by_start.len() > 1 { gap_sum / (by_start.len() - 1) as f64 } else { 0.0 };

        Self { mean_speed, speed_cv, mean_gap_ms, mean_brush: sum_brush / n, mean_length: sum_length / n }
    }

    /// Smoothness of the session in `[0, 1]`, from speed consistency and pause length.
    #[must_use]
    pub fn flow(&self, idle_time_secs: f64) -> f64 {
        let gap_norm = if idle_time_secs > 0.0 { self.mean_gap_ms / (idle_time_secs * 1000.0) } else { 0.0 };
        let gap_score = clamp01(1.0 - gap_norm / FLOW_GAP_SCALE);
        let speed_consistency = clamp01(1.0 - self.speed_cv.min(FLOW_SPEED_CV_CAP) / FLOW_SPEED_CV_CAP);
        clamp01(FLOW_SPEED_WEIGHT * speed_consistency + FLOW_GAP_WEIGHT * gap_score)
    }
}

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Session-wide parameters derived from the settings and the behavior flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionThresholds {
    pub flow: f64,
    /// Idle time (seconds) used for temporal scores in this pass.
    pub idle_time: f64,
    /// Base threshold after the session-wide flow relaxation.
    pub behavior_threshold: f64,
}

impl SessionThresholds {
    #[must_use]
    pub fn new(settings: &GroupingSettings, features: &[StrokeFeatures]) -> Self {
        let flow = if features.is_empty() {
            0.0
        } else {
            SessionBehavior::summarize(features).flow(settings.idle_time())
        };
        Self {
            flow,
            idle_time: settings.idle_time() * (1.0 + IDLE_STRETCH * (1.0 - flow)),
            behavior_threshold: clamp01(settings.grouping_threshold() - FLOW_THRESHOLD_RELAXATION * flow),
        }
    }

    /// Merge bar for one pair, relaxed by the pair's temporal/spatial affinity.
    #[must_use]
    pub fn adaptive_threshold(&self, score: &PairScore) -> f64 {
        let affinity = (score.temporal + score.spatial) * 0.5;
        let floor = ADAPTIVE_THRESHOLD_FLOOR.min(self.behavior_threshold);
        floor.max(self.behavior_threshold - AFFINITY_RELAXATION * affinity - FLOW_PAIR_RELAXATION * self.flow)
    }

    /// Rapid consecutive strokes close in space that score just under the bar.
    #[must_use]
    pub fn is_burst(&self, delta_ms: f64, score: &PairScore) -> bool {
        let window = temporal_tau_ms(self.idle_time) * BURST_WINDOW_SCALE;
        delta_ms <= window
            && score.spatial >= BURST_MIN_SPATIAL
            && (score.geometry >= BURST_MIN_GEOMETRY || score.spatial >= BURST_STRONG_SPATIAL)
            && score.combined >= self.behavior_threshold * BURST_SCORE_RATIO
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

/// Partition `strokes` into groups. Pure: every call is a full recompute.
///
/// Strokes must have unique ids; a repeated id is grouped once, at its first
/// occurrence.
#[must_use]
pub fn compute_groups(strokes: &[Stroke], settings: &GroupingSettings) -> GroupingResult {
    let mut seen: HashSet<&str> = HashSet::with_capacity(strokes.len());
    let mut unique: Vec<&Stroke> = Vec::with_capacity(strokes.len());
    for stroke in strokes {
        if seen.insert(stroke.id.as_str()) {
            unique.push(stroke);
        } else {
            warn!(stroke_id = %stroke.id, "duplicate stroke id skipped");
        }
    }

    let features: Vec<StrokeFeatures> = unique.iter().filter_map(|s| extract_features(s)).collect();
    let session = SessionThresholds::new(settings, &features);

    let mut sets = UnionFind::new(features.len());
    let mut merges = 0usize;
    for i in 0..features.len() {
        for j in (i + 1)..features.len() {
            let (a, b) = (&features[i], &features[j]);
            let score = score_pair(a, b, session.idle_time);
            let merge = if score.combined >= session.adaptive_threshold(&score) {
                true
            } else if session.is_burst(temporal_delta_ms(a, b), &score) {
                trace!(a = %a.id, b = %b.id, score = score.combined, "burst merge");
                true
            } else {
                false
            };
            if merge && sets.union(i, j) {
                merges += 1;
            }
        }
    }

    let mut result = GroupingResult::new();
    for (i, f) in features.iter().enumerate() {
        let root = sets.find(i);
        result.assign(f.id.clone(), cluster_group_id(root));
    }
    for stroke in &unique {
        if result.group_id_for_stroke(&stroke.id).is_none() {
            result.assign(stroke.id.clone(), singleton_group_id(&stroke.id));
        }
    }

    debug!(
        strokes = unique.len(),
        featured = features.len(),
        groups = result.group_count(),
        merges,
        flow = session.flow,
        "grouping recomputed"
    );
    result
}

fn cluster_group_id(root: usize) -> GroupId {
    format!("group_{root}")
}

fn singleton_group_id(stroke_id: &str) -> GroupId {
    format!("group_stroke_{stroke_id}")
}
