//! Pairwise affinity scoring.
//!
//! DESIGN
//! ======
//! Each unordered stroke pair gets four independent sub-scores in `[0, 1]`:
//!
//! - temporal: stretched-exponential decay of the smallest cross gap between
//!   the two strokes' start/end times.
//! - spatial: linear falloff of center distance over a range that grows with
//!   stroke extent and brush thickness.
//! - geometry: the strongest of box overlap, touching endpoints, sitting
//!   inside a closed loop, and bounding-box enclosure.
//! - behavior: similarity of drawing speed and path length.
//!
//! The combined score is a weighted sum, except that a strong temporal or
//! geometric signal lifts it to a near-certain floor, and a pair that is weak
//! on all of temporal, spatial, and geometry is rejected outright.

#[cfg(test)]
#[path = "scoring_test.rs"]
mod scoring_test;

use serde::Serialize;

use crate::consts::*;
use crate::features::StrokeFeatures;

/// Sub-scores and combined affinity for one stroke pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PairScore {
    pub temporal: f64,
    pub spatial: f64,
    pub geometry: f64,
    pub behavior: f64,
    /// Final 0–1 affinity after the high-confidence and gate rules.
    pub combined: f64,
}

impl PairScore {
    /// Plain weighted sum of the four sub-scores.
    #[must_use]
    pub fn weighted_sum(&self) -> f64 {
        WEIGHT_TEMPORAL * self.temporal
            + WEIGHT_SPATIAL * self.spatial
            + WEIGHT_GEOMETRY * self.geometry
            + WEIGHT_BEHAVIOR * self.behavior
    }
}

#[must_use]
pub fn clamp01(value: f64) -> f64 {
    if value <= 0.0 {
        0.0
    } else if value >= 1.0 {
        1.0
    } else {
        value
    }
}

// =============================================================================
// TEMPORAL
// =============================================================================

/// Smallest of the four cross gaps between two strokes' start and end times.
#[must_use]
pub fn temporal_delta_ms(a: &StrokeFeatures, b: &StrokeFeatures) -> f64 {
    (a.start_time - b.start_time)
        .abs()
        .min((a.end_time - b.end_time).abs())
        .min((a.end_time - b.start_time).abs())
        .min((b.end_time - a.start_time).abs())
}

/// Decay constant for the temporal score, in milliseconds.
#[must_use]
pub fn temporal_tau_ms(idle_time_secs: f64) -> f64 {
    MIN_TEMPORAL_TAU_MS.max(idle_time_secs * 1000.0)
}

#[must_use]
pub fn temporal_score(a: &StrokeFeatures, b: &StrokeFeatures, idle_time_secs: f64) -> f64 {
    let delta = temporal_delta_ms(a, b);
    let tau = temporal_tau_ms(idle_time_secs);
    (-(delta / tau).powf(TEMPORAL_DECAY_EXPONENT)).exp()
}

// =============================================================================
// SPATIAL
// =============================================================================

/// Center distance at which the spatial score reaches zero.
#[must_use]
pub fn spatial_range(a: &StrokeFeatures, b: &StrokeFeatures) -> f64 {
    MIN_SPATIAL_RANGE.max(
        (a.size + b.size) * SPATIAL_RANGE_SCALE + (a.brush_size + b.brush_size) * BRUSH_RANGE_SCALE,
    )
}

#[must_use]
pub fn spatial_score(a: &StrokeFeatures, b: &StrokeFeatures) -> f64 {
    1.0 - clamp01(a.center.distance(b.center) / spatial_range(a, b))
}

// =============================================================================
// GEOMETRY
// =============================================================================

/// Endpoint distance at or below which two strokes count as touching.
#[must_use]
pub fn endpoint_threshold(a: &StrokeFeatures, b: &StrokeFeatures) -> f64 {
    MIN_ENDPOINT_THRESHOLD.max((a.brush_size + b.brush_size) * ENDPOINT_THRESHOLD_SCALE)
}

fn boxes_overlap(a: &StrokeFeatures, b: &StrokeFeatures) -> bool {
    let (ab, bb) = (a.bounds(), b.bounds());
    let overlap_x = ab.max_x.min(bb.max_x) - ab.min_x.max(bb.min_x);
    let overlap_y = ab.max_y.min(bb.max_y) - ab.min_y.max(bb.min_y);
    overlap_x > 0.0 && overlap_y > 0.0
}

fn endpoints_touch(a: &StrokeFeatures, b: &StrokeFeatures) -> bool {
    let threshold = endpoint_threshold(a, b);
    [(a.start, b.start), (a.start, b.end), (a.end, b.start), (a.end, b.end)]
        .iter()
        .any(|(p, q)| p.distance(*q) <= threshold)
}

/// `other`'s center lies within `outer`'s closed loop.
fn inside_closed_loop(outer: &StrokeFeatures, other: &StrokeFeatures) -> bool {
    outer.closed_loop
        && outer.center.distance(other.center) <= outer.width.max(outer.height) * CLOSED_LOOP_CENTER_SCALE
}

/// How strongly `inner` looks like a detail drawn inside `outer`.
///
/// Zero unless most of `inner`'s box lies within `outer`'s. Peaks when the
/// inner box is about a fifth of the outer one, and is suppressed as the
/// outer box grows past a soft area cap so that a single huge stroke cannot
/// swallow everything drawn on top of it. Never exceeds
/// [`ENCLOSURE_MAX_SCORE`].
#[must_use]
pub fn enclosure_score(outer: &StrokeFeatures, inner: &StrokeFeatures) -> f64 {
    let ob = outer.bounds();
    let ib = inner.bounds();

    let ix = (ob.max_x.min(ib.max_x) - ob.min_x.max(ib.min_x)).max(0.0);
    let iy = (ob.max_y.min(ib.max_y) - ob.min_y.max(ib.min_y)).max(0.0);
    let portion = ix * iy / ib.area;
    if portion < ENCLOSURE_PORTION_THRESHOLD {
        return 0.0;
    }

    let ratio = ib.area / ob.area;
    let ratio_score = clamp01(1.0 - (ratio - ENCLOSURE_RATIO_TARGET).abs() / ENCLOSURE_RATIO_RANGE);

    let cap = ENCLOSURE_OUTER_AREA_SOFT_CAP;
    let outer_area = ob.area;
    let size_score = (1.0 / (1.0 + outer_area / cap)).powf(1.5);
    let small_outer_boost = clamp01(1.0 - outer_area / (cap * 0.5));
    let large_outer_penalty = clamp01(1.0 - outer_area / (cap * 2.0));
    let outer_factor = size_score * (0.6 + 0.4 * small_outer_boost) * (0.5 + 0.5 * large_outer_penalty);

    clamp01(portion * ratio_score * outer_factor) * ENCLOSURE_MAX_SCORE
}

#[must_use]
pub fn geometry_score(a: &StrokeFeatures, b: &StrokeFeatures) -> f64 {
    let mut score: f64 = 0.0;
    if boxes_overlap(a, b) {
        score = score.max(OVERLAP_SCORE);
    }
    if endpoints_touch(a, b) {
        score = score.max(ENDPOINT_SCORE);
    }
    if inside_closed_loop(a, b) || inside_closed_loop(b, a) {
        score = score.max(CLOSED_LOOP_SCORE);
    }
    score.max(enclosure_score(a, b)).max(enclosure_score(b, a))
}

// =============================================================================
// BEHAVIOR
// =============================================================================

fn similarity(a: f64, b: f64, floor: f64, tolerance: f64) -> f64 {
    let scale = a.max(b).max(floor);
    1.0 - clamp01((a - b).abs() / (scale * tolerance))
}

#[must_use]
pub fn behavior_score(a: &StrokeFeatures, b: &StrokeFeatures) -> f64 {
    let speed = similarity(a.speed, b.speed, MIN_SPEED_SCALE, SPEED_TOLERANCE);
    let length = similarity(a.length, b.length, MIN_LENGTH_SCALE, LENGTH_TOLERANCE);
    (speed + length) * 0.5
}

// =============================================================================
// COMBINED
// =============================================================================

/// Score a stroke pair. `idle_time_secs` sets the temporal decay constant.
#[must_use]
pub fn score_pair(a: &StrokeFeatures, b: &StrokeFeatures, idle_time_secs: f64) -> PairScore {
    let mut score = PairScore {
        temporal: temporal_score(a, b, idle_time_secs),
        spatial: spatial_score(a, b),
        geometry: geometry_score(a, b),
        behavior: behavior_score(a, b),
        combined: 0.0,
    };
    score.combined = combine(&score);
    score
}

fn combine(s: &PairScore) -> f64 {
    if s.temporal.max(s.geometry) >= HIGH_CONFIDENCE_THRESHOLD {
        return HIGH_CONFIDENCE_SCORE.max(s.weighted_sum());
    }
    if s.temporal < TEMPORAL_GATE && s.spatial < SPATIAL_GATE && s.geometry < GEOMETRY_GATE {
        return 0.0;
    }
    s.weighted_sum()
}
