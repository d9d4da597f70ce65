//! Shared numeric constants for the grouping engine.

// ── Pair score weights ──────────────────────────────────────────

/// Weight of the temporal sub-score in the combined pair score.
pub const WEIGHT_TEMPORAL: f64 = 0.4;

/// Weight of the spatial sub-score in the combined pair score.
pub const WEIGHT_SPATIAL: f64 = 0.35;

/// Weight of the geometry sub-score in the combined pair score.
pub const WEIGHT_GEOMETRY: f64 = 0.2;

/// Weight of the drawing-behavior sub-score in the combined pair score.
pub const WEIGHT_BEHAVIOR: f64 = 0.05;

// ── Features ────────────────────────────────────────────────────

/// Floor applied to durations (ms) and bounding-box dimensions before they are used as divisors.
pub const MIN_FEATURE_EXTENT: f64 = 1.0;

/// Minimum start/end distance that still counts as a closed loop.
pub const MIN_CLOSED_LOOP_DISTANCE: f64 = 10.0;

/// Closed-loop distance expressed in brush widths.
pub const CLOSED_LOOP_BRUSH_SCALE: f64 = 2.0;

// ── Temporal ────────────────────────────────────────────────────

/// Lower bound on the temporal decay constant, in milliseconds.
pub const MIN_TEMPORAL_TAU_MS: f64 = 1000.0;

/// Exponent of the stretched-exponential temporal decay.
pub const TEMPORAL_DECAY_EXPONENT: f64 = 1.35;

// ── Spatial ─────────────────────────────────────────────────────

pub const MIN_SPATIAL_RANGE: f64 = 40.0;
pub const SPATIAL_RANGE_SCALE: f64 = 0.5;
pub const BRUSH_RANGE_SCALE: f64 = 2.0;

// ── Geometry ────────────────────────────────────────────────────

/// Geometry score when two bounding boxes overlap.
pub const OVERLAP_SCORE: f64 = 0.6;

/// Geometry score when two endpoints nearly touch.
pub const ENDPOINT_SCORE: f64 = 0.9;

/// Geometry score when one stroke sits inside a closed loop.
pub const CLOSED_LOOP_SCORE: f64 = 0.7;

pub const MIN_ENDPOINT_THRESHOLD: f64 = 10.0;
pub const ENDPOINT_THRESHOLD_SCALE: f64 = 1.5;
pub const CLOSED_LOOP_CENTER_SCALE: f64 = 0.6;

// ── Enclosure ───────────────────────────────────────────────────

/// Share of the inner box that must lie inside the outer box.
pub const ENCLOSURE_PORTION_THRESHOLD: f64 = 0.6;

/// Inner/outer area ratio that scores best (eye inside a face).
pub const ENCLOSURE_RATIO_TARGET: f64 = 0.2;

/// Distance from the target ratio at which the ratio score reaches zero.
pub const ENCLOSURE_RATIO_RANGE: f64 = 0.25;

/// Outer area (px²) beyond which enclosure is progressively suppressed.
pub const ENCLOSURE_OUTER_AREA_SOFT_CAP: f64 = 60_000.0;

/// Upper bound on any enclosure score; enclosure alone never forces a merge.
pub const ENCLOSURE_MAX_SCORE: f64 = 0.85;

// ── Behavior ────────────────────────────────────────────────────

pub const SPEED_TOLERANCE: f64 = 2.0;
pub const LENGTH_TOLERANCE: f64 = 1.5;
pub const MIN_SPEED_SCALE: f64 = 1e-3;
pub const MIN_LENGTH_SCALE: f64 = 1.0;

// ── Decision ────────────────────────────────────────────────────

/// A temporal or geometry score at or above this forces a near-certain merge.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 0.85;

/// Pair score floor applied on the high-confidence path.
pub const HIGH_CONFIDENCE_SCORE: f64 = 0.95;

pub const TEMPORAL_GATE: f64 = 0.2;
pub const SPATIAL_GATE: f64 = 0.4;
pub const GEOMETRY_GATE: f64 = 0.6;

// ── Clustering ──────────────────────────────────────────────────

/// The adaptive threshold is never relaxed below this (or the behavior threshold, if lower).
pub const ADAPTIVE_THRESHOLD_FLOOR: f64 = 0.3;

/// Threshold relaxation per unit of pair affinity.
pub const AFFINITY_RELAXATION: f64 = 0.1;

/// Per-pair threshold relaxation per unit of behavior flow.
pub const FLOW_PAIR_RELAXATION: f64 = 0.04;

/// Session-wide threshold relaxation per unit of behavior flow.
pub const FLOW_THRESHOLD_RELAXATION: f64 = 0.05;

/// How much an uneven session stretches the idle window.
pub const IDLE_STRETCH: f64 = 0.75;

pub const BURST_WINDOW_SCALE: f64 = 1.1;
pub const BURST_MIN_SPATIAL: f64 = 0.6;
pub const BURST_STRONG_SPATIAL: f64 = 0.75;
pub const BURST_MIN_GEOMETRY: f64 = 0.5;

/// Share of the behavior threshold a burst pair must still reach.
pub const BURST_SCORE_RATIO: f64 = 0.85;

// ── Behavior flow ───────────────────────────────────────────────

pub const FLOW_SPEED_WEIGHT: f64 = 0.6;
pub const FLOW_GAP_WEIGHT: f64 = 0.4;
pub const FLOW_GAP_SCALE: f64 = 1.5;
pub const FLOW_SPEED_CV_CAP: f64 = 2.0;

// ── Settings ────────────────────────────────────────────────────

pub const DEFAULT_GROUPING_THRESHOLD: f64 = 0.5;
pub const DEFAULT_IDLE_TIME_SECS: f64 = 1.5;

/// Smallest idle time `GroupingSettings::clamped` will produce.
pub const MIN_IDLE_TIME_SECS: f64 = 0.05;

/// Quiet period before a burst of stroke edits triggers one recompute.
pub const DEFAULT_DEBOUNCE_MS: u64 = 600;
