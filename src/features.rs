//! Per-stroke feature extraction.
//!
//! Every grouping pass rebuilds one `StrokeFeatures` per stroke. Geometry is
//! taken in world space (transform applied). Durations and box dimensions are
//! floored at 1 so later stages can divide by them without producing NaN.

#[cfg(test)]
#[path = "features_test.rs"]
mod features_test;

use serde::Serialize;

use crate::consts::{CLOSED_LOOP_BRUSH_SCALE, MIN_CLOSED_LOOP_DISTANCE, MIN_FEATURE_EXTENT};
use crate::stroke::{BoundingBox, Point, Stroke, StrokeId};

/// Derived summary of one stroke, used for pairwise comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrokeFeatures {
    pub id: StrokeId,
    /// First world-space point.
    pub start: Point,
    /// Last world-space point.
    pub end: Point,
    /// Absolute time (ms) of the first point.
    pub start_time: f64,
    /// Absolute time (ms) of the last point.
    pub end_time: f64,
    /// `end_time - start_time`, at least 1ms.
    pub duration: f64,
    /// Path length: sum of distances between consecutive world points.
    pub length: f64,
    pub center: Point,
    pub width: f64,
    pub height: f64,
    /// Diagonal of `(width, height)`.
    pub size: f64,
    /// `length / duration`, in px per ms.
    pub speed: f64,
    pub brush_size: f64,
    /// The stroke ends close to where it started.
    pub closed_loop: bool,
}

/// Axis-aligned box derived from a feature's center and dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    /// `width × height`, at least 1.
    pub area: f64,
}

impl StrokeFeatures {
    #[must_use]
    pub fn bounds(&self) -> FeatureBounds {
        let half_w = self.width / 2.0;
        let half_h = self.height / 2.0;
        FeatureBounds {
            min_x: self.center.x - half_w,
            min_y: self.center.y - half_h,
            max_x: self.center.x + half_w,
            max_y: self.center.y + half_h,
            area: (self.width * self.height).max(MIN_FEATURE_EXTENT),
        }
    }
}

/// Extract features from a stroke. Returns `None` only for a stroke with no points.
#[must_use]
pub fn extract_features(stroke: &Stroke) -> Option<StrokeFeatures> {
    let (first, last) = (stroke.points.first()?, stroke.points.last()?);
    let points = stroke.world_points();
    let (start, end) = (*points.first()?, *points.last()?);

    let start_time = stroke.started_at + first.t;
    let end_time = stroke.started_at + last.t;
    let duration = (end_time - start_time).max(MIN_FEATURE_EXTENT);

    let length: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();

    let bounds = stroke
        .bounds()
        .unwrap_or_else(|| BoundingBox::from_corners(start, start));
    let width = bounds.width.max(MIN_FEATURE_EXTENT);
    let height = bounds.height.max(MIN_FEATURE_EXTENT);
    let size = width.hypot(height).max(MIN_FEATURE_EXTENT);

    let closed_loop =
        start.distance(end) <= MIN_CLOSED_LOOP_DISTANCE.max(stroke.size * CLOSED_LOOP_BRUSH_SCALE);

    Some(StrokeFeatures {
        id: stroke.id.clone(),
        start,
        end,
        start_time,
        end_time,
        duration,
        length,
        center: bounds.center(),
        width,
        height,
        size,
        speed: length / duration,
        brush_size: stroke.size,
        closed_loop,
    })
}
