//! Stroke data model: points, affine transforms, bounding boxes, and layers.
//!
//! Strokes are owned by the caller and are read-only to the engine. Point
//! timestamps are relative to the stroke's own start; `started_at` anchors
//! them on a shared clock so that gaps between strokes can be measured.
//!
//! All types serialize with the same field names the drawing front end uses
//! for its stroke dumps, so a JSON export can be fed straight to the engine.

#[cfg(test)]
#[path = "stroke_test.rs"]
mod stroke_test;

use serde::{Deserialize, Serialize};

/// Unique identifier for a stroke.
pub type StrokeId = String;

/// A point in world or stroke-local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A sampled pen position. `t` is milliseconds since the stroke started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    pub t: f64,
}

impl StrokePoint {
    #[must_use]
    pub fn new(x: f64, y: f64, t: f64) -> Self {
        Self { x, y, t }
    }

    #[must_use]
    pub fn position(self) -> Point {
        Point { x: self.x, y: self.y }
    }
}

/// 2D affine transform in canvas matrix order:
///
/// ```text
/// | a c e |
/// | b d f |
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform { a: 1.0, b: 0.0, c: 0.0, d: 1.0, e: 0.0, f: 0.0 };

    /// Pure translation by `(dx, dy)`.
    #[must_use]
    pub fn translate(dx: f64, dy: f64) -> Self {
        Self { e: dx, f: dy, ..Self::IDENTITY }
    }

    /// Uniform or non-uniform scale about the origin.
    #[must_use]
    pub fn scale(sx: f64, sy: f64) -> Self {
        Self { a: sx, d: sy, ..Self::IDENTITY }
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Map a point through this transform.
    #[must_use]
    pub fn apply(&self, p: Point) -> Point {
        Point {
            x: p.x * self.a + p.y * self.c + self.e,
            y: p.x * self.b + p.y * self.d + self.f,
        }
    }

    /// Compose two transforms; the result applies `other` first, then `self`.
    #[must_use]
    pub fn multiply(&self, other: &Transform) -> Transform {
        Transform {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            e: self.a * other.e + self.c * other.f + self.e,
            f: self.b * other.e + self.d * other.f + self.f,
        }
    }

    /// Inverse transform, or `None` when the matrix is singular.
    #[must_use]
    pub fn invert(&self) -> Option<Transform> {
        let det = self.a * self.d - self.b * self.c;
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Transform {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    /// Largest axis scale factor, never below 1. Used to pad boxes for brush width.
    #[must_use]
    pub fn max_scale(&self) -> f64 {
        self.a.hypot(self.b).max(self.c.hypot(self.d)).max(1.0)
    }
}

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
    pub width: f64,
    pub height: f64,
    pub center_x: f64,
    pub center_y: f64,
}

impl BoundingBox {
    /// Box spanning two corners, with the center at the geometric midpoint.
    #[must_use]
    pub fn from_corners(min: Point, max: Point) -> Self {
        Self {
            min_x: min.x,
            min_y: min.y,
            max_x: max.x,
            max_y: max.y,
            width: max.x - min.x,
            height: max.y - min.y,
            center_x: (min.x + max.x) / 2.0,
            center_y: (min.y + max.y) / 2.0,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point { x: self.center_x, y: self.center_y }
    }
}

/// Drawing layer a stroke belongs to. The caller clusters one layer at a time.
///
/// Serializes as a lowercase name. Deserializes from the name or from the
/// front end's numeric index (`0` background through `3` final).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "LayerRepr")]
pub enum Layer {
    Background,
    #[default]
    Start,
    End,
    Final,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    #[error("unknown layer index {0}, expected 0..=3")]
    Index(u64),
    #[error("unknown layer name `{0}`")]
    Name(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LayerRepr {
    Index(u64),
    Name(String),
}

impl TryFrom<LayerRepr> for Layer {
    type Error = LayerError;

    fn try_from(repr: LayerRepr) -> Result<Self, Self::Error> {
        match repr {
            LayerRepr::Index(i) => Self::from_index(i).ok_or(LayerError::Index(i)),
            LayerRepr::Name(name) => match name.as_str() {
                "background" => Ok(Self::Background),
                "start" => Ok(Self::Start),
                "end" => Ok(Self::End),
                "final" => Ok(Self::Final),
                _ => Err(LayerError::Name(name)),
            },
        }
    }
}

impl Layer {
    /// Layer for the front end's numeric index.
    #[must_use]
    pub fn from_index(index: u64) -> Option<Self> {
        match index {
            0 => Some(Self::Background),
            1 => Some(Self::Start),
            2 => Some(Self::End),
            3 => Some(Self::Final),
            _ => None,
        }
    }
}

/// One continuous pen gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    /// Points in stroke-local coordinates, in drawing order.
    pub points: Vec<StrokePoint>,
    #[serde(default)]
    pub color: String,
    /// Brush diameter in pixels.
    pub size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Transform>,
    /// Cached world-space bounds. Computed from the points when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding: Option<BoundingBox>,
    #[serde(default)]
    pub layer: Layer,
    /// Absolute time (ms) of the first point; point `t` values are offsets from it.
    #[serde(default, rename = "startedAt")]
    pub started_at: f64,
}

impl Stroke {
    /// Create a stroke on the default layer with a 2px black brush.
    #[must_use]
    pub fn new(id: impl Into<StrokeId>, points: Vec<StrokePoint>) -> Self {
        Self {
            id: id.into(),
            points,
            color: "#000000".to_owned(),
            size: 2.0,
            transform: None,
            bounding: None,
            layer: Layer::default(),
            started_at: 0.0,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    #[must_use]
    pub fn with_started_at(mut self, started_at: f64) -> Self {
        self.started_at = started_at;
        self
    }

    #[must_use]
    pub fn with_bounding(mut self, bounding: BoundingBox) -> Self {
        self.bounding = Some(bounding);
        self
    }

    /// The stroke's transform, identity when absent.
    #[must_use]
    pub fn transform(&self) -> Transform {
        self.transform.unwrap_or_default()
    }

    /// Points mapped into world space.
    #[must_use]
    pub fn world_points(&self) -> Vec<Point> {
        let t = self.transform();
        if t.is_identity() {
            return self.points.iter().map(|p| p.position()).collect();
        }
        self.points.iter().map(|p| t.apply(p.position())).collect()
    }

    /// Cached bounds if present, otherwise computed from the points.
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.bounding.or_else(|| calculate_bounding_box(std::slice::from_ref(self)))
    }
}

/// World-space bounds of a set of strokes, padded by half the widest brush.
///
/// The padding is scaled by the largest transform scale among the strokes.
/// The center is the midpoint of the unpadded point extent. Returns `None`
/// when no stroke has any points.
#[must_use]
pub fn calculate_bounding_box(strokes: &[Stroke]) -> Option<BoundingBox> {
    let mut min = Point::new(f64::INFINITY, f64::INFINITY);
    let mut max = Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    let mut max_scale = 1.0_f64;
    let mut max_brush = 0.0_f64;
    let mut any = false;

    for stroke in strokes {
        max_scale = max_scale.max(stroke.transform().max_scale());
        max_brush = max_brush.max(stroke.size);
        for p in stroke.world_points() {
            any = true;
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
    }

    if !any {
        return None;
    }

    let pad = max_brush * max_scale / 2.0;
    Some(BoundingBox {
        min_x: min.x - pad,
        min_y: min.y - pad,
        max_x: max.x + pad,
        max_y: max.y + pad,
        width: max.x - min.x + 2.0 * pad,
        height: max.y - min.y + 2.0 * pad,
        center_x: (min.x + max.x) / 2.0,
        center_y: (min.y + max.y) / 2.0,
    })
}
