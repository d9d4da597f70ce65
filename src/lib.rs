//! Stroke grouping engine for a freehand drawing canvas.
//!
//! Strokes drawn close together in time or space, touching, or nested inside
//! one another are clustered into groups that the host selects and moves as
//! one object. Every recompute scores all stroke pairs from scratch and
//! partitions them with union-find; there is no incremental path.
//!
//! The pure entry point is [`recompute`]. Hosts with a live board wrap their
//! strokes in a [`GroupingService`], which debounces edits and publishes each
//! new [`GroupingResult`] to subscribers.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`stroke`] | Stroke, point, transform, and bounding-box types |
//! | [`settings`] | Validated grouping settings and env-driven service config |
//! | [`features`] | Per-stroke feature extraction |
//! | [`scoring`] | Pairwise temporal, spatial, geometry, and behavior scores |
//! | [`cluster`] | Session thresholds, burst rule, and union-find clustering |
//! | [`groups`] | Grouping result, query surface, and group selection |
//! | [`store`] | Insertion-ordered stroke store with an active layer |
//! | [`service`] | Debounced recompute and result publication |
//! | [`consts`] | Tuning constants (weights, gates, scales) |

pub mod cluster;
pub mod consts;
pub mod features;
pub mod groups;
pub mod scoring;
pub mod service;
pub mod settings;
pub mod store;
pub mod stroke;

pub use cluster::compute_groups;
pub use groups::{GroupId, GroupingResult, select_group};
pub use service::GroupingService;
pub use settings::{GroupingSettings, ServiceConfig, SettingsError};
pub use store::StrokeStore;
pub use stroke::{Layer, Stroke, StrokeId, StrokePoint, Transform};

/// Partition `strokes` into groups under `settings`. Pure and synchronous.
#[must_use]
pub fn recompute(strokes: &[Stroke], settings: &GroupingSettings) -> GroupingResult {
    compute_groups(strokes, settings)
}
