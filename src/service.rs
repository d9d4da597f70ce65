//! Debounced grouping service over a live stroke store.
//!
//! DESIGN
//! ======
//! `GroupingService` is a cloneable handle; every clone shares one store,
//! one settings value, and one published result. Each mutation resets a
//! single pending timer slot (cancel-and-replace), so a burst of edits during
//! continuous drawing collapses into one recompute once the board has been
//! quiet for the debounce window. Undo/redo and explicit requests skip the
//! timer and recompute on the spot.
//!
//! Results are published through a `tokio::sync::watch` channel as
//! `Arc<GroupingResult>`: readers see the latest complete result, never a
//! half-built one.
//!
//! LOCKING
//! =======
//! Store, settings, and a generation counter share one `RwLock`. A recompute
//! clones the active strokes under the read lock, releases it, and runs the
//! O(n²) pass unlocked. Publication is guarded by the generation: a result
//! computed from an older snapshot never replaces one from a newer snapshot.
//! Locks are `std::sync` and never held across an await; poisoned locks are
//! recovered.

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cluster::compute_groups;
use crate::groups::{GroupId, GroupingResult, select_group};
use crate::settings::{GroupingSettings, ServiceConfig};
use crate::store::StrokeStore;
use crate::stroke::{Layer, Stroke, StrokeId};

// =============================================================================
// TYPES
// =============================================================================

/// Shared handle to the grouping pipeline. Cheap to clone.
#[derive(Clone)]
pub struct GroupingService {
    inner: Arc<Inner>,
}

struct Inner {
    debounce: Duration,
    state: RwLock<State>,
    result_tx: watch::Sender<Arc<GroupingResult>>,
    /// Generation of the snapshot behind the published result.
    published: Mutex<u64>,
    pending: Mutex<Option<JoinHandle<()>>>,
    recomputes: AtomicU64,
}

struct State {
    store: StrokeStore,
    settings: GroupingSettings,
    /// Bumped on every mutation that can change the result.
    generation: u64,
}

impl Default for GroupingService {
    fn default() -> Self {
        Self::new(ServiceConfig::default())
    }
}

impl GroupingService {
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        let debounce_ms = u64::try_from(config.debounce.as_millis()).unwrap_or(u64::MAX);
        info!(
            debounce_ms,
            grouping_threshold = config.settings.grouping_threshold(),
            idle_time = config.settings.idle_time(),
            "grouping service configured"
        );
        let (result_tx, _) = watch::channel(Arc::new(GroupingResult::new()));
        Self {
            inner: Arc::new(Inner {
                debounce: config.debounce,
                state: RwLock::new(State { store: StrokeStore::new(), settings: config.settings, generation: 0 }),
                result_tx,
                published: Mutex::new(0),
                pending: Mutex::new(None),
                recomputes: AtomicU64::new(0),
            }),
        }
    }

    /// Service configured from `INKGROUP_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ServiceConfig::from_env())
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Add a stroke (or replace one with the same id) and schedule a recompute.
    pub fn add_stroke(&self, stroke: Stroke) {
        self.mutate(|state| {
            state.store.insert(stroke);
            true
        });
    }

    /// Replace an existing stroke. Returns `false` and does nothing if the id is unknown.
    pub fn update_stroke(&self, stroke: Stroke) -> bool {
        self.mutate(|state| {
            if !state.store.contains(&stroke.id) {
                return false;
            }
            state.store.insert(stroke);
            true
        })
    }

    /// Remove a stroke. Returns `false` and does nothing if the id is unknown.
    pub fn delete_stroke(&self, id: &str) -> bool {
        self.mutate(|state| state.store.remove(id).is_some())
    }

    pub fn set_settings(&self, settings: GroupingSettings) {
        self.mutate(|state| {
            state.settings = settings;
            true
        });
    }

    pub fn set_active_layer(&self, layer: Layer) {
        self.mutate(|state| {
            state.store.set_active_layer(layer);
            true
        });
    }

    /// Replace every stroke with `strokes` and recompute immediately (undo/redo).
    pub fn apply_snapshot(&self, strokes: Vec<Stroke>) {
        {
            let mut state = self.write_state();
            state.store.load_snapshot(strokes);
            state.generation += 1;
        }
        self.recompute_now();
    }

    /// Drop every stroke and publish the empty result immediately.
    pub fn clear(&self) {
        {
            let mut state = self.write_state();
            state.store.clear();
            state.generation += 1;
        }
        self.recompute_now();
    }

    fn mutate(&self, f: impl FnOnce(&mut State) -> bool) -> bool {
        let changed = {
            let mut state = self.write_state();
            let changed = f(&mut state);
            if changed {
                state.generation += 1;
            }
            changed
        };
        if changed {
            self.schedule_recompute();
        }
        changed
    }

    // =========================================================================
    // SCHEDULING
    // =========================================================================

    /// Reset the debounce timer. Only the last call in a burst recomputes.
    ///
    /// Outside a tokio runtime there is no timer to arm, so the recompute
    /// runs immediately instead.
    pub fn schedule_recompute(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!("no async runtime; recomputing without debounce");
            self.recompute_now();
            return;
        };
        let mut pending = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let service = self.clone();
        let debounce = self.inner.debounce;
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            service.recompute();
        }));
    }

    /// Cancel any pending timer and recompute synchronously.
    pub fn recompute_now(&self) -> Arc<GroupingResult> {
        self.cancel_pending();
        self.recompute()
    }

    /// A debounced recompute is armed and has not run yet.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn cancel_pending(&self) {
        let previous = self.inner.pending.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = previous {
            handle.abort();
        }
    }

    fn recompute(&self) -> Arc<GroupingResult> {
        let (strokes, settings, generation) = {
            let state = self.read_state();
            (state.store.active_strokes(), state.settings, state.generation)
        };

        let result = Arc::new(compute_groups(&strokes, &settings));
        self.inner.recomputes.fetch_add(1, Ordering::Relaxed);

        let mut published = self.inner.published.lock().unwrap_or_else(PoisonError::into_inner);
        if generation < *published {
            debug!(generation, published = *published, "stale grouping result dropped");
            return self.result();
        }
        *published = generation;
        self.inner.result_tx.send_replace(Arc::clone(&result));
        result
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Latest published result.
    #[must_use]
    pub fn result(&self) -> Arc<GroupingResult> {
        Arc::clone(&self.inner.result_tx.borrow())
    }

    /// Receiver notified on every published result.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<GroupingResult>> {
        self.inner.result_tx.subscribe()
    }

    /// Number of completed recomputes.
    #[must_use]
    pub fn recompute_count(&self) -> u64 {
        self.inner.recomputes.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn settings(&self) -> GroupingSettings {
        self.read_state().settings
    }

    #[must_use]
    pub fn active_layer(&self) -> Layer {
        self.read_state().store.active_layer()
    }

    /// Strokes on the active layer, in insertion order.
    #[must_use]
    pub fn active_strokes(&self) -> Vec<Stroke> {
        self.read_state().store.active_strokes()
    }

    #[must_use]
    pub fn stroke(&self, id: &str) -> Option<Stroke> {
        self.read_state().store.get(id).cloned()
    }

    #[must_use]
    pub fn group_id_for_stroke(&self, stroke_id: &str) -> Option<GroupId> {
        self.result().group_id_for_stroke(stroke_id).cloned()
    }

    #[must_use]
    pub fn stroke_ids_in_group(&self, group_id: &str) -> Vec<StrokeId> {
        self.result().stroke_ids_in_group(group_id)
    }

    #[must_use]
    pub fn group_members_for_stroke(&self, stroke_id: &str) -> Vec<StrokeId> {
        self.result().group_members_for_stroke(stroke_id)
    }

    /// See [`select_group`].
    #[must_use]
    pub fn select_group(&self, selection: &[StrokeId], stroke_id: &str, additive: bool) -> Vec<StrokeId> {
        select_group(&self.result(), selection, stroke_id, additive)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, State> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, State> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
