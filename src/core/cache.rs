// src/core/cache.rs
//
// Content-addressed artifact cache shared by every on-demand requester.
// At most one computation runs per key; concurrent requesters wait on the
// same slot and receive the same `Arc`. Completed entries are evicted
// oldest first once the capacity is exceeded.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use super::artifact::VisualizationArtifact;
use super::pipeline::PipelineConfig;
use crate::error::{Result, VizError};

/// Completed entries kept by [`ArtifactCache::new`].
pub const DEFAULT_CAPACITY: usize = 256;

/// Compute the cache key from clip identifier and pipeline configuration.
///
/// Returns a 32-character hex md5 digest.
pub fn cache_key(clip_id: &str, config: &PipelineConfig) -> String {
    let mut input = Vec::with_capacity(clip_id.len() + 33);
    input.extend_from_slice(clip_id.as_bytes());
    input.push(0);
    input.extend_from_slice(config.fingerprint().as_bytes());
    format!("{:x}", md5::compute(&input))
}

#[derive(Debug)]
enum SlotState {
    Pending,
    Done(Arc<VisualizationArtifact>),
    /// The computation failed or its leader was cancelled; waiters re-check the map.
    Abandoned,
}

#[derive(Debug)]
struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

impl Slot {
    fn pending() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(SlotState::Pending),
            ready: Condvar::new(),
        })
    }

    fn settle(&self, state: SlotState) {
        *self.state.lock() = state;
        self.ready.notify_all();
    }
}

enum Role {
    Leader(Arc<Slot>),
    Waiter(Arc<Slot>),
    Hit(Arc<VisualizationArtifact>),
}

#[derive(Debug, Default)]
struct Entries {
    slots: HashMap<String, Arc<Slot>>,
    /// Keys of completed slots, oldest first
    completed: VecDeque<String>,
}

/// Shared, thread-safe artifact cache.
#[derive(Debug)]
pub struct ArtifactCache {
    entries: Mutex<Entries>,
    capacity: usize,
}

impl Default for ArtifactCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` completed artifacts (minimum 1).
    /// In-flight computations never count against the bound.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(Entries::default()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of completed entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .slots
            .values()
            .filter(|slot| matches!(*slot.state.lock(), SlotState::Done(_)))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, key: &str) -> Option<Arc<VisualizationArtifact>> {
        let slot = self.entries.lock().slots.get(key).cloned()?;
        let state = slot.state.lock();
        match &*state {
            SlotState::Done(artifact) => Some(Arc::clone(artifact)),
            _ => None,
        }
    }

    /// Drop every completed entry. Computations in flight keep their slots.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        entries.completed.clear();
        entries
            .slots
            .retain(|_, slot| matches!(*slot.state.lock(), SlotState::Pending));
    }

    /// Return the cached artifact for `key`, or run `compute` exactly once
    /// across all concurrent callers.
    ///
    /// Failures are not cached: the slot is dropped so a later call retries.
    /// When the computing caller fails with `Cancelled`, one of the waiters
    /// takes over instead of inheriting the cancellation.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Result<Arc<VisualizationArtifact>>
    where
        F: Fn() -> Result<VisualizationArtifact>,
    {
        loop {
            match self.claim(key) {
                Role::Hit(artifact) => {
                    log::debug!("cache hit {}", key);
                    return Ok(artifact);
                }
                Role::Leader(slot) => return self.lead(key, slot, &compute),
                Role::Waiter(slot) => {
                    if let Some(artifact) = wait_for(&slot) {
                        return Ok(artifact);
                    }
                    // Leader gave up; try to claim the key again.
                }
            }
        }
    }

    fn claim(&self, key: &str) -> Role {
        let mut entries = self.entries.lock();
        if let Some(slot) = entries.slots.get(key) {
            let state = slot.state.lock();
            match &*state {
                SlotState::Done(artifact) => return Role::Hit(Arc::clone(artifact)),
                SlotState::Pending => return Role::Waiter(Arc::clone(slot)),
                SlotState::Abandoned => {}
            }
        }
        let slot = Slot::pending();
        entries.slots.insert(key.to_string(), Arc::clone(&slot));
        Role::Leader(slot)
    }

    fn lead<F>(&self, key: &str, slot: Arc<Slot>, compute: &F) -> Result<Arc<VisualizationArtifact>>
    where
        F: Fn() -> Result<VisualizationArtifact>,
    {
        match compute() {
            Ok(artifact) => {
                let artifact = Arc::new(artifact);
                let mut entries = self.entries.lock();
                slot.settle(SlotState::Done(Arc::clone(&artifact)));
                if entries.slots.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                    entries.completed.push_back(key.to_string());
                    self.evict(&mut entries);
                }
                Ok(artifact)
            }
            Err(err) => {
                {
                    let mut entries = self.entries.lock();
                    if entries.slots.get(key).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
                        entries.slots.remove(key);
                    }
                }
                slot.settle(SlotState::Abandoned);
                if !matches!(err, VizError::Cancelled) {
                    log::debug!("cache compute failed for {}: {}", key, err);
                }
                Err(err)
            }
        }
    }

    fn evict(&self, entries: &mut Entries) {
        while entries.completed.len() > self.capacity {
            let Some(oldest) = entries.completed.pop_front() else {
                break;
            };
            entries.slots.remove(&oldest);
            log::debug!("cache evicted {}", oldest);
        }
    }
}

fn wait_for(slot: &Slot) -> Option<Arc<VisualizationArtifact>> {
    let mut state = slot.state.lock();
    while matches!(*state, SlotState::Pending) {
        slot.ready.wait(&mut state);
    }
    match &*state {
        SlotState::Done(artifact) => Some(Arc::clone(artifact)),
        _ => None,
    }
}
