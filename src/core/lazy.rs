// src/core/lazy.rs
//
// On-demand artifact computation for UI-bound clip references.
//
// ```text
// Idle ──[visible]──► Loading ──[ok]──► Ready
//                             ──[err]──► Error ──[retry]──► Loading
// Any ──[clip ref changes]──► Idle
// Any ──[dispose]──► (in-flight work cancelled, handle inert)
// ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use uuid::Uuid;

use super::artifact::VisualizationArtifact;
use super::cache::{cache_key, ArtifactCache};
use super::pipeline::ClipPipeline;
use super::source::ByteSource;
use crate::error::{Result, VizError};

pub const DEFAULT_THRESHOLD: f32 = 0.1;
pub const DEFAULT_LOOKAHEAD: f32 = 50.0;

/// Lifecycle of one clip reference.
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    /// Not yet visible.
    #[default]
    Idle,
    /// Fetch and compute running in the background.
    Loading,
    Ready(Arc<VisualizationArtifact>),
    /// Failed; waits for a user-triggered retry.
    Error(String),
}

impl LoadState {
    pub fn is_idle(&self) -> bool {
        matches!(self, LoadState::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, LoadState::Ready(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    pub fn artifact(&self) -> Option<&Arc<VisualizationArtifact>> {
        match self {
            LoadState::Ready(artifact) => Some(artifact),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading => "loading",
            LoadState::Ready(_) => "ready",
            LoadState::Error(_) => "error",
        }
    }
}

/// Vertical extent in layout coordinates (top < bottom).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f32,
    pub bottom: f32,
}

impl Span {
    pub fn new(top: f32, bottom: f32) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f32 {
        (self.bottom - self.top).max(0.0)
    }
}

/// Proximity rule deciding when an element counts as about to be shown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityPolicy {
    /// Fraction of the element that must fall inside the grown viewport
    pub threshold: f32,
    /// Margin added above and below the viewport
    pub lookahead: f32,
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            lookahead: DEFAULT_LOOKAHEAD,
        }
    }
}

impl VisibilityPolicy {
    pub fn is_visible(&self, element: Span, viewport: Span) -> bool {
        let grown = Span::new(viewport.top - self.lookahead, viewport.bottom + self.lookahead);
        let touching = element.top <= grown.bottom && element.bottom >= grown.top;
        if !touching {
            return false;
        }

        let height = element.height();
        if height <= 0.0 || self.threshold <= 0.0 {
            return true;
        }
        let overlap = element.bottom.min(grown.bottom) - element.top.max(grown.top);
        overlap / height >= self.threshold
    }
}

struct Shared {
    /// (generation, state); results from an older generation are discarded
    state: Mutex<(u64, LoadState)>,
    changed: Condvar,
}

struct Task {
    cancel: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Task {
    fn cancel(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        // Detach: the worker drops its buffers as soon as it observes the flag.
        self.handle.take();
    }
}

/// Lazily computed artifact bound to one UI element.
pub struct LazyClip {
    id: Uuid,
    clip_ref: String,
    source: Arc<dyn ByteSource>,
    pipeline: Arc<ClipPipeline>,
    cache: Option<Arc<ArtifactCache>>,
    policy: VisibilityPolicy,
    shared: Arc<Shared>,
    task: Option<Task>,
    disposed: bool,
}

impl LazyClip {
    pub fn new(
        clip_ref: impl Into<String>,
        source: Arc<dyn ByteSource>,
        pipeline: Arc<ClipPipeline>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            clip_ref: clip_ref.into(),
            source,
            pipeline,
            cache: None,
            policy: VisibilityPolicy::default(),
            shared: Arc::new(Shared {
                state: Mutex::new((0, LoadState::Idle)),
                changed: Condvar::new(),
            }),
            task: None,
            disposed: false,
        }
    }

    /// Share computed artifacts with other handles through `cache`.
    pub fn with_cache(mut self, cache: Arc<ArtifactCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_policy(mut self, policy: VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn clip_ref(&self) -> &str {
        &self.clip_ref
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn state(&self) -> LoadState {
        self.shared.state.lock().1.clone()
    }

    /// Visibility signal from the UI. Starts loading from `Idle` when the
    /// element is within reach of the viewport; returns whether it did.
    pub fn on_visibility(&mut self, element: Span, viewport: Span) -> bool {
        if self.disposed || !self.state().is_idle() {
            return false;
        }
        if !self.policy.is_visible(element, viewport) {
            return false;
        }
        self.begin();
        true
    }

    /// Start loading immediately, regardless of visibility. Only from `Idle`.
    pub fn load_now(&mut self) -> bool {
        if self.disposed || !self.state().is_idle() {
            return false;
        }
        self.begin();
        true
    }

    /// User-triggered retry. Only leaves `Error`.
    pub fn retry(&mut self) -> bool {
        if self.disposed || !self.state().is_error() {
            return false;
        }
        log::debug!("[{}] retrying {}", self.id, self.clip_ref);
        self.begin();
        true
    }

    /// Point the handle at another clip. Cancels in-flight work and resets to `Idle`.
    pub fn set_clip_ref(&mut self, clip_ref: impl Into<String>) {
        let clip_ref = clip_ref.into();
        if self.disposed || clip_ref == self.clip_ref {
            return;
        }
        self.cancel_task();
        self.clip_ref = clip_ref;
        let mut guard = self.shared.state.lock();
        guard.0 += 1;
        guard.1 = LoadState::Idle;
        self.shared.changed.notify_all();
    }

    /// Element removed: abandon any in-flight computation. The handle is inert afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.cancel_task();
        let mut guard = self.shared.state.lock();
        guard.0 += 1;
        if guard.1.is_loading() {
            guard.1 = LoadState::Idle;
        }
        self.shared.changed.notify_all();
        log::debug!("[{}] disposed {}", self.id, self.clip_ref);
    }

    /// Block until the state leaves `Loading` or `timeout` elapses.
    pub fn wait(&self, timeout: Duration) -> LoadState {
        let deadline = Instant::now() + timeout;
        let mut guard = self.shared.state.lock();
        while guard.1.is_loading() {
            if self.shared.changed.wait_until(&mut guard, deadline).timed_out() {
                break;
            }
        }
        guard.1.clone()
    }

    fn cancel_task(&mut self) {
        if let Some(mut task) = self.task.take() {
            task.cancel();
        }
    }

    fn begin(&mut self) {
        self.cancel_task();

        let generation = {
            let mut guard = self.shared.state.lock();
            guard.0 += 1;
            guard.1 = LoadState::Loading;
            self.shared.changed.notify_all();
            guard.0
        };

        let cancel = Arc::new(AtomicBool::new(false));
        let job = Job {
            instance: self.id,
            clip_ref: self.clip_ref.clone(),
            source: Arc::clone(&self.source),
            pipeline: Arc::clone(&self.pipeline),
            cache: self.cache.clone(),
            cancel: Arc::clone(&cancel),
        };
        let shared = Arc::clone(&self.shared);

        let spawned = thread::Builder::new()
            .name(format!("avrviz-lazy-{}", self.id.simple()))
            .spawn(move || {
                let outcome = job.run();
                publish(&shared, generation, &job.cancel, outcome);
            });

        match spawned {
            Ok(handle) => {
                self.task = Some(Task {
                    cancel,
                    handle: Some(handle),
                });
            }
            Err(e) => {
                let outcome = Err(VizError::Io(e));
                publish(&self.shared, generation, &cancel, outcome);
            }
        }
    }
}

impl Drop for LazyClip {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Everything the background worker needs, detached from the handle.
struct Job {
    instance: Uuid,
    clip_ref: String,
    source: Arc<dyn ByteSource>,
    pipeline: Arc<ClipPipeline>,
    cache: Option<Arc<ArtifactCache>>,
    cancel: Arc<AtomicBool>,
}

impl Job {
    fn run(&self) -> Result<Arc<VisualizationArtifact>> {
        match &self.cache {
            Some(cache) => {
                let key = cache_key(&self.clip_ref, self.pipeline.config());
                cache.get_or_compute(&key, || self.fetch_and_compute())
            }
            None => self.fetch_and_compute().map(Arc::new),
        }
    }

    fn fetch_and_compute(&self) -> Result<VisualizationArtifact> {
        self.check_cancelled()?;
        let bytes = self.source.fetch(&self.clip_ref)?;
        self.check_cancelled()?;
        // Decode and transform run to completion once started.
        self.pipeline.process_bytes(&self.clip_ref, &bytes)
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            log::debug!("[{}] cancelled {}", self.instance, self.clip_ref);
            return Err(VizError::Cancelled);
        }
        Ok(())
    }
}

fn publish(
    shared: &Shared,
    generation: u64,
    cancel: &AtomicBool,
    outcome: Result<Arc<VisualizationArtifact>>,
) {
    let mut guard = shared.state.lock();
    if cancel.load(Ordering::SeqCst) || guard.0 != generation {
        return;
    }
    guard.1 = match outcome {
        Ok(artifact) => LoadState::Ready(artifact),
        Err(VizError::Cancelled) => return,
        Err(e) => {
            log::warn!("Failed to compute visualization: {}", e);
            LoadState::Error(e.to_string())
        }
    };
    shared.changed.notify_all();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_inside_viewport() {
        let policy = VisibilityPolicy::default();
        assert!(policy.is_visible(Span::new(100.0, 200.0), Span::new(0.0, 800.0)));
    }

    #[test]
    fn test_visibility_lookahead() {
        let policy = VisibilityPolicy {
            threshold: 0.1,
            lookahead: 50.0,
        };
        let viewport = Span::new(0.0, 800.0);
        // starts 30px below the fold: 20px of 100 inside the grown viewport
        assert!(policy.is_visible(Span::new(830.0, 930.0), viewport));
        // starts 45px below: only 5% inside
        assert!(!policy.is_visible(Span::new(845.0, 945.0), viewport));
        // far away
        assert!(!policy.is_visible(Span::new(2000.0, 2100.0), viewport));
        // above the viewport
        assert!(policy.is_visible(Span::new(-120.0, -20.0), viewport));
    }

    #[test]
    fn test_zero_height_element() {
        let policy = VisibilityPolicy::default();
        assert!(policy.is_visible(Span::new(820.0, 820.0), Span::new(0.0, 800.0)));
        assert!(!policy.is_visible(Span::new(900.0, 900.0), Span::new(0.0, 800.0)));
    }

    #[test]
    fn test_state_labels() {
        assert_eq!(LoadState::default().label(), "idle");
        assert!(LoadState::Error("x".into()).is_error());
        assert!(LoadState::Loading.artifact().is_none());
    }

    use crate::core::decoder::tests::wav_bytes;
    use crate::core::pipeline::PipelineConfig;
    use crate::core::source::MemorySource;

    const WAIT: Duration = Duration::from_secs(10);

    fn tone(len: usize) -> Vec<u8> {
        let samples: Vec<i16> = (0..len)
            .map(|i| ((i as f32 * 0.3).sin() * 12_000.0) as i16)
            .collect();
        wav_bytes(&samples, 8000, 1)
    }

    fn pipeline() -> Arc<ClipPipeline> {
        Arc::new(ClipPipeline::new(PipelineConfig::default()).unwrap())
    }

    /// Source that blocks every fetch until released.
    struct GatedSource {
        inner: MemorySource,
        gate: Arc<(Mutex<bool>, Condvar)>,
    }

    impl ByteSource for GatedSource {
        fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>> {
            let (open, cv) = &*self.gate;
            let mut open = open.lock();
            while !*open {
                cv.wait(&mut open);
            }
            self.inner.fetch(clip_ref)
        }

        fn describe(&self) -> String {
            "gated".into()
        }
    }

    #[test]
    fn test_stays_idle_until_visible() {
        let mut source = MemorySource::new();
        source.insert("a.wav", tone(4000));
        let mut clip = LazyClip::new("a.wav", Arc::new(source), pipeline());

        assert!(!clip.on_visibility(Span::new(5000.0, 5100.0), Span::new(0.0, 800.0)));
        assert!(clip.state().is_idle());

        assert!(clip.on_visibility(Span::new(10.0, 110.0), Span::new(0.0, 800.0)));
        let state = clip.wait(WAIT);
        assert!(state.is_ready(), "state was {}", state.label());
        assert_eq!(state.artifact().unwrap().clip_id, "a.wav");

        // Ready is terminal for visibility signals
        assert!(!clip.on_visibility(Span::new(10.0, 110.0), Span::new(0.0, 800.0)));
    }

    #[test]
    fn test_error_then_retry() {
        let source = Arc::new(parking_lot::RwLock::new(MemorySource::new()));

        struct SwappableSource(Arc<parking_lot::RwLock<MemorySource>>);
        impl ByteSource for SwappableSource {
            fn fetch(&self, clip_ref: &str) -> Result<Vec<u8>> {
                self.0.read().fetch(clip_ref)
            }
            fn describe(&self) -> String {
                "shared".into()
            }
        }

        let mut clip = LazyClip::new("b.wav", Arc::new(SwappableSource(Arc::clone(&source))), pipeline());
        assert!(!clip.retry());
        assert!(clip.load_now());
        assert!(clip.wait(WAIT).is_error());

        // Errors do not auto-retry on visibility
        assert!(!clip.on_visibility(Span::new(0.0, 10.0), Span::new(0.0, 800.0)));

        source.write().insert("b.wav", tone(4000));
        assert!(clip.retry());
        assert!(clip.wait(WAIT).is_ready());
    }

    #[test]
    fn test_set_clip_ref_resets_to_idle() {
        let mut source = MemorySource::new();
        source.insert("a.wav", tone(4000));
        source.insert("c.wav", tone(2000));
        let mut clip = LazyClip::new("a.wav", Arc::new(source), pipeline());

        clip.load_now();
        assert!(clip.wait(WAIT).is_ready());

        clip.set_clip_ref("c.wav");
        assert!(clip.state().is_idle());
        assert_eq!(clip.clip_ref(), "c.wav");

        clip.load_now();
        let state = clip.wait(WAIT);
        assert_eq!(state.artifact().unwrap().clip_id, "c.wav");
    }

    #[test]
    fn test_dispose_discards_in_flight_result() {
        let mut inner = MemorySource::new();
        inner.insert("a.wav", tone(4000));
        let gate = Arc::new((Mutex::new(false), Condvar::new()));
        let source = GatedSource {
            inner,
            gate: Arc::clone(&gate),
        };
        let cache = Arc::new(ArtifactCache::new());
        let mut clip =
            LazyClip::new("a.wav", Arc::new(source), pipeline()).with_cache(Arc::clone(&cache));

        clip.load_now();
        assert!(clip.state().is_loading());
        clip.dispose();
        assert!(clip.is_disposed());

        *gate.0.lock() = true;
        gate.1.notify_all();

        thread::sleep(Duration::from_millis(100));
        assert!(!clip.state().is_ready());
        assert!(!clip.load_now());
        assert!(!clip.retry());
    }

    #[test]
    fn test_handles_share_cached_artifact() {
        let mut source = MemorySource::new();
        source.insert("a.wav", tone(4000));
        let source: Arc<dyn ByteSource> = Arc::new(source);
        let cache = Arc::new(ArtifactCache::new());
        let pipeline = pipeline();

        let mut first = LazyClip::new("a.wav", Arc::clone(&source), Arc::clone(&pipeline))
            .with_cache(Arc::clone(&cache));
        let mut second = LazyClip::new("a.wav", source, pipeline).with_cache(Arc::clone(&cache));
        assert_ne!(first.id(), second.id());

        first.load_now();
        second.load_now();
        let a = first.wait(WAIT);
        let b = second.wait(WAIT);
        assert!(Arc::ptr_eq(a.artifact().unwrap(), b.artifact().unwrap()));
        assert_eq!(cache.len(), 1);
    }
}
