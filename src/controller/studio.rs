//! Capture view lifecycle: ties the source selector, capture loop, preview,
//! recording session and training gate together.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver};

use super::viewport::Viewport;
use crate::archive::{
    export_collection, import_collection, ExportError, ExportOptions, ExportedArchive,
    ImportError, ImportReport,
};
use crate::capture::{CaptureLoop, LoopState, PreviewBuffer, PreviewSink, StepInterval};
use crate::session::{CaptureProfile, RecordingSession};
use crate::source::{
    FrameFormat, FrameRequest, ProviderEvent, ProviderEventKind, ProviderFactory, SelectOutcome,
    SourceKind, SourceSelector,
};
use crate::store::{LabelStore, StoreError};
use crate::training::{TrainError, TrainOutcome, TrainingGate, DEFAULT_SETTLE};

/// Construction parameters for a [`StudioController`].
#[derive(Debug, Clone)]
pub struct StudioOptions {
    pub step: Duration,
    pub settle: Duration,
    pub profile: CaptureProfile,
    /// Overrides the profile's sampling interval when set.
    pub sample_every: Option<u64>,
}

impl Default for StudioOptions {
    fn default() -> Self {
        Self {
            step: Duration::from_millis(33),
            settle: DEFAULT_SETTLE,
            profile: CaptureProfile::Classifier,
            sample_every: None,
        }
    }
}

/// State touched by both the host and capture ticks.
struct Shared<P> {
    selector: SourceSelector,
    preview: P,
    session: RecordingSession,
    access: bool,
    loaded: bool,
}

/// Owns one capture view from mount to unmount.
///
/// Provider lifecycle events arrive on a channel and are applied by
/// [`pump_events`](Self::pump_events) or
/// [`next_event`](Self::next_event); events from a provider that has since
/// been replaced are ignored.
pub struct StudioController<P: PreviewSink + 'static = PreviewBuffer> {
    shared: Arc<Mutex<Shared<P>>>,
    store: Arc<dyn LabelStore>,
    capture: CaptureLoop,
    gate: TrainingGate,
    step: StepInterval,
    events: UnboundedReceiver<ProviderEvent>,
    viewport: Viewport,
    unmounted: bool,
}

impl<P: PreviewSink + 'static> std::fmt::Debug for StudioController<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioController")
            .field("capture", &self.capture)
            .field("gate", &self.gate)
            .field("viewport", &self.viewport)
            .field("unmounted", &self.unmounted)
            .finish_non_exhaustive()
    }
}

fn lock<P>(shared: &Mutex<Shared<P>>) -> MutexGuard<'_, Shared<P>> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<P: PreviewSink + 'static> StudioController<P> {
    pub fn new(
        store: Arc<dyn LabelStore>,
        factory: Box<dyn ProviderFactory>,
        preview: P,
        options: StudioOptions,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut session = RecordingSession::new(Arc::clone(&store), options.profile);
        if let Some(every) = options.sample_every {
            session = session.with_sample_every(every);
        }
        Self {
            shared: Arc::new(Mutex::new(Shared {
                selector: SourceSelector::new(factory, tx),
                preview,
                session,
                access: false,
                loaded: false,
            })),
            store,
            capture: CaptureLoop::new(),
            gate: TrainingGate::new(options.settle),
            step: StepInterval::new(options.step),
            events: rx,
            viewport: Viewport::default(),
            unmounted: false,
        }
    }

    /// Attach the preview surface and record the initial window size.
    pub fn mount(&mut self, width: u32, height: u32) {
        if self.unmounted {
            log::debug!("Ignoring mount after teardown");
            return;
        }
        lock(&self.shared).selector.attach_surface();
        self.resize(width, height);
        log::debug!("Capture view mounted at {:?}", self.viewport);
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Viewport {
        self.viewport = Viewport::from_window(width, height);
        self.viewport
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Host tick duration; the capture loop picks up changes on its next
    /// reschedule.
    pub fn set_step(&self, step: Duration) {
        self.step.set(step);
    }

    /// Switch to `kind`. Re-selecting the active kind does nothing.
    pub fn select_source(&mut self, kind: SourceKind) -> SelectOutcome {
        let mut shared = lock(&self.shared);
        let outcome = shared.selector.select(kind);
        if let SelectOutcome::Switched { .. } = outcome {
            self.capture.stop();
            shared.loaded = false;
        }
        outcome
    }

    pub fn active_source(&self) -> Option<SourceKind> {
        lock(&self.shared).selector.active_kind()
    }

    /// Camera permission has been granted by the active provider.
    pub fn access(&self) -> bool {
        lock(&self.shared).access
    }

    /// The active provider has reported ready or failed since the last switch.
    pub fn loaded(&self) -> bool {
        lock(&self.shared).loaded
    }

    pub fn loop_state(&self) -> LoopState {
        self.capture.state()
    }

    /// Apply every provider event already queued. Returns how many were read.
    pub fn pump_events(&mut self) -> usize {
        let mut count = 0;
        while let Ok(event) = self.events.try_recv() {
            self.handle_event(event);
            count += 1;
        }
        count
    }

    /// Wait for the next provider event and apply it.
    pub async fn next_event(&mut self) -> bool {
        match self.events.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    fn handle_event(&mut self, event: ProviderEvent) {
        let mut shared = lock(&self.shared);
        if !shared.selector.is_current(event.generation) {
            log::debug!(
                "Ignoring {:?} from stale source generation {}",
                event.kind,
                event.generation
            );
            return;
        }

        match event.kind {
            ProviderEventKind::AccessGranted => shared.access = true,
            ProviderEventKind::Ready => {
                shared.loaded = true;
                drop(shared);
                self.start_capture(event.generation);
            }
            ProviderEventKind::Error(e) => {
                log::warn!("Camera unavailable: {}", e);
                self.capture.stop();
                shared.selector.release();
                shared.preview.blank();
                shared.access = false;
                shared.loaded = true;
            }
        }
    }

    fn start_capture(&mut self, generation: u64) {
        let shared = Arc::clone(&self.shared);
        self.capture.start(self.step.clone(), move |tick, step| {
            let mut guard = lock(&shared);
            let shared = &mut *guard;
            let request = FrameRequest::new(FrameFormat::Rgba, step);
            let Some(frame) = shared.selector.get_frame(generation, &request) else {
                return;
            };
            if !shared.preview.is_ready() {
                shared.preview.show(&frame);
            }
            shared.session.on_frame(&frame, tick);
        });
    }

    /// Run `f` against the recording session (cursor, record button,
    /// rename editor, class list operations).
    pub fn with_session<R>(&self, f: impl FnOnce(&mut RecordingSession) -> R) -> R {
        f(&mut lock(&self.shared).session)
    }

    pub fn with_preview<R>(&self, f: impl FnOnce(&mut P) -> R) -> R {
        f(&mut lock(&self.shared).preview)
    }

    pub fn store(&self) -> &Arc<dyn LabelStore> {
        &self.store
    }

    /// Clone of the training gate, for observing the busy flag.
    pub fn training_gate(&self) -> TrainingGate {
        self.gate.clone()
    }

    pub async fn train(&self) -> Result<TrainOutcome, TrainError> {
        self.gate.train(self.store.as_ref()).await
    }

    pub async fn export(&self, options: &ExportOptions) -> Result<ExportedArchive, ExportError> {
        export_collection(self.store.as_ref(), options).await
    }

    pub async fn import(&self, bytes: Vec<u8>) -> Result<ImportReport, ImportError> {
        import_collection(self.store.as_ref(), bytes).await
    }

    /// Tear the view down: stop capture, release the camera, clear the
    /// training busy flag without waiting, and save the store.
    pub fn unmount(&mut self) -> Result<(), StoreError> {
        if self.unmounted {
            return Ok(());
        }
        self.unmounted = true;
        self.capture.dispose();
        {
            let mut shared = lock(&self.shared);
            shared.selector.detach_surface();
            shared.selector.release();
        }
        self.gate.cancel();
        log::debug!("Capture view unmounted");
        self.store.save_changes()
    }
}
