//! Source selection: at most one live provider at a time.

use tokio::sync::mpsc::UnboundedSender;

use super::provider::{FrameProvider, ProviderEvent, ProviderFactory, ProviderSink};
use super::types::{Frame, FrameRequest, SourceKind};

/// Result of a [`SourceSelector::select`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A new provider was constructed and enabled under this generation.
    Switched { generation: u64 },
    /// The requested kind is already active.
    Unchanged,
    /// No preview surface exists yet; selection ignored.
    NoSurface,
}

struct ActiveSource {
    kind: SourceKind,
    generation: u64,
    provider: Box<dyn FrameProvider>,
}

/// Holds the single active frame provider and switches between backends.
pub struct SourceSelector {
    factory: Box<dyn ProviderFactory>,
    events: UnboundedSender<ProviderEvent>,
    active: Option<ActiveSource>,
    generation: u64,
    surface_attached: bool,
}

impl std::fmt::Debug for SourceSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceSelector")
            .field("active_kind", &self.active_kind())
            .field("generation", &self.generation)
            .field("surface_attached", &self.surface_attached)
            .finish_non_exhaustive()
    }
}

impl SourceSelector {
    pub fn new(factory: Box<dyn ProviderFactory>, events: UnboundedSender<ProviderEvent>) -> Self {
        Self {
            factory,
            events,
            active: None,
            generation: 0,
            surface_attached: false,
        }
    }

    /// Mark the preview surface as present. Selection is ignored until then.
    pub fn attach_surface(&mut self) {
        self.surface_attached = true;
    }

    /// Drop the preview surface. Later selections return `NoSurface`.
    pub fn detach_surface(&mut self) {
        self.surface_attached = false;
    }

    pub fn has_surface(&self) -> bool {
        self.surface_attached
    }

    /// Request a source type.
    ///
    /// Re-selecting the active kind is a no-op. Otherwise the previous
    /// provider is disabled before the new one is constructed and enabled.
    pub fn select(&mut self, kind: SourceKind) -> SelectOutcome {
        if !self.surface_attached {
            log::debug!("Ignoring {} selection: no preview surface yet", kind);
            return SelectOutcome::NoSurface;
        }
        if self.active_kind() == Some(kind) {
            return SelectOutcome::Unchanged;
        }

        if let Some(mut previous) = self.active.take() {
            log::info!("Disabling {} source (generation {})", previous.kind, previous.generation);
            previous.provider.disable();
        }

        self.generation += 1;
        let generation = self.generation;
        let mut provider = self.factory.create(kind);
        provider.enable(ProviderSink::new(generation, self.events.clone()));
        log::info!("Enabled {} source (generation {})", kind, generation);

        self.active = Some(ActiveSource {
            kind,
            generation,
            provider,
        });
        SelectOutcome::Switched { generation }
    }

    /// Disable and drop the active provider, if any.
    pub fn release(&mut self) -> Option<SourceKind> {
        let mut active = self.active.take()?;
        active.provider.disable();
        log::info!("Released {} source (generation {})", active.kind, active.generation);
        Some(active.kind)
    }

    pub fn active_kind(&self) -> Option<SourceKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    pub fn active_generation(&self) -> Option<u64> {
        self.active.as_ref().map(|a| a.generation)
    }

    /// Whether `generation` names the provider that is currently active.
    pub fn is_current(&self, generation: u64) -> bool {
        self.active_generation() == Some(generation)
    }

    /// Fetch a frame from the active provider, but only if it is still the
    /// one identified by `generation`.
    pub fn get_frame(&mut self, generation: u64, request: &FrameRequest) -> Option<Frame> {
        let active = self.active.as_mut()?;
        if active.generation != generation {
            return None;
        }
        active.provider.get_frame(request)
    }
}
