//! Provider contract consumed by the frame source adapter.
//!
//! A provider owns raw frame acquisition for one backend. It reports its
//! lifecycle (access granted, stream ready, error) through a [`ProviderSink`]
//! whose events are tagged with the generation of the adapter instance that
//! created it, so events from a replaced provider can be told apart.

use tokio::sync::mpsc::UnboundedSender;

use super::types::{Frame, FrameRequest, SourceError, SourceKind};

/// A camera backend behind the common capability set.
pub trait FrameProvider: Send {
    /// Backend this provider implements.
    fn kind(&self) -> SourceKind;

    /// Start acquiring frames. Lifecycle callbacks are delivered via `sink`.
    fn enable(&mut self, sink: ProviderSink);

    /// Stop acquiring frames and release the device.
    fn disable(&mut self);

    /// Latest frame, or `None` when none is currently available.
    fn get_frame(&mut self, request: &FrameRequest) -> Option<Frame>;
}

/// Builds providers on demand when the user selects a source type.
pub trait ProviderFactory: Send {
    fn create(&mut self, kind: SourceKind) -> Box<dyn FrameProvider>;
}

impl<F> ProviderFactory for F
where
    F: FnMut(SourceKind) -> Box<dyn FrameProvider> + Send,
{
    fn create(&mut self, kind: SourceKind) -> Box<dyn FrameProvider> {
        self(kind)
    }
}

/// Lifecycle notifications a provider can raise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEventKind {
    AccessGranted,
    Ready,
    Error(SourceError),
}

/// A lifecycle notification tagged with the adapter generation that raised it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub generation: u64,
    pub kind: ProviderEventKind,
}

/// Callback handle given to a provider in [`FrameProvider::enable`].
///
/// Every method may be called any number of times, from any thread, even
/// after the receiving side has gone away.
#[derive(Debug, Clone)]
pub struct ProviderSink {
    generation: u64,
    tx: UnboundedSender<ProviderEvent>,
}

impl ProviderSink {
    pub fn new(generation: u64, tx: UnboundedSender<ProviderEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn access_granted(&self) {
        self.send(ProviderEventKind::AccessGranted);
    }

    pub fn ready(&self) {
        self.send(ProviderEventKind::Ready);
    }

    pub fn error(&self, error: SourceError) {
        self.send(ProviderEventKind::Error(error));
    }

    fn send(&self, kind: ProviderEventKind) {
        // A closed channel means the controller is gone; nothing to notify.
        let _ = self.tx.send(ProviderEvent {
            generation: self.generation,
            kind,
        });
    }
}
