//! Frame source adapter.
//!
//! Normalizes interchangeable camera backends behind one capability set:
//! - Provider contract via [`FrameProvider`] and [`ProviderSink`]
//! - Single active provider via [`SourceSelector`]
//! - Per-tick frame reuse via [`FrameCache`]
//! - Device-free playback via [`ReplayProvider`]

mod cache;
mod frame_utils;
mod provider;
mod replay;
mod selector;
mod types;

pub use cache::FrameCache;
pub use frame_utils::{blank_fill, convert_format, mirror_horizontal};
pub use provider::{FrameProvider, ProviderEvent, ProviderEventKind, ProviderFactory, ProviderSink};
pub use replay::{load_frames_from_dir, ReplayProvider};
pub use selector::{SelectOutcome, SourceSelector};
pub use types::{Frame, FrameFormat, FrameRequest, SourceError, SourceKind};
