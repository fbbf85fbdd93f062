//! Recording session.
//!
//! Per-class example accumulation with press-and-hold recording, plus the
//! rename/clear/remove/add operations on the class list.

mod cursor;
mod recording;

pub use cursor::{CaptureCursor, NameEdit, NameKey, PressEvent};
pub use recording::{CaptureProfile, RecordingSession, SessionError};
