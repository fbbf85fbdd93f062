//! Capture loop and preview.
//!
//! - Host tick duration via [`StepInterval`]
//! - Generation-token cancellable polling via [`CaptureLoop`]
//! - Preview surface via [`PreviewSink`] / [`PreviewBuffer`]

mod capture_loop;
mod preview;
mod step;

pub use capture_loop::{CaptureLoop, LoopState, TickHandler};
pub use preview::{PreviewBuffer, PreviewSink};
pub use step::{StepInterval, MIN_STEP};
