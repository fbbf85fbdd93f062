//! Resize/lifecycle controller for the capture view.

mod studio;
mod viewport;

pub use studio::{StudioController, StudioOptions};
pub use viewport::{Viewport, HEADER_HEIGHT};
