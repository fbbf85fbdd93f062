//! classifier-studio library crate.
//!
//! Capture, train and persist pipeline for on-device image classifiers and
//! face enrollment: a camera frame source, a cancellable capture loop, a
//! recording session over a label store, a single-flight training gate, and
//! the `.ipcc` collection archive codec.

pub mod archive;
pub mod capture;
pub mod config;
pub mod controller;
pub mod session;
pub mod source;
pub mod store;
pub mod training;
