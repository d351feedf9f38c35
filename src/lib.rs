//! Upload a property photo, have it enhanced remotely, and pay for the result.
//!
//! [`workflow::WorkflowController`] owns the single active job and sequences
//! file intake, the enhancement call and checkout. The `app` module is the
//! egui front end that drives it.

pub mod app;
pub mod config;
pub mod upload;
pub mod workflow;
