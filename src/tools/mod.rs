//! Tool response shaping.

pub mod envelope;

pub use envelope::{error_envelope, success_envelope};
