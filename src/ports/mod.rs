//! Ports (trait boundaries) for external collaborators.
//!
//! The learner depends only on these traits. Concrete environments and
//! observers are adapters implementing them.

pub mod environment;
pub mod observer;

pub use environment::Environment;
pub use observer::Observer;
