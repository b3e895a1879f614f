//! Adapters implementing domain ports.
//!
//! Concrete environments live here. The learner only sees them through the
//! [`Environment`](crate::ports::Environment) port.

pub mod grid_world;

pub use grid_world::{GridInfo, GridWorld, GridWorldConfig, Move};
