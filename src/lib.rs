//! Tabular Q-learning on discrete grid worlds
//!
//! This crate provides:
//! - A narrow [`Environment`](ports::Environment) port for discrete 2-D tasks
//! - A configurable [`GridWorld`](adapters::GridWorld) adapter
//! - A dense Q-table and ε-greedy Q-learning agent
//! - A training pipeline with composable observers
//! - Greedy policy extraction from a trained table
//!
//! Training and extraction are single-threaded. A table must not be shared
//! between concurrent training runs.

pub mod adapters;
pub mod cli;
pub mod error;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod spaces;
pub mod types;

pub use error::{Error, Result};
pub use q_learning::{OptimalPolicy, QTable, extract, train, train_with_config};
pub use types::{Observation, State, Step};
