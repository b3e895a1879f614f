//! Tabular Q-learning and greedy policy extraction
//!
//! Q-learning is off-policy temporal difference control: each step moves
//! the estimate for the visited (state, action) pair toward the observed
//! reward plus the discounted best value of the successor state.
//!
//! ## Update Rule
//!
//! ```text
//! td  = r + γ (max_a' Q(s', a') - Q(s, a))
//! Q(s, a) ← Q(s, a) + α td
//! ```
//!
//! ## Usage Example
//!
//! ```no_run
//! use gridq::adapters::{GridWorld, GridWorldConfig};
//! use gridq::q_learning::{extract, train};
//!
//! let mut world = GridWorld::new(GridWorldConfig::new(4, 4))?;
//! let table = train(&mut world)?;
//! let policy = extract(&mut world, &table)?;
//! print!("{}", world.render_policy(&policy));
//! # Ok::<(), gridq::Error>(())
//! ```

pub mod agent;
pub mod policy;
pub mod q_table;

pub use agent::{ActionChoice, QLearningAgent};
pub use policy::{ExtractionMode, OptimalPolicy, PolicyEntry, extract, extract_with_mode};
pub use q_table::QTable;

use crate::{
    Result,
    pipeline::{TrainingConfig, TrainingPipeline},
    ports::Environment,
};

/// Train a Q-table on `env` with the default configuration
///
/// α = 0.5, γ = 0.4, exploit probability 0.5, 100 episodes of at most
/// 1000 steps each, unseeded.
pub fn train<E: Environment>(env: &mut E) -> Result<QTable> {
    train_with_config(env, &TrainingConfig::default())
}

/// Train a Q-table on `env` with an explicit configuration
pub fn train_with_config<E: Environment>(env: &mut E, config: &TrainingConfig) -> Result<QTable> {
    let (table, _result) = TrainingPipeline::new(config.clone()).run(env)?;
    Ok(table)
}
