//! Q-learning agent
//!
//! Couples a [`QTable`] with ε-greedy action selection. The agent owns the
//! table for the duration of training and hands it back afterwards.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use crate::{Result, ports::Environment, q_learning::q_table::QTable, types::State};

/// How an action was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionChoice {
    /// Uniformly random action from the environment
    Explore,
    /// Highest-valued action in the table
    Exploit,
}

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent (off-policy TD control)
///
/// Exploitation happens with probability `exploit_probability`: a uniform
/// draw in `[0, 1)` that exceeds it triggers a random action instead.
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    q_table: QTable,
    exploit_probability: f64,
    rng: StdRng,
}

impl QLearningAgent {
    /// Create a new Q-learning agent
    ///
    /// # Arguments
    ///
    /// * `q_table` - Initial value table (carries α and γ)
    /// * `exploit_probability` - Probability of taking the greedy action
    /// * `seed` - Seed for the selection RNG, `None` for entropy
    pub fn new(q_table: QTable, exploit_probability: f64, seed: Option<u64>) -> Self {
        Self {
            q_table,
            exploit_probability,
            rng: build_rng(seed),
        }
    }

    /// ε-greedy action selection
    pub fn select_action<E: Environment>(
        &mut self,
        env: &mut E,
        state: State,
    ) -> Result<(usize, ActionChoice)> {
        if self.rng.random::<f64>() > self.exploit_probability {
            Ok((env.sample_action(&mut self.rng), ActionChoice::Explore))
        } else {
            Ok((self.q_table.greedy_action(state)?, ActionChoice::Exploit))
        }
    }

    /// Apply the Q-learning update for one transition
    pub fn learn(
        &mut self,
        state: State,
        action: usize,
        reward: f64,
        next_state: State,
    ) -> Result<f64> {
        self.q_table
            .q_learning_update(state, action, reward, next_state)
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn exploit_probability(&self) -> f64 {
        self.exploit_probability
    }

    /// Release the learned table
    pub fn into_q_table(self) -> QTable {
        self.q_table
    }
}
