//! Greedy policy extraction from a trained Q-table

use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{Error, Result, ports::Environment, q_learning::q_table::QTable, types::State};

/// Whether extraction re-steps the environment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Apply each chosen action to the environment while dumping the table.
    /// Rewards and termination flags are discarded.
    #[default]
    Replay,
    /// Read the table only; the environment is left untouched.
    TableOnly,
}

/// One state's entry in an exported policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub x: usize,
    pub y: usize,
    pub action: usize,
}

/// Deterministic state → action mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimalPolicy {
    actions: BTreeMap<State, usize>,
}

impl OptimalPolicy {
    /// Action chosen in `state`, if the state is covered
    pub fn action(&self, state: State) -> Option<usize> {
        self.actions.get(&state).copied()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Entries in `(x, y)` order
    pub fn iter(&self) -> impl Iterator<Item = (State, usize)> + '_ {
        self.actions.iter().map(|(&state, &action)| (state, action))
    }

    pub fn states(&self) -> impl Iterator<Item = State> + '_ {
        self.actions.keys().copied()
    }

    /// Follow the policy from `start` for at most `limit` steps.
    ///
    /// `transition` maps a state and action to the next state. The walk
    /// stops early at a state the policy does not cover or when a step
    /// leaves the state unchanged. The returned path starts with `start`.
    pub fn trace<F>(&self, start: State, limit: usize, mut transition: F) -> Result<Vec<State>>
    where
        F: FnMut(State, usize) -> Result<State>,
    {
        let mut path = vec![start];
        let mut current = start;
        for _ in 0..limit {
            let Some(action) = self.action(current) else {
                break;
            };
            let next = transition(current, action)?;
            if next == current {
                break;
            }
            path.push(next);
            current = next;
        }
        Ok(path)
    }

    pub fn to_entries(&self) -> Vec<PolicyEntry> {
        self.iter()
            .map(|(state, action)| PolicyEntry {
                x: state.x,
                y: state.y,
                action,
            })
            .collect()
    }

    /// Save the policy as a JSON array of entries
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create policy file {}", path.display()),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &self.to_entries())?;
        writer.flush()?;
        Ok(())
    }
}

impl FromIterator<(State, usize)> for OptimalPolicy {
    fn from_iter<T: IntoIterator<Item = (State, usize)>>(iter: T) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

/// Extract the greedy policy, re-stepping the environment for every state
///
/// Equivalent to [`extract_with_mode`] with [`ExtractionMode::Replay`].
pub fn extract<E: Environment>(env: &mut E, table: &QTable) -> Result<OptimalPolicy> {
    extract_with_mode(env, table, ExtractionMode::Replay)
}

/// Extract the greedy action for every state of the observation space
///
/// States are visited x outer, y inner. Every cell of the space gets an
/// entry regardless of reachability. Ties resolve to the lowest action
/// index.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the table was not built for this
/// environment's spaces, or any error raised by the environment.
pub fn extract_with_mode<E: Environment>(
    env: &mut E,
    table: &QTable,
    mode: ExtractionMode,
) -> Result<OptimalPolicy> {
    let (x_dims, y_dims) = env.observation_space().grid_dims()?;
    let expected = (x_dims, y_dims, env.action_space().n);
    if table.shape() != expected {
        return Err(Error::ShapeMismatch {
            table: table.shape(),
            environment: expected,
        });
    }

    let mut actions = BTreeMap::new();
    for x in 0..x_dims {
        for y in 0..y_dims {
            let state = State::new(x, y);
            let action = table.greedy_action(state)?;
            if mode == ExtractionMode::Replay {
                env.step(action)?;
            }
            actions.insert(state, action);
        }
    }

    tracing::debug!(states = actions.len(), ?mode, "extracted greedy policy");
    Ok(OptimalPolicy { actions })
}
