//! Dense Q-table over a discrete grid

use crate::{Error, Result, ports::Environment, types::State};

/// Q-table mapping (x, y, action) to a value estimate
///
/// Values live in one contiguous buffer laid out row-major over
/// `(x, y, action)`. The shape is fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    /// Q-values, `x_dims * y_dims * num_actions` entries
    values: Vec<f64>,
    x_dims: usize,
    y_dims: usize,
    num_actions: usize,
    /// Learning rate α
    learning_rate: f64,
    /// Discount factor γ
    discount_factor: f64,
}

impl QTable {
    /// Create a zero-initialized Q-table
    ///
    /// # Errors
    ///
    /// Returns an error if any dimension is zero.
    pub fn new(
        x_dims: usize,
        y_dims: usize,
        num_actions: usize,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Result<Self> {
        for (space, n) in [
            ("observation x", x_dims),
            ("observation y", y_dims),
            ("action", num_actions),
        ] {
            if n == 0 {
                return Err(Error::EmptySpace {
                    space: space.to_string(),
                });
            }
        }
        Ok(Self {
            values: vec![0.0; x_dims * y_dims * num_actions],
            x_dims,
            y_dims,
            num_actions,
            learning_rate,
            discount_factor,
        })
    }

    /// Create a zero-initialized Q-table shaped for `env`
    pub fn for_environment<E: Environment>(
        env: &E,
        learning_rate: f64,
        discount_factor: f64,
    ) -> Result<Self> {
        let (x_dims, y_dims) = env.observation_space().grid_dims()?;
        let num_actions = env.action_space().n;
        Self::new(x_dims, y_dims, num_actions, learning_rate, discount_factor)
    }

    /// Shape as `(x_dims, y_dims, num_actions)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.x_dims, self.y_dims, self.num_actions)
    }

    pub fn num_actions(&self) -> usize {
        self.num_actions
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn discount_factor(&self) -> f64 {
        self.discount_factor
    }

    /// All values in `(x, y, action)` row-major order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    fn row_offset(&self, state: State) -> Result<usize> {
        if state.x >= self.x_dims || state.y >= self.y_dims {
            return Err(Error::StateOutOfBounds {
                x: state.x,
                y: state.y,
                x_dims: self.x_dims,
                y_dims: self.y_dims,
            });
        }
        Ok((state.x * self.y_dims + state.y) * self.num_actions)
    }

    fn index(&self, state: State, action: usize) -> Result<usize> {
        if action >= self.num_actions {
            return Err(Error::ActionOutOfBounds {
                action,
                num_actions: self.num_actions,
            });
        }
        Ok(self.row_offset(state)? + action)
    }

    /// Action values for a state
    pub fn row(&self, state: State) -> Result<&[f64]> {
        let start = self.row_offset(state)?;
        Ok(&self.values[start..start + self.num_actions])
    }

    /// Get Q-value for a state-action pair
    pub fn get(&self, state: State, action: usize) -> Result<f64> {
        Ok(self.values[self.index(state, action)?])
    }

    /// Set Q-value for a state-action pair
    ///
    /// # Errors
    ///
    /// Rejects out-of-bounds indices and non-finite values.
    pub fn set(&mut self, state: State, action: usize, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::NonFiniteValue {
                x: state.x,
                y: state.y,
                action,
                value,
            });
        }
        let idx = self.index(state, action)?;
        self.values[idx] = value;
        Ok(())
    }

    /// Maximum Q-value over all actions in a state
    pub fn max_q(&self, state: State) -> Result<f64> {
        Ok(self
            .row(state)?
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max))
    }

    /// Select the greedy action (highest Q-value)
    ///
    /// Ties resolve to the lowest action index.
    pub fn greedy_action(&self, state: State) -> Result<usize> {
        let row = self.row(state)?;
        let mut best = 0;
        for (action, &value) in row.iter().enumerate().skip(1) {
            if value > row[best] {
                best = action;
            }
        }
        Ok(best)
    }

    /// Value after one temporal-difference step
    ///
    /// `old + α * (reward + γ * (next_max - old))`
    pub fn td_value(
        old: f64,
        reward: f64,
        next_max: f64,
        learning_rate: f64,
        discount_factor: f64,
    ) -> f64 {
        let temporal_difference = reward + discount_factor * (next_max - old);
        old + learning_rate * temporal_difference
    }

    /// Q-learning update, returning the value written
    ///
    /// Q(s,a) ← Q(s,a) + α[r + γ(max_a' Q(s',a') - Q(s,a))]
    pub fn q_learning_update(
        &mut self,
        state: State,
        action: usize,
        reward: f64,
        next_state: State,
    ) -> Result<f64> {
        let old_value = self.get(state, action)?;
        let next_max = self.max_q(next_state)?;
        let new_value = Self::td_value(
            old_value,
            reward,
            next_max,
            self.learning_rate,
            self.discount_factor,
        );
        self.set(state, action, new_value)?;
        Ok(new_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> QTable {
        QTable::new(3, 2, 4, 0.5, 0.4).unwrap()
    }

    #[test]
    fn test_qtable_initialization() {
        let qtable = table();
        assert_eq!(qtable.shape(), (3, 2, 4));
        assert_eq!(qtable.values().len(), 24);
        assert!(qtable.values().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            QTable::new(2, 2, 0, 0.5, 0.4),
            Err(Error::EmptySpace { .. })
        ));
    }

    #[test]
    fn test_qtable_set_get() {
        let mut qtable = table();
        qtable.set(State::new(2, 1), 3, 1.5).unwrap();
        assert_eq!(qtable.get(State::new(2, 1), 3).unwrap(), 1.5);
        assert_eq!(qtable.get(State::new(1, 1), 3).unwrap(), 0.0);
        // last cell of the buffer
        assert_eq!(qtable.values()[23], 1.5);
    }

    #[test]
    fn test_out_of_bounds_state() {
        let qtable = table();
        assert!(matches!(
            qtable.get(State::new(3, 0), 0),
            Err(Error::StateOutOfBounds { x: 3, .. })
        ));
        assert!(matches!(
            qtable.row(State::new(0, 2)),
            Err(Error::StateOutOfBounds { y: 2, .. })
        ));
    }

    #[test]
    fn test_out_of_bounds_action() {
        let mut qtable = table();
        assert!(matches!(
            qtable.set(State::new(0, 0), 4, 1.0),
            Err(Error::ActionOutOfBounds {
                action: 4,
                num_actions: 4
            })
        ));
    }

    #[test]
    fn test_non_finite_value_rejected() {
        let mut qtable = table();
        assert!(matches!(
            qtable.set(State::new(0, 0), 0, f64::NAN),
            Err(Error::NonFiniteValue { .. })
        ));
        assert!(qtable.set(State::new(0, 0), 0, f64::INFINITY).is_err());
        assert_eq!(qtable.get(State::new(0, 0), 0).unwrap(), 0.0);
    }

    #[test]
    fn test_max_q() {
        let mut qtable = table();
        let state = State::new(1, 1);
        qtable.set(state, 0, 0.5).unwrap();
        qtable.set(state, 1, 1.5).unwrap();
        qtable.set(state, 2, -0.8).unwrap();
        assert_eq!(qtable.max_q(state).unwrap(), 1.5);
    }

    #[test]
    fn test_greedy_action() {
        let mut qtable = table();
        let state = State::new(1, 0);
        qtable.set(state, 0, 0.5).unwrap();
        qtable.set(state, 2, 1.5).unwrap();
        qtable.set(state, 3, 0.8).unwrap();
        assert_eq!(qtable.greedy_action(state).unwrap(), 2);
    }

    #[test]
    fn test_greedy_action_ties_pick_lowest_index() {
        let mut qtable = table();
        let state = State::new(0, 1);
        assert_eq!(qtable.greedy_action(state).unwrap(), 0);

        qtable.set(state, 1, 2.0).unwrap();
        qtable.set(state, 3, 2.0).unwrap();
        assert_eq!(qtable.greedy_action(state).unwrap(), 1);
    }

    #[test]
    fn test_greedy_action_all_negative() {
        let mut qtable = table();
        let state = State::new(2, 0);
        for action in 0..4 {
            qtable.set(state, action, -1.0 - action as f64).unwrap();
        }
        assert_eq!(qtable.greedy_action(state).unwrap(), 0);
    }

    #[test]
    fn test_td_value_arithmetic() {
        // 0.0 + 0.5 * (1.0 + 0.4 * (0.0 - 0.0)) = 0.5
        assert_eq!(QTable::td_value(0.0, 1.0, 0.0, 0.5, 0.4), 0.5);
        // 1.0 + 0.5 * (0.0 + 0.4 * (2.0 - 1.0)) = 1.2
        assert!((QTable::td_value(1.0, 0.0, 2.0, 0.5, 0.4) - 1.2).abs() < 1e-12);
    }

    #[test]
    fn test_q_learning_update() {
        let mut qtable = table();
        let state = State::new(0, 0);
        let next_state = State::new(1, 0);

        let written = qtable.q_learning_update(state, 2, 1.0, next_state).unwrap();
        assert_eq!(written, 0.5);
        assert_eq!(qtable.get(state, 2).unwrap(), 0.5);

        qtable.set(next_state, 1, 2.0).unwrap();
        // 0.5 + 0.5 * (0.0 + 0.4 * (2.0 - 0.5)) = 0.8
        let written = qtable.q_learning_update(state, 2, 0.0, next_state).unwrap();
        assert!((written - 0.8).abs() < 1e-12);
        assert_eq!(qtable.shape(), (3, 2, 4));
    }

    #[test]
    fn test_self_transition_update() {
        let mut qtable = table();
        let state = State::new(2, 1);
        qtable.set(state, 1, 1.0).unwrap();
        // next_max is read before the write: 1.0 + 0.5 * (1.0 + 0.4 * (1.0 - 1.0)) = 1.5
        let written = qtable.q_learning_update(state, 1, 1.0, state).unwrap();
        assert_eq!(written, 1.5);
    }
}
