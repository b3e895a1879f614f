//! Core value types shared between environments and learners

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Discrete grid coordinates identifying the agent's position
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct State {
    pub x: usize,
    pub y: usize,
}

impl State {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl From<(usize, usize)> for State {
    fn from((x, y): (usize, usize)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Raw observation emitted by an environment
///
/// The first two components are the agent's coordinates. Environments may
/// append further components (e.g. a time index); learners ignore them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation(pub Vec<i64>);

impl Observation {
    pub fn new(components: Vec<i64>) -> Self {
        Self(components)
    }

    /// Observation consisting only of a state's coordinates
    pub fn from_state(state: State) -> Self {
        Self(vec![state.x as i64, state.y as i64])
    }

    pub fn components(&self) -> &[i64] {
        &self.0
    }

    /// Extract the state from the first two components
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidObservation`] if there are fewer than two
    /// components or a coordinate is negative. Upper bounds are checked
    /// where the value table is indexed.
    pub fn state(&self) -> Result<State> {
        let invalid = |reason: &str| Error::InvalidObservation {
            observation: self.0.clone(),
            reason: reason.to_string(),
        };
        let [x, y, ..] = self.0.as_slice() else {
            return Err(invalid("expected at least two coordinates"));
        };
        let x = usize::try_from(*x).map_err(|_| invalid("x coordinate is negative"))?;
        let y = usize::try_from(*y).map_err(|_| invalid("y coordinate is negative"))?;
        Ok(State { x, y })
    }
}

impl From<State> for Observation {
    fn from(state: State) -> Self {
        Self::from_state(state)
    }
}

/// Outcome of applying one action to an environment
#[derive(Debug, Clone, PartialEq)]
pub struct Step<I> {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    /// Auxiliary environment data, ignored by the learner
    pub info: I,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_uses_first_two_components() {
        let obs = Observation::new(vec![3, 1, 42]);
        assert_eq!(obs.state().unwrap(), State::new(3, 1));
    }

    #[test]
    fn short_observation_is_rejected() {
        let obs = Observation::new(vec![3]);
        assert!(matches!(
            obs.state(),
            Err(Error::InvalidObservation { .. })
        ));
    }

    #[test]
    fn negative_coordinate_is_rejected() {
        let obs = Observation::new(vec![0, -1]);
        let err = obs.state().unwrap_err();
        assert!(err.to_string().contains("y coordinate is negative"));
    }

    #[test]
    fn state_round_trips_through_observation() {
        let state = State::new(2, 5);
        assert_eq!(Observation::from(state).state().unwrap(), state);
    }
}
