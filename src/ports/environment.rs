//! Environment port - the capability set a learner needs from a task
//!
//! The trainer and the policy extractor never depend on a concrete
//! environment. Anything that can be reset, stepped with a discrete action
//! and describe its spaces can be learned on.

use rand::Rng;

use crate::{
    Result,
    spaces::{Discrete, TupleSpace},
    types::{Observation, Step},
};

/// Environment trait - discrete grid task consumed by the learner
///
/// This trait represents a **port** in hexagonal architecture. Concrete
/// tasks such as [`GridWorld`](crate::adapters::GridWorld) are **adapters**
/// implementing it.
///
/// # Contract
///
/// - Observations carry the agent's `(x, y)` coordinates in their first two
///   components, within the first two members of
///   [`observation_space`](Environment::observation_space).
/// - Actions are indices in `0..action_space().n`.
/// - `step` mutates internal state; calling it after `done` was reported is
///   allowed and must not fail on that account.
///
/// # Examples
///
/// ```
/// use gridq::{
///     Result,
///     ports::Environment,
///     spaces::{Discrete, TupleSpace},
///     types::{Observation, State, Step},
/// };
///
/// /// One-dimensional corridor: action 0 stays, action 1 moves right.
/// struct Corridor {
///     x: usize,
/// }
///
/// impl Environment for Corridor {
///     type Info = ();
///
///     fn observation_space(&self) -> TupleSpace {
///         TupleSpace::grid(3, 1)
///     }
///
///     fn action_space(&self) -> Discrete {
///         Discrete::new(2)
///     }
///
///     fn reset(&mut self) -> Result<Observation> {
///         self.x = 0;
///         Ok(State::new(self.x, 0).into())
///     }
///
///     fn step(&mut self, action: usize) -> Result<Step<()>> {
///         self.x = (self.x + action).min(2);
///         Ok(Step {
///             observation: State::new(self.x, 0).into(),
///             reward: if self.x == 2 { 1.0 } else { 0.0 },
///             done: self.x == 2,
///             info: (),
///         })
///     }
/// }
/// ```
pub trait Environment {
    /// Auxiliary data returned alongside each step
    type Info;

    /// Shape of the observations this environment emits
    fn observation_space(&self) -> TupleSpace;

    /// Discrete actions this environment accepts
    fn action_space(&self) -> Discrete;

    /// Reinitialize internal state and return the initial observation.
    fn reset(&mut self) -> Result<Observation>;

    /// Apply `action` and advance the environment by one step.
    ///
    /// # Errors
    ///
    /// Implementations may reject actions outside the action space.
    fn step(&mut self, action: usize) -> Result<Step<Self::Info>>;

    /// Draw a uniformly random valid action.
    ///
    /// # Default Implementation
    ///
    /// Samples uniformly from [`action_space`](Environment::action_space)
    /// with the caller's generator, keeping seeded runs reproducible.
    fn sample_action<R: Rng>(&mut self, rng: &mut R) -> usize {
        self.action_space().sample(rng)
    }
}
