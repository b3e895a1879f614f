//! Common test utilities for the gridq test suite.
//!
//! Environment wrappers and fixtures shared by the integration tests.

#![allow(dead_code)]

use gridq::{
    Result,
    adapters::{GridWorld, GridWorldConfig, Move},
    ports::Environment,
    spaces::{Discrete, TupleSpace},
    types::{Observation, Step},
};
use rand::Rng;

/// Environment wrapper counting resets and steps
pub struct CountingEnv<E> {
    pub inner: E,
    pub resets: usize,
    pub steps: usize,
}

impl<E> CountingEnv<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            resets: 0,
            steps: 0,
        }
    }
}

impl<E: Environment> Environment for CountingEnv<E> {
    type Info = E::Info;

    fn observation_space(&self) -> TupleSpace {
        self.inner.observation_space()
    }

    fn action_space(&self) -> Discrete {
        self.inner.action_space()
    }

    fn reset(&mut self) -> Result<Observation> {
        self.resets += 1;
        self.inner.reset()
    }

    fn step(&mut self, action: usize) -> Result<Step<E::Info>> {
        self.steps += 1;
        self.inner.step(action)
    }

    fn sample_action<R: Rng>(&mut self, rng: &mut R) -> usize {
        self.inner.sample_action(rng)
    }
}

/// Environment that emits a fixed observation after every step
pub struct ScriptedEnv {
    pub space: TupleSpace,
    pub actions: usize,
    pub next: Observation,
}

impl Environment for ScriptedEnv {
    type Info = ();

    fn observation_space(&self) -> TupleSpace {
        self.space.clone()
    }

    fn action_space(&self) -> Discrete {
        Discrete::new(self.actions)
    }

    fn reset(&mut self) -> Result<Observation> {
        Ok(Observation::new(vec![0, 0]))
    }

    fn step(&mut self, _action: usize) -> Result<Step<()>> {
        Ok(Step {
            observation: self.next.clone(),
            reward: 0.0,
            done: false,
            info: (),
        })
    }
}

/// 2x2 grid with east/south moves and the goal in the bottom-right corner
pub fn two_by_two() -> GridWorld {
    GridWorld::new(GridWorldConfig::new(2, 2).with_moves(vec![Move::East, Move::South]))
        .expect("valid 2x2 grid")
}
