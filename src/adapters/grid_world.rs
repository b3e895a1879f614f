//! Deterministic grid-world environment
//!
//! A rectangular maze with a start cell, a goal cell and optional walls.
//! The agent moves one cell per step; moves that would leave the grid or
//! enter a wall leave it in place. Reaching the goal ends the episode.

use std::{collections::BTreeSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::Environment,
    q_learning::OptimalPolicy,
    spaces::{Discrete, TupleSpace},
    types::{Observation, State, Step},
};

/// One-cell move on the grid
///
/// `x` grows eastwards and `y` grows southwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Move {
    East,
    South,
    West,
    North,
}

impl Move {
    pub const ALL: [Move; 4] = [Move::East, Move::South, Move::West, Move::North];

    /// Offset applied to `(x, y)`
    pub fn delta(self) -> (isize, isize) {
        match self {
            Move::East => (1, 0),
            Move::South => (0, 1),
            Move::West => (-1, 0),
            Move::North => (0, -1),
        }
    }

    /// Glyph used when rendering a policy
    pub fn arrow(self) -> char {
        match self {
            Move::East => '→',
            Move::South => '↓',
            Move::West => '←',
            Move::North => '↑',
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Move::East => "east",
            Move::South => "south",
            Move::West => "west",
            Move::North => "north",
        };
        f.write_str(name)
    }
}

impl FromStr for Move {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "east" | "e" | "right" => Ok(Move::East),
            "south" | "s" | "down" => Ok(Move::South),
            "west" | "w" | "left" => Ok(Move::West),
            "north" | "n" | "up" => Ok(Move::North),
            other => Err(Error::ParseMove {
                input: other.to_string(),
                expected: "east, south, west, north".to_string(),
            }),
        }
    }
}

/// Configuration for a [`GridWorld`]
///
/// # Examples
///
/// ```
/// use gridq::adapters::{GridWorld, GridWorldConfig, Move};
/// use gridq::types::State;
///
/// let config = GridWorldConfig::new(4, 3)
///     .with_goal(State::new(3, 0))
///     .with_walls(vec![State::new(1, 0), State::new(1, 1)])
///     .with_moves(vec![Move::East, Move::North, Move::South]);
/// let world = GridWorld::new(config)?;
/// assert_eq!(world.config().moves.len(), 3);
/// # Ok::<(), gridq::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridWorldConfig {
    /// Number of columns (x dimension)
    pub width: usize,
    /// Number of rows (y dimension)
    pub height: usize,
    /// Cell the agent starts each episode in
    pub start: State,
    /// Terminal cell
    pub goal: State,
    /// Impassable cells
    pub walls: Vec<State>,
    /// Action index `i` performs `moves[i]`
    pub moves: Vec<Move>,
    /// Reward for the step that reaches the goal
    pub goal_reward: f64,
    /// Reward for every other step
    pub step_reward: f64,
}

impl GridWorldConfig {
    /// Open `width` by `height` grid from the top-left to the bottom-right
    /// corner with all four moves.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            start: State::new(0, 0),
            goal: State::new(width.saturating_sub(1), height.saturating_sub(1)),
            walls: Vec::new(),
            moves: Move::ALL.to_vec(),
            goal_reward: 1.0,
            step_reward: 0.0,
        }
    }

    pub fn with_start(mut self, start: State) -> Self {
        self.start = start;
        self
    }

    pub fn with_goal(mut self, goal: State) -> Self {
        self.goal = goal;
        self
    }

    pub fn with_walls(mut self, walls: Vec<State>) -> Self {
        self.walls = walls;
        self
    }

    pub fn with_moves(mut self, moves: Vec<Move>) -> Self {
        self.moves = moves;
        self
    }

    pub fn with_rewards(mut self, goal_reward: f64, step_reward: f64) -> Self {
        self.goal_reward = goal_reward;
        self.step_reward = step_reward;
        self
    }

    fn in_bounds(&self, cell: State) -> bool {
        cell.x < self.width && cell.y < self.height
    }

    /// Check the layout is consistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidGrid { message });

        if self.width == 0 || self.height == 0 {
            return invalid(format!(
                "grid must be non-empty, got {}x{}",
                self.width, self.height
            ));
        }
        if self.moves.is_empty() {
            return invalid("at least one move is required".to_string());
        }
        if !self.in_bounds(self.start) {
            return invalid(format!("start {} is outside the grid", self.start));
        }
        if !self.in_bounds(self.goal) {
            return invalid(format!("goal {} is outside the grid", self.goal));
        }
        if let Some(wall) = self.walls.iter().find(|w| !self.in_bounds(**w)) {
            return invalid(format!("wall {wall} is outside the grid"));
        }
        if self.walls.contains(&self.start) {
            return invalid(format!("start {} is a wall", self.start));
        }
        if self.walls.contains(&self.goal) {
            return invalid(format!("goal {} is a wall", self.goal));
        }
        if !self.goal_reward.is_finite() || !self.step_reward.is_finite() {
            return invalid("rewards must be finite".to_string());
        }
        Ok(())
    }
}

impl Default for GridWorldConfig {
    fn default() -> Self {
        Self::new(5, 5)
    }
}

/// Auxiliary step data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridInfo {
    /// Steps taken since the last reset, including this one
    pub steps: usize,
    /// The move was stopped by the border or a wall
    pub blocked: bool,
}

/// Deterministic grid-world environment
#[derive(Debug, Clone)]
pub struct GridWorld {
    config: GridWorldConfig,
    walls: BTreeSet<State>,
    position: State,
    steps: usize,
}

impl GridWorld {
    /// Create a grid world from a validated configuration
    pub fn new(config: GridWorldConfig) -> Result<Self> {
        config.validate()?;
        let walls = config.walls.iter().copied().collect();
        Ok(Self {
            position: config.start,
            config,
            walls,
            steps: 0,
        })
    }

    pub fn config(&self) -> &GridWorldConfig {
        &self.config
    }

    /// Agent's current cell
    pub fn position(&self) -> State {
        self.position
    }

    pub fn goal(&self) -> State {
        self.config.goal
    }

    pub fn is_wall(&self, cell: State) -> bool {
        self.walls.contains(&cell)
    }

    /// Cell reached by taking `action` from `state`, without side effects
    ///
    /// # Errors
    ///
    /// Returns an error if `action` is not a valid move index.
    pub fn transition(&self, state: State, action: usize) -> Result<State> {
        let mv = self
            .config
            .moves
            .get(action)
            .ok_or(Error::ActionOutOfBounds {
                action,
                num_actions: self.config.moves.len(),
            })?;
        let (dx, dy) = mv.delta();
        let target = state
            .x
            .checked_add_signed(dx)
            .zip(state.y.checked_add_signed(dy))
            .map(State::from)
            .filter(|cell| self.config.in_bounds(*cell) && !self.is_wall(*cell));
        Ok(target.unwrap_or(state))
    }

    /// Draw the policy as a grid of arrows
    ///
    /// Walls render as `#`, the goal as `G` and cells missing from the
    /// policy as `?`.
    pub fn render_policy(&self, policy: &OptimalPolicy) -> String {
        let mut out = String::new();
        for y in 0..self.config.height {
            for x in 0..self.config.width {
                let cell = State::new(x, y);
                let glyph = if cell == self.config.goal {
                    'G'
                } else if self.is_wall(cell) {
                    '#'
                } else {
                    policy
                        .action(cell)
                        .and_then(|action| self.config.moves.get(action))
                        .map_or('?', |mv| mv.arrow())
                };
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl Environment for GridWorld {
    type Info = GridInfo;

    fn observation_space(&self) -> TupleSpace {
        TupleSpace::grid(self.config.width, self.config.height)
    }

    fn action_space(&self) -> Discrete {
        Discrete::new(self.config.moves.len())
    }

    fn reset(&mut self) -> Result<Observation> {
        self.position = self.config.start;
        self.steps = 0;
        Ok(Observation::from_state(self.position))
    }

    fn step(&mut self, action: usize) -> Result<Step<GridInfo>> {
        let next = self.transition(self.position, action)?;
        let blocked = next == self.position;
        self.position = next;
        self.steps += 1;

        let done = next == self.config.goal;
        let reward = if done {
            self.config.goal_reward
        } else {
            self.config.step_reward
        };

        Ok(Step {
            observation: Observation::from_state(next),
            reward,
            done,
            info: GridInfo {
                steps: self.steps,
                blocked,
            },
        })
    }
}
