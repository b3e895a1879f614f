//! Training pipeline for the Q-learning agent

use std::{fs::File, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    Error, Result,
    ports::{Environment, Observer},
    q_learning::{ActionChoice, QLearningAgent, QTable},
    types::State,
};

/// Training configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Learning rate α, weight of the TD correction
    pub learning_rate: f64,

    /// Discount factor γ, weight of the estimated future value
    pub discount_factor: f64,

    /// Probability of taking the greedy action; random actions are taken
    /// with probability `1 - exploit_probability`
    pub exploit_probability: f64,

    /// Number of training episodes
    pub episodes: usize,

    /// Step cap per episode
    pub max_steps: usize,

    /// Random seed
    pub seed: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.5,
            discount_factor: 0.4,
            exploit_probability: 0.5,
            episodes: 100,
            max_steps: 1000,
            seed: None,
        }
    }
}

impl TrainingConfig {
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_exploit_probability(mut self, exploit_probability: f64) -> Self {
        self.exploit_probability = exploit_probability;
        self
    }

    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every hyperparameter is in range
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(Error::InvalidConfiguration { message });

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return invalid(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return invalid(format!(
                "discount_factor must be in [0, 1], got {}",
                self.discount_factor
            ));
        }
        if !(0.0..=1.0).contains(&self.exploit_probability) {
            return invalid(format!(
                "exploit_probability must be in [0, 1], got {}",
                self.exploit_probability
            ));
        }
        if self.episodes == 0 {
            return invalid("episodes must be at least 1".to_string());
        }
        if self.max_steps == 0 {
            return invalid("max_steps must be at least 1".to_string());
        }
        Ok(())
    }

    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open training config {}", path.display()),
            source,
        })?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }
}

/// One value update during training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRecord {
    pub episode: usize,
    /// Step number within the episode (1-based)
    pub step: usize,
    pub state: State,
    pub action: usize,
    pub choice: ActionChoice,
    pub reward: f64,
    pub next_state: State,
    pub done: bool,
    pub old_value: f64,
    pub new_value: f64,
}

/// Statistics for one completed episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    /// Steps whose action was drawn at random
    pub explored: usize,
    /// Steps whose action was the greedy one
    pub exploited: usize,
    /// The environment signalled termination (as opposed to hitting the cap)
    pub terminated: bool,
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes run
    pub episodes: usize,

    /// Steps taken across all episodes
    pub total_steps: usize,

    /// Episodes that ended by termination rather than the step cap
    pub terminated_episodes: usize,

    /// Mean of per-episode total reward
    pub mean_reward: f64,

    /// Mean episode length
    pub mean_steps: f64,
}

impl TrainingResult {
    /// Aggregate per-episode summaries
    pub fn from_episodes(episodes: &[EpisodeSummary]) -> Self {
        let count = episodes.len();
        let total_steps: usize = episodes.iter().map(|e| e.steps).sum();
        let total_reward: f64 = episodes.iter().map(|e| e.total_reward).sum();
        let terminated_episodes = episodes.iter().filter(|e| e.terminated).count();
        let (mean_reward, mean_steps) = if count > 0 {
            (total_reward / count as f64, total_steps as f64 / count as f64)
        } else {
            (0.0, 0.0)
        };

        Self {
            episodes: count,
            total_steps,
            terminated_episodes,
            mean_reward,
            mean_steps,
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Load result from JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let result = serde_json::from_reader(file)?;
        Ok(result)
    }
}

/// Training pipeline running Q-learning episodes against an environment
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train a fresh Q-table on `env`
    ///
    /// Runs the full episode budget; there is no convergence check. The
    /// environment is reset at the start of every episode and left in
    /// whatever state the last step produced.
    pub fn run<E: Environment>(&mut self, env: &mut E) -> Result<(QTable, TrainingResult)> {
        self.config.validate()?;
        let table = QTable::for_environment(
            env,
            self.config.learning_rate,
            self.config.discount_factor,
        )?;
        let mut agent =
            QLearningAgent::new(table, self.config.exploit_probability, self.config.seed);

        let (x_dims, y_dims, num_actions) = agent.q_table().shape();
        tracing::info!(
            x_dims,
            y_dims,
            num_actions,
            episodes = self.config.episodes,
            max_steps = self.config.max_steps,
            seed = ?self.config.seed,
            "starting Q-learning"
        );

        for observer in &mut self.observers {
            observer.on_training_start(self.config.episodes)?;
        }

        let mut summaries = Vec::with_capacity(self.config.episodes);
        for episode in 0..self.config.episodes {
            let summary = self.run_episode(episode, env, &mut agent)?;
            tracing::debug!(
                episode,
                steps = summary.steps,
                reward = summary.total_reward,
                terminated = summary.terminated,
                "episode finished"
            );

            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
            summaries.push(summary);
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }

        let result = TrainingResult::from_episodes(&summaries);
        tracing::info!(
            total_steps = result.total_steps,
            terminated = result.terminated_episodes,
            mean_reward = result.mean_reward,
            "training complete"
        );

        Ok((agent.into_q_table(), result))
    }

    fn run_episode<E: Environment>(
        &mut self,
        episode: usize,
        env: &mut E,
        agent: &mut QLearningAgent,
    ) -> Result<EpisodeSummary> {
        let mut state = env.reset()?.state()?;
        for observer in &mut self.observers {
            observer.on_episode_start(episode)?;
        }

        let mut summary = EpisodeSummary {
            episode,
            steps: 0,
            total_reward: 0.0,
            explored: 0,
            exploited: 0,
            terminated: false,
        };

        while !summary.terminated && summary.steps < self.config.max_steps {
            summary.steps += 1;

            let (action, choice) = agent.select_action(env, state)?;
            match choice {
                ActionChoice::Explore => summary.explored += 1,
                ActionChoice::Exploit => summary.exploited += 1,
            }

            let step = env.step(action)?;
            let next_state = step.observation.state()?;

            let old_value = agent.q_table().get(state, action)?;
            let new_value = agent.learn(state, action, step.reward, next_state)?;

            let record = StepRecord {
                episode,
                step: summary.steps,
                state,
                action,
                choice,
                reward: step.reward,
                next_state,
                done: step.done,
                old_value,
                new_value,
            };
            for observer in &mut self.observers {
                observer.on_step(&record)?;
            }

            summary.total_reward += step.reward;
            summary.terminated = step.done;
            state = next_state;
        }

        Ok(summary)
    }
}
