//! Train command - Train a Q-learning agent on a grid world

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::{
    Error,
    adapters::{GridWorld, GridWorldConfig, Move},
    cli::output::{format_number, format_percent, print_grid, print_section, print_stats_table},
    pipeline::{
        JsonlObserver, MetricsObserver, ProgressObserver, TrainingConfig, TrainingPipeline,
        TrainingResult,
    },
    q_learning::{ExtractionMode, PolicyEntry, extract_with_mode},
    types::State,
};

#[derive(Debug, Serialize)]
struct TrainingSummaryFile {
    training: TrainingResult,
    config: TrainingConfig,
    grid: GridWorldConfig,
    extraction: ExtractionMode,
    policy: Vec<PolicyEntry>,
}

/// Parse a cell given as `x:y`
pub fn parse_cell(value: &str) -> crate::Result<State> {
    let parse_error = || Error::ParseCell {
        input: value.to_string(),
    };
    let (x, y) = value.trim().split_once(':').ok_or_else(parse_error)?;
    let x = x.trim().parse().map_err(|_| parse_error())?;
    let y = y.trim().parse().map_err(|_| parse_error())?;
    Ok(State::new(x, y))
}

/// Parse a comma-separated move list such as `east,south`
pub fn parse_moves(value: &str) -> crate::Result<Vec<Move>> {
    value
        .split(',')
        .filter(|token| !token.trim().is_empty())
        .map(str::parse)
        .collect()
}

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Treat trailing separators or missing filename as a directory target.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("training_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent on a grid world", allow_negative_numbers = true)]
pub struct TrainArgs {
    /// Grid width (x dimension)
    #[arg(long, default_value_t = 5)]
    pub width: usize,

    /// Grid height (y dimension)
    #[arg(long, default_value_t = 5)]
    pub height: usize,

    /// Start cell as x:y (defaults to 0:0)
    #[arg(long)]
    pub start: Option<String>,

    /// Goal cell as x:y (defaults to the bottom-right corner)
    #[arg(long)]
    pub goal: Option<String>,

    /// Wall cell as x:y, repeatable
    #[arg(long = "wall")]
    pub walls: Vec<String>,

    /// Comma-separated moves; action i performs the i-th move
    #[arg(long, default_value = "east,south,west,north")]
    pub moves: String,

    /// Reward for reaching the goal
    #[arg(long, default_value_t = 1.0)]
    pub goal_reward: f64,

    /// Reward for every other step
    #[arg(long, default_value_t = 0.0)]
    pub step_reward: f64,

    /// JSON file with a training configuration; flags below override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Number of training episodes
    #[arg(long, short = 'e')]
    pub episodes: Option<usize>,

    /// Step cap per episode
    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Learning rate α
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Discount factor γ
    #[arg(long)]
    pub discount_factor: Option<f64>,

    /// Probability of taking the greedy action instead of a random one
    #[arg(long)]
    pub exploit_probability: Option<f64>,

    /// Random seed for reproducibility
    #[arg(long)]
    pub seed: Option<u64>,

    /// Extract the policy from the table without re-stepping the environment
    #[arg(long, default_value_t = false)]
    pub table_only: bool,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Optional path for writing the policy as JSON
    #[arg(long)]
    pub policy: Option<PathBuf>,

    /// Optional file for JSONL observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Include every value update in the JSONL observations
    #[arg(long, default_value_t = false)]
    pub record_steps: bool,

    /// Show progress bar
    #[arg(long, default_value_t = false)]
    pub progress: bool,
}

impl TrainArgs {
    fn grid_config(&self) -> Result<GridWorldConfig> {
        let mut config = GridWorldConfig::new(self.width, self.height)
            .with_moves(parse_moves(&self.moves)?)
            .with_rewards(self.goal_reward, self.step_reward);
        if let Some(start) = &self.start {
            config = config.with_start(parse_cell(start)?);
        }
        if let Some(goal) = &self.goal {
            config = config.with_goal(parse_cell(goal)?);
        }
        let walls = self
            .walls
            .iter()
            .map(|wall| parse_cell(wall))
            .collect::<crate::Result<Vec<_>>>()?;
        Ok(config.with_walls(walls))
    }

    fn training_config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::load(path)
                .with_context(|| format!("loading training config {}", path.display()))?,
            None => TrainingConfig::default(),
        };
        if let Some(episodes) = self.episodes {
            config.episodes = episodes;
        }
        if let Some(max_steps) = self.max_steps {
            config.max_steps = max_steps;
        }
        if let Some(learning_rate) = self.learning_rate {
            config.learning_rate = learning_rate;
        }
        if let Some(discount_factor) = self.discount_factor {
            config.discount_factor = discount_factor;
        }
        if let Some(exploit_probability) = self.exploit_probability {
            config.exploit_probability = exploit_probability;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        config.validate()?;
        Ok(config)
    }
}

pub fn execute(args: TrainArgs) -> Result<()> {
    let grid_config = args.grid_config()?;
    let config = args.training_config()?;
    let mode = if args.table_only {
        ExtractionMode::TableOnly
    } else {
        ExtractionMode::Replay
    };

    let mut world = GridWorld::new(grid_config.clone())?;

    let metrics_observer = MetricsObserver::new();
    let metrics = metrics_observer.handle();
    let mut pipeline =
        TrainingPipeline::new(config.clone()).with_observer(Box::new(metrics_observer));
    if args.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)?.with_steps(args.record_steps);
        pipeline = pipeline.with_observer(Box::new(observer));
    }

    let (table, result) = pipeline.run(&mut world)?;
    let policy = extract_with_mode(&mut world, &table, mode)?;

    print_section("Learned policy");
    print_grid(&world.render_policy(&policy));

    print_section("Training statistics");
    let metrics = metrics.borrow();
    print_stats_table(&[
        ("Episodes", format_number(result.episodes)),
        ("Total steps", format_number(result.total_steps)),
        (
            "Goal reached",
            format!(
                "{} ({})",
                result.terminated_episodes,
                format_percent(metrics.success_rate())
            ),
        ),
        ("Mean reward", format!("{:.3}", result.mean_reward)),
        ("Mean steps", format!("{:.1}", result.mean_steps)),
        (
            "Last 10 episodes",
            format!("{:.1} steps", metrics.recent_mean_steps(10)),
        ),
        ("Exploration rate", format_percent(metrics.exploration_rate())),
    ]);

    if let Some(path) = &args.policy {
        policy.save(path)?;
        println!("\nPolicy written to {}", path.display());
    }

    if let Some(raw) = &args.summary {
        let path = sanitize_summary_path(raw);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating summary directory {}", parent.display()))?;
        }
        let summary = TrainingSummaryFile {
            training: result,
            config,
            grid: grid_config,
            extraction: mode,
            policy: policy.to_entries(),
        };
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating summary file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &summary)?;
        println!("\nSummary written to {}", path.display());
    }

    Ok(())
}
