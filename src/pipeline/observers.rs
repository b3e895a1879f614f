//! Observer implementations for training pipelines
//!
//! Observers allow composable data collection during training without
//! coupling the episode loop to specific output formats.

use std::{
    cell::RefCell,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    rc::Rc,
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::{
    Error, Result,
    pipeline::training::{EpisodeSummary, StepRecord},
    ports::Observer,
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    terminated: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            terminated: 0,
        }
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes ({msg})")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        if summary.terminated {
            self.terminated += 1;
        }
        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(format!("goal reached {}", self.terminated));
        }
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(format!("goal reached {}", self.terminated));
        }
        Ok(())
    }
}

/// Per-episode metrics collected by [`MetricsObserver`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrainingMetrics {
    pub episode_steps: Vec<usize>,
    pub episode_rewards: Vec<f64>,
    pub terminated: Vec<bool>,
    pub explored: usize,
    pub exploited: usize,
    /// Largest absolute change made by a single update
    pub max_abs_delta: f64,
}

impl TrainingMetrics {
    /// Fraction of episodes that reached termination
    pub fn success_rate(&self) -> f64 {
        if self.terminated.is_empty() {
            return 0.0;
        }
        self.terminated.iter().filter(|&&t| t).count() as f64 / self.terminated.len() as f64
    }

    /// Fraction of actions drawn at random
    pub fn exploration_rate(&self) -> f64 {
        let total = self.explored + self.exploited;
        if total == 0 {
            0.0
        } else {
            self.explored as f64 / total as f64
        }
    }

    /// Mean length of the last `window` episodes
    pub fn recent_mean_steps(&self, window: usize) -> f64 {
        let start = self.episode_steps.len().saturating_sub(window);
        let recent = &self.episode_steps[start..];
        if recent.is_empty() {
            0.0
        } else {
            recent.iter().sum::<usize>() as f64 / recent.len() as f64
        }
    }
}

/// Metrics observer - Tracks training metrics
///
/// The pipeline owns the boxed observer, so the metrics live behind a
/// shared handle the caller keeps.
///
/// # Examples
///
/// ```
/// use gridq::adapters::{GridWorld, GridWorldConfig};
/// use gridq::pipeline::{MetricsObserver, TrainingConfig, TrainingPipeline};
///
/// let observer = MetricsObserver::new();
/// let metrics = observer.handle();
/// let mut world = GridWorld::new(GridWorldConfig::new(3, 3))?;
/// TrainingPipeline::new(TrainingConfig::default().with_episodes(5).with_seed(1))
///     .with_observer(Box::new(observer))
///     .run(&mut world)?;
/// assert_eq!(metrics.borrow().episode_steps.len(), 5);
/// # Ok::<(), gridq::Error>(())
/// ```
pub struct MetricsObserver {
    metrics: Rc<RefCell<TrainingMetrics>>,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self {
            metrics: Rc::new(RefCell::new(TrainingMetrics::default())),
        }
    }

    /// Shared view of the collected metrics
    pub fn handle(&self) -> Rc<RefCell<TrainingMetrics>> {
        Rc::clone(&self.metrics)
    }
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let mut metrics = self.metrics.borrow_mut();
        *metrics = TrainingMetrics::default();
        metrics.episode_steps.reserve(total_episodes);
        metrics.episode_rewards.reserve(total_episodes);
        metrics.terminated.reserve(total_episodes);
        Ok(())
    }

    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        let mut metrics = self.metrics.borrow_mut();
        let delta = (record.new_value - record.old_value).abs();
        metrics.max_abs_delta = metrics.max_abs_delta.max(delta);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let mut metrics = self.metrics.borrow_mut();
        metrics.episode_steps.push(summary.steps);
        metrics.episode_rewards.push(summary.total_reward);
        metrics.terminated.push(summary.terminated);
        metrics.explored += summary.explored;
        metrics.exploited += summary.exploited;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum JsonlLine<'a> {
    Step(&'a StepRecord),
    Episode(&'a EpisodeSummary),
}

/// JSONL observer - Writes one JSON object per event
///
/// Episode summaries are always written; per-step records only when
/// enabled with [`with_steps`](JsonlObserver::with_steps).
pub struct JsonlObserver {
    writer: BufWriter<File>,
    include_steps: bool,
}

impl JsonlObserver {
    /// Create a new JSONL observer writing to `path`
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create observation file {}", path.display()),
            source,
        })?;
        Ok(Self {
            writer: BufWriter::new(file),
            include_steps: false,
        })
    }

    /// Also record every value update
    pub fn with_steps(mut self, include_steps: bool) -> Self {
        self.include_steps = include_steps;
        self
    }

    fn write_line(&mut self, line: &JsonlLine<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Observer for JsonlObserver {
    fn on_step(&mut self, record: &StepRecord) -> Result<()> {
        if self.include_steps {
            self.write_line(&JsonlLine::Step(record))?;
        }
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.write_line(&JsonlLine::Episode(summary))
    }

    fn on_training_end(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(episode: usize, steps: usize, terminated: bool) -> EpisodeSummary {
        EpisodeSummary {
            episode,
            steps,
            total_reward: if terminated { 1.0 } else { 0.0 },
            explored: steps / 2,
            exploited: steps - steps / 2,
            terminated,
        }
    }

    #[test]
    fn metrics_accumulate_episodes() {
        let mut observer = MetricsObserver::new();
        let metrics = observer.handle();
        observer.on_training_start(3).unwrap();
        observer.on_episode_end(&summary(0, 10, false)).unwrap();
        observer.on_episode_end(&summary(1, 4, true)).unwrap();
        observer.on_episode_end(&summary(2, 2, true)).unwrap();

        let metrics = metrics.borrow();
        assert_eq!(metrics.episode_steps, vec![10, 4, 2]);
        assert!((metrics.success_rate() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(metrics.explored, 5 + 2 + 1);
        assert_eq!(metrics.recent_mean_steps(2), 3.0);
        assert_eq!(metrics.recent_mean_steps(10), 16.0 / 3.0);
    }

    #[test]
    fn empty_metrics_report_zero() {
        let metrics = TrainingMetrics::default();
        assert_eq!(metrics.success_rate(), 0.0);
        assert_eq!(metrics.exploration_rate(), 0.0);
        assert_eq!(metrics.recent_mean_steps(5), 0.0);
    }

    #[test]
    fn jsonl_writes_episode_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("episodes.jsonl");
        let mut observer = JsonlObserver::new(&path).unwrap();
        observer.on_episode_end(&summary(0, 3, true)).unwrap();
        observer.on_episode_end(&summary(1, 5, false)).unwrap();
        observer.on_training_end().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "episode");
        assert_eq!(lines[1]["steps"], 5);
        assert_eq!(lines[1]["terminated"], false);
    }
}
