//! Training pipeline abstractions
//!
//! This module provides:
//! - The episode loop driving a Q-learning agent against an environment
//! - Per-step and per-episode records handed to observers
//! - Observer implementations for progress, metrics and JSONL export

pub mod observers;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{JsonlObserver, MetricsObserver, ProgressObserver, TrainingMetrics};
pub use training::{EpisodeSummary, StepRecord, TrainingConfig, TrainingPipeline, TrainingResult};

pub use crate::ports::Observer;
