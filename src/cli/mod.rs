//! CLI infrastructure for the gridq toolkit
//!
//! This module provides the command-line interface for training a
//! Q-learning agent on a grid world and printing the extracted policy.

pub mod commands;
pub mod output;
