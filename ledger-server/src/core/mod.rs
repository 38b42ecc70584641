//! Core module - configuration and background task lifecycle
//!
//! - [`Config`] - environment-driven settings
//! - [`BackgroundTasks`] - spawned workers sharing one shutdown token

pub mod config;
pub mod tasks;

pub use config::Config;
pub use tasks::{BackgroundTasks, TaskKind};
