//! Workflow timing configuration.

use atelier_core::AspectRatio;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Busy floors and batch shape for the workflow controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder)]
#[builder(setter(into), default)]
pub struct WorkflowConfig {
    /// Minimum busy time for row regenerate and duplicate, in milliseconds.
    #[serde(default = "default_row_busy_floor_ms")]
    row_busy_floor_ms: u64,

    /// Minimum busy time for per-idea creative generation, in milliseconds.
    #[serde(default = "default_idea_busy_floor_ms")]
    idea_busy_floor_ms: u64,

    /// Ratios one batch is expected to contain.
    #[serde(default = "default_aspect_ratios")]
    aspect_ratios: Vec<AspectRatio>,
}

fn default_row_busy_floor_ms() -> u64 {
    3000
}

fn default_idea_busy_floor_ms() -> u64 {
    2000
}

fn default_aspect_ratios() -> Vec<AspectRatio> {
    AspectRatio::ALL.to_vec()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            row_busy_floor_ms: default_row_busy_floor_ms(),
            idea_busy_floor_ms: default_idea_busy_floor_ms(),
            aspect_ratios: default_aspect_ratios(),
        }
    }
}

impl WorkflowConfig {
    /// Floor for row-level regenerate and duplicate.
    pub fn row_busy_floor(&self) -> Duration {
        Duration::from_millis(self.row_busy_floor_ms)
    }

    /// Floor for per-idea creative generation.
    pub fn idea_busy_floor(&self) -> Duration {
        Duration::from_millis(self.idea_busy_floor_ms)
    }

    /// Creatives one batch should produce.
    pub fn batch_size(&self) -> usize {
        self.aspect_ratios.len()
    }

    /// Same configuration without busy floors, for scripted runs.
    pub fn without_floors(self) -> Self {
        Self {
            row_busy_floor_ms: 0,
            idea_busy_floor_ms: 0,
            ..self
        }
    }
}
