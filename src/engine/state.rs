use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::perception::resolver::DEFAULT_GRID_BUCKET;

/// Runtime knobs for one engine instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub max_steps: u32,
    pub history_window: usize,
    pub step_pacing_ms: u64,
    pub grid_bucket: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_steps: 30,
            history_window: 15,
            step_pacing_ms: 500,
            grid_bucket: DEFAULT_GRID_BUCKET,
        }
    }
}

impl From<&AppConfig> for EngineConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            max_steps: cfg.engine.max_steps,
            history_window: cfg.engine.history_window,
            step_pacing_ms: cfg.engine.step_pacing_ms,
            grid_bucket: cfg.perception.grid_bucket,
        }
    }
}

/// Why a run ended. Hitting the step ceiling and cooperative stop are
/// normal terminations, not crashes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum StopReason {
    /// Every task was completed or skipped.
    QueueDrained,
    /// The proposal service signalled the whole goal is satisfied.
    GoalComplete,
    /// The step ceiling was hit before the queue drained.
    StepLimitReached,
    /// The stop flag was raised by the host.
    StopRequested,
    /// A snapshot/proposal boundary failed or a step panicked its error up.
    Fatal { message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub reason: StopReason,
    pub steps: u32,
    pub tasks_remaining: usize,
    pub finished_at: DateTime<Utc>,
}
