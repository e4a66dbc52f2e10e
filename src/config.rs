use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::errors::{DeskPilotError, DeskPilotResult};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub perception: PerceptionSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Hard ceiling on step-loop iterations per run.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    /// Maximum retained conversation entries (pinned seed included).
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Settle delay between steps, in milliseconds.
    #[serde(default = "default_step_pacing_ms")]
    pub step_pacing_ms: u64,
    /// Write the session transcript as JSONL under the platform data dir.
    #[serde(default)]
    pub persist_sessions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerceptionSettings {
    /// Bucket size in pixels used to group elements into visual rows
    /// before ordering left-to-right.
    #[serde(default = "default_grid_bucket")]
    pub grid_bucket: f32,
}

fn default_max_steps() -> u32 {
    30
}

fn default_history_window() -> usize {
    15
}

fn default_step_pacing_ms() -> u64 {
    500
}

fn default_grid_bucket() -> f32 {
    30.0
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            history_window: default_history_window(),
            step_pacing_ms: default_step_pacing_ms(),
            persist_sessions: false,
        }
    }
}

impl Default for PerceptionSettings {
    fn default() -> Self {
        Self {
            grid_bucket: default_grid_bucket(),
        }
    }
}

fn resolve_config_path() -> DeskPilotResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            let candidate = parent.join("deskpilot.toml");
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "config found next to executable");
                return Ok(candidate);
            }
        }
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("deskpilot.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(candidate);
    }

    Err(DeskPilotError::Config(
        "deskpilot.toml not found next to executable or in working directory".into(),
    ))
}

/// Load config from disk, or fall back to defaults when no file exists.
pub fn load_config() -> DeskPilotResult<AppConfig> {
    let path = match resolve_config_path() {
        Ok(p) => p,
        Err(_) => {
            tracing::info!("no config file found; using defaults");
            return Ok(AppConfig::default());
        }
    };
    let content = std::fs::read_to_string(&path)?;
    let config: AppConfig = toml::from_str(&content)?;
    tracing::info!(path = %path.display(), max_steps = config.engine.max_steps, "config loaded");
    Ok(config)
}

pub fn save_config(config: &AppConfig) -> DeskPilotResult<()> {
    let path = resolve_config_path()?;
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: AppConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.engine.max_steps, 30);
        assert_eq!(cfg.engine.history_window, 15);
        assert_eq!(cfg.engine.step_pacing_ms, 500);
        assert!(!cfg.engine.persist_sessions);
        assert_eq!(cfg.perception.grid_bucket, 30.0);
    }

    #[test]
    fn partial_sections_fill_in() {
        let cfg: AppConfig = toml::from_str("[engine]\nmax_steps = 5\n").unwrap();
        assert_eq!(cfg.engine.max_steps, 5);
        assert_eq!(cfg.engine.history_window, 15);
        assert_eq!(cfg.perception.grid_bucket, 30.0);
    }
}
