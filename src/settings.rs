//! Simulation configuration
//!
//! Everything that used to be process-wide (debug/freeze/advance flags, arena
//! size, AI tuning) lives in [`SimConfig`] and is passed into each system call.
//! Persisted as JSON; missing fields fall back to their defaults.

use std::path::{Path, PathBuf};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::arena_radius;
use crate::consts::*;
use crate::sim::steering::PreyPick;

/// Errors from loading, saving or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to access config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// The playing field, `[0, width] x [0, height]` with y growing downward
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Default for Arena {
    fn default() -> Self {
        Self {
            width: WINDOW_WIDTH_PX,
            height: WINDOW_HEIGHT_PX,
        }
    }
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Default AI detection scale for this arena
    #[inline]
    pub fn radius(&self) -> f32 {
        arena_radius(self.width, self.height)
    }
}

/// Runtime toggles, normally switched by key presses
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Mode {
    /// Draw bounding shapes, mesh vertices and AI vectors
    pub debug: bool,
    /// Pause the simulation briefly and only show debug info
    pub freeze: bool,
    /// Enable vortices, stones and egg laying
    pub advance: bool,
}

/// AI tuning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringParams {
    /// Bug detection half-window; `None` derives it from the arena
    pub prey_epsilon: Option<f32>,
    /// Eagle detection half-window; `None` derives it from the arena
    pub predator_epsilon: Option<f32>,
    pub prey_fall_speed: f32,
    pub predator_speed: f32,
    /// Weight of the chase direction when blending with the flee direction
    pub blend_weight: f32,
    pub patrol_margin: f32,
    /// How an eagle chooses the bug it reacts to
    pub prey_pick: PreyPick,
}

impl Default for SteeringParams {
    fn default() -> Self {
        Self {
            prey_epsilon: None,
            predator_epsilon: None,
            prey_fall_speed: PREY_FALL_SPEED,
            predator_speed: PREDATOR_SPEED,
            blend_weight: PREDATOR_BLEND_WEIGHT,
            patrol_margin: PATROL_MARGIN,
            prey_pick: PreyPick::Random,
        }
    }
}

impl SteeringParams {
    pub fn prey_epsilon(&self, arena: &Arena) -> f32 {
        self.prey_epsilon.unwrap_or(arena.radius() / 4.0)
    }

    pub fn predator_epsilon(&self, arena: &Arena) -> f32 {
        self.predator_epsilon.unwrap_or(arena.radius() / 3.0)
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: Arena,
    pub mode: Mode,
    /// Run the AI every Nth frame (1 = every frame)
    pub ai_interval_frames: u32,
    /// Run collision detection every Nth frame (1 = every frame)
    pub collision_interval_frames: u32,
    pub steering: SteeringParams,
    /// Gravity given to newly laid eggs
    pub gravity: Vec2,
    /// RNG seed for spawning and prey selection
    pub seed: u64,
    /// Optional OBJ file for the chicken; a built-in polygon is used otherwise
    pub player_mesh: Option<PathBuf>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            arena: Arena::default(),
            mode: Mode::default(),
            ai_interval_frames: 1,
            collision_interval_frames: 1,
            steering: SteeringParams::default(),
            gravity: DEFAULT_GRAVITY,
            seed: 0,
            player_mesh: None,
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena.width > 0.0 && self.arena.height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "arena must have positive size, got {}x{}",
                self.arena.width, self.arena.height
            )));
        }
        if self.ai_interval_frames == 0 || self.collision_interval_frames == 0 {
            return Err(ConfigError::Invalid(
                "frame intervals must be at least 1".to_string(),
            ));
        }
        let w = self.steering.blend_weight;
        if !(0.0..=1.0).contains(&w) {
            return Err(ConfigError::Invalid(format!(
                "blend weight must be within [0, 1], got {w}"
            )));
        }
        Ok(())
    }

    pub fn prey_epsilon(&self) -> f32 {
        self.steering.prey_epsilon(&self.arena)
    }

    pub fn predator_epsilon(&self) -> f32 {
        self.steering.predator_epsilon(&self.arena)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_epsilons_follow_arena() {
        let config = SimConfig::default();
        let r = (1200.0f32 * 800.0).sqrt();
        assert!((config.prey_epsilon() - r / 4.0).abs() < 1e-3);
        assert!((config.predator_epsilon() - r / 3.0).abs() < 1e-3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json_str(
            r#"{ "arena": { "width": 640.0, "height": 480.0 }, "mode": { "advance": true } }"#,
        )
        .unwrap();
        assert_eq!(config.arena, Arena::new(640.0, 480.0));
        assert!(config.mode.advance);
        assert!(!config.mode.debug);
        assert_eq!(config.ai_interval_frames, 1);
        assert_eq!(config.steering.prey_pick, PreyPick::Random);
    }

    #[test]
    fn test_epsilon_override() {
        let config =
            SimConfig::from_json_str(r#"{ "steering": { "prey_epsilon": 50.0 } }"#).unwrap();
        assert_eq!(config.prey_epsilon(), 50.0);
        assert_eq!(config.steering.predator_speed, PREDATOR_SPEED);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = SimConfig::from_json_str(r#"{ "ai_interval_frames": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err =
            SimConfig::from_json_str(r#"{ "arena": { "width": 0.0, "height": 10.0 } }"#)
                .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SimConfig::from_json_str(r#"{ "steering": { "blend_weight": 1.5 } }"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("bug_chase_cfg_{}.json", std::process::id()));
        let mut config = SimConfig::default();
        config.seed = 42;
        config.steering.prey_pick = PreyPick::Nearest;
        config.save(&path).unwrap();
        let loaded = SimConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file() {
        let err = SimConfig::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
