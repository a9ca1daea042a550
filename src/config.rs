//! Gameplay and capture tunables
//!
//! One explicit struct passed to constructors and `tick`; nothing reads
//! process-wide globals. Optionally loaded from a JSON file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts;

/// Config load/validation failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {source}")]
    Parse {
        #[from]
        source: serde_json::Error,
    },
    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

/// Game tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    // === Playfield (pixels) ===
    /// Scene width
    pub width: f32,
    /// Scene height
    pub height: f32,
    /// Top of the ground strip; obstacles and the hen rest on this line
    pub ground_y: f32,

    // === Physics (per tick) ===
    /// Downward acceleration added to vertical velocity each tick
    pub gravity: f32,
    /// Base upward jump speed before the intensity multiplier
    pub jump_power: f32,
    /// Minimum seconds between successful jumps
    pub jump_cooldown: f32,

    // === Voice control ===
    /// Smoothed intensity above which a grounded hen jumps
    pub sound_threshold: f32,
    /// Amplification applied to raw block RMS before smoothing
    pub mic_gain: f32,

    // === Obstacles ===
    /// Leftward travel per tick
    pub obstacle_speed: f32,
    /// Minimum screen-space gap to the newest obstacle before another spawns
    pub min_spacing: f32,
    /// Minimum seconds between spawns
    pub spawn_interval: f32,
    /// Score granted per obstacle that scrolls off screen
    pub points_per_obstacle: u32,

    // === Rewards ===
    /// Score at which the reward sink fires
    pub reward_threshold: u32,
    /// Recipient address for the stub wallet (any base58-looking string)
    pub wallet_address: Option<String>,

    // === Determinism ===
    /// Fixed RNG seed; `None` seeds from the wall clock at startup
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            ground_y: 500.0,

            gravity: 0.8,
            jump_power: 15.0,
            jump_cooldown: 0.05,

            sound_threshold: 0.1,
            mic_gain: 5.0,

            obstacle_speed: 5.0,
            min_spacing: 300.0,
            spawn_interval: 2.0,
            points_per_obstacle: 10,

            reward_threshold: 100,
            wallet_address: None,

            seed: None,
        }
    }
}

impl GameConfig {
    /// Where the hen stands: a quarter of the way across the scene
    pub fn hen_spawn_x(&self) -> f32 {
        self.width / 4.0
    }

    /// Grounded hen y (top edge); pixels grow downward
    pub fn hen_rest_y(&self) -> f32 {
        self.ground_y - consts::HEN_H
    }

    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a JSON file, or fall back to defaults when no path is given
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_string(),
                    source,
                })?;
                let config = Self::from_json(&json)?;
                log::info!("Loaded config from {}", path);
                Ok(config)
            }
            None => {
                log::info!("Using default config");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::Invalid {
                reason: reason.to_string(),
            })
        };
        if self.width <= 0.0 || self.height <= 0.0 {
            return invalid("playfield dimensions must be positive");
        }
        if self.ground_y <= consts::HEN_H || self.ground_y > self.height {
            return invalid("ground line must sit inside the scene with room for the hen");
        }
        if self.gravity <= 0.0 || self.jump_power <= 0.0 {
            return invalid("gravity and jump power must be positive");
        }
        if self.jump_cooldown < 0.0 || self.sound_threshold < 0.0 {
            return invalid("jump cooldown and sound threshold must be non-negative");
        }
        if self.mic_gain <= 0.0 {
            return invalid("mic gain must be positive");
        }
        if self.obstacle_speed <= 0.0 || self.spawn_interval <= 0.0 {
            return invalid("obstacle speed and spawn interval must be positive");
        }
        if self.min_spacing < 0.0 {
            return invalid("min spacing must be non-negative");
        }
        if self.points_per_obstacle == 0 || self.reward_threshold == 0 {
            return invalid("scoring values must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hen_spawn_x(), 200.0);
        assert_eq!(config.hen_rest_y(), 460.0);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{ "gravity": 1.2, "seed": 7 }"#).unwrap();
        assert_eq!(config.gravity, 1.2);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.width, 800.0);
        assert_eq!(config.reward_threshold, 100);
    }

    #[test]
    fn test_rejects_ground_line_outside_scene() {
        let mut config = GameConfig::default();
        config.ground_y = config.height + 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { .. })
        ));
    }

    #[test]
    fn test_rejects_non_positive_speeds() {
        let result = GameConfig::from_json(r#"{ "obstacle_speed": 0.0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }
}
