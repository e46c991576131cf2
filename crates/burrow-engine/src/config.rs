//! World configuration.
//!
//! Everything the simulation needs at construction time: map size, gravity,
//! the dt clamp, the RNG seed, and gameplay tuning. All structs deserialize
//! with `#[serde(default)]`, so a JSON document only has to name the fields it
//! overrides.
//!
//! ```
//! use burrow_engine::config::WorldConfig;
//!
//! let config = WorldConfig::from_json(r#"{ "width": 64, "height": 32, "seed": 9 }"#).unwrap();
//! assert_eq!(config.width, 64);
//! assert_eq!(config.max_dt, 0.2);
//! ```

use serde::{Deserialize, Serialize};

use crate::math::Vec2;
use crate::tilemap::MAX_MAP_SIDE;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Reasons a [`WorldConfig`] is rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("world dimensions must be in 1..={max}, got {width}x{height}", max = MAX_MAP_SIDE)]
    InvalidDimensions { width: u32, height: u32 },

    #[error("max_dt must be positive and finite, got {0}")]
    InvalidMaxDt(f64),

    #[error("gravity must be finite, got ({x}, {y})")]
    InvalidGravity { x: f64, y: f64 },

    #[error("failed to parse world config: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Constants used by every physics component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// Horizontal friction force while grounded.
    pub ground_friction: f64,
    /// Horizontal drag force while airborne.
    pub air_friction: f64,
    /// Per-axis scale of the entity-entity repulsion force.
    pub repulsion: Vec2,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            ground_friction: 20.0,
            air_friction: 1.0,
            repulsion: Vec2::new(80.0, 20.0),
        }
    }
}

/// Player controller constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub run_force: f64,
    pub run_speed: f64,
    pub jump_impulse: f64,
    pub dash_impulse: f64,
    pub dash_cooldown: f64,
    /// Maximum distance, in tiles, for breaking and placing.
    pub reach: f64,
    pub shoot_cooldown: f64,
    pub projectile_speed: f64,
    /// Inventory slots; the first `hotbar_size` form the hotbar.
    pub inventory_size: usize,
    pub hotbar_size: usize,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            run_force: 50.0,
            run_speed: 5.0,
            jump_impulse: 13.0,
            dash_impulse: 10.0,
            dash_cooldown: 1.0,
            reach: 5.0,
            shoot_cooldown: 0.2,
            projectile_speed: 20.0,
            inventory_size: 45,
            hotbar_size: 9,
        }
    }
}

/// Simple AI constants.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    pub decision_period: f64,
    pub speed: f64,
    /// Force is `speed * force_scale` toward the chosen direction.
    pub force_scale: f64,
    pub jump_impulse: f64,
    pub near_player_jump_chance: f64,
    pub hazard_jump_chance: f64,
    /// How close to a blocking tile an enemy must be before it hops.
    pub obstacle_margin: f64,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            decision_period: 0.3,
            speed: 2.0,
            force_scale: 10.0,
            jump_impulse: 8.0,
            near_player_jump_chance: 0.5,
            hazard_jump_chance: 0.1,
            obstacle_margin: 0.1,
        }
    }
}

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Tilemap width in tiles.
    pub width: u32,
    /// Tilemap height in tiles.
    pub height: u32,
    pub gravity: Vec2,
    /// Upper bound applied to every frame's dt.
    pub max_dt: f64,
    pub seed: u64,
    /// Player spawn point; defaults to the map centre, five tiles up.
    pub player_spawn: Option<Vec2>,
    /// Record per-frame forces for debug drawing.
    pub debug: bool,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub ai: AiTuning,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 128,
            gravity: Vec2::new(0.0, 15.0),
            max_dt: 0.2,
            seed: 0,
            player_spawn: None,
            debug: false,
            physics: PhysicsTuning::default(),
            player: PlayerTuning::default(),
            ai: AiTuning::default(),
        }
    }
}

impl WorldConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let side_ok = |side: u32| (1..=MAX_MAP_SIDE).contains(&side);
        if !(side_ok(self.width) && side_ok(self.height)) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.max_dt > 0.0 && self.max_dt.is_finite()) {
            return Err(ConfigError::InvalidMaxDt(self.max_dt));
        }
        if !(self.gravity.x.is_finite() && self.gravity.y.is_finite()) {
            return Err(ConfigError::InvalidGravity {
                x: self.gravity.x,
                y: self.gravity.y,
            });
        }
        Ok(())
    }

    pub fn player_spawn(&self) -> Vec2 {
        self.player_spawn.unwrap_or_else(|| {
            Vec2::new(
                (self.width / 2) as f64 + 0.5,
                (self.height / 2) as f64 - 4.5,
            )
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        WorldConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            WorldConfig::from_json(r#"{ "gravity": { "x": 0.0, "y": 20.0 }, "physics": { "air_friction": 2.0 } }"#)
                .unwrap();
        assert_eq!(config.gravity, Vec2::new(0.0, 20.0));
        assert_eq!(config.physics.air_friction, 2.0);
        assert_eq!(config.physics.ground_friction, 20.0);
        assert_eq!(config.width, 256);
    }

    #[test]
    fn zero_width_is_rejected() {
        let err = WorldConfig::from_json(r#"{ "width": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDimensions { .. }));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let err = WorldConfig::from_json(r#"{ "width": 2147483649 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDimensions { width: 2_147_483_649, .. }));

        let config = WorldConfig {
            height: MAX_MAP_SIDE + 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidDimensions { .. })));

        let config = WorldConfig {
            width: MAX_MAP_SIDE,
            height: 1,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn negative_max_dt_is_rejected() {
        let config = WorldConfig {
            max_dt: -0.1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidMaxDt(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = WorldConfig::from_json("{ width: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn spawn_defaults_to_map_centre() {
        let config = WorldConfig {
            width: 100,
            height: 50,
            ..Default::default()
        };
        assert_eq!(config.player_spawn(), Vec2::new(50.5, 20.5));
    }
}
