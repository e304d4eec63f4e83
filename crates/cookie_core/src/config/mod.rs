//! Configuration system
//!
//! Tunables for the physics components, the octree and the game session.
//! Defaults reproduce the values the game shipped with; any of them can be
//! overridden from a `.toml` or `.ron` file through the [`Config`] trait.

pub use serde::{Serialize, Deserialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A value is outside its allowed range
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field
        field: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Physics component tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration applied to airborne cookies (units/s^2)
    pub gravity: f32,
    /// Height at or below which a cookie counts as resting on the ground
    pub ground_epsilon: f32,
    /// Base points awarded per cookie hit
    pub points_per_hit: f32,
    /// Seconds a hit billboard lives before it is despawned
    pub billboard_lifetime: f32,
    /// Upward drift speed of hit billboards
    pub billboard_speed: f32,
    /// Speed a thrown cookie leaves the player with
    pub throw_velocity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: 10.0,
            ground_epsilon: 0.2,
            points_per_hit: 500.0,
            billboard_lifetime: 1.0,
            billboard_speed: 1.5,
            throw_velocity: 15.0,
        }
    }
}

/// Octree build parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    /// Regions at or below this extent on every axis are not subdivided
    pub min_node_size: f32,
    /// Hard stop for subdivision depth
    pub max_depth: u32,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            min_node_size: 1.0,
            max_depth: 32,
        }
    }
}

/// Game session parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Countdown the session starts with, in seconds
    pub start_time: f32,
    /// Points per remaining second added to the final score on a win
    pub time_bonus_per_second: f32,
    /// Material applied to a target once it has been delivered to
    pub delivered_material: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            start_time: 60.0,
            time_bonus_per_second: 100.0,
            delivered_material: "Red Rubber".to_string(),
        }
    }
}

/// Top-level simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Physics tunables
    pub physics: PhysicsConfig,
    /// Octree parameters
    pub octree: OctreeConfig,
    /// Session parameters
    pub game: GameConfig,
}

impl Config for SimulationConfig {}

impl SimulationConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.physics.gravity >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.gravity",
                reason: format!("must be non-negative, got {}", self.physics.gravity),
            });
        }

        if !(self.physics.ground_epsilon >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.ground_epsilon",
                reason: format!("must be non-negative, got {}", self.physics.ground_epsilon),
            });
        }

        if !(self.physics.throw_velocity >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.throw_velocity",
                reason: format!("must be non-negative, got {}", self.physics.throw_velocity),
            });
        }

        if !(self.physics.billboard_speed >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.billboard_speed",
                reason: format!("must be non-negative, got {}", self.physics.billboard_speed),
            });
        }

        if !(self.physics.points_per_hit > 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.points_per_hit",
                reason: format!("must be positive, got {}", self.physics.points_per_hit),
            });
        }

        if !(self.physics.billboard_lifetime >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "physics.billboard_lifetime",
                reason: format!("must be non-negative, got {}", self.physics.billboard_lifetime),
            });
        }

        if !(self.octree.min_node_size > 0.0) {
            return Err(ConfigError::Invalid {
                field: "octree.min_node_size",
                reason: format!("must be positive, got {}", self.octree.min_node_size),
            });
        }

        if self.octree.max_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "octree.max_depth",
                reason: "must be at least 1".to_string(),
            });
        }

        if !(self.game.start_time > 0.0) {
            return Err(ConfigError::Invalid {
                field: "game.start_time",
                reason: format!("must be positive, got {}", self.game.start_time),
            });
        }

        Ok(())
    }
}
