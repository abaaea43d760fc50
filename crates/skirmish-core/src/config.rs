//! Configuration loading and typed config structures for the engine.
//!
//! The canonical configuration lives in `skirmish-config.yaml`. Every field
//! has a default matching the reference rules (map radius 60, interaction
//! range 2, casualty probability 0.05, invalid moves ignored), so an empty
//! file or a missing section is valid.
//!
//! ```yaml
//! map:
//!   radius: 60
//! interaction:
//!   range: 2
//!   invalid_movement: ignore   # or: reject
//! battle:
//!   casualty_probability: 0.05
//! ```

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is outside its allowed range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Map geometry.
    #[serde(default)]
    pub map: MapConfig,

    /// Movement and interaction rules.
    #[serde(default)]
    pub interaction: InteractionConfig,

    /// Battle outcome parameters.
    #[serde(default)]
    pub battle: BattleConfig,
}

impl EngineConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.radius == 0 {
            return Err(ConfigError::Invalid {
                field: "map.radius",
                reason: String::from("must be greater than zero"),
            });
        }
        self.battle.validate()
    }
}

/// Map geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct MapConfig {
    /// Radius of the map disc, centred on the origin.
    #[serde(default = "default_map_radius")]
    pub radius: u32,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            radius: default_map_radius(),
        }
    }
}

/// What to do with a requested move that fails a geometry check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementPolicy {
    /// Leave the agent where it is and carry on with the tick.
    #[default]
    Ignore,
    /// Abort the whole transition with
    /// [`TransitionError::InvalidMovement`](crate::error::TransitionError::InvalidMovement).
    Reject,
}

/// Movement and interaction rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct InteractionConfig {
    /// Chebyshev distance within which two agents can interact.
    #[serde(default = "default_interaction_range")]
    pub range: u32,

    /// Handling of out-of-bounds or multi-step moves.
    #[serde(default)]
    pub invalid_movement: MovementPolicy,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            range: default_interaction_range(),
            invalid_movement: MovementPolicy::Ignore,
        }
    }
}

/// Battle outcome parameters.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BattleConfig {
    /// Independent chance that each losing combatant is killed in action.
    #[serde(default = "default_casualty_probability")]
    pub casualty_probability: f64,
}

impl BattleConfig {
    /// Check that the casualty probability is a finite value in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = self.casualty_probability;
        if p.is_finite() && (0.0..=1.0).contains(&p) {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                field: "battle.casualty_probability",
                reason: format!("{p} is not a probability in [0, 1]"),
            })
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            casualty_probability: default_casualty_probability(),
        }
    }
}

const fn default_map_radius() -> u32 {
    60
}

const fn default_interaction_range() -> u32 {
    2
}

const fn default_casualty_probability() -> f64 {
    0.05
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_reference_rules() {
        let config = EngineConfig::default();
        assert_eq!(config.map.radius, 60);
        assert_eq!(config.interaction.range, 2);
        assert_eq!(config.interaction.invalid_movement, MovementPolicy::Ignore);
        assert_eq!(config.battle.casualty_probability, 0.05);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
map:
  radius: 100
interaction:
  range: 3
  invalid_movement: reject
battle:
  casualty_probability: 0.25
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.map.radius, 100);
        assert_eq!(config.interaction.range, 3);
        assert_eq!(config.interaction.invalid_movement, MovementPolicy::Reject);
        assert_eq!(config.battle.casualty_probability, 0.25);
    }

    #[test]
    fn missing_sections_use_defaults() {
        let config = EngineConfig::parse("interaction:\n  range: 4\n").unwrap();
        assert_eq!(config.map.radius, 60);
        assert_eq!(config.interaction.range, 4);
        assert_eq!(config.interaction.invalid_movement, MovementPolicy::Ignore);
        assert_eq!(config.battle, BattleConfig::default());
    }

    #[test]
    fn zero_radius_is_rejected() {
        let err = EngineConfig::parse("map:\n  radius: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "map.radius", .. }));
    }

    #[test]
    fn out_of_range_casualty_probability_is_rejected() {
        let err = EngineConfig::parse("battle:\n  casualty_probability: 1.5\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "battle.casualty_probability",
                ..
            }
        ));

        let negative = BattleConfig {
            casualty_probability: -0.1,
        };
        assert!(negative.validate().is_err());

        let nan = BattleConfig {
            casualty_probability: f64::NAN,
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn malformed_yaml_is_reported() {
        let err = EngineConfig::parse("map: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn shipped_config_file_matches_defaults() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../skirmish-config.yaml");
        let config = EngineConfig::from_file(&path).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/skirmish-config.yaml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
