//! Configuration loading and typed config structures for the Standoff simulation.
//!
//! The canonical configuration lives in `standoff-config.yaml` at the project
//! root. Every section and every field is optional; anything missing falls
//! back to the published rules. The loaded ruleset is validated before it is
//! handed back, so a game can never start from an impossible configuration.

use std::path::Path;

use serde::Deserialize;
use standoff_types::{InvalidRules, RulesConfig};

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

    /// The YAML parsed but the ruleset is unusable.
    #[error("invalid rules: {source}")]
    Invalid {
        /// The violated constraint.
        #[from]
        source: InvalidRules,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
///
/// Mirrors the structure of `standoff-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EngineConfig {
    /// Game-level settings (name, seed, pacing).
    #[serde(default)]
    pub game: GameConfig,

    /// The ruleset.
    #[serde(default)]
    pub rules: RulesConfig,

    /// Which decision provider drives the agents.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `STANDOFF_SEED` overrides `game.seed`
    /// - `STANDOFF_PROVIDER` overrides `provider.kind`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if the ruleset fails validation.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the ruleset fails validation.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides();
        config.rules.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Some(seed) = std::env::var("STANDOFF_SEED")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
        {
            self.game.seed = seed;
        }
        if let Some(kind) = std::env::var("STANDOFF_PROVIDER")
            .ok()
            .and_then(|v| ProviderKind::from_name(&v))
        {
            self.provider.kind = kind;
        }
    }
}

/// Game-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GameConfig {
    /// Human-readable game name.
    #[serde(default = "default_game_name")]
    pub name: String,

    /// Seed for the covert coin and scripted doctrines.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Real-time milliseconds between rounds.
    #[serde(default)]
    pub round_interval_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            name: default_game_name(),
            seed: default_seed(),
            round_interval_ms: 0,
        }
    }
}

/// Decision provider selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ProviderConfig {
    /// Which provider to use.
    #[serde(default)]
    pub kind: ProviderKind,
}

/// The available decision providers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Seeded scripted doctrines, one per persona. Runs offline.
    #[default]
    Scripted,
    /// Every agent stands down every round.
    StandDown,
    /// An LLM backend configured from the environment.
    Llm,
}

impl ProviderKind {
    /// Parse a provider name as written in YAML or the environment.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "scripted" => Some(Self::Scripted),
            "stand_down" | "stand-down" => Some(Self::StandDown),
            "llm" => Some(Self::Llm),
            _ => None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_game_name() -> String {
    String::from("Standoff")
}

const fn default_seed() -> u64 {
    42
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let config = EngineConfig::parse("{}").unwrap();
        assert_eq!(config.rules, RulesConfig::default());
        assert_eq!(config.game.name, "Standoff");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn parses_nested_rule_overrides() {
        let yaml = r"
game:
  name: short-fuse
  round_interval_ms: 250
rules:
  max_rounds: 12
  lock_threshold: 3
  actions:
    strike:
      target_loss: 6
provider:
  kind: stand_down
logging:
  level: debug
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.game.name, "short-fuse");
        assert_eq!(config.game.round_interval_ms, 250);
        assert_eq!(config.rules.max_rounds, 12);
        assert_eq!(config.rules.lock_threshold, 3);
        assert_eq!(config.rules.actions.strike.target_loss, 6);
        assert_eq!(config.rules.actions.strike.actor_gain, 3);
        assert_eq!(config.provider.kind, ProviderKind::StandDown);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn rejects_invalid_rules() {
        let result = EngineConfig::parse("rules:\n  stability_max: 0\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn rejects_malformed_yaml() {
        let result = EngineConfig::parse("rules: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn provider_names_accept_both_spellings() {
        assert_eq!(ProviderKind::from_name("Stand-Down"), Some(ProviderKind::StandDown));
        assert_eq!(ProviderKind::from_name(" llm "), Some(ProviderKind::Llm));
        assert_eq!(ProviderKind::from_name("oracle"), None);
    }

    #[test]
    fn shipped_config_spells_out_the_defaults() {
        let config = EngineConfig::parse(include_str!("../../../standoff-config.yaml")).unwrap();
        let expected = RulesConfig {
            decision_timeout_ms: 30_000,
            ..RulesConfig::default()
        };
        assert_eq!(config.rules, expected);
    }
}
