use crate::game::GameRules;
use std::result::Result;
use std::time::Duration;
use thiserror::Error;

/// Indicates that a configuration value could not be used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

/// Settings for the game engine.
///
/// | Field | Default | Environment variable |
/// |---|---|---|
/// | `default_word_length` | 5 | `WORDLE_DEFAULT_LENGTH` |
/// | `max_guesses` | 6 | `WORDLE_MAX_GUESSES` |
/// | `solution_rarity` | 1,000,000 | `WORDLE_SOLUTION_RARITY` |
/// | `guess_rarity` | 150,000 | `WORDLE_GUESS_RARITY` |
/// | `io_timeout` | 5s | `WORDLE_IO_TIMEOUT_MS` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Solution length used when a game is started without one.
    pub default_word_length: usize,
    pub max_guesses: usize,
    /// Solutions must be more frequent than this.
    pub solution_rarity: u64,
    /// Guesses must be more frequent than this.
    pub guess_rarity: u64,
    /// Deadline for each dictionary or store call.
    pub io_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let rules = GameRules::default();
        EngineConfig {
            default_word_length: 5,
            max_guesses: rules.max_guesses,
            solution_rarity: rules.solution_rarity,
            guess_rarity: rules.guess_rarity,
            io_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Result<EngineConfig, ConfigError> {
        EngineConfig::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration using `lookup` to fetch variables. Unset or blank variables keep
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<EngineConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = EngineConfig::default();
        Ok(EngineConfig {
            default_word_length: read_positive(
                &lookup,
                "WORDLE_DEFAULT_LENGTH",
                defaults.default_word_length as u64,
            )? as usize,
            max_guesses: read_positive(
                &lookup,
                "WORDLE_MAX_GUESSES",
                defaults.max_guesses as u64,
            )? as usize,
            solution_rarity: read_positive(
                &lookup,
                "WORDLE_SOLUTION_RARITY",
                defaults.solution_rarity,
            )?,
            guess_rarity: read_positive(&lookup, "WORDLE_GUESS_RARITY", defaults.guess_rarity)?,
            io_timeout: Duration::from_millis(read_positive(
                &lookup,
                "WORDLE_IO_TIMEOUT_MS",
                defaults.io_timeout.as_millis() as u64,
            )?),
        })
    }

    /// Checks values that may have been set in code rather than read with [`from_lookup`].
    ///
    /// [`from_lookup`]: EngineConfig::from_lookup
    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks: [(&'static str, u128); 5] = [
            ("WORDLE_DEFAULT_LENGTH", self.default_word_length as u128),
            ("WORDLE_MAX_GUESSES", self.max_guesses as u128),
            ("WORDLE_SOLUTION_RARITY", u128::from(self.solution_rarity)),
            ("WORDLE_GUESS_RARITY", u128::from(self.guess_rarity)),
            ("WORDLE_IO_TIMEOUT_MS", self.io_timeout.as_millis()),
        ];
        match checks.into_iter().find(|(_, value)| *value == 0) {
            Some((name, value)) => Err(ConfigError::InvalidValue {
                name,
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// The rules each new game is played under.
    pub fn rules(&self) -> GameRules {
        GameRules {
            max_guesses: self.max_guesses,
            solution_rarity: self.solution_rarity,
            guess_rarity: self.guess_rarity,
        }
    }
}

fn read_positive<F>(lookup: &F, name: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(default);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(default);
    }
    match trimmed.parse::<u64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            name,
            value: raw.clone(),
        }),
    }
}
