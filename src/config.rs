use std::path::PathBuf;

use crate::game::constants::{field, food, placement, records, session, timing};

/// Invalid configuration detected by `validate`
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("field dimensions must be positive and finite, got {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },
    #[error("{0} must be a non-negative finite number of seconds")]
    InvalidDuration(&'static str),
    #[error("tick rate must be at least 1 Hz")]
    ZeroTickRate,
    #[error("lag ceiling must be longer than one tick period")]
    LagCeilingTooShort,
    #[error("command buffer capacity must be at least 1")]
    ZeroCommandCapacity,
    #[error("player name cannot be empty")]
    EmptyPlayerName,
    #[error("records capacity cannot be negative, got {0}")]
    NegativeRecordsCapacity(i64),
}

/// Game field parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    /// Food count after stocking and after every reset
    pub start_food: usize,
    /// Seconds between periodic food drops
    pub food_generation_period: f32,
    pub food_generation_count: usize,
    /// Seconds of frozen simulation after a reset
    pub start_delay: f32,
    pub respawn_delay: f32,
    /// Rejection-sampling budget per placement
    pub placement_attempts: u32,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: field::WIDTH,
            height: field::HEIGHT,
            start_food: field::START_FOOD_COUNT,
            food_generation_period: food::GENERATION_PERIOD,
            food_generation_count: food::GENERATION_COUNT,
            start_delay: timing::START_DELAY,
            respawn_delay: timing::RESPAWN_DELAY,
            placement_attempts: placement::MAX_ATTEMPTS,
            seed: None,
        }
    }
}

impl FieldConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(width) = std::env::var("FIELD_WIDTH") {
            match width.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed.is_finite() => config.width = parsed,
                _ => tracing::warn!("Invalid FIELD_WIDTH '{}', using default", width),
            }
        }

        if let Ok(height) = std::env::var("FIELD_HEIGHT") {
            match height.parse::<f32>() {
                Ok(parsed) if parsed > 0.0 && parsed.is_finite() => config.height = parsed,
                _ => tracing::warn!("Invalid FIELD_HEIGHT '{}', using default", height),
            }
        }

        if let Ok(start_food) = std::env::var("START_FOOD") {
            if let Ok(parsed) = start_food.parse::<usize>() {
                config.start_food = parsed;
            } else {
                tracing::warn!("Invalid START_FOOD '{}', using default", start_food);
            }
        }

        if let Ok(attempts) = std::env::var("PLACEMENT_ATTEMPTS") {
            match attempts.parse::<u32>() {
                Ok(parsed) if parsed > 0 => config.placement_attempts = parsed,
                _ => tracing::warn!("PLACEMENT_ATTEMPTS must be > 0, using default"),
            }
        }

        if let Ok(seed) = std::env::var("SIM_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid SIM_SEED '{}', using random seed", seed);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()) {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        for (name, value) in [
            ("food_generation_period", self.food_generation_period),
            ("start_delay", self.start_delay),
            ("respawn_delay", self.respawn_delay),
        ] {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidDuration(name));
            }
        }
        Ok(())
    }
}

/// Scheduler and runner parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub tick_rate: u32,
    /// Accumulated lag at or above this many seconds is discarded
    pub max_lag_seconds: f64,
    /// Ticker sleep between frames
    pub frame_interval_ms: u64,
    pub command_buffer_capacity: usize,
    pub computer_players: usize,
    pub player_name: String,
    /// How long the headless runner keeps the session active
    pub run_seconds: u64,
    pub records_path: PathBuf,
    /// Signed so that a negative value can be reported instead of wrapped
    pub records_capacity: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_rate: timing::TICK_RATE,
            max_lag_seconds: timing::MAX_LAG_SECONDS,
            frame_interval_ms: session::FRAME_INTERVAL_MS,
            command_buffer_capacity: session::COMMAND_BUFFER_CAPACITY,
            computer_players: crate::game::constants::ai::COUNT,
            player_name: session::PLAYER_NAME.to_string(),
            run_seconds: 30,
            records_path: PathBuf::from(records::FILE_NAME),
            records_capacity: records::CAPACITY as i64,
        }
    }
}

impl SessionConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(tick_rate) = std::env::var("TICK_RATE") {
            match tick_rate.parse::<u32>() {
                Ok(parsed) if (1..=1000).contains(&parsed) => config.tick_rate = parsed,
                _ => tracing::warn!("TICK_RATE must be 1-1000, using default"),
            }
        }

        if let Ok(players) = std::env::var("COMPUTER_PLAYERS") {
            if let Ok(parsed) = players.parse::<usize>() {
                config.computer_players = parsed;
            } else {
                tracing::warn!("Invalid COMPUTER_PLAYERS '{}', using default", players);
            }
        }

        if let Ok(name) = std::env::var("PLAYER_NAME") {
            let name = name.trim();
            if name.is_empty() {
                tracing::warn!("PLAYER_NAME is empty, using default");
            } else {
                config.player_name = name.to_string();
            }
        }

        if let Ok(run_seconds) = std::env::var("RUN_SECONDS") {
            if let Ok(parsed) = run_seconds.parse::<u64>() {
                config.run_seconds = parsed;
            } else {
                tracing::warn!("Invalid RUN_SECONDS '{}', using default", run_seconds);
            }
        }

        if let Ok(path) = std::env::var("RECORDS_PATH") {
            config.records_path = PathBuf::from(path);
        }

        // Kept even when negative; validate() rejects it
        if let Ok(capacity) = std::env::var("RECORDS_CAPACITY") {
            if let Ok(parsed) = capacity.parse::<i64>() {
                config.records_capacity = parsed;
            } else {
                tracing::warn!("Invalid RECORDS_CAPACITY '{}', using default", capacity);
            }
        }

        config
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if !(self.max_lag_seconds > 1.0 / self.tick_rate as f64) {
            return Err(ConfigError::LagCeilingTooShort);
        }
        if self.command_buffer_capacity == 0 {
            return Err(ConfigError::ZeroCommandCapacity);
        }
        if self.player_name.trim().is_empty() {
            return Err(ConfigError::EmptyPlayerName);
        }
        if self.records_capacity < 0 {
            return Err(ConfigError::NegativeRecordsCapacity(self.records_capacity));
        }
        Ok(())
    }
}
