/// Field defaults (overridable through `FieldConfig`)
pub mod field {
    /// Field width in world units
    pub const WIDTH: f32 = 50.0;
    /// Field height in world units
    pub const HEIGHT: f32 = 30.0;
    /// Food items present after a reset
    pub const START_FOOD_COUNT: usize = 450;
}

/// Cell and player-body constants
pub mod cell {
    /// Radius scaling: radius = sqrt(mass * RADIUS_SCALE)
    pub const RADIUS_SCALE: f32 = 0.01;
    /// Mass (and score) of a freshly spawned player
    pub const START_MASS: u32 = 40;
    /// Maximum number of cells one player may own
    pub const MAX_CELLS_PER_PLAYER: usize = 16;
    /// Cells lighter than this are skipped when splitting
    pub const MIN_SPLIT_MASS: u32 = 14;
    /// Seconds after a split before cells may merge again.
    /// Until then overlapping siblings push each other apart.
    pub const MERGE_COOLDOWN: f32 = 6.0;
}

/// Consumption thresholds
pub mod eat {
    /// Share of the prey's area that must be covered to eat it
    pub const OVERLAP_AREA_RATIO: f32 = 0.6;
    /// Share of the smaller sibling's area that must be covered to merge
    pub const MERGE_OVERLAP_AREA_RATIO: f32 = 0.2;
    /// Relative area advantage a cell needs over a rival cell to eat it.
    /// Also the score margin computer players use to classify rivals.
    pub const RELATIVE_MASS_DIFFERENCE: f32 = 0.1;
}

/// Food generation
pub mod food {
    pub const MASS_MIN: u32 = 1;
    pub const MASS_MAX: u32 = 6;
    /// Seconds between generation rounds
    pub const GENERATION_PERIOD: f32 = 3.0;
    /// Food items created per round
    pub const GENERATION_COUNT: usize = 40;
}

/// Simulation timing
pub mod timing {
    /// Internal simulation rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Seconds per tick
    pub const DT: f32 = 1.0 / TICK_RATE as f32;
    /// Accumulated lag at or above this is dropped instead of replayed
    pub const MAX_LAG_SECONDS: f64 = 1.0;
    /// Countdown before anything moves after a reset
    pub const START_DELAY: f32 = 1.5;
    /// Seconds a dead player waits before respawning
    pub const RESPAWN_DELAY: f32 = 3.0;
    /// Max-score high-water marks are refreshed this often
    pub const MAX_SCORE_REFRESH_PERIOD: f32 = 1.0;
}

/// Velocity shaping
pub mod speed {
    /// Desired velocity is scaled by this before clamping
    pub const MULTIPLIER: f32 = 0.8;
    /// Maximum velocity magnitude before the mass penalty
    pub const MAX: f32 = 13.0;
    /// velocity *= MASS_FACTOR * mass^MASS_EXPONENT
    pub const MASS_FACTOR: f32 = 4.0;
    pub const MASS_EXPONENT: f32 = -0.42;
}

/// Computer-controlled players
pub mod ai {
    /// Computer players in a default session
    pub const COUNT: usize = 6;
    /// Name prefix, numbered from 1
    pub const NAME_PREFIX: &str = "Computer";
    /// Seconds between decisions
    pub const DECISION_INTERVAL: f32 = 0.2;
    /// Bigger rivals closer than this (squared) are fled from
    pub const DANGER_DISTANCE_SQ: f32 = 9.0 * 9.0;
    /// Smaller rivals closer than this (squared) are chased
    pub const CATCH_DISTANCE_SQ: f32 = 5.0 * 5.0;
    /// Steering vectors are scaled up so shaping saturates at max speed
    pub const SPEED_MULTIPLIER: f32 = 1000.0;
}

/// Random placement
pub mod placement {
    /// Rejection-sampling attempts before the field is treated as saturated
    pub const MAX_ATTEMPTS: u32 = 100_000;
}

/// Ticker thread
pub mod session {
    /// Default human player name
    pub const PLAYER_NAME: &str = "Test";
    /// Pause between frames of the ticker thread in milliseconds
    pub const FRAME_INTERVAL_MS: u64 = 4;
    /// Inbound command queue capacity
    pub const COMMAND_BUFFER_CAPACITY: usize = 1024;
    /// Seconds between statistics log lines
    pub const STATS_LOG_INTERVAL: f32 = 30.0;
}

/// Records table
pub mod records {
    /// Entries kept in the ranked list
    pub const CAPACITY: usize = 5;
    /// Default storage file
    pub const FILE_NAME: &str = "records.json";
}
