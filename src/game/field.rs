//! The game field: players, food and the per-tick update pipeline

use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use tracing::{debug, info};

use crate::config::FieldConfig;
use crate::game::cell::{Cell, MovingCell};
use crate::game::constants::ai::NAME_PREFIX;
use crate::game::constants::cell::{MAX_CELLS_PER_PLAYER, START_MASS};
use crate::game::constants::food::{MASS_MAX, MASS_MIN};
use crate::game::constants::timing::MAX_SCORE_REFRESH_PERIOD;
use crate::game::events::{FieldEvent, PlayerInfo};
use crate::game::placement::{find_free_position, PlacementError};
use crate::game::player::{Player, PlayerId};
use crate::game::strategy::{ComputerStrategy, MovingStrategy};
use crate::game::systems::{eating, movement, split};
use crate::util::geometry::radius_from_mass;
use crate::util::vec2::Vec2;

/// Aggregate counters for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldStats {
    pub players: usize,
    pub alive: usize,
    pub cells: usize,
    pub food: usize,
}

pub struct GameField {
    config: FieldConfig,
    /// Join order
    players: Vec<Player>,
    food: Vec<Cell>,
    /// Seconds since death per dead player
    dead_timers: HashMap<PlayerId, f32>,
    /// Applied and cleared at the start of the next tick
    split_requests: SmallVec<[PlayerId; 8]>,
    strategies: Vec<Box<dyn MovingStrategy>>,
    food_timer: f32,
    max_score_timer: f32,
    start_delay_remaining: f32,
    rng: StdRng,
    events: Vec<FieldEvent>,
}

impl GameField {
    pub fn new(config: FieldConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            start_delay_remaining: config.start_delay,
            config,
            players: Vec::new(),
            food: Vec::new(),
            dead_timers: HashMap::new(),
            split_requests: SmallVec::new(),
            strategies: Vec::new(),
            food_timer: 0.0,
            max_score_timer: 0.0,
            rng,
            events: Vec::new(),
        }
    }

    /// A stocked field with one human player and `computer_players`
    /// computer players named `Computer1`, `Computer2`, ...
    pub fn with_defaults(config: FieldConfig, player_name: &str, computer_players: usize) -> Self {
        let mut field = Self::new(config);
        let stocked = field.create_food(field.config.start_food);
        field.add_player(player_name);
        for n in 1..=computer_players {
            field.add_computer_player(format!("{}{}", NAME_PREFIX, n));
        }
        info!(
            "Field {}x{} ready: {} food, {} players",
            field.width(),
            field.height(),
            stocked,
            field.players.len()
        );
        field
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.config.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.config.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.config.width / 2.0, self.config.height / 2.0)
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Players in join order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// First player not driven by a strategy
    pub fn human_player_id(&self) -> Option<PlayerId> {
        self.players.iter().find(|p| !p.is_computer).map(|p| p.id)
    }

    pub fn food(&self) -> &[Cell] {
        &self.food
    }

    pub fn start_delay_remaining(&self) -> f32 {
        self.start_delay_remaining.max(0.0)
    }

    /// Seconds until a dead player respawns, `None` when alive or unknown
    pub fn respawn_remaining(&self, id: PlayerId) -> Option<f32> {
        self.dead_timers
            .get(&id)
            .map(|elapsed| (self.config.respawn_delay - elapsed).max(0.0))
    }

    /// Mass of every player cell and food item on the field
    pub fn total_mass(&self) -> u64 {
        let players: u64 = self.players.iter().map(|p| p.total_mass() as u64).sum();
        let food: u64 = self.food.iter().map(|f| f.mass() as u64).sum();
        players + food
    }

    pub fn stats(&self) -> FieldStats {
        FieldStats {
            players: self.players.len(),
            alive: self.players.iter().filter(|p| p.alive).count(),
            cells: self.players.iter().map(Player::cell_count).sum(),
            food: self.food.len(),
        }
    }

    /// Events raised since the last drain, in order
    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Add a player controlled from outside at a free random position
    pub fn add_player(&mut self, name: impl Into<String>) -> PlayerId {
        self.insert_player(Player::new(name))
    }

    /// Add a player steered by a [`ComputerStrategy`]
    pub fn add_computer_player(&mut self, name: impl Into<String>) -> PlayerId {
        let id = self.insert_player(Player::computer(name));
        self.strategies.push(Box::new(ComputerStrategy::new(id)));
        id
    }

    fn insert_player(&mut self, mut player: Player) -> PlayerId {
        let position = self.spawn_position(radius_from_mass(START_MASS));
        player.respawn_at(position);
        let id = player.id;
        debug!("Player {} joined at ({:.2}, {:.2})", player.name, position.x, position.y);
        self.events.push(FieldEvent::PlayerCreated(PlayerInfo::from(&player)));
        self.players.push(player);
        id
    }

    /// Free position for a player cell; a saturated field yields the last
    /// sampled candidate.
    fn spawn_position(&mut self, radius: f32) -> Vec2 {
        match find_free_position(
            &mut self.rng,
            self.config.width,
            self.config.height,
            radius,
            &self.players,
            self.config.placement_attempts,
        ) {
            Ok(position) => position,
            Err(PlacementError::Saturated { fallback, .. }) => fallback,
        }
    }

    /// Scatter up to `count` food items with random mass. Items with no free
    /// spot are skipped. Returns how many were created.
    pub fn create_food(&mut self, count: usize) -> usize {
        let mut created = 0;
        for _ in 0..count {
            let mut item = Cell::new(self.rng.gen_range(MASS_MIN..=MASS_MAX));
            let placed = find_free_position(
                &mut self.rng,
                self.config.width,
                self.config.height,
                item.radius(),
                &self.players,
                self.config.placement_attempts,
            );
            let Ok(position) = placed else {
                continue;
            };
            item.position = position;
            self.events.push(FieldEvent::FoodCreated(item.clone()));
            self.food.push(item);
            created += 1;
        }
        created
    }

    /// Steer a live player. Returns false for unknown or dead players.
    pub fn set_player_velocity(&mut self, id: PlayerId, desired: Vec2) -> bool {
        let (width, height) = (self.config.width, self.config.height);
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) if player.alive => {
                movement::set_player_velocity(player, desired, width, height);
                true
            }
            _ => false,
        }
    }

    /// Queue a split for the next tick. Returns false when the player is
    /// unknown, dead, already at the cell cap, or already queued.
    pub fn request_split(&mut self, id: PlayerId) -> bool {
        let eligible = self
            .player(id)
            .is_some_and(|p| p.alive && p.cell_count() < MAX_CELLS_PER_PLAYER);
        if !eligible || self.split_requests.contains(&id) {
            return false;
        }
        self.split_requests.push(id);
        true
    }

    pub fn rename_player(&mut self, id: PlayerId, name: impl Into<String>) -> bool {
        match self.players.iter_mut().find(|p| p.id == id) {
            Some(player) => {
                player.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.start_delay_remaining > 0.0 {
            self.start_delay_remaining -= dt;
            return;
        }

        self.apply_split_requests();
        movement::integrate(&mut self.players, dt);
        self.generate_food(dt);
        self.refresh_max_scores(dt);
        eating::resolve(
            &mut self.players,
            &mut self.food,
            &mut self.dead_timers,
            &mut self.events,
        );
        self.respawn_dead_players(dt);
        self.drive_strategies(dt);
    }

    fn apply_split_requests(&mut self) {
        let center = self.center();
        for id in std::mem::take(&mut self.split_requests) {
            if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
                let created = split::split_player(player, center);
                if created > 0 {
                    debug!("{} split into {} cells", player.name, player.cell_count());
                }
            }
        }
    }

    fn generate_food(&mut self, dt: f32) {
        self.food_timer += dt;
        if self.food_timer > self.config.food_generation_period {
            self.food_timer = 0.0;
            self.create_food(self.config.food_generation_count);
        }
    }

    fn refresh_max_scores(&mut self, dt: f32) {
        self.max_score_timer += dt;
        if self.max_score_timer >= MAX_SCORE_REFRESH_PERIOD {
            self.max_score_timer = 0.0;
            self.players.iter_mut().for_each(Player::refresh_max_score);
        }
    }

    fn respawn_dead_players(&mut self, dt: f32) {
        if self.dead_timers.is_empty() {
            return;
        }

        let delay = self.config.respawn_delay;
        let mut due: SmallVec<[PlayerId; 8]> = SmallVec::new();
        for (id, elapsed) in self.dead_timers.iter_mut() {
            *elapsed += dt;
            if *elapsed >= delay {
                due.push(*id);
            }
        }

        // Join order, independent of map iteration order
        for index in 0..self.players.len() {
            let id = self.players[index].id;
            if !due.contains(&id) {
                continue;
            }
            self.dead_timers.remove(&id);
            let position = self.spawn_position(radius_from_mass(START_MASS));
            let player = &mut self.players[index];
            player.respawn_at(position);
            debug!("Player {} respawned", player.name);
            self.events.push(FieldEvent::PlayerReborn(PlayerInfo::from(&*player)));
        }
    }

    fn drive_strategies(&mut self, dt: f32) {
        let mut steering: SmallVec<[(PlayerId, Vec2); 8]> = SmallVec::new();
        for strategy in self.strategies.iter_mut() {
            if let Some(desired) = strategy.update(&self.players, &self.food, dt) {
                steering.push((strategy.player_id(), desired));
            }
        }
        for (id, desired) in steering {
            self.set_player_velocity(id, desired);
        }
    }

    /// Return to the initial playable state: starting food count, one
    /// starting cell per player, everything reshuffled, start delay re-armed.
    pub fn reset(&mut self) {
        self.start_delay_remaining = self.config.start_delay;
        self.food_timer = 0.0;
        self.max_score_timer = 0.0;
        self.split_requests.clear();
        self.dead_timers.clear();
        let revived: SmallVec<[PlayerId; 8]> =
            self.players.iter().filter(|p| !p.alive).map(|p| p.id).collect();

        let target = self.config.start_food;
        while self.food.len() > target {
            if let Some(food) = self.food.pop() {
                self.events.push(FieldEvent::FoodEaten { food, eater: None });
            }
        }
        if self.food.len() < target {
            let shortfall = target - self.food.len();
            self.create_food(shortfall);
        }

        for player in self.players.iter_mut() {
            player.cells.truncate(1);
            if player.cells.is_empty() {
                player.cells.push(MovingCell::new(START_MASS));
            }
            let cell = &mut player.cells[0];
            cell.set_mass(START_MASS);
            cell.velocity = Vec2::ZERO;
            cell.acceleration = Vec2::ZERO;
            cell.time_since_split = 0.0;
            player.score = START_MASS;
            player.alive = true;
        }

        self.shuffle_single_cells();
        for player in self.players.iter().filter(|p| revived.contains(&p.id)) {
            self.events.push(FieldEvent::PlayerReborn(PlayerInfo::from(player)));
        }
        info!("Field reset: {} food, {} players", self.food.len(), self.players.len());
    }

    fn shuffle_single_cells(&mut self) {
        for index in 0..self.food.len() {
            let radius = self.food[index].radius();
            if let Ok(position) = find_free_position(
                &mut self.rng,
                self.config.width,
                self.config.height,
                radius,
                &self.players,
                self.config.placement_attempts,
            ) {
                self.food[index].position = position;
            }
        }
        for index in 0..self.players.len() {
            let radius = self.players[index].cells[0].radius();
            let position = self.spawn_position(radius);
            self.players[index].cells[0].body.position = position;
        }
    }
}
