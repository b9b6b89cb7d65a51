//! Player: a named, scored group of moving cells controlled as one unit

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::cell::MovingCell;
use crate::game::constants::cell::START_MASS;
use crate::util::geometry::{mass_center, Rect};
use crate::util::vec2::Vec2;

/// Unique player identifier
pub type PlayerId = Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// Total mass of all owned cells while alive
    pub score: u32,
    /// High-water mark of `score`, kept across deaths
    pub max_score: u32,
    /// Owned cells in creation/split order
    pub cells: Vec<MovingCell>,
    pub alive: bool,
    /// Steered by a computer strategy rather than external input
    pub is_computer: bool,
}

impl Player {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            score: 0,
            max_score: 0,
            cells: Vec::new(),
            alive: false,
            is_computer: false,
        }
    }

    pub fn computer(name: impl Into<String>) -> Self {
        Self {
            is_computer: true,
            ..Self::new(name)
        }
    }

    /// Give the player a single fresh cell at `position` and mark it alive
    pub fn respawn_at(&mut self, position: Vec2) {
        self.cells.clear();
        self.cells.push(MovingCell::at(position, START_MASS));
        self.score = START_MASS;
        self.alive = true;
    }

    /// Union of the bounding boxes of all cells, `None` without cells
    pub fn bounding_rect(&self) -> Option<Rect> {
        let mut cells = self.cells.iter();
        let first = cells.next()?.bounds();
        Some(cells.fold(first, |rect, cell| rect.union(&cell.bounds())))
    }

    /// Mass-weighted centre of all cells
    pub fn mass_center(&self) -> Vec2 {
        mass_center(self.cells.iter().map(|c| (c.position, c.mass())))
    }

    /// Sum of cell masses
    pub fn total_mass(&self) -> u32 {
        self.cells.iter().map(|c| c.mass()).sum()
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Raise `max_score` to `score` if it was exceeded
    pub fn refresh_max_score(&mut self) {
        if self.score > self.max_score {
            self.max_score = self.score;
        }
    }
}
