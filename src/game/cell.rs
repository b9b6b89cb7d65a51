//! Circular entities: static food cells and moving player cells

use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};

use crate::util::geometry::{circle_area, circles_overlap, radius_from_mass, Rect};
use crate::util::vec2::Vec2;

/// A circle with integer mass. The radius is derived from the mass and is
/// recomputed on every mass change, so the two can never disagree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub position: Vec2,
    mass: u32,
    radius: f32,
}

impl Cell {
    pub fn new(mass: u32) -> Self {
        Self {
            position: Vec2::ZERO,
            mass,
            radius: radius_from_mass(mass),
        }
    }

    pub fn at(position: Vec2, mass: u32) -> Self {
        Self {
            position,
            ..Self::new(mass)
        }
    }

    #[inline]
    pub fn mass(&self) -> u32 {
        self.mass
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn set_mass(&mut self, mass: u32) {
        self.mass = mass;
        self.radius = radius_from_mass(mass);
    }

    pub fn add_mass(&mut self, mass: u32) {
        self.set_mass(self.mass.saturating_add(mass));
    }

    pub fn area(&self) -> f32 {
        circle_area(self.radius)
    }

    pub fn bounds(&self) -> Rect {
        Rect::around_circle(self.position, self.radius)
    }

    /// True when the circles overlap (touching does not count)
    pub fn intersects(&self, other: &Cell) -> bool {
        circles_overlap(self.position, self.radius, other.position, other.radius)
    }

    /// Area shared with another cell
    pub fn intersection_area(&self, other: &Cell) -> f32 {
        crate::util::geometry::intersection_area(
            self.position,
            self.radius,
            other.position,
            other.radius,
        )
    }
}

/// A player-owned cell that moves every tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingCell {
    pub body: Cell,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Seconds since this cell last took part in a split
    pub time_since_split: f32,
}

impl MovingCell {
    pub fn new(mass: u32) -> Self {
        Self {
            body: Cell::new(mass),
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            time_since_split: 0.0,
        }
    }

    pub fn at(position: Vec2, mass: u32) -> Self {
        Self {
            body: Cell::at(position, mass),
            ..Self::new(mass)
        }
    }

    /// Velocity-Verlet step: the half-acceleration term keeps the result
    /// independent of the tick length.
    pub fn integrate(&mut self, dt: f32) {
        let acceleration_step = self.acceleration * dt;
        self.body.position += self.velocity * dt + acceleration_step / 2.0;
        self.velocity += acceleration_step;
    }

    /// Whether the post-split cooldown has elapsed
    #[inline]
    pub fn can_merge(&self, cooldown: f32) -> bool {
        self.time_since_split >= cooldown
    }
}

impl Deref for MovingCell {
    type Target = Cell;

    fn deref(&self) -> &Cell {
        &self.body
    }
}

impl DerefMut for MovingCell {
    fn deref_mut(&mut self) -> &mut Cell {
        &mut self.body
    }
}
