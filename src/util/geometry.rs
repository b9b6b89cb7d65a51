//! Circle and rectangle math for the simulation
//!
//! Pure functions only. Everything that feeds `acos`/`sqrt` is clamped so
//! degenerate inputs (coincident centres, rounding drift) cannot leak NaN
//! into the field state.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::game::constants::cell::RADIUS_SCALE;
use crate::util::vec2::Vec2;

/// Radius of a cell with the given mass: `sqrt(mass * 0.01)`
#[inline]
pub fn radius_from_mass(mass: u32) -> f32 {
    (mass as f32 * RADIUS_SCALE).sqrt()
}

/// Area of a circle
#[inline]
pub fn circle_area(radius: f32) -> f32 {
    PI * radius * radius
}

/// Axis-aligned rectangle given by its top-left (x1, y1) and
/// bottom-right (x2, y2) corners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Rect {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Bounding box of a circle
    pub fn around_circle(center: Vec2, radius: f32) -> Self {
        Self {
            x1: center.x - radius,
            y1: center.y - radius,
            x2: center.x + radius,
            y2: center.y + radius,
        }
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Self {
        Self {
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
            x2: self.x2.max(other.x2),
            y2: self.y2.max(other.y2),
        }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    /// Closed-interval overlap test; touching edges count as intersecting
    pub fn intersects(&self, other: &Rect) -> bool {
        !(self.x1 > other.x2 || other.x1 > self.x2 || self.y1 > other.y2 || other.y1 > self.y2)
    }

    /// Overlap test against the bounding box of a circle
    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        self.intersects(&Rect::around_circle(center, radius))
    }
}

/// Squared distance between the centres of two rectangles
pub fn distance_sq_between_centers(a: &Rect, b: &Rect) -> f32 {
    a.center().distance_sq_to(b.center())
}

/// True when two circles overlap (strictly; touching circles do not)
#[inline]
pub fn circles_overlap(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    let radius_sum = r1 + r2;
    radius_sum * radius_sum > c1.distance_sq_to(c2)
}

/// Area of the intersection of two circles.
///
/// Returns 0 for disjoint circles and the smaller circle's area when one is
/// nested in the other, which also covers coincident centres (`d == 0`).
pub fn intersection_area(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> f32 {
    let d = c1.distance_to(c2);
    if d >= r1 + r2 {
        return 0.0;
    }

    let (small, large) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
    if d <= f32::EPSILON || d + small <= large {
        return circle_area(small);
    }

    let d_sq = d * d;
    let (r1_sq, r2_sq) = (r1 * r1, r2 * r2);
    let alpha = ((d_sq + r1_sq - r2_sq) / (2.0 * d * r1)).clamp(-1.0, 1.0);
    let beta = ((d_sq + r2_sq - r1_sq) / (2.0 * d * r2)).clamp(-1.0, 1.0);
    let kite = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);

    let area = r1_sq * alpha.acos() + r2_sq * beta.acos() - 0.5 * kite.max(0.0).sqrt();
    area.clamp(0.0, circle_area(small))
}

/// Mass-weighted average of positions. An empty set (or zero total mass)
/// yields the zero vector.
pub fn mass_center<I>(bodies: I) -> Vec2
where
    I: IntoIterator<Item = (Vec2, u32)>,
{
    let mut weighted = Vec2::ZERO;
    let mut total: u64 = 0;
    for (position, mass) in bodies {
        weighted += position * mass as f32;
        total += mass as u64;
    }
    if total == 0 {
        return Vec2::ZERO;
    }
    weighted / total as f32
}
