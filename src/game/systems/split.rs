//! Splitting a player's cells in two

use smallvec::SmallVec;

use crate::game::cell::MovingCell;
use crate::game::constants::cell::{MAX_CELLS_PER_PLAYER, MIN_SPLIT_MASS};
use crate::game::player::Player;
use crate::util::vec2::Vec2;

/// Split as many of the player's heaviest cells as the cell cap allows.
///
/// Each split cell keeps the larger half of its mass; the new half is placed
/// just outside it along its direction of motion and inherits its velocity.
/// A motionless cell splits toward the field centre. Returns the number of
/// new cells.
pub fn split_player(player: &mut Player, field_center: Vec2) -> usize {
    if !player.alive || player.cells.len() >= MAX_CELLS_PER_PLAYER {
        return 0;
    }

    let budget = player.cells.len().min(MAX_CELLS_PER_PLAYER - player.cells.len());

    let mut order: SmallVec<[usize; MAX_CELLS_PER_PLAYER]> = (0..player.cells.len()).collect();
    // Stable sort keeps cell order among equal masses
    order.sort_by(|&a, &b| player.cells[b].mass().cmp(&player.cells[a].mass()));

    let mut spawned: SmallVec<[MovingCell; MAX_CELLS_PER_PLAYER]> = SmallVec::new();
    for index in order.into_iter().take(budget) {
        let parent = &mut player.cells[index];
        if parent.mass() < MIN_SPLIT_MASS {
            continue;
        }

        let half = parent.mass() / 2;
        let kept = parent.mass() - half;
        parent.set_mass(kept);
        parent.time_since_split = 0.0;

        let mut child = MovingCell::new(half);
        child.velocity = parent.velocity;

        let to_center = (field_center - parent.position).normalize_or(Vec2::RIGHT);
        let direction = parent.velocity.normalize_or(to_center);
        child.body.position = parent.position + direction * (parent.radius() + child.radius());

        spawned.push(child);
    }

    let count = spawned.len();
    player.cells.extend(spawned);
    count
}
