//! Eating resolution: rival cells, own-cell merging and food
//!
//! Mass only moves between cells here; the total mass on the field is
//! unchanged by every operation in this module.

use hashbrown::HashMap;
use tracing::debug;

use crate::game::cell::{Cell, MovingCell};
use crate::game::constants::cell::MERGE_COOLDOWN;
use crate::game::constants::eat::{
    MERGE_OVERLAP_AREA_RATIO, OVERLAP_AREA_RATIO, RELATIVE_MASS_DIFFERENCE,
};
use crate::game::events::{FieldEvent, PlayerInfo};
use crate::game::player::{Player, PlayerId};

/// Resolve every eat and merge for this tick, in player join order
pub fn resolve(
    players: &mut [Player],
    food: &mut Vec<Cell>,
    dead_timers: &mut HashMap<PlayerId, f32>,
    events: &mut Vec<FieldEvent>,
) {
    for hunter in 0..players.len() {
        if !players[hunter].alive {
            continue;
        }

        for other in 0..players.len() {
            if !players[other].alive {
                continue;
            }
            if other == hunter {
                if players[hunter].cells.len() > 1 {
                    merge_cells(&mut players[hunter]);
                }
                continue;
            }

            // Players with disjoint bounding boxes cannot touch
            let (Some(hunter_rect), Some(other_rect)) =
                (players[hunter].bounding_rect(), players[other].bounding_rect())
            else {
                continue;
            };
            if !hunter_rect.intersects(&other_rect) {
                continue;
            }

            let (hunter_player, prey_player) = pair_mut(players, hunter, other);
            eat_rival_cells(hunter_player, prey_player, dead_timers, events);
        }

        eat_food(&mut players[hunter], food, events);
    }
}

/// Whether `hunter` is big enough and covers enough of `prey` to eat it.
/// `hunter_area` is the hunter's area before it started eating this pass.
pub fn can_eat_rival(hunter: &Cell, hunter_area: f32, prey: &Cell) -> bool {
    let prey_area = prey.area();
    if prey_area <= 0.0 || hunter_area <= prey_area {
        return false;
    }
    if (hunter_area - prey_area) / hunter_area <= RELATIVE_MASS_DIFFERENCE {
        return false;
    }
    hunter.intersection_area(prey) / prey_area > OVERLAP_AREA_RATIO
}

/// Whether two cells of the same player may merge `small` into `big`
pub fn can_merge(big: &MovingCell, big_area: f32, small: &MovingCell) -> bool {
    let small_area = small.area();
    if small_area <= 0.0 || big_area <= small_area {
        return false;
    }
    if !big.can_merge(MERGE_COOLDOWN) || !small.can_merge(MERGE_COOLDOWN) {
        return false;
    }
    big.intersection_area(small) / small_area >= MERGE_OVERLAP_AREA_RATIO
}

/// Let every hunter cell eat what it can of the prey player. Prey cells are
/// scanned back to front so removal keeps the remaining indices valid.
pub fn eat_rival_cells(
    hunter: &mut Player,
    prey: &mut Player,
    dead_timers: &mut HashMap<PlayerId, f32>,
    events: &mut Vec<FieldEvent>,
) {
    let prey_score_before = prey.score;

    for j in 0..hunter.cells.len() {
        let hunter_area = hunter.cells[j].area();
        let mut i = prey.cells.len();
        while i > 0 {
            i -= 1;
            if !can_eat_rival(&hunter.cells[j], hunter_area, &prey.cells[i]) {
                continue;
            }
            let eaten = prey.cells.remove(i);
            let mass = eaten.mass();
            hunter.cells[j].add_mass(mass);
            hunter.score = hunter.score.saturating_add(mass);
            prey.score = prey.score.saturating_sub(mass);
        }

        if prey.cells.is_empty() {
            kill(prey, prey_score_before, dead_timers, events);
            debug!("{} was eaten by {}", prey.name, hunter.name);
            break;
        }
    }
}

fn kill(
    player: &mut Player,
    score_before: u32,
    dead_timers: &mut HashMap<PlayerId, f32>,
    events: &mut Vec<FieldEvent>,
) {
    player.max_score = player.max_score.max(score_before);
    player.alive = false;
    player.score = 0;
    dead_timers.insert(player.id, 0.0);
    events.push(FieldEvent::PlayerDead(PlayerInfo::from(&*player)));
}

/// Merge cooled-down overlapping cells of one player. The player's score is
/// unchanged since the mass stays with the player.
pub fn merge_cells(player: &mut Player) {
    let cells = &mut player.cells;
    let mut j = 0;
    while j < cells.len() {
        let merging_area = cells[j].area();
        let mut i = cells.len();
        while i > 0 {
            i -= 1;
            if i == j || !can_merge(&cells[j], merging_area, &cells[i]) {
                continue;
            }
            let absorbed = cells.remove(i);
            if i < j {
                j -= 1;
            }
            cells[j].add_mass(absorbed.mass());
        }
        j += 1;
    }
}

/// Food covered enough by one of the player's cells is eaten by the first
/// such cell in cell order.
pub fn eat_food(player: &mut Player, food: &mut Vec<Cell>, events: &mut Vec<FieldEvent>) {
    let Some(rect) = player.bounding_rect() else {
        return;
    };

    let mut k = food.len();
    while k > 0 {
        k -= 1;
        let item = &food[k];
        if !rect.intersects_circle(item.position, item.radius()) {
            continue;
        }
        let area = item.area();
        let eater = player
            .cells
            .iter()
            .position(|cell| area > 0.0 && item.intersection_area(cell) / area >= OVERLAP_AREA_RATIO);

        if let Some(index) = eater {
            let eaten = food.remove(k);
            player.cells[index].add_mass(eaten.mass());
            player.score = player.score.saturating_add(eaten.mass());
            events.push(FieldEvent::FoodEaten {
                food: eaten,
                eater: Some(player.id),
            });
        }
    }
}

/// Two distinct mutable players out of one slice
fn pair_mut(players: &mut [Player], a: usize, b: usize) -> (&mut Player, &mut Player) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = players.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = players.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
