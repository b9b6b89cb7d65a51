//! Position integration and velocity shaping

#[cfg(feature = "parallel_physics")]
use rayon::prelude::*;

use crate::game::cell::MovingCell;
use crate::game::constants::cell::MERGE_COOLDOWN;
use crate::game::constants::speed::{MASS_EXPONENT, MASS_FACTOR, MAX, MULTIPLIER};
use crate::game::player::Player;
use crate::util::vec2::Vec2;

/// Advance split timers and positions of every cell of every player
pub fn integrate(players: &mut [Player], dt: f32) {
    #[cfg(feature = "parallel_physics")]
    players.par_iter_mut().for_each(|player| integrate_player(player, dt));

    #[cfg(not(feature = "parallel_physics"))]
    players.iter_mut().for_each(|player| integrate_player(player, dt));
}

fn integrate_player(player: &mut Player, dt: f32) {
    for cell in &mut player.cells {
        cell.time_since_split += dt;
        cell.integrate(dt);
    }
}

/// Scale the desired velocity and clamp its magnitude (rescaled, keeping
/// direction) to the maximum speed
pub fn real_speed_vector(desired: Vec2) -> Vec2 {
    (desired * MULTIPLIER).clamp_length(MAX)
}

/// Heavier cells move slower: `v * 4 * mass^-0.42`
pub fn fit_speed_to_mass(velocity: Vec2, mass: u32) -> Vec2 {
    velocity * (MASS_FACTOR * (mass.max(1) as f32).powf(MASS_EXPONENT))
}

/// Zero each axis that would push the cell through a field wall
pub fn stop_at_walls(cell: &MovingCell, velocity: Vec2, width: f32, height: f32) -> Vec2 {
    let mut v = velocity;
    let (pos, r) = (cell.position, cell.radius());
    if (v.x > 0.0 && pos.x + r >= width) || (v.x < 0.0 && pos.x - r <= 0.0) {
        v.x = 0.0;
    }
    if (v.y > 0.0 && pos.y + r >= height) || (v.y < 0.0 && pos.y - r <= 0.0) {
        v.y = 0.0;
    }
    v
}

/// Assign raw velocities: a lone cell takes the desired vector directly;
/// split cells are pulled toward their common centre of mass and freshly
/// split overlapping siblings push each other apart.
fn apply_mutual_attraction(player: &mut Player, desired: Vec2) {
    if player.cell_count() == 1 {
        player.cells[0].velocity = desired;
        return;
    }

    let center = player.mass_center();
    let cells = &mut player.cells;
    for cell in cells.iter_mut() {
        cell.velocity = desired + (center - cell.position);
    }

    for i in 0..cells.len() {
        let mut push = Vec2::ZERO;
        for j in 0..cells.len() {
            if i == j {
                continue;
            }
            let (a, b) = (&cells[i], &cells[j]);
            if a.time_since_split < MERGE_COOLDOWN
                && b.time_since_split < MERGE_COOLDOWN
                && a.intersects(b)
            {
                let connection = a.position - b.position;
                let len_sq = connection.length_sq();
                // (Nearly) coincident centres have no usable push direction
                if len_sq > f32::EPSILON {
                    push += connection / len_sq;
                }
            }
        }
        cells[i].velocity += push;
    }
}

/// Set a player's desired velocity, shaping it per cell
pub fn set_player_velocity(player: &mut Player, desired: Vec2, width: f32, height: f32) {
    if player.cells.is_empty() || !desired.is_finite() {
        return;
    }

    apply_mutual_attraction(player, desired);

    for cell in player.cells.iter_mut() {
        let shaped = fit_speed_to_mass(real_speed_vector(cell.velocity), cell.mass());
        cell.velocity = stop_at_walls(cell, shaped, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::timing::DT;

    const EPSILON: f32 = 1e-4;

    fn player_with_cells(cells: &[(Vec2, u32)]) -> Player {
        let mut player = Player::new("Test");
        for &(pos, mass) in cells {
            player.cells.push(MovingCell::at(pos, mass));
        }
        player.score = player.total_mass();
        player.alive = true;
        player
    }

    #[test]
    fn test_real_speed_vector_clamps_to_max() {
        let v = real_speed_vector(Vec2::new(60.0, 80.0)); // length 100
        assert!((v.length() - 13.0).abs() < EPSILON);
        assert!((v.x / v.y - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_real_speed_vector_clamps_huge_input() {
        let v = real_speed_vector(Vec2::new(1e20, 0.0));
        assert!(v.approx_eq(Vec2::new(MAX, 0.0), EPSILON));
    }

    #[test]
    fn test_real_speed_vector_scales_small_input() {
        let v = real_speed_vector(Vec2::new(3.0, 4.0));
        assert!(v.approx_eq(Vec2::new(2.4, 3.2), EPSILON));
    }

    #[test]
    fn test_heavier_cells_are_slower() {
        let v = Vec2::new(10.0, 0.0);
        let light = fit_speed_to_mass(v, 40);
        let heavy = fit_speed_to_mass(v, 400);
        assert!(heavy.x < light.x);
        let expected = 10.0 * 4.0 * 40f32.powf(-0.42);
        assert!((light.x - expected).abs() < EPSILON);
    }

    #[test]
    fn test_walls_stop_outward_axis_only() {
        let cell = MovingCell::at(Vec2::new(49.5, 15.0), 100); // r = 1, touches right wall
        let v = stop_at_walls(&cell, Vec2::new(5.0, 2.0), 50.0, 30.0);
        assert_eq!(v, Vec2::new(0.0, 2.0));

        // Moving away from the wall is allowed
        let v = stop_at_walls(&cell, Vec2::new(-5.0, 2.0), 50.0, 30.0);
        assert_eq!(v, Vec2::new(-5.0, 2.0));
    }

    #[test]
    fn test_walls_top_left() {
        let cell = MovingCell::at(Vec2::new(0.5, 0.5), 100);
        let v = stop_at_walls(&cell, Vec2::new(-1.0, -1.0), 50.0, 30.0);
        assert_eq!(v, Vec2::ZERO);
    }

    #[test]
    fn test_single_cell_velocity() {
        let mut player = player_with_cells(&[(Vec2::new(25.0, 15.0), 40)]);
        set_player_velocity(&mut player, Vec2::new(100.0, 0.0), 50.0, 30.0);

        let expected = 13.0 * 4.0 * 40f32.powf(-0.42);
        let v = player.cells[0].velocity;
        assert!((v.x - expected).abs() < EPSILON);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn test_split_cells_attract_to_mass_center() {
        let mut player = player_with_cells(&[(Vec2::new(10.0, 15.0), 40), (Vec2::new(20.0, 15.0), 40)]);
        for cell in &mut player.cells {
            cell.time_since_split = MERGE_COOLDOWN;
        }
        set_player_velocity(&mut player, Vec2::ZERO, 50.0, 30.0);

        assert!(player.cells[0].velocity.x > 0.0);
        assert!(player.cells[1].velocity.x < 0.0);
    }

    #[test]
    fn test_fresh_siblings_repel() {
        // Close overlapping siblings: repulsion outweighs attraction
        let mut player = player_with_cells(&[(Vec2::new(24.8, 15.0), 100), (Vec2::new(25.2, 15.0), 100)]);
        set_player_velocity(&mut player, Vec2::ZERO, 50.0, 30.0);
        assert!(player.cells[0].velocity.x < 0.0);
        assert!(player.cells[1].velocity.x > 0.0);
    }

    #[test]
    fn test_coincident_siblings_stay_finite() {
        let mut player = player_with_cells(&[(Vec2::new(25.0, 15.0), 100), (Vec2::new(25.0, 15.0), 100)]);
        set_player_velocity(&mut player, Vec2::new(1.0, 1.0), 50.0, 30.0);
        assert!(player.cells.iter().all(|c| c.velocity.is_finite()));
    }

    #[test]
    fn test_dead_player_is_ignored() {
        let mut player = Player::new("Dead");
        set_player_velocity(&mut player, Vec2::new(1.0, 0.0), 50.0, 30.0);
        assert!(player.cells.is_empty());
    }

    #[test]
    fn test_integrate_advances_timers_and_positions() {
        let mut players = vec![player_with_cells(&[(Vec2::new(10.0, 10.0), 40)])];
        players[0].cells[0].velocity = Vec2::new(6.0, 0.0);

        integrate(&mut players, DT);

        let cell = &players[0].cells[0];
        assert!((cell.time_since_split - DT).abs() < 1e-6);
        assert!((cell.position.x - (10.0 + 6.0 * DT)).abs() < 1e-5);
    }
}
