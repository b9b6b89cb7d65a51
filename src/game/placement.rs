//! Random collision-free placement of new cells
//!
//! Rejection sampling against every player cell on the field. Food is not
//! checked, so food may be placed under food or be spawned on by players.

use rand::Rng;
use tracing::warn;

use crate::game::player::Player;
use crate::util::geometry::circles_overlap;
use crate::util::vec2::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PlacementError {
    /// No free spot found within the attempt budget. `fallback` is the last
    /// sampled candidate, usable when a position is mandatory.
    #[error("no free position after {attempts} attempts")]
    Saturated { attempts: u32, fallback: Vec2 },
}

/// Sample a position for a circle of `radius` inside a `width` x `height`
/// field such that it overlaps no player cell.
pub fn find_free_position<R: Rng + ?Sized>(
    rng: &mut R,
    width: f32,
    height: f32,
    radius: f32,
    players: &[Player],
    max_attempts: u32,
) -> Result<Vec2, PlacementError> {
    let mut candidate = Vec2::new(width / 2.0, height / 2.0);
    for _ in 0..max_attempts.max(1) {
        candidate = Vec2::new(
            sample_axis(rng, radius, width),
            sample_axis(rng, radius, height),
        );
        if !overlaps_any_player(candidate, radius, players) {
            return Ok(candidate);
        }
    }

    warn!(
        "Field saturated: no free spot for radius {:.3} after {} attempts",
        radius, max_attempts
    );
    Err(PlacementError::Saturated {
        attempts: max_attempts,
        fallback: candidate,
    })
}

/// Uniform coordinate in [radius, extent - radius]; a cell wider than the
/// field is centred.
fn sample_axis<R: Rng + ?Sized>(rng: &mut R, radius: f32, extent: f32) -> f32 {
    let low = radius;
    let high = extent - radius;
    if high > low {
        rng.gen_range(low..=high)
    } else {
        extent / 2.0
    }
}

fn overlaps_any_player(center: Vec2, radius: f32, players: &[Player]) -> bool {
    players.iter().any(|player| {
        player
            .cells
            .iter()
            .any(|cell| circles_overlap(center, radius, cell.position, cell.radius()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cell::MovingCell;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn player_with_cell(position: Vec2, mass: u32) -> Player {
        let mut player = Player::new("P");
        player.cells.push(MovingCell::at(position, mass));
        player.alive = true;
        player
    }

    #[test]
    fn test_position_inside_field() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let pos = find_free_position(&mut rng, 50.0, 30.0, 0.5, &[], 10).unwrap();
            assert!(pos.x >= 0.5 && pos.x <= 49.5);
            assert!(pos.y >= 0.5 && pos.y <= 29.5);
        }
    }

    #[test]
    fn test_avoids_player_cells() {
        let mut rng = StdRng::seed_from_u64(11);
        // One huge cell covering most of a small field
        let blocker = player_with_cell(Vec2::new(5.0, 5.0), 1600); // r = 4
        let players = vec![blocker];
        for _ in 0..200 {
            let pos = find_free_position(&mut rng, 10.0, 10.0, 0.3, &players, 100_000).unwrap();
            assert!(!circles_overlap(pos, 0.3, Vec2::new(5.0, 5.0), 4.0));
        }
    }

    #[test]
    fn test_saturated_field_reports_error() {
        let mut rng = StdRng::seed_from_u64(3);
        let blocker = player_with_cell(Vec2::new(5.0, 5.0), 10_000); // r = 10
        let result = find_free_position(&mut rng, 10.0, 10.0, 1.0, &[blocker], 50);
        match result {
            Err(PlacementError::Saturated { attempts, fallback }) => {
                assert_eq!(attempts, 50);
                assert!(fallback.is_finite());
            }
            Ok(pos) => panic!("expected saturation, got {:?}", pos),
        }
    }

    #[test]
    fn test_cell_wider_than_field_is_centred() {
        let mut rng = StdRng::seed_from_u64(1);
        let pos = find_free_position(&mut rng, 2.0, 2.0, 5.0, &[], 1).unwrap();
        assert_eq!(pos, Vec2::new(1.0, 1.0));
    }
}
