//! Steering strategies for players not driven by external input

use crate::game::cell::Cell;
use crate::game::constants::ai::{
    CATCH_DISTANCE_SQ, DANGER_DISTANCE_SQ, DECISION_INTERVAL, SPEED_MULTIPLIER,
};
use crate::game::constants::eat::RELATIVE_MASS_DIFFERENCE;
use crate::game::player::{Player, PlayerId};
use crate::util::geometry::distance_sq_between_centers;
use crate::util::vec2::Vec2;

/// Produces a desired velocity for one player from the current field state.
///
/// Called once per tick; returning `None` leaves the player's velocity as is.
pub trait MovingStrategy: Send {
    fn player_id(&self) -> PlayerId;

    fn update(&mut self, players: &[Player], food: &[Cell], dt: f32) -> Option<Vec2>;
}

/// Greedy computer behaviour: flee bigger rivals, chase smaller ones,
/// otherwise head for the nearest food. Decisions are taken at a fixed
/// interval rather than every tick.
#[derive(Debug, Clone)]
pub struct ComputerStrategy {
    player_id: PlayerId,
    decision_timer: f32,
}

impl ComputerStrategy {
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            decision_timer: 0.0,
        }
    }

    /// Unscaled desired direction for `me`
    pub fn decide(me: &Player, players: &[Player], food: &[Cell]) -> Vec2 {
        let Some(my_rect) = me.bounding_rect() else {
            return Vec2::ZERO;
        };
        let my_center = my_rect.center();

        let mut desired = food
            .iter()
            .min_by(|a, b| {
                let da = my_center.distance_sq_to(a.position);
                let db = my_center.distance_sq_to(b.position);
                da.total_cmp(&db)
            })
            .map(|nearest| nearest.position - my_center)
            .unwrap_or(Vec2::ZERO);

        let my_score = me.score as f32;
        let ratio = 1.0 + RELATIVE_MASS_DIFFERENCE;

        let mut threat: Option<(f32, Vec2)> = None;
        let mut prey: Option<(f32, Vec2)> = None;
        for rival in players.iter().filter(|p| p.alive && p.id != me.id) {
            let Some(rival_rect) = rival.bounding_rect() else {
                continue;
            };
            let distance_sq = distance_sq_between_centers(&my_rect, &rival_rect);
            let rival_score = rival.score as f32;

            if rival_score > my_score * ratio && distance_sq <= DANGER_DISTANCE_SQ {
                if threat.map_or(true, |(best, _)| distance_sq < best) {
                    threat = Some((distance_sq, rival_rect.center()));
                }
            } else if rival_score * ratio < my_score && distance_sq <= CATCH_DISTANCE_SQ {
                if prey.map_or(true, |(best, _)| distance_sq < best) {
                    prey = Some((distance_sq, rival_rect.center()));
                }
            }
        }

        if let Some((_, rival_center)) = threat {
            desired = my_center - rival_center;
        } else if let Some((_, rival_center)) = prey {
            desired = rival_center - my_center;
        }
        desired
    }
}

impl MovingStrategy for ComputerStrategy {
    fn player_id(&self) -> PlayerId {
        self.player_id
    }

    fn update(&mut self, players: &[Player], food: &[Cell], dt: f32) -> Option<Vec2> {
        let me = players.iter().find(|p| p.id == self.player_id)?;
        if !me.alive {
            return None;
        }

        self.decision_timer += dt;
        if self.decision_timer < DECISION_INTERVAL {
            return None;
        }
        self.decision_timer = 0.0;

        Some(Self::decide(me, players, food) * SPEED_MULTIPLIER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::cell::MovingCell;

    fn alive(name: &str, position: Vec2, mass: u32) -> Player {
        let mut player = Player::computer(name);
        player.cells.push(MovingCell::at(position, mass));
        player.score = mass;
        player.alive = true;
        player
    }

    #[test]
    fn test_heads_for_nearest_food() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 40);
        let food = vec![
            Cell::at(Vec2::new(30.0, 10.0), 2),
            Cell::at(Vec2::new(10.0, 13.0), 2),
        ];
        let desired = ComputerStrategy::decide(&me, &[me.clone()], &food);
        assert!(desired.approx_eq(Vec2::new(0.0, 3.0), 1e-5));
    }

    #[test]
    fn test_no_food_no_rivals_stands_still() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 40);
        assert_eq!(ComputerStrategy::decide(&me, &[me.clone()], &[]), Vec2::ZERO);
    }

    #[test]
    fn test_flees_bigger_rival_in_range() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 40);
        let big = alive("Computer2", Vec2::new(14.0, 10.0), 400);
        let food = vec![Cell::at(Vec2::new(20.0, 10.0), 2)];
        let players = vec![me.clone(), big];

        let desired = ComputerStrategy::decide(&me, &players, &food);
        assert!(desired.x < 0.0);
    }

    #[test]
    fn test_flee_beats_chase() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 100);
        let big = alive("Computer2", Vec2::new(10.0, 16.0), 1000);
        let small = alive("Computer3", Vec2::new(12.0, 10.0), 20);
        let players = vec![me.clone(), big, small];

        let desired = ComputerStrategy::decide(&me, &players, &[]);
        assert!(desired.y < 0.0);
        assert_eq!(desired.x, 0.0);
    }

    #[test]
    fn test_chases_nearest_smaller_rival() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 400);
        let near = alive("Computer2", Vec2::new(12.0, 10.0), 40);
        let far = alive("Computer3", Vec2::new(10.0, 14.0), 40);
        let players = vec![me.clone(), near, far];

        let desired = ComputerStrategy::decide(&me, &players, &[]);
        assert!(desired.approx_eq(Vec2::new(2.0, 0.0), 1e-5));
    }

    #[test]
    fn test_ignores_rivals_out_of_range_or_similar() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 100);
        let similar = alive("Computer2", Vec2::new(11.0, 10.0), 105);
        let far_big = alive("Computer3", Vec2::new(40.0, 10.0), 5000);
        let food = vec![Cell::at(Vec2::new(10.0, 5.0), 2)];
        let players = vec![me.clone(), similar, far_big];

        let desired = ComputerStrategy::decide(&me, &players, &food);
        assert!(desired.approx_eq(Vec2::new(0.0, -5.0), 1e-5));
    }

    #[test]
    fn test_update_decides_on_interval() {
        let me = alive("Computer1", Vec2::new(10.0, 10.0), 40);
        let food = vec![Cell::at(Vec2::new(11.0, 10.0), 2)];
        let players = vec![me.clone()];
        let mut strategy = ComputerStrategy::new(me.id);

        assert_eq!(strategy.update(&players, &food, 0.15), None);
        let steering = strategy.update(&players, &food, 0.15).unwrap();
        assert!(steering.approx_eq(Vec2::new(SPEED_MULTIPLIER, 0.0), 1e-2));
        // Timer restarts after a decision
        assert_eq!(strategy.update(&players, &food, 0.15), None);
    }

    #[test]
    fn test_dead_player_gets_no_steering() {
        let mut me = alive("Computer1", Vec2::new(10.0, 10.0), 40);
        me.alive = false;
        me.cells.clear();
        let players = vec![me.clone()];
        let mut strategy = ComputerStrategy::new(me.id);
        assert_eq!(strategy.update(&players, &[], 1.0), None);
    }
}
