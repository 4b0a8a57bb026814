//! Steering rules for bugs (prey) and eagles (predators)
//!
//! Stateless: every call recomputes a velocity from current positions only.
//! NPCs "see" within an axis-aligned half-window `epsilon` around themselves.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::Motion;
use crate::settings::{Arena, SteeringParams};
use crate::with_sign;

/// How an eagle chooses which bug to react to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreyPick {
    /// Uniform over all bugs, resampled every AI step
    #[default]
    Random,
    /// Closest bug by squared distance
    Nearest,
}

/// Axis-aligned proximity test: `|dx| <= eps && |dy| <= eps`
#[inline]
pub fn in_range(npc: &Motion, target: &Motion, epsilon: f32) -> bool {
    let d = (npc.position - target.position).abs();
    d.x <= epsilon && d.y <= epsilon
}

/// Bug rule: flee the chicken on each axis when close, otherwise drift down.
///
/// An axis where the positions are equal keeps its velocity. Speed magnitude
/// is preserved when fleeing.
pub fn steer_prey(npc: &mut Motion, target: Option<&Motion>, epsilon: f32, fall_speed: f32) {
    match target {
        Some(target) if in_range(npc, target, epsilon) => {
            let p = npc.position;
            let t = target.position;
            if p.x != t.x {
                npc.velocity.x = with_sign(npc.velocity.x, p.x - t.x);
            }
            if p.y != t.y {
                npc.velocity.y = with_sign(npc.velocity.y, p.y - t.y);
            }
        }
        _ => npc.velocity.y = fall_speed,
    }
}

/// Choose one of `candidates` for `npc` to react to; `None` when empty
pub fn pick_prey<'a, R: Rng>(
    npc: &Motion,
    candidates: &'a [Motion],
    pick: PreyPick,
    rng: &mut R,
) -> Option<&'a Motion> {
    if candidates.is_empty() {
        return None;
    }
    match pick {
        PreyPick::Random => candidates.get(rng.random_range(0..candidates.len())),
        PreyPick::Nearest => candidates.iter().min_by(|a, b| {
            let da = a.position.distance_squared(npc.position);
            let db = b.position.distance_squared(npc.position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

/// Eagle rule: chase the chicken, flee its chosen bug, or patrol.
///
/// With both in range the two directions are blended by
/// `params.blend_weight` (chase share) and rescaled to `params.predator_speed`.
pub fn steer_predator(
    npc: &mut Motion,
    target: Option<&Motion>,
    prey: Option<&Motion>,
    params: &SteeringParams,
    epsilon: f32,
    arena: &Arena,
) {
    let target = target.filter(|t| in_range(npc, t, epsilon));
    let prey = prey.filter(|p| in_range(npc, p, epsilon));
    let speed = params.predator_speed;

    let to_target = target.map(|t| (t.position - npc.position).normalize_or_zero());
    let away_from_prey = prey.map(|p| (npc.position - p.position).normalize_or_zero());

    match (to_target, away_from_prey) {
        (Some(chase), Some(flee)) => {
            let w = params.blend_weight;
            npc.velocity = (w * chase + (1.0 - w) * flee).normalize_or_zero() * speed;
        }
        (None, Some(flee)) => npc.velocity = flee * speed,
        (Some(chase), None) => npc.velocity = chase * speed,
        (None, None) => patrol(npc, arena, params.patrol_margin),
    }
}

/// Turn back inward when within `margin` of an arena edge
pub fn patrol(npc: &mut Motion, arena: &Arena, margin: f32) {
    let Vec2 { x, y } = npc.position;

    if (0.0..=margin).contains(&y) {
        npc.velocity.y = npc.velocity.y.abs();
    } else if (arena.height - margin..=arena.height).contains(&y) {
        npc.velocity.y = -npc.velocity.y.abs();
    }

    if (0.0..=margin).contains(&x) {
        npc.velocity.x = npc.velocity.x.abs();
    } else if (arena.width - margin..=arena.width).contains(&x) {
        npc.velocity.x = -npc.velocity.x.abs();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn at(x: f32, y: f32) -> Motion {
        Motion::at(Vec2::new(x, y))
    }

    fn arena() -> Arena {
        Arena::new(1200.0, 800.0)
    }

    #[test]
    fn test_prey_scenario() {
        let mut bug = at(0.0, 0.0).with_velocity(Vec2::new(10.0, 50.0));

        // Chicken far away: keep falling
        steer_prey(&mut bug, Some(&at(200.0, 0.0)), 50.0, 50.0);
        assert_eq!(bug.velocity, Vec2::new(10.0, 50.0));

        // Chicken to the right: run left, y unchanged on the shared row
        steer_prey(&mut bug, Some(&at(10.0, 0.0)), 50.0, 50.0);
        assert_eq!(bug.velocity, Vec2::new(-10.0, 50.0));
    }

    #[test]
    fn test_prey_is_idempotent() {
        let chicken = at(120.0, 90.0);
        let mut once = at(100.0, 100.0).with_velocity(Vec2::new(30.0, -40.0));
        steer_prey(&mut once, Some(&chicken), 50.0, 50.0);
        let mut twice = once;
        steer_prey(&mut twice, Some(&chicken), 50.0, 50.0);
        assert_eq!(once.velocity, Vec2::new(-30.0, 40.0));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_prey_without_target_falls() {
        let mut bug = at(5.0, 5.0).with_velocity(Vec2::new(7.0, -3.0));
        steer_prey(&mut bug, None, 50.0, 50.0);
        assert_eq!(bug.velocity, Vec2::new(7.0, 50.0));
    }

    #[test]
    fn test_in_range_is_inclusive_square() {
        assert!(in_range(&at(0.0, 0.0), &at(50.0, -50.0), 50.0));
        assert!(!in_range(&at(0.0, 0.0), &at(50.1, 0.0), 50.0));
    }

    #[test]
    fn test_predator_blends_chase_and_flee() {
        let params = SteeringParams::default();
        let mut eagle = at(0.0, 0.0);
        let chicken = at(30.0, 0.0);
        let bug = at(0.0, -40.0);
        steer_predator(&mut eagle, Some(&chicken), Some(&bug), &params, 100.0, &arena());
        let expected = Vec2::new(1.0, 1.0).normalize() * 100.0;
        assert!((eagle.velocity - expected).length() < 1e-3);
    }

    #[test]
    fn test_predator_single_sighting() {
        let params = SteeringParams::default();

        let mut fleeing = at(500.0, 400.0);
        steer_predator(
            &mut fleeing,
            Some(&at(1000.0, 400.0)),
            Some(&at(450.0, 400.0)),
            &params,
            100.0,
            &arena(),
        );
        assert!((fleeing.velocity - Vec2::new(100.0, 0.0)).length() < 1e-4);

        let mut chasing = at(500.0, 400.0);
        steer_predator(&mut chasing, Some(&at(500.0, 450.0)), None, &params, 100.0, &arena());
        assert!((chasing.velocity - Vec2::new(0.0, 100.0)).length() < 1e-4);
    }

    #[test]
    fn test_predator_on_top_of_prey_stops() {
        let params = SteeringParams::default();
        let mut eagle = at(300.0, 300.0).with_velocity(Vec2::new(0.0, 100.0));
        steer_predator(&mut eagle, None, Some(&at(300.0, 300.0)), &params, 100.0, &arena());
        assert_eq!(eagle.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_predator_patrols_when_alone() {
        let params = SteeringParams::default();
        let mut eagle = at(1150.0, 50.0).with_velocity(Vec2::new(20.0, -30.0));
        steer_predator(&mut eagle, Some(&at(100.0, 700.0)), None, &params, 100.0, &arena());
        // Near the ceiling and the right wall: turn down and left
        assert_eq!(eagle.velocity, Vec2::new(-20.0, 30.0));
    }

    #[test]
    fn test_patrol_uses_width_for_x() {
        // x = 750 is inside [height - margin, height] but far from the right wall
        let mut eagle = at(750.0, 400.0).with_velocity(Vec2::new(20.0, 10.0));
        patrol(&mut eagle, &arena(), 100.0);
        assert_eq!(eagle.velocity, Vec2::new(20.0, 10.0));

        let mut low = at(50.0, 750.0).with_velocity(Vec2::new(-20.0, 10.0));
        patrol(&mut low, &arena(), 100.0);
        assert_eq!(low.velocity, Vec2::new(20.0, -10.0));
    }

    #[test]
    fn test_pick_prey() {
        let mut rng = Pcg32::seed_from_u64(7);
        let eagle = at(0.0, 0.0);
        assert!(pick_prey(&eagle, &[], PreyPick::Random, &mut rng).is_none());
        assert!(pick_prey(&eagle, &[], PreyPick::Nearest, &mut rng).is_none());

        let bugs = [at(300.0, 0.0), at(20.0, 20.0), at(-100.0, 0.0)];
        let nearest = pick_prey(&eagle, &bugs, PreyPick::Nearest, &mut rng).unwrap();
        assert_eq!(nearest.position, Vec2::new(20.0, 20.0));

        for _ in 0..20 {
            let any = pick_prey(&eagle, &bugs, PreyPick::Random, &mut rng).unwrap();
            assert!(bugs.contains(any));
        }
    }
}
