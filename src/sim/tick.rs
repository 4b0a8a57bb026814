//! Per-frame simulation tick
//!
//! One frame, strictly in order: input, world step, AI, integration,
//! collision detection (+ debug overlay), collision reactions.

use glam::Vec2;

use super::collision::detect_collisions;
use super::debug::DebugOverlay;
use super::integrate::integrate;
use super::state::{Kind, Motion};
use super::steering::{pick_prey, steer_predator, steer_prey};
use super::world::GameState;
use crate::consts::FREEZE_DURATION_MS;
use crate::settings::SimConfig;

/// Decoded input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Cursor position in arena coordinates
    pub cursor: Option<Vec2>,
    /// Arrow keys currently held
    pub move_left: bool,
    pub move_right: bool,
    pub move_up: bool,
    pub move_down: bool,
    /// Debug key state; `None` keeps the current setting
    pub debug: Option<bool>,
    /// Start a short freeze showing only the debug overlay
    pub freeze: bool,
    pub speed_up: bool,
    pub slow_down: bool,
    pub restart: bool,
    /// Switch to advance (`Some(true)`) or basic (`Some(false)`) mode
    pub advance: Option<bool>,
}

/// Advance the game by one frame of `elapsed_ms`
pub fn tick(state: &mut GameState, input: &TickInput, elapsed_ms: f32, config: &SimConfig) {
    apply_input(state, input, config);

    if state.mode.freeze && state.freeze_elapsed_ms <= FREEZE_DURATION_MS {
        state.overlay = Some(DebugOverlay::build(&state.registry, state.player));
        state.freeze_elapsed_ms += elapsed_ms;
        return;
    }
    state.mode.freeze = false;
    state.freeze_elapsed_ms = 0.0;

    let frame = state.frame;
    state.frame += 1;

    // World step
    state.despawn_offscreen(config);
    state.update_spawns(elapsed_ms, config);
    state.lay_eggs(elapsed_ms, config);
    state.move_player();
    state.update_timers(elapsed_ms, config);

    if frame % u64::from(config.ai_interval_frames.max(1)) == 0 {
        run_ai(state, config);
    }

    integrate(&mut state.registry, elapsed_ms, &config.arena);

    if frame % u64::from(config.collision_interval_frames.max(1)) == 0 {
        state.last_wall_correction =
            detect_collisions(&mut state.registry, state.player, &config.arena, &mut state.log);
    }

    state.overlay = state
        .mode
        .debug
        .then(|| DebugOverlay::build(&state.registry, state.player));

    state.handle_collisions();
}

fn apply_input(state: &mut GameState, input: &TickInput, config: &SimConfig) {
    if input.restart {
        state.restart(config);
    }
    if let Some(advance) = input.advance {
        state.set_advance(advance, config);
    }
    if let Some(debug) = input.debug {
        state.mode.debug = debug;
    }
    if input.freeze && !state.mode.freeze {
        state.mode.freeze = true;
        state.freeze_elapsed_ms = 0.0;
    }
    if input.slow_down {
        state.slow_down();
    }
    if input.speed_up {
        state.speed_up();
    }

    let Some(chicken) = state.player_entity_mut() else {
        return;
    };
    let flags = &mut chicken.flags;
    if flags.alive && !flags.dragged {
        flags.moving_left = input.move_left;
        flags.moving_right = input.move_right;
        flags.moving_up = input.move_up;
        flags.moving_down = input.move_down;
    }
    if let Some(cursor) = input.cursor {
        if chicken.flags.alive {
            let p = chicken.motion.position;
            chicken.motion.angle = (cursor.y - p.y).atan2(p.x - cursor.x);
        }
    }
}

/// Steer every bug and eagle from the current positions
fn run_ai(state: &mut GameState, config: &SimConfig) {
    let params = &config.steering;
    let arena = &config.arena;
    let prey_epsilon = config.prey_epsilon();
    let predator_epsilon = config.predator_epsilon();

    let chicken: Option<Motion> = state.player_entity().map(|e| e.motion);
    let bugs: Vec<Motion> = state
        .registry
        .iter()
        .filter(|e| e.kind == Kind::Bug)
        .map(|e| e.motion)
        .collect();

    let rng = &mut state.rng;
    for e in state.registry.iter_mut() {
        match e.kind {
            Kind::Bug => steer_prey(
                &mut e.motion,
                chicken.as_ref(),
                prey_epsilon,
                params.prey_fall_speed,
            ),
            Kind::Eagle => {
                let prey = pick_prey(&e.motion, &bugs, params.prey_pick, &mut *rng).copied();
                steer_predator(
                    &mut e.motion,
                    chicken.as_ref(),
                    prey.as_ref(),
                    params,
                    predator_epsilon,
                    arena,
                );
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::world::GameEvent;
    use std::f32::consts::FRAC_PI_2;

    const FRAME_MS: f32 = 16.0;

    fn setup(config: SimConfig) -> (GameState, SimConfig) {
        let state = GameState::new(&config).unwrap();
        (state, config)
    }

    fn chicken_pos(state: &GameState) -> Vec2 {
        state.player_entity().unwrap().motion.position
    }

    fn snapshot(state: &GameState) -> Vec<(u32, Motion)> {
        state.registry.iter().map(|e| (e.id, e.motion)).collect()
    }

    #[test]
    fn test_tick_eats_nearby_bug() {
        let (mut state, config) = setup(SimConfig::default());
        let pos = chicken_pos(&state);
        let bug = state.spawn_bug(pos + Vec2::new(20.0, 0.0), 60.0);

        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(state.points, 1);
        assert!(!state.registry.contains(bug));
        assert!(state.drain_events().contains(&GameEvent::ChickenAte { points: 1 }));
        assert!(state.log.is_empty());
    }

    #[test]
    fn test_tick_death_then_restart() {
        let (mut state, config) = setup(SimConfig::default());
        let pos = chicken_pos(&state);
        state.spawn_eagle(pos);

        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert!(!state.player_entity().unwrap().flags.alive);
        assert_eq!(state.drain_events(), vec![GameEvent::ChickenDied]);

        // Input is ignored while dying
        let hold_left = TickInput {
            move_left: true,
            ..Default::default()
        };
        tick(&mut state, &hold_left, FRAME_MS, &config);
        assert!(!state.player_entity().unwrap().flags.moving_left);
        assert!(state.darken_screen_factor > 0.0);

        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        }
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Restarted));
        assert!(state.player_entity().unwrap().flags.alive);
    }

    #[test]
    fn test_freeze_pauses_then_resumes() {
        let (mut state, config) = setup(SimConfig::default());
        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        let frame = state.frame;
        let before = snapshot(&state);

        let freeze = TickInput {
            freeze: true,
            ..Default::default()
        };
        tick(&mut state, &freeze, FRAME_MS, &config);
        assert!(state.mode.freeze);
        assert!(state.overlay.is_some());

        // 500 ms at 16 ms per frame: 32 frozen frames in total
        for _ in 0..31 {
            tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        }
        assert_eq!(state.frame, frame);
        assert_eq!(snapshot(&state), before);

        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(state.frame, frame + 1);
        assert!(!state.mode.freeze);
        // Debug is off, so normal frames carry no overlay
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_ai_throttle() {
        let config = SimConfig {
            ai_interval_frames: 2,
            ..Default::default()
        };
        let (mut state, config) = setup(config);
        let bug = state.spawn_bug(Vec2::new(100.0, 300.0), 0.0);

        let set_vy = |state: &mut GameState, vy: f32| {
            state.registry.get_mut(bug).unwrap().motion.velocity.y = vy;
        };
        let vy = |state: &GameState| state.registry.get(bug).unwrap().motion.velocity.y;

        set_vy(&mut state, -30.0);
        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(vy(&state), 50.0);

        set_vy(&mut state, -30.0);
        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(vy(&state), -30.0);

        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(vy(&state), 50.0);
    }

    #[test]
    fn test_collision_throttle() {
        let config = SimConfig {
            collision_interval_frames: 2,
            ..Default::default()
        };
        let (mut state, config) = setup(config);
        tick(&mut state, &TickInput::default(), FRAME_MS, &config);

        let pos = chicken_pos(&state);
        let bug = state.spawn_bug(pos, 60.0);

        // Frame 1 skips detection, so nothing is logged or eaten
        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(state.points, 0);
        assert!(state.registry.contains(bug));
        assert!(state.log.is_empty());
        assert!(
            !state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::ChickenAte { .. }))
        );

        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert_eq!(state.points, 1);
        assert!(!state.registry.contains(bug));
        assert!(state.drain_events().contains(&GameEvent::ChickenAte { points: 1 }));
    }

    #[test]
    fn test_debug_overlay_follows_mode() {
        let (mut state, config) = setup(SimConfig::default());
        let on = TickInput {
            debug: Some(true),
            ..Default::default()
        };
        tick(&mut state, &on, FRAME_MS, &config);
        assert!(state.overlay.as_ref().is_some_and(|o| !o.is_empty()));

        // Holding state persists without input
        tick(&mut state, &TickInput::default(), FRAME_MS, &config);
        assert!(state.overlay.is_some());

        let off = TickInput {
            debug: Some(false),
            ..Default::default()
        };
        tick(&mut state, &off, FRAME_MS, &config);
        assert!(state.overlay.is_none());
    }

    #[test]
    fn test_cursor_rotates_chicken() {
        let (mut state, config) = setup(SimConfig::default());
        let pos = chicken_pos(&state);
        let above = TickInput {
            cursor: Some(pos + Vec2::new(0.0, -100.0)),
            ..Default::default()
        };
        tick(&mut state, &above, FRAME_MS, &config);
        let angle = state.player_entity().unwrap().motion.angle;
        assert!((angle + FRAC_PI_2).abs() < 1e-5);
    }

    #[test]
    fn test_mode_switch_and_speed_input() {
        let (mut state, config) = setup(SimConfig::default());
        let input = TickInput {
            advance: Some(true),
            speed_up: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_MS, &config);
        assert!(state.mode.advance);
        // Restart resets the speed before the step is applied
        assert!((state.current_speed - 1.1).abs() < 1e-6);
        assert!(state.registry.count(Kind::is_blower) >= 1);
    }

    #[test]
    fn test_determinism() {
        let config = SimConfig {
            seed: 99999,
            mode: crate::settings::Mode {
                advance: true,
                ..Default::default()
            },
            ..Default::default()
        };
        let (mut a, _) = setup(config.clone());
        let (mut b, _) = setup(config.clone());

        let inputs = [
            TickInput {
                cursor: Some(Vec2::new(300.0, 200.0)),
                move_left: true,
                ..Default::default()
            },
            TickInput {
                move_up: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for i in 0..600 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, FRAME_MS, &config);
            tick(&mut b, input, FRAME_MS, &config);
        }

        assert_eq!(a.points, b.points);
        assert_eq!(a.frame, b.frame);
        assert_eq!(snapshot(&a), snapshot(&b));
        assert_eq!(a.events, b.events);
    }
}
