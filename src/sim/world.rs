//! Game world: entity spawning, timers, restart and collision reactions
//!
//! The per-frame ordering of these pieces lives in [`super::tick`].

use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;
use std::rc::Rc;

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::WallCorrection;
use super::debug::DebugOverlay;
use super::mesh::{Mesh, MeshError};
use super::state::{CollisionLog, Entity, EntityId, GravityBody, Kind, Motion, Registry};
use crate::consts::*;
use crate::settings::{Mode, SimConfig};

/// Size of the built-in chicken shape before `CHICKEN_MESH_SCALE`
const DEFAULT_CHICKEN_SIZE: Vec2 = Vec2::new(0.5, 0.375);
const CHICKEN_TINT: Vec3 = Vec3::new(1.0, 0.8, 0.8);
const DEAD_TINT: Vec3 = Vec3::new(1.0, 0.0, 0.0);

/// Something the frontend should react to (sound cues, title updates)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ChickenDied,
    ChickenAte { points: u32 },
    Restarted,
    ModeChanged { advance: bool },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub registry: Registry,
    pub log: CollisionLog,
    /// The chicken; `None` only between teardown and respawn
    pub player: Option<EntityId>,
    pub player_mesh: Rc<Mesh>,
    /// Score (kept across restarts)
    pub points: u32,
    /// Game speed multiplier, adjusted by the player
    pub current_speed: f32,
    pub mode: Mode,
    pub next_eagle_spawn_ms: f32,
    pub next_bug_spawn_ms: f32,
    pub next_vortex_spawn_ms: f32,
    pub next_stone_spawn_ms: f32,
    /// 0 = normal, 1 = black; ramps up while the chicken is dying
    pub darken_screen_factor: f32,
    /// Time spent in the current freeze
    pub freeze_elapsed_ms: f32,
    /// Simulated (non-frozen) frames so far
    pub frame: u64,
    /// Overlay for the last frame, when debugging or frozen
    pub overlay: Option<DebugOverlay>,
    /// Last player/wall push, for inspection
    pub last_wall_correction: Option<WallCorrection>,
    /// Events since the last [`GameState::drain_events`]
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
}

impl GameState {
    /// Create a game from a config, loading the chicken mesh if one is set
    pub fn new(config: &SimConfig) -> Result<Self, MeshError> {
        let mesh = match &config.player_mesh {
            Some(path) => Mesh::load(path)?,
            None => Mesh::regular_polygon(8, DEFAULT_CHICKEN_SIZE, CHICKEN_TINT),
        };
        Ok(Self::with_mesh(config, Rc::new(mesh)))
    }

    /// Create a game with an already loaded chicken mesh
    pub fn with_mesh(config: &SimConfig, player_mesh: Rc<Mesh>) -> Self {
        let mut state = Self {
            registry: Registry::new(),
            log: CollisionLog::new(),
            player: None,
            player_mesh,
            points: 0,
            current_speed: 1.0,
            mode: config.mode,
            next_eagle_spawn_ms: 0.0,
            next_bug_spawn_ms: 0.0,
            next_vortex_spawn_ms: 0.0,
            next_stone_spawn_ms: 0.0,
            darken_screen_factor: 0.0,
            freeze_elapsed_ms: 0.0,
            frame: 0,
            overlay: None,
            last_wall_correction: None,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(config.seed),
        };
        state.restart(config);
        state.events.clear();
        state
    }

    pub fn player_entity(&self) -> Option<&Entity> {
        self.player.and_then(|id| self.registry.get(id))
    }

    pub fn player_entity_mut(&mut self) -> Option<&mut Entity> {
        self.player.and_then(|id| self.registry.get_mut(id))
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Remove everything and start over with a fresh chicken
    pub fn restart(&mut self, config: &SimConfig) {
        log::info!("Restarting (points so far: {})", self.points);
        self.current_speed = 1.0;
        self.registry.clear();
        self.log.clear();
        self.darken_screen_factor = 0.0;
        self.last_wall_correction = None;

        let arena = config.arena;
        let id = self.spawn_chicken(Vec2::new(arena.width / 2.0, arena.height - 200.0));
        self.player = Some(id);
        self.events.push(GameEvent::Restarted);
    }

    /// Switch between basic and advance mode; always restarts
    pub fn set_advance(&mut self, advance: bool, config: &SimConfig) {
        self.mode.advance = advance;
        log::info!(
            "Switch to {} mode",
            if advance { "advance" } else { "basic" }
        );
        self.events.push(GameEvent::ModeChanged { advance });
        self.restart(config);
    }

    pub fn speed_up(&mut self) {
        self.current_speed += SPEED_STEP;
        log::info!("Current speed = {:.1}", self.current_speed);
    }

    pub fn slow_down(&mut self) {
        self.current_speed = (self.current_speed - SPEED_STEP).max(0.0);
        log::info!("Current speed = {:.1}", self.current_speed);
    }

    // --- Spawning ---

    pub fn spawn_chicken(&mut self, position: Vec2) -> EntityId {
        let mut scale = self.player_mesh.original_size * CHICKEN_MESH_SCALE;
        // Point the front to the right
        scale.y = -scale.y;
        let mesh = Rc::clone(&self.player_mesh);
        let chicken = self
            .registry
            .spawn(Kind::Chicken, Motion::at(position).with_scale(scale));
        chicken.mesh = Some(mesh);
        chicken.tint = CHICKEN_TINT;
        chicken.id
    }

    /// `speed` is the initial horizontal speed
    pub fn spawn_bug(&mut self, position: Vec2, speed: f32) -> EntityId {
        let motion = Motion::at(position)
            .with_velocity(Vec2::new(speed, PREY_FALL_SPEED))
            .with_scale(Vec2::new(-BUG_BB_WIDTH, BUG_BB_HEIGHT));
        self.registry.spawn(Kind::Bug, motion).id
    }

    pub fn spawn_eagle(&mut self, position: Vec2) -> EntityId {
        let motion = Motion::at(position)
            .with_velocity(Vec2::new(0.0, PREDATOR_SPEED))
            .with_scale(Vec2::new(-EAGLE_BB_WIDTH, EAGLE_BB_HEIGHT));
        self.registry.spawn(Kind::Eagle, motion).id
    }

    pub fn spawn_egg(&mut self, position: Vec2, size: Vec2, gravity: Vec2) -> EntityId {
        let egg = self
            .registry
            .spawn(Kind::Egg, Motion::at(position).with_scale(size));
        egg.gravity = Some(GravityBody::new(EGG_MASS).with_gravity(gravity));
        egg.id
    }

    /// `extra` in `[0, 1)` grows the stone up to twice its base size
    pub fn spawn_stone(&mut self, position: Vec2, extra: f32) -> EntityId {
        let base = Vec2::new(-STONE_BB_WIDTH, STONE_BB_HEIGHT);
        let motion = Motion::at(position)
            .with_velocity(Vec2::new(0.0, 75.0))
            .with_scale(extra * base + base);
        self.registry.spawn(Kind::Stone, motion).id
    }

    pub fn spawn_vortex(&mut self, position: Vec2) -> EntityId {
        let motion = Motion::at(position)
            .with_velocity(Vec2::new(-100.0, 0.0))
            .with_scale(Vec2::new(-VORTEX_BB_WIDTH, VORTEX_BB_HEIGHT));
        self.registry.spawn(Kind::Vortex, motion).id
    }

    // --- World step pieces ---

    /// Drop everything that left the screen, except the chicken
    pub fn despawn_offscreen(&mut self, config: &SimConfig) {
        let height = config.arena.height;
        self.registry.retain(|e| {
            if e.kind.is_player() {
                return true;
            }
            let m = &e.motion;
            let gone_left = m.position.x + m.scale.x.abs() < 0.0;
            let gone_down = m.position.y - m.scale.y.abs() > height;
            !(gone_left || gone_down)
        });
    }

    /// Random x along the top, off screen
    fn top_spawn_point(&mut self, width: f32) -> Vec2 {
        Vec2::new(50.0 + self.rng.random::<f32>() * (width - 100.0), -100.0)
    }

    /// Reset a spawn timer to a random value in `[delay/2, delay)`
    fn next_delay(&mut self, delay_ms: f32) -> f32 {
        delay_ms / 2.0 + self.rng.random::<f32>() * (delay_ms / 2.0)
    }

    /// Advance spawn timers and create whatever is due
    pub fn update_spawns(&mut self, elapsed_ms: f32, config: &SimConfig) {
        let width = config.arena.width;
        let height = config.arena.height;
        let scaled = elapsed_ms * self.current_speed;

        self.next_eagle_spawn_ms -= scaled;
        if self.registry.count(Kind::is_deadly) <= MAX_EAGLES && self.next_eagle_spawn_ms < 0.0 {
            self.next_eagle_spawn_ms = self.next_delay(EAGLE_DELAY_MS);
            let pos = self.top_spawn_point(width);
            self.spawn_eagle(pos);
        }

        self.next_bug_spawn_ms -= scaled;
        if self.registry.count(Kind::is_eatable) <= MAX_BUG && self.next_bug_spawn_ms < 0.0 {
            self.next_bug_spawn_ms = self.next_delay(BUG_DELAY_MS);
            let pos = self.top_spawn_point(width);
            let speed = self.rng.random::<f32>() * 50.0 + 50.0;
            self.spawn_bug(pos, speed);
        }

        if !self.mode.advance {
            return;
        }

        self.next_vortex_spawn_ms -= scaled;
        if self.registry.count(Kind::is_blower) <= MAX_VORTEX && self.next_vortex_spawn_ms < 0.0 {
            self.next_vortex_spawn_ms = self.next_delay(VORTEX_DELAY_MS);
            let y = 50.0 + self.rng.random::<f32>() * (height - 100.0);
            self.spawn_vortex(Vec2::new(width, y));
        }

        self.next_stone_spawn_ms -= scaled;
        if self.registry.count(Kind::is_deadly) <= MAX_STONE && self.next_stone_spawn_ms < 0.0 {
            self.next_stone_spawn_ms = self.next_delay(STONE_DELAY_MS);
            let pos = self.top_spawn_point(width);
            let extra = self.rng.random::<f32>();
            self.spawn_stone(pos, extra);
        }
    }

    /// In advance mode every eagle drops an egg once per `EGG_TIMER_MS`
    pub fn lay_eggs(&mut self, elapsed_ms: f32, config: &SimConfig) {
        if !self.mode.advance {
            return;
        }
        let mut due = Vec::new();
        for eagle in self.registry.iter_mut().filter(|e| e.kind == Kind::Eagle) {
            let left = eagle.timers.egg_ms.unwrap_or(EGG_TIMER_MS) - elapsed_ms;
            if left < 0.0 {
                eagle.timers.egg_ms = Some(EGG_TIMER_MS);
                let m = &eagle.motion;
                due.push(m.position + Vec2::new(0.0, m.scale.y.abs() / 2.0));
            } else {
                eagle.timers.egg_ms = Some(left);
            }
        }
        for pos in due {
            // range 0.3 .. 1.3 of a 30 px egg
            let radius = 30.0 * (self.rng.random::<f32>() + 0.3);
            self.spawn_egg(pos, Vec2::splat(radius), config.gravity);
        }
    }

    /// Keyboard movement along the chicken's own axes
    pub fn move_player(&mut self) {
        let speed = self.current_speed;
        let Some(chicken) = self.player_entity_mut() else {
            return;
        };
        let flags = chicken.flags;
        if !flags.alive || flags.dragged {
            return;
        }

        let m = &mut chicken.motion;
        m.velocity = Vec2::ZERO;
        let (sin, cos) = m.angle.sin_cos();
        let step = PLAYER_STEP * speed;
        if flags.moving_left {
            m.position += step * Vec2::new(-cos, sin);
        }
        if flags.moving_right {
            m.position += step * Vec2::new(cos, -sin);
        }
        if flags.moving_up {
            m.position += step * Vec2::new(-sin, -cos);
        }
        if flags.moving_down {
            m.position += step * Vec2::new(sin, cos);
        }
    }

    /// Count down entity timers. Returns `true` if a death timer expired
    /// and the game was restarted.
    pub fn update_timers(&mut self, elapsed_ms: f32, config: &SimConfig) -> bool {
        let mut min_death_ms = DEATH_TIMER_MS;
        let mut expired = false;
        for e in self.registry.iter_mut() {
            if let Some(ms) = e.timers.death_ms.as_mut() {
                *ms -= elapsed_ms;
                min_death_ms = min_death_ms.min(*ms);
                if *ms < 0.0 {
                    e.timers.death_ms = None;
                    expired = true;
                }
            }
        }
        if expired {
            self.restart(config);
            return true;
        }
        self.darken_screen_factor = 1.0 - min_death_ms / DEATH_TIMER_MS;

        for e in self.registry.iter_mut() {
            if let Some(ms) = e.timers.light_up_ms.as_mut() {
                *ms -= elapsed_ms;
                if *ms < 0.0 {
                    e.timers.light_up_ms = None;
                    e.light_up = false;
                }
            }
        }

        if self.mode.advance {
            for e in self.registry.iter_mut() {
                if let Some(ms) = e.timers.blow_up_ms.as_mut() {
                    *ms -= elapsed_ms;
                    if *ms < 0.0 {
                        e.timers.blow_up_ms = None;
                        e.flags.dragged = false;
                    }
                }
            }
        }
        false
    }

    // --- Reactions ---

    /// React to this frame's collisions, then clear the log
    pub fn handle_collisions(&mut self) {
        let events = self.log.drain();
        // Entities removed by an earlier event in this pass
        let mut removed: HashSet<EntityId> = HashSet::new();

        for c in events {
            if removed.contains(&c.entity) || removed.contains(&c.other) {
                continue;
            }
            let (Some(kind), Some(other_kind)) = (
                self.registry.get(c.entity).map(|e| e.kind),
                self.registry.get(c.other).map(|e| e.kind),
            ) else {
                debug_assert!(false, "collision references a missing entity: {c:?}");
                continue;
            };

            if kind.is_player() {
                if other_kind.is_deadly() {
                    self.kill_chicken(c.entity);
                } else if other_kind.is_eatable() && self.eat_bug(c.entity, c.other) {
                    removed.insert(c.other);
                }
            }

            if self.mode.advance && kind.is_blowable() && other_kind.is_blower() {
                self.blow(c.entity, c.other);
            }
        }
    }

    fn kill_chicken(&mut self, id: EntityId) {
        let speed = self.current_speed;
        let Some(chicken) = self.registry.get_mut(id) else {
            return;
        };
        if chicken.timers.death_ms.is_some() {
            return;
        }
        chicken.timers.death_ms = Some(DEATH_TIMER_MS);
        chicken.tint = DEAD_TINT;
        chicken.flags.follow_mouse = false;
        chicken.flags.alive = false;
        chicken.motion.angle = FRAC_PI_2;
        chicken.motion.velocity = Vec2::new(0.0, DEATH_SINK_SPEED * speed);
        log::info!("Chicken {id} died");
        self.events.push(GameEvent::ChickenDied);
    }

    /// Returns `true` if the bug was eaten
    fn eat_bug(&mut self, chicken_id: EntityId, bug: EntityId) -> bool {
        let Some(chicken) = self.registry.get_mut(chicken_id) else {
            return false;
        };
        if chicken.timers.light_up_ms.is_some() {
            return false;
        }
        chicken.timers.light_up_ms = Some(LIGHT_UP_TIMER_MS);
        chicken.light_up = true;
        self.registry.remove(bug);
        self.points += 1;
        log::debug!("Bug {bug} eaten, points = {}", self.points);
        self.events.push(GameEvent::ChickenAte {
            points: self.points,
        });
        true
    }

    /// Grab `id` and fling it toward the vortex
    fn blow(&mut self, id: EntityId, vortex: EntityId) {
        let Some(center) = self.registry.get(vortex).map(|v| v.motion.position) else {
            return;
        };
        let Some(e) = self.registry.get_mut(id) else {
            return;
        };
        if e.timers.blow_up_ms.is_some() {
            return;
        }
        e.timers.blow_up_ms = Some(BLOW_UP_TIMER_MS);
        e.flags.dragged = true;
        e.motion.velocity = -VORTEX_PULL * (e.motion.position - center);
    }
}
