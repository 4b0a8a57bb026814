//! Entities, components and the object store
//!
//! The integrator, detector and debug overlay only see objects through the
//! [`Bodies`] trait; [`Registry`] is the store the game itself uses.

use std::rc::Rc;

use glam::{Vec2, Vec3};

use super::mesh::Mesh;
use crate::consts::DEFAULT_GRAVITY;

pub type EntityId = u32;

/// Shape and motion of an entity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Vec2,
    /// Orientation (radians)
    pub angle: f32,
    pub velocity: Vec2,
    /// Visual size; also the bounding box source. Sign encodes facing.
    pub scale: Vec2,
}

impl Default for Motion {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            angle: 0.0,
            velocity: Vec2::ZERO,
            scale: Vec2::new(10.0, 10.0),
        }
    }
}

impl Motion {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_scale(mut self, scale: Vec2) -> Self {
        self.scale = scale;
        self
    }
}

/// Mass and integrator state for objects that fall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GravityBody {
    pub mass: f32,
    pub force: Vec2,
    pub acceleration: Vec2,
    /// Positive y is downward
    pub gravity: Vec2,
    pub obeys_gravity: bool,
    // Midpoint scratch, only meaningful inside one step
    pub mid_position: Vec2,
    pub mid_velocity: Vec2,
    pub mid_force: Vec2,
    pub mid_acceleration: Vec2,
}

impl GravityBody {
    pub fn new(mass: f32) -> Self {
        Self {
            mass,
            force: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity: DEFAULT_GRAVITY,
            obeys_gravity: true,
            mid_position: Vec2::ZERO,
            mid_velocity: Vec2::ZERO,
            mid_force: Vec2::ZERO,
            mid_acceleration: Vec2::ZERO,
        }
    }

    pub fn with_gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }
}

/// What an entity is; gameplay roles derive from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// The player
    Chicken,
    /// Prey, soft shell
    Bug,
    /// Airborne hazard, hard shell
    Eagle,
    /// Laid by eagles, falls under gravity
    Egg,
    /// Falling rock (advance mode)
    Stone,
    /// Drags blowable things toward itself (advance mode)
    Vortex,
}

impl Kind {
    pub fn is_player(self) -> bool {
        self == Kind::Chicken
    }

    pub fn is_eatable(self) -> bool {
        self == Kind::Bug
    }

    pub fn is_deadly(self) -> bool {
        matches!(self, Kind::Eagle | Kind::Egg | Kind::Stone)
    }

    pub fn is_blower(self) -> bool {
        self == Kind::Vortex
    }

    /// Light creatures a vortex can grab
    pub fn is_blowable(self) -> bool {
        matches!(self, Kind::Chicken | Kind::Bug | Kind::Eagle)
    }

    /// Prey and hazards stay inside the side walls
    pub fn bounces_horizontally(self) -> bool {
        matches!(self, Kind::Bug | Kind::Eagle)
    }

    /// Only airborne hazards stay between floor and ceiling
    pub fn bounces_vertically(self) -> bool {
        self == Kind::Eagle
    }
}

/// Countdown timers attached to an entity (ms remaining)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timers {
    pub death_ms: Option<f32>,
    pub light_up_ms: Option<f32>,
    pub blow_up_ms: Option<f32>,
    pub egg_ms: Option<f32>,
}

/// Player movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionFlags {
    pub follow_mouse: bool,
    pub alive: bool,
    pub moving_left: bool,
    pub moving_right: bool,
    pub moving_up: bool,
    pub moving_down: bool,
    /// Grabbed by a vortex; keyboard movement is ignored
    pub dragged: bool,
}

impl Default for MotionFlags {
    fn default() -> Self {
        Self {
            follow_mouse: true,
            alive: true,
            moving_left: false,
            moving_right: false,
            moving_up: false,
            moving_down: false,
            dragged: false,
        }
    }
}

/// A game object
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: Kind,
    pub motion: Motion,
    pub gravity: Option<GravityBody>,
    /// Shared render mesh, used for exact wall tests
    pub mesh: Option<Rc<Mesh>>,
    pub tint: Vec3,
    pub light_up: bool,
    pub timers: Timers,
    pub flags: MotionFlags,
}

impl Entity {
    pub fn new(id: EntityId, kind: Kind, motion: Motion) -> Self {
        Self {
            id,
            kind,
            motion,
            gravity: None,
            mesh: None,
            tint: Vec3::ONE,
            light_up: false,
            timers: Timers::default(),
            flags: MotionFlags::default(),
        }
    }
}

/// One direction of a detected overlap: `entity` was hit by `other`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collision {
    pub entity: EntityId,
    pub other: EntityId,
}

/// Per-frame collision events; both directions of each overlap are recorded
#[derive(Debug, Clone, Default)]
pub struct CollisionLog {
    events: Vec<Collision>,
}

impl CollisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an overlap in both directions
    pub fn push_pair(&mut self, a: EntityId, b: EntityId) {
        self.events.push(Collision { entity: a, other: b });
        self.events.push(Collision { entity: b, other: a });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collision> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, entity: EntityId, other: EntityId) -> bool {
        self.events.contains(&Collision { entity, other })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Hand the events to a consumer, leaving the log empty
    pub fn drain(&mut self) -> Vec<Collision> {
        std::mem::take(&mut self.events)
    }
}

/// Minimal view of the object store needed by the physics systems
pub trait Bodies {
    /// All ids, in a stable order
    fn ids(&self) -> Vec<EntityId>;
    fn kind(&self, id: EntityId) -> Option<Kind>;
    fn motion(&self, id: EntityId) -> Option<&Motion>;
    fn motion_mut(&mut self, id: EntityId) -> Option<&mut Motion>;
    fn mesh(&self, id: EntityId) -> Option<&Mesh>;

    /// Motion and gravity together, for the integrator
    fn motion_and_gravity_mut(
        &mut self,
        id: EntityId,
    ) -> Option<(&mut Motion, Option<&mut GravityBody>)>;
}

/// Entity store, sorted by id for deterministic iteration
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entities: Vec<Entity>,
    next_id: EntityId,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Spawn an entity under a fresh id
    pub fn spawn(&mut self, kind: Kind, motion: Motion) -> &mut Entity {
        let id = self.next_entity_id();
        self.insert(Entity::new(id, kind, motion))
    }

    /// Insert a prepared entity, keeping the id order
    pub fn insert(&mut self, entity: Entity) -> &mut Entity {
        let idx = match self.entities.binary_search_by_key(&entity.id, |e| e.id) {
            Ok(idx) => {
                self.entities[idx] = entity;
                idx
            }
            Err(idx) => {
                self.entities.insert(idx, entity);
                idx
            }
        };
        &mut self.entities[idx]
    }

    fn index_of(&self, id: EntityId) -> Option<usize> {
        self.entities.binary_search_by_key(&id, |e| e.id).ok()
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.index_of(id).map(|i| &self.entities[i])
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.index_of(id).map(move |i| &mut self.entities[i])
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.index_of(id).map(|i| self.entities.remove(i))
    }

    pub fn retain(&mut self, f: impl FnMut(&Entity) -> bool) {
        self.entities.retain(f);
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn count(&self, pred: impl Fn(Kind) -> bool) -> usize {
        self.entities.iter().filter(|e| pred(e.kind)).count()
    }

    /// Ids of every entity of the given kind
    pub fn ids_of(&self, kind: Kind) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.id)
            .collect()
    }
}

impl Bodies for Registry {
    fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|e| e.id).collect()
    }

    fn kind(&self, id: EntityId) -> Option<Kind> {
        self.get(id).map(|e| e.kind)
    }

    fn motion(&self, id: EntityId) -> Option<&Motion> {
        self.get(id).map(|e| &e.motion)
    }

    fn motion_mut(&mut self, id: EntityId) -> Option<&mut Motion> {
        self.get_mut(id).map(|e| &mut e.motion)
    }

    fn mesh(&self, id: EntityId) -> Option<&Mesh> {
        self.get(id).and_then(|e| e.mesh.as_deref())
    }

    fn motion_and_gravity_mut(
        &mut self,
        id: EntityId,
    ) -> Option<(&mut Motion, Option<&mut GravityBody>)> {
        self.get_mut(id).map(|e| (&mut e.motion, e.gravity.as_mut()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_keeps_id_order() {
        let mut registry = Registry::new();
        let a = registry.spawn(Kind::Bug, Motion::default()).id;
        let b = registry.spawn(Kind::Eagle, Motion::default()).id;
        let c = registry.spawn(Kind::Bug, Motion::default()).id;
        registry.remove(b);
        assert_eq!(registry.ids(), vec![a, c]);
        assert_eq!(registry.ids_of(Kind::Bug), vec![a, c]);
        assert!(!registry.contains(b));

        // Ids are never reused
        let d = registry.spawn(Kind::Stone, Motion::default()).id;
        assert!(d > c);
    }

    #[test]
    fn test_collision_log_records_both_directions() {
        let mut log = CollisionLog::new();
        log.push_pair(3, 7);
        assert_eq!(log.len(), 2);
        assert!(log.contains(3, 7));
        assert!(log.contains(7, 3));
        let drained = log.drain();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_kind_roles() {
        assert!(Kind::Bug.is_eatable() && !Kind::Bug.is_deadly());
        assert!(Kind::Egg.is_deadly() && !Kind::Egg.bounces_horizontally());
        assert!(Kind::Eagle.bounces_vertically());
        assert!(!Kind::Bug.bounces_vertically());
        assert!(!Kind::Vortex.is_blowable());
    }
}
