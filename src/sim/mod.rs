//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod debug;
pub mod integrate;
pub mod mesh;
pub mod state;
pub mod steering;
pub mod tick;
pub mod transform;
pub mod world;

pub use collision::{Wall, WallCorrection, detect_collisions, resolve_player_walls};
pub use debug::{DebugLine, DebugOverlay};
pub use integrate::integrate;
pub use mesh::{ColoredVertex, Mesh, MeshError};
pub use state::{
    Bodies, Collision, CollisionLog, Entity, EntityId, GravityBody, Kind, Motion, MotionFlags,
    Registry, Timers,
};
pub use steering::{PreyPick, in_range, patrol, pick_prey, steer_predator, steer_prey};
pub use tick::{TickInput, tick};
pub use transform::Transform;
pub use world::{GameEvent, GameState};
