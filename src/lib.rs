//! Bug Chase - chase the bugs, avoid the eagles
//!
//! Core modules:
//! - `sim`: Per-frame simulation (motion, collisions, steering, gameplay)
//! - `settings`: Serializable simulation configuration

pub mod settings;
pub mod sim;

pub use settings::{Arena, ConfigError, Mode, SimConfig, SteeringParams};

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Default arena dimensions (pixels)
    pub const WINDOW_WIDTH_PX: f32 = 1200.0;
    pub const WINDOW_HEIGHT_PX: f32 = 800.0;

    /// Bounding box sizes, hard coded to the dimensions of each texture
    pub const BUG_BB_WIDTH: f32 = 0.6 * 165.0;
    pub const BUG_BB_HEIGHT: f32 = 0.6 * 165.0;
    pub const EAGLE_BB_WIDTH: f32 = 0.6 * 300.0;
    pub const EAGLE_BB_HEIGHT: f32 = 0.6 * 202.0;
    pub const VORTEX_BB_WIDTH: f32 = 0.6 * 300.0;
    pub const VORTEX_BB_HEIGHT: f32 = 0.6 * 300.0;
    pub const STONE_BB_WIDTH: f32 = 0.6 * 100.0;
    pub const STONE_BB_HEIGHT: f32 = 0.6 * 100.0;

    /// Chicken mesh is scaled from its original size by this factor
    pub const CHICKEN_MESH_SCALE: f32 = 300.0;

    /// Population caps (spawning stops once the count exceeds the cap)
    pub const MAX_EAGLES: usize = 15;
    pub const MAX_BUG: usize = 5;
    pub const MAX_VORTEX: usize = 1;
    pub const MAX_STONE: usize = 10;

    /// Spawn delays (ms at speed 1.0)
    pub const EAGLE_DELAY_MS: f32 = 5000.0 * 6.0;
    pub const BUG_DELAY_MS: f32 = 8000.0 * 6.0;
    pub const VORTEX_DELAY_MS: f32 = 3000.0 * 3.0;
    pub const STONE_DELAY_MS: f32 = 2000.0 * 3.0;

    /// Timer lengths (ms)
    pub const DEATH_TIMER_MS: f32 = 3000.0;
    pub const LIGHT_UP_TIMER_MS: f32 = 500.0;
    pub const BLOW_UP_TIMER_MS: f32 = 300.0;
    pub const EGG_TIMER_MS: f32 = 1000.0;
    /// How long a freeze shows the debug overlay before play resumes
    pub const FREEZE_DURATION_MS: f32 = 500.0;

    /// Bug fall speed when the chicken is out of range
    pub const PREY_FALL_SPEED: f32 = 50.0;
    /// Eagle cruising speed when chasing or fleeing
    pub const PREDATOR_SPEED: f32 = 100.0;
    /// Chase/flee blend weight (1.0 = pure chase)
    pub const PREDATOR_BLEND_WEIGHT: f32 = 0.5;
    /// Distance from each arena edge inside which a patrolling eagle turns
    pub const PATROL_MARGIN: f32 = 100.0;

    /// Downward gravity, non-negative because screen y grows downward
    pub const DEFAULT_GRAVITY: Vec2 = Vec2::new(0.0, 98.0 / 2.0);
    /// Real world mass of an egg
    pub const EGG_MASS: f32 = 50.0;

    /// Keyboard step per frame, multiplied by the current speed
    pub const PLAYER_STEP: f32 = 5.0;
    /// Speed change per `<`/`>` press
    pub const SPEED_STEP: f32 = 0.1;
    /// Velocity gain applied when a vortex grabs something
    pub const VORTEX_PULL: f32 = 1.5;
    /// Sinking speed of a dead chicken
    pub const DEATH_SINK_SPEED: f32 = 100.0;
}

/// Diagonal-ish extent of an arena: `sqrt(width * height)`.
///
/// Detection thresholds for the AI are fractions of this value.
#[inline]
pub fn arena_radius(width: f32, height: f32) -> f32 {
    (width * height).sqrt()
}

/// Flip a component so it points in the sign of `dir` (magnitude preserved)
#[inline]
pub fn with_sign(value: f32, dir: f32) -> f32 {
    if dir < 0.0 { -value.abs() } else { value.abs() }
}
