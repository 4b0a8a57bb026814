//! Collision detection and player/wall resolution
//!
//! Overlaps use a generous bounding circle: each object's circle comes from
//! its half-extent, and a pair is tested against the *larger* of the two
//! radii. The player additionally gets an exact mesh-vs-wall pass so
//! its true silhouette, not its box, rests on the boundary.

use glam::Vec2;

use super::state::{Bodies, CollisionLog, EntityId, Motion};
use super::transform::Transform;
use crate::settings::Arena;

/// Local bounding box size; abs because a negative scale only encodes facing
#[inline]
pub fn bounding_box(motion: &Motion) -> Vec2 {
    motion.scale.abs()
}

/// Squared radius of the circle around the half-extent
#[inline]
pub fn bounding_radius_squared(motion: &Motion) -> f32 {
    let half = bounding_box(motion) / 2.0;
    half.dot(half)
}

/// Overlap test using the larger of the two bounding circles.
///
/// Inclusive: centers exactly one test radius apart collide. Two zero-size
/// objects therefore collide only when their centers coincide.
pub fn collides(a: &Motion, b: &Motion) -> bool {
    let dp = a.position - b.position;
    let dist_squared = dp.dot(dp);
    let r_squared = bounding_radius_squared(a).max(bounding_radius_squared(b));
    dist_squared <= r_squared
}

/// All-pairs overlap scan, O(n^2); each hit is logged once per direction
pub fn detect_pairs<B: Bodies>(bodies: &B, log: &mut CollisionLog) {
    let ids = bodies.ids();
    let motions: Vec<(EntityId, Motion)> = ids
        .iter()
        .filter_map(|&id| bodies.motion(id).map(|m| (id, *m)))
        .collect();

    for (i, (id_i, motion_i)) in motions.iter().enumerate() {
        // j starts at i + 1: every unordered pair once, never self
        for (id_j, motion_j) in &motions[i + 1..] {
            if collides(motion_i, motion_j) {
                log.push_pair(*id_i, *id_j);
            }
        }
    }
}

/// Which wall a correction pushed away from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

/// Position change applied by [`resolve_player_walls`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallCorrection {
    pub offset: Vec2,
    pub horizontal: Option<Wall>,
    pub vertical: Option<Wall>,
}

/// World-space extent of an object: its mesh if it has one, else its box
fn world_extent<B: Bodies>(bodies: &B, id: EntityId, motion: &Motion) -> (Vec2, Vec2) {
    match bodies.mesh(id) {
        Some(mesh) if !mesh.vertices.is_empty() => {
            let transform = Transform::model(motion.position, motion.angle, motion.scale);
            mesh.world_vertices(&transform).fold(
                (Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)),
                |(lo, hi), p| (lo.min(p), hi.max(p)),
            )
        }
        _ => {
            let half = bounding_box(motion) / 2.0;
            (motion.position - half, motion.position + half)
        }
    }
}

/// Push the player back inside the arena by its exact penetration depth.
///
/// The cheap box test gates the per-vertex pass. Each axis is resolved on its
/// own, and only one wall per axis: a single convex mesh can't cross both
/// opposite walls in one step.
pub fn resolve_player_walls<B: Bodies>(
    bodies: &mut B,
    player: EntityId,
    arena: &Arena,
) -> Option<WallCorrection> {
    let Some(motion) = bodies.motion(player).copied() else {
        debug_assert!(false, "player {player} has no motion");
        return None;
    };

    let half = bounding_box(&motion) / 2.0;
    let p = motion.position;
    let box_touches = p.x - half.x <= 0.0
        || p.x + half.x >= arena.width
        || p.y - half.y <= 0.0
        || p.y + half.y >= arena.height;
    if !box_touches {
        return None;
    }

    let (lo, hi) = world_extent(bodies, player, &motion);
    let mut correction = WallCorrection {
        offset: Vec2::ZERO,
        horizontal: None,
        vertical: None,
    };

    if lo.x < 0.0 {
        correction.offset.x = -lo.x;
        correction.horizontal = Some(Wall::Left);
    } else if hi.x > arena.width {
        correction.offset.x = arena.width - hi.x;
        correction.horizontal = Some(Wall::Right);
    }

    if lo.y < 0.0 {
        correction.offset.y = -lo.y;
        correction.vertical = Some(Wall::Top);
    } else if hi.y > arena.height {
        correction.offset.y = arena.height - hi.y;
        correction.vertical = Some(Wall::Bottom);
    }

    if correction.horizontal.is_none() && correction.vertical.is_none() {
        return None;
    }

    if let Some(m) = bodies.motion_mut(player) {
        m.position += correction.offset;
    }
    log::debug!(
        "player {} pushed off {:?}/{:?} by {:?}",
        player,
        correction.horizontal,
        correction.vertical,
        correction.offset
    );
    Some(correction)
}

/// Full detection pass for one frame: pairwise overlaps, then player walls
pub fn detect_collisions<B: Bodies>(
    bodies: &mut B,
    player: Option<EntityId>,
    arena: &Arena,
    log: &mut CollisionLog,
) -> Option<WallCorrection> {
    detect_pairs(bodies, log);
    player.and_then(|id| resolve_player_walls(bodies, id, arena))
}
