//! Motion integration
//!
//! Advances every body by the frame's elapsed time. Plain bodies move
//! linearly; bodies with an active [`GravityBody`] use a midpoint scheme whose
//! midpoint force is back-computed from the half-step velocity change rather
//! than sampled at the midpoint position. Keep the formula order intact.

use super::state::{Bodies, GravityBody, Motion};
use crate::settings::Arena;
use crate::with_sign;

/// Advance all bodies by `elapsed_ms`
pub fn integrate<B: Bodies>(bodies: &mut B, elapsed_ms: f32, arena: &Arena) {
    let step_seconds = elapsed_ms / 1000.0;

    for id in bodies.ids() {
        let Some(kind) = bodies.kind(id) else {
            continue;
        };
        let Some((motion, gravity)) = bodies.motion_and_gravity_mut(id) else {
            continue;
        };

        // Gravity replaces the linear step so falling bodies move once
        match gravity {
            Some(body) if body.obeys_gravity => midpoint_step(motion, body, step_seconds),
            _ => linear_step(motion, step_seconds),
        }

        if kind.bounces_horizontally() {
            bounce_horizontal(motion, arena);
        }
        if kind.bounces_vertically() {
            bounce_vertical(motion, arena);
        }
    }
}

/// `position += dt * velocity`
#[inline]
pub fn linear_step(motion: &mut Motion, step_seconds: f32) {
    motion.position += step_seconds * motion.velocity;
}

/// One midpoint step under constant gravity.
///
/// A zero step or a massless body leaves everything untouched.
pub fn midpoint_step(motion: &mut Motion, body: &mut GravityBody, step_seconds: f32) {
    if step_seconds == 0.0 || body.mass == 0.0 {
        return;
    }
    let half = step_seconds / 2.0;

    body.force = body.mass * body.gravity;
    body.acceleration = body.force / body.mass;

    body.mid_position = motion.position + half * motion.velocity;
    body.mid_velocity = motion.velocity + half * body.acceleration;

    body.mid_force = body.mass * (body.mid_velocity - motion.velocity) / half;
    body.mid_acceleration = body.mid_force / body.mass;

    motion.position += step_seconds * body.mid_velocity;
    motion.velocity += step_seconds * body.mid_acceleration;
}

/// Keep a body between the side walls, sending it back inward on contact.
///
/// The velocity sign is forced inward rather than negated, so a body clamped
/// while already heading back in is not flipped out again.
pub fn bounce_horizontal(motion: &mut Motion, arena: &Arena) {
    let half = motion.scale.x.abs() / 2.0;
    if motion.position.x - half < 0.0 {
        motion.position.x = half;
        motion.velocity.x = with_sign(motion.velocity.x, 1.0);
    } else if motion.position.x + half > arena.width {
        motion.position.x = arena.width - half;
        motion.velocity.x = with_sign(motion.velocity.x, -1.0);
    }
}

/// Keep a body between floor and ceiling, same inward sign rule as
/// [`bounce_horizontal`]
pub fn bounce_vertical(motion: &mut Motion, arena: &Arena) {
    let half = motion.scale.y.abs() / 2.0;
    if motion.position.y - half < 0.0 {
        motion.position.y = half;
        motion.velocity.y = with_sign(motion.velocity.y, 1.0);
    } else if motion.position.y + half > arena.height {
        motion.position.y = arena.height - half;
        motion.velocity.y = with_sign(motion.velocity.y, -1.0);
    }
}
