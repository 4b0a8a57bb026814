//! Debug overlay geometry
//!
//! Built fresh each frame while debugging (or frozen) and handed to whatever
//! draws it. Every primitive is an axis-aligned line: a filled rectangle
//! centered on `position` with size `scale`.

use glam::Vec2;

use super::collision::{bounding_box, bounding_radius_squared};
use super::state::{Bodies, EntityId, Kind};
use super::transform::Transform;

/// Thickness of AABB outlines and the side of vertex markers
const OUTLINE_WIDTH: f32 = 3.0;
const VERTEX_MARKER_SIZE: f32 = 6.0;
/// Thickness of velocity direction lines
const DIRECTION_WIDTH: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DebugLine {
    pub position: Vec2,
    pub scale: Vec2,
}

impl DebugLine {
    pub fn new(position: Vec2, scale: Vec2) -> Self {
        Self { position, scale }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugOverlay {
    pub lines: Vec<DebugLine>,
}

impl DebugOverlay {
    /// Overlay for the current frame
    pub fn build<B: Bodies>(bodies: &B, player: Option<EntityId>) -> Self {
        let mut overlay = Self::default();
        for id in bodies.ids() {
            overlay.add_bounds(bodies, id);
            if matches!(bodies.kind(id), Some(Kind::Bug | Kind::Eagle)) {
                overlay.add_direction(bodies, id);
            }
        }
        if let Some(id) = player {
            overlay.add_mesh_vertices(bodies, id);
        }
        overlay
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Radius cross plus the AABB outline
    fn add_bounds<B: Bodies>(&mut self, bodies: &B, id: EntityId) {
        let Some(m) = bodies.motion(id) else {
            return;
        };
        let radius = bounding_radius_squared(m).sqrt();
        let thickness = m.scale.x.abs() / 10.0;
        self.lines.push(DebugLine::new(m.position, Vec2::new(thickness, 2.0 * radius)));
        self.lines.push(DebugLine::new(m.position, Vec2::new(2.0 * radius, thickness)));

        let bb = bounding_box(m);
        let half = bb / 2.0;
        for side in [-1.0, 1.0] {
            self.lines.push(DebugLine::new(
                m.position + Vec2::new(side * half.x, 0.0),
                Vec2::new(OUTLINE_WIDTH, bb.y),
            ));
            self.lines.push(DebugLine::new(
                m.position + Vec2::new(0.0, side * half.y),
                Vec2::new(bb.x, OUTLINE_WIDTH),
            ));
        }
    }

    /// Velocity split into its x and y components
    fn add_direction<B: Bodies>(&mut self, bodies: &B, id: EntityId) {
        let Some(m) = bodies.motion(id) else {
            return;
        };
        let v = m.velocity;
        self.lines.push(DebugLine::new(
            m.position + Vec2::new(v.x / 2.0, 0.0),
            Vec2::new(v.x, DIRECTION_WIDTH),
        ));
        self.lines.push(DebugLine::new(
            m.position + Vec2::new(0.0, v.y / 2.0),
            Vec2::new(DIRECTION_WIDTH, v.y),
        ));
    }

    fn add_mesh_vertices<B: Bodies>(&mut self, bodies: &B, id: EntityId) {
        let (Some(m), Some(mesh)) = (bodies.motion(id), bodies.mesh(id)) else {
            return;
        };
        let transform = Transform::model(m.position, m.angle, m.scale);
        self.lines.extend(
            mesh.world_vertices(&transform)
                .map(|p| DebugLine::new(p, Vec2::splat(VERTEX_MARKER_SIZE))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mesh::Mesh;
    use crate::sim::state::{Motion, Registry};
    use glam::Vec3;
    use std::rc::Rc;

    #[test]
    fn test_overlay_per_kind() {
        let mut registry = Registry::new();
        registry.spawn(
            Kind::Stone,
            Motion::at(Vec2::new(100.0, 100.0)).with_scale(Vec2::new(-60.0, 80.0)),
        );
        let bug = registry
            .spawn(
                Kind::Bug,
                Motion::at(Vec2::new(300.0, 300.0)).with_velocity(Vec2::new(40.0, 50.0)),
            )
            .id;

        let overlay = DebugOverlay::build(&registry, None);
        // 6 bounds lines each, plus 2 direction lines for the bug
        assert_eq!(overlay.len(), 14);

        // Radius cross of the stone: r = |(30, 40)| = 50
        assert_eq!(overlay.lines[1].scale, Vec2::new(100.0, 6.0));

        let bug_pos = registry.get(bug).unwrap().motion.position;
        assert!(overlay.lines.contains(&DebugLine::new(
            bug_pos + Vec2::new(20.0, 0.0),
            Vec2::new(40.0, DIRECTION_WIDTH)
        )));
    }

    #[test]
    fn test_overlay_marks_player_vertices() {
        let mut registry = Registry::new();
        let chicken = registry.spawn(
            Kind::Chicken,
            Motion::at(Vec2::new(600.0, 400.0)).with_scale(Vec2::splat(100.0)),
        );
        chicken.mesh = Some(Rc::new(Mesh::regular_polygon(6, Vec2::ONE, Vec3::ONE)));
        let id = chicken.id;

        let overlay = DebugOverlay::build(&registry, Some(id));
        // 6 bounds lines and 7 vertices (center + ring)
        assert_eq!(overlay.len(), 13);
        assert!(overlay
            .lines
            .iter()
            .any(|l| (l.position - Vec2::new(650.0, 400.0)).length() < 1e-3));
    }
}
