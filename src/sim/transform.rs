//! 2D affine transforms
//!
//! Builder in the usual model-matrix order: each call right-multiplies, so
//! `Transform::identity().translate(p).rotate(a).scale(s)` maps a local point
//! through scale, then rotation, then translation.

use glam::{Mat3, Vec2};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    mat: Mat3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            mat: Mat3::IDENTITY,
        }
    }

    pub fn translate(self, offset: Vec2) -> Self {
        Self {
            mat: self.mat * Mat3::from_translation(offset),
        }
    }

    /// Rotate by `radians` (counter-clockwise in a y-up frame)
    pub fn rotate(self, radians: f32) -> Self {
        Self {
            mat: self.mat * Mat3::from_angle(radians),
        }
    }

    pub fn scale(self, factor: Vec2) -> Self {
        Self {
            mat: self.mat * Mat3::from_scale(factor),
        }
    }

    /// Model matrix of an object: translate, rotate, scale
    pub fn model(position: Vec2, angle: f32, scale: Vec2) -> Self {
        Self::identity().translate(position).rotate(angle).scale(scale)
    }

    #[inline]
    pub fn apply(&self, point: Vec2) -> Vec2 {
        self.mat.transform_point2(point)
    }
}
