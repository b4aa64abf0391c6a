//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam already provides arithmetic, dot, length, normalize and `perp`. This trait adds
//! the handful of operations the simulation leans on that glam spells differently.

use glam::Vec2;

pub trait Vec2Ext {
    /// Rotate about the origin by `angle` radians (counter-clockwise for +y up)
    fn rotated(self, angle: f32) -> Vec2;

    /// Rotate about `pivot` by `angle` radians
    fn rotated_about(self, angle: f32, pivot: Vec2) -> Vec2;

    /// Scalar 2D cross product (z component of the 3D cross)
    fn cross(self, rhs: Vec2) -> f32;

    /// Flip the sign of the x component
    fn invert_x(&mut self);

    /// Flip the sign of the y component
    fn invert_y(&mut self);
}

impl Vec2Ext for Vec2 {
    #[inline]
    fn rotated(self, angle: f32) -> Vec2 {
        Vec2::from_angle(angle).rotate(self)
    }

    #[inline]
    fn rotated_about(self, angle: f32, pivot: Vec2) -> Vec2 {
        (self - pivot).rotated(angle) + pivot
    }

    #[inline]
    fn cross(self, rhs: Vec2) -> f32 {
        self.perp_dot(rhs)
    }

    #[inline]
    fn invert_x(&mut self) {
        self.x = -self.x;
    }

    #[inline]
    fn invert_y(&mut self) {
        self.y = -self.y;
    }
}
