//! Degree-based transforms and the imperative transform chain.
//!
//! Rotations are always given as Euler angles in degrees and applied X first,
//! then Y, then Z, each post-multiplied onto the running matrix. [`Transform`]
//! composes as `T · Rx · Ry · Rz · S`.
//!
//! [`TransformChain`] is the flat "translate, rotate, scale, draw, unscale"
//! sequence used to lay out composite characters. The part tree in
//! [`hierarchy`](crate::hierarchy) produces the same matrices without relying
//! on undoing scales.

use glam::{Mat4, Vec3};

/// Post-multiplies `matrix` by rotations about X, Y and Z, in that order.
pub fn rotate_degrees(matrix: Mat4, degrees: Vec3) -> Mat4 {
    matrix
        * Mat4::from_rotation_x(degrees.x.to_radians())
        * Mat4::from_rotation_y(degrees.y.to_radians())
        * Mat4::from_rotation_z(degrees.z.to_radians())
}

/// Position, Euler rotation in degrees, and scale of an object.
///
/// Input handlers mutate the fields directly; renderers read
/// [`matrix`](Self::matrix).
///
/// ```
/// use courtlight::{Transform, Vec3};
///
/// let t = Transform::new()
///     .position(Vec3::new(0.0, -0.1, 0.0))
///     .scale(Vec3::new(42.0, 20.0, 20.0));
/// assert_eq!(t.matrix().w_axis.y, -0.1);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, degrees: Vec3) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// `T · Rx · Ry · Rz · S`.
    pub fn matrix(&self) -> Mat4 {
        rotate_degrees(Mat4::from_translation(self.position), self.rotation)
            * Mat4::from_scale(self.scale)
    }
}

/// A running model matrix that records every matrix it is asked to draw.
///
/// Each operation post-multiplies, so later steps happen in the local frame
/// left behind by earlier ones.
#[derive(Clone, Debug)]
pub struct TransformChain {
    current: Mat4,
    drawn: Vec<Mat4>,
}

impl Default for TransformChain {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

impl TransformChain {
    pub fn new(root: Mat4) -> Self {
        Self {
            current: root,
            drawn: Vec::new(),
        }
    }

    pub fn translate(&mut self, offset: Vec3) -> &mut Self {
        self.current *= Mat4::from_translation(offset);
        self
    }

    pub fn rotate(&mut self, degrees: Vec3) -> &mut Self {
        self.current = rotate_degrees(self.current, degrees);
        self
    }

    pub fn scale(&mut self, factors: Vec3) -> &mut Self {
        self.current *= Mat4::from_scale(factors);
        self
    }

    /// Multiplies by the reciprocal of `factors`, cancelling a prior
    /// [`scale`](Self::scale) with the same factors.
    pub fn unscale(&mut self, factors: Vec3) -> &mut Self {
        self.current *= Mat4::from_scale(factors.recip());
        self
    }

    /// Records the current matrix as a drawn part.
    pub fn draw(&mut self) -> &mut Self {
        self.drawn.push(self.current);
        self
    }

    /// Scale, draw, then unscale.
    pub fn draw_scaled(&mut self, factors: Vec3) -> &mut Self {
        self.scale(factors).draw().unscale(factors)
    }

    pub fn matrix(&self) -> Mat4 {
        self.current
    }

    pub fn drawn(&self) -> &[Mat4] {
        &self.drawn
    }

    pub fn into_drawn(self) -> Vec<Mat4> {
        self.drawn
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unscale_restores_matrix_before_scale() {
        let mut chain = TransformChain::default();
        chain
            .translate(Vec3::new(0.0, 5.0, 0.0))
            .rotate(Vec3::new(45.0, 10.0, -30.0));
        let before = chain.matrix();

        chain.scale(Vec3::new(0.5, 4.0, 0.5)).draw().unscale(Vec3::new(0.5, 4.0, 0.5));

        assert!(chain.matrix().abs_diff_eq(before, 1e-5));
        assert_eq!(chain.drawn().len(), 1);
    }

    #[test]
    fn rotation_applies_x_then_y_then_z() {
        let degrees = Vec3::new(30.0, 60.0, 90.0);
        let expected = Mat4::from_rotation_x(30f32.to_radians())
            * Mat4::from_rotation_y(60f32.to_radians())
            * Mat4::from_rotation_z(90f32.to_radians());
        assert!(rotate_degrees(Mat4::IDENTITY, degrees).abs_diff_eq(expected, 1e-6));

        let reversed = Mat4::from_rotation_z(90f32.to_radians())
            * Mat4::from_rotation_y(60f32.to_radians())
            * Mat4::from_rotation_x(30f32.to_radians());
        assert!(!rotate_degrees(Mat4::IDENTITY, degrees).abs_diff_eq(reversed, 1e-3));
    }

    #[test]
    fn order_of_operations_matters() {
        let mut translate_first = TransformChain::default();
        translate_first
            .translate(Vec3::X)
            .rotate(Vec3::new(0.0, 90.0, 0.0));

        let mut rotate_first = TransformChain::default();
        rotate_first
            .rotate(Vec3::new(0.0, 90.0, 0.0))
            .translate(Vec3::X);

        let a = translate_first.matrix().transform_point3(Vec3::ZERO);
        let b = rotate_first.matrix().transform_point3(Vec3::ZERO);
        assert!(a.abs_diff_eq(Vec3::X, 1e-6));
        assert!(b.abs_diff_eq(Vec3::new(0.0, 0.0, -1.0), 1e-6));
    }

    #[test]
    fn transform_matrix_matches_chain() {
        let t = Transform::new()
            .position(Vec3::new(1.0, 2.0, 3.0))
            .rotation(Vec3::new(10.0, 20.0, 30.0))
            .uniform_scale(0.8);

        let mut chain = TransformChain::default();
        chain
            .translate(t.position)
            .rotate(t.rotation)
            .scale(t.scale);

        assert!(t.matrix().abs_diff_eq(chain.matrix(), 1e-6));
    }
}
