//! The scene's single shadow-casting light.
//!
//! A [`Light`] is a small camera: it keeps a look-at basis, a cached view
//! matrix and a cached perspective projection sized for the square shadow
//! map. The view is rebuilt only through [`Light::set_position`],
//! [`Light::set_target`] or [`Light::update_view`].

use glam::{Mat4, Vec3};

/// Construction parameters for a [`Light`].
#[derive(Clone, Debug)]
pub struct LightConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub ambient_strength: f32,
    pub specular_strength: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Edge length of the square shadow map in texels.
    pub shadow_map_size: u32,
    /// Horizontal radius of the animated path.
    pub orbit_radius: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 13.0, 0.0),
            target: Vec3::ZERO,
            color: Vec3::new(0.99, 0.95, 0.78),
            ambient_strength: 0.2,
            specular_strength: 0.4,
            fov: 90.0,
            near: 1.0,
            far: 100.0,
            shadow_map_size: 2048,
            orbit_radius: 4.0,
        }
    }
}

/// The light values a material is shaded with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightParams {
    pub position: Vec3,
    pub color: Vec3,
    pub ambient_strength: f32,
    pub specular_strength: f32,
}

#[derive(Clone, Debug)]
pub struct Light {
    position: Vec3,
    target: Vec3,
    pub color: Vec3,
    pub ambient_strength: f32,
    pub specular_strength: f32,
    fov: f32,
    near: f32,
    far: f32,
    shadow_map_size: u32,
    orbit_radius: f32,
    /// Unit vector from the target towards the light.
    forward: Vec3,
    right: Vec3,
    up: Vec3,
    view: Mat4,
    projection: Mat4,
}

impl Light {
    pub const WORLD_UP: Vec3 = Vec3::Y;

    pub fn new(config: &LightConfig) -> Self {
        let mut light = Self {
            position: config.position,
            target: config.target,
            color: config.color,
            ambient_strength: config.ambient_strength,
            specular_strength: config.specular_strength,
            fov: config.fov,
            near: config.near,
            far: config.far,
            shadow_map_size: config.shadow_map_size,
            orbit_radius: config.orbit_radius,
            forward: Vec3::Z,
            right: Vec3::X,
            up: Vec3::Y,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
        };
        light.update_projection();
        light.update_view();
        light
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn shadow_map_size(&self) -> u32 {
        self.shadow_map_size
    }

    /// Near and far planes of the shadow projection.
    pub fn depth_range(&self) -> (f32, f32) {
        (self.near, self.far)
    }

    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// `projection · view`, the light-space transform used by both passes.
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.update_view();
    }

    /// Point on the animated path at time `t` seconds.
    pub fn orbit_position(&self, t: f32) -> Vec3 {
        Vec3::new(
            (2.0 * t).cos() * self.orbit_radius,
            10.0 * (t / 2.0).sin() + 15.0,
            t.sin() * self.orbit_radius,
        )
    }

    /// Moves the light to its animated position for time `t`.
    pub fn animate(&mut self, t: f32) {
        self.set_position(self.orbit_position(t));
    }

    pub fn params(&self) -> LightParams {
        LightParams {
            position: self.position,
            color: self.color,
            ambient_strength: self.ambient_strength,
            specular_strength: self.specular_strength,
        }
    }

    /// Rebuilds the basis and view matrix from position and target.
    ///
    /// When the light sits on its target the direction is undefined; the
    /// previous view is kept and a warning is logged.
    pub fn update_view(&mut self) {
        let offset = self.position - self.target;
        if offset.length_squared() <= f32::EPSILON {
            log::warn!(
                "light position {:?} coincides with its target; keeping previous view",
                self.position
            );
            return;
        }

        let forward = offset.normalize();
        let mut reference = Self::WORLD_UP;
        if reference.cross(forward).length_squared() <= 1e-6 {
            reference = Vec3::NEG_Z;
        }
        let right = reference.cross(forward).normalize();
        let up = forward.cross(right);

        self.forward = forward;
        self.right = right;
        self.up = up;
        self.view = Mat4::look_at_rh(self.position, self.target, up);
    }

    fn update_projection(&mut self) {
        self.projection = Mat4::perspective_rh(self.fov.to_radians(), 1.0, self.near, self.far);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_projection_is_projection_times_view() {
        let light = Light::new(&LightConfig::default());
        assert_eq!(light.view_projection(), light.projection() * light.view());
    }

    #[test]
    fn set_position_changes_only_view() {
        let mut light = Light::new(&LightConfig::default());
        let view = light.view();
        let projection = light.projection();

        light.set_position(Vec3::new(4.0, 20.0, 3.0));

        assert_ne!(light.view(), view);
        assert_eq!(light.projection(), projection);
    }

    #[test]
    fn update_view_is_idempotent() {
        let mut light = Light::new(&LightConfig::default());
        light.set_position(Vec3::new(3.0, 12.0, -2.0));
        let first = light.view();
        light.update_view();
        assert_eq!(light.view().to_cols_array(), first.to_cols_array());
    }

    #[test]
    fn light_straight_above_target_has_valid_basis() {
        let light = Light::new(&LightConfig::default());
        assert!(light.forward().abs_diff_eq(Vec3::Y, 1e-6));
        assert!(light.right().is_normalized());
        assert!(light.up().is_normalized());
        assert!(light.view().is_finite());

        let target_in_view = light.view().transform_point3(Vec3::ZERO);
        assert!(target_in_view.abs_diff_eq(Vec3::new(0.0, 0.0, -13.0), 1e-4));
    }

    #[test]
    fn degenerate_position_keeps_previous_view() {
        let mut light = Light::new(&LightConfig::default());
        let view = light.view();
        light.set_position(light.target());
        assert_eq!(light.view(), view);
        assert!(light.view().is_finite());
    }

    #[test]
    fn orbit_follows_parametric_path() {
        let light = Light::new(&LightConfig::default());
        assert!(light.orbit_position(0.0).abs_diff_eq(Vec3::new(4.0, 15.0, 0.0), 1e-6));

        let t = std::f32::consts::PI;
        let p = light.orbit_position(t);
        assert!(p.abs_diff_eq(Vec3::new(4.0, 25.0, 0.0), 1e-4));
    }

    #[test]
    fn retargeting_rebuilds_basis() {
        let mut light = Light::new(&LightConfig::default());
        light.set_position(Vec3::new(0.0, 10.0, 10.0));
        light.set_target(Vec3::new(0.0, 0.0, 10.0));
        assert!(light.forward().abs_diff_eq(Vec3::Y, 1e-6));
        light.set_target(Vec3::ZERO);
        assert!(light.forward().abs_diff_eq(Vec3::new(0.0, 1.0, 1.0).normalize(), 1e-6));
    }
}
