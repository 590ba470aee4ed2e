use glam::{Mat4, Quat, Vec3};

/// Construction parameters and control speeds for a [`Camera`].
#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Units per second for keyboard translation.
    pub move_speed: f32,
    /// Degrees per second for pan and tilt.
    pub turn_speed: f32,
    /// Radians per second for orbiting around the target.
    pub orbit_speed: f32,
    /// Where the camera sits relative to a player it focuses on.
    pub focus_offset: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 25.0, 30.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov: 45.0,
            near: 0.1,
            far: 1000.0,
            move_speed: 10.0,
            turn_speed: 30.0,
            orbit_speed: 1.0,
            focus_offset: Vec3::new(0.0, 25.0, 30.0),
        }
    }
}

/// Translation directions for [`Camera::translate`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraMove {
    Up,
    Down,
    Left,
    Right,
    /// Horizontal step towards the target.
    Forward,
    Backward,
    /// Step along the viewing direction, including its vertical part.
    Along,
}

/// A look-at camera with cached view and projection matrices.
///
/// The view is rebuilt whenever position or target change; the projection
/// only when the viewport is resized.
#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec3,
    target: Vec3,
    up: Vec3,
    fov: f32,
    near: f32,
    far: f32,
    width: u32,
    height: u32,
    view: Mat4,
    projection: Mat4,
    home_position: Vec3,
    home_target: Vec3,
    focus_offset: Vec3,
}

impl Camera {
    /// Elevation stays this far from the poles so the view never looks
    /// straight along `up`.
    const POLE_MARGIN: f32 = 0.01;

    pub fn new(config: &CameraConfig, width: u32, height: u32) -> Self {
        let mut camera = Self {
            position: config.position,
            target: config.target,
            up: config.up,
            fov: config.fov,
            near: config.near,
            far: config.far,
            width: width.max(1),
            height: height.max(1),
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            home_position: config.position,
            home_target: config.target,
            focus_offset: config.focus_offset,
        };
        camera.update_view();
        camera.update_projection();
        camera
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.update_view();
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.update_view();
    }

    /// Updates the aspect ratio. Zero sizes (minimized windows) are ignored.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.width = width;
            self.height = height;
            self.update_projection();
        }
    }

    /// Looks at `point` from the configured focus offset.
    pub fn focus(&mut self, point: Vec3) {
        self.position = point + self.focus_offset;
        self.target = point;
        self.update_view();
    }

    /// Returns to the initial position and target.
    pub fn reset(&mut self) {
        self.position = self.home_position;
        self.target = self.home_target;
        self.update_view();
    }

    fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or(Vec3::X)
    }

    /// Moves position and target together by `distance` units.
    pub fn translate(&mut self, direction: CameraMove, distance: f32) {
        let horizontal = {
            let f = self.forward();
            Vec3::new(f.x, 0.0, f.z).normalize_or(Vec3::NEG_Z)
        };
        let step = match direction {
            CameraMove::Up => self.up,
            CameraMove::Down => -self.up,
            CameraMove::Left => -self.right(),
            CameraMove::Right => self.right(),
            CameraMove::Forward => horizontal,
            CameraMove::Backward => -horizontal,
            CameraMove::Along => self.forward(),
        } * distance;
        self.position += step;
        self.target += step;
        self.update_view();
    }

    /// Tilts the view by rotating the target about the camera's right axis.
    pub fn tilt(&mut self, degrees: f32) {
        let offset = self.target - self.position;
        let rotated = Quat::from_axis_angle(self.right(), degrees.to_radians()) * offset;
        let max_cos = (std::f32::consts::FRAC_PI_2 - Self::POLE_MARGIN).sin();
        if rotated.normalize().dot(self.up).abs() < max_cos {
            self.target = self.position + rotated;
            self.update_view();
        }
    }

    /// Pans the view by rotating the target about the world up axis.
    pub fn pan(&mut self, degrees: f32) {
        let offset = self.target - self.position;
        let rotated = Quat::from_axis_angle(self.up, degrees.to_radians()) * offset;
        self.target = self.position + rotated;
        self.update_view();
    }

    /// Orbits the camera around its target on a sphere.
    pub fn orbit(&mut self, azimuth: f32, elevation: f32) {
        let offset = self.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }

        let limit = std::f32::consts::FRAC_PI_2 - Self::POLE_MARGIN;
        let current_azimuth = offset.x.atan2(offset.z);
        let current_elevation = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let azimuth = current_azimuth + azimuth;
        let elevation = (current_elevation + elevation).clamp(-limit, limit);

        let offset = Vec3::new(
            distance * elevation.cos() * azimuth.sin(),
            distance * elevation.sin(),
            distance * elevation.cos() * azimuth.cos(),
        );
        self.position = self.target + offset;
        self.update_view();
    }

    fn update_view(&mut self) {
        self.view = Mat4::look_at_rh(self.position, self.target, self.up);
    }

    fn update_projection(&mut self) {
        self.projection =
            Mat4::perspective_rh(self.fov.to_radians(), self.aspect(), self.near, self.far);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::new(&CameraConfig::default(), 1280, 720)
    }

    #[test]
    fn resize_changes_only_projection() {
        let mut camera = camera();
        let view = camera.view();
        let projection = camera.projection();

        camera.set_viewport_size(800, 800);

        assert_eq!(camera.view(), view);
        assert_ne!(camera.projection(), projection);
        assert_eq!(camera.aspect(), 1.0);
    }

    #[test]
    fn zero_sized_viewport_is_ignored() {
        let mut camera = camera();
        let projection = camera.projection();
        camera.set_viewport_size(0, 720);
        assert_eq!(camera.projection(), projection);
    }

    #[test]
    fn translation_keeps_view_direction() {
        let mut camera = camera();
        let direction = camera.target() - camera.position();
        camera.translate(CameraMove::Left, 3.0);
        camera.translate(CameraMove::Up, 2.0);
        assert!((camera.target() - camera.position()).abs_diff_eq(direction, 1e-5));
        assert!(camera.position().abs_diff_eq(Vec3::new(-3.0, 27.0, 30.0), 1e-5));
    }

    #[test]
    fn orbit_keeps_distance_to_target() {
        let mut camera = camera();
        let distance = camera.position().distance(camera.target());
        camera.orbit(0.7, 0.2);
        camera.orbit(-2.0, 5.0);
        assert!((camera.position().distance(camera.target()) - distance).abs() < 1e-3);
        assert!(camera.view().is_finite());
    }

    #[test]
    fn focus_and_reset() {
        let mut camera = camera();
        camera.focus(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(camera.target(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(camera.position(), Vec3::new(10.0, 25.0, 30.0));

        camera.pan(30.0);
        camera.reset();
        assert_eq!(camera.position(), Vec3::new(0.0, 25.0, 30.0));
        assert_eq!(camera.target(), Vec3::ZERO);
    }

    #[test]
    fn tilt_stops_short_of_the_pole() {
        let mut camera = camera();
        for _ in 0..20 {
            camera.tilt(-30.0);
        }
        let direction = (camera.target() - camera.position()).normalize();
        assert!(direction.dot(Vec3::Y).abs() < 1.0);
        assert!(camera.view().is_finite());
    }
}
