use glam::{Mat4, Vec3};
use motion_config::ViewerConfig;

/// Orbit camera looking at the model.
///
/// The model rotates in place; the camera only moves when orbited by the
/// user and returns to its home position on reset.
pub struct Camera {
    pub position: Vec3,
    /// Point the camera orbits around.
    pub target: Vec3,
    home: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    pub fn new(config: &ViewerConfig) -> Self {
        let home = Vec3::new(0.0, 0.0, config.camera_distance);
        Self {
            position: home,
            target: Vec3::ZERO,
            home,
            fov_y_degrees: config.fov_y_degrees,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Orbit around the target by `yaw` and `pitch` radians, keeping the distance.
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        let current_pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let current_yaw = offset.x.atan2(offset.z);

        let limit = std::f32::consts::FRAC_PI_2 - 0.01;
        let pitch = (current_pitch + pitch).clamp(-limit, limit);
        let yaw = current_yaw + yaw;

        self.position = self.target
            + radius * Vec3::new(pitch.cos() * yaw.sin(), pitch.sin(), pitch.cos() * yaw.cos());
    }

    /// Back to the home position, looking at the origin.
    pub fn reset(&mut self) {
        self.position = self.home;
        self.target = Vec3::ZERO;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(
            self.fov_y_degrees.to_radians(),
            self.aspect_ratio,
            self.near,
            self.far,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn orbit_keeps_distance_and_reset_returns_home() {
        let mut camera = Camera::new(&ViewerConfig::default());
        camera.orbit(0.8, 0.3);
        assert_abs_diff_eq!(camera.position.length(), 50.0, epsilon = 1e-3);
        assert!(camera.position.distance(Vec3::new(0.0, 0.0, 50.0)) > 1.0);

        camera.reset();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 50.0));
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let camera = Camera::new(&ViewerConfig::default());
        let clip = camera.projection_matrix() * camera.view_matrix() * Vec3::ZERO.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert_abs_diff_eq!(ndc.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ndc.y, 0.0, epsilon = 1e-6);
    }
}
