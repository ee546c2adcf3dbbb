use crate::camera::Camera;
use glam::{EulerRot, Mat4, Quat, Vec3};
use motion_config::ViewerConfig;
use motion_sensors::OrientationTarget;

/// The displayed model. Its rotation is driven by the orientation controller.
///
/// Per-axis rotation and orientation quaternion are kept in sync: writing one
/// updates the other.
#[derive(Debug, Clone)]
pub struct Model {
    pub name: String,
    pub position: Vec3,
    /// Uniform scale applied when the model was fitted.
    pub scale: f32,
    rotation: Vec3,
    orientation: Quat,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            scale: 1.0,
            rotation: Vec3::ZERO,
            orientation: Quat::IDENTITY,
        }
    }

    /// Scale the model so its largest dimension is `fit_size` and move its
    /// bounding box center to the origin.
    ///
    /// Returns `false` and leaves the model untouched for empty bounds.
    pub fn fit_to_bounds(&mut self, min: Vec3, max: Vec3, fit_size: f32) -> bool {
        let max_dim = (max - min).max_element();
        if !max_dim.is_finite() || max_dim <= 0.0 {
            return false;
        }
        self.scale = fit_size / max_dim;
        self.position = -(min + max) * 0.5 * self.scale;
        true
    }

    /// Per-axis (x, y, z) rotation in radians.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(Vec3::splat(self.scale), self.orientation, self.position)
    }
}

impl OrientationTarget for Model {
    fn set_rotation(&mut self, euler: Vec3) {
        self.rotation = euler;
        self.orientation = Quat::from_euler(EulerRot::XYZ, euler.x, euler.y, euler.z);
    }

    fn set_orientation(&mut self, orientation: Quat) {
        self.orientation = orientation;
        let (x, y, z) = orientation.to_euler(EulerRot::XYZ);
        self.rotation = Vec3::new(x, y, z);
    }
}

/// The viewer scene: an optional model and the camera.
pub struct Scene {
    /// `None` until a model is loaded.
    pub model: Option<Model>,
    pub camera: Camera,
    fit_size: f32,
}

impl Scene {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            model: None,
            camera: Camera::new(config),
            fit_size: config.fit_size,
        }
    }

    /// Fit `model` to the configured size and make it the displayed model.
    pub fn load_model(&mut self, mut model: Model, bounds_min: Vec3, bounds_max: Vec3) {
        model.fit_to_bounds(bounds_min, bounds_max, self.fit_size);
        self.model = Some(model);
    }

    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    /// Return the camera to its home position.
    pub fn reset_view(&mut self) {
        self.camera.reset();
    }

    /// Combined transform for the current frame, if a model is loaded.
    pub fn model_view_projection(&self) -> Option<Mat4> {
        let model = self.model.as_ref()?;
        Some(self.camera.projection_matrix() * self.camera.view_matrix() * model.model_matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn fit_scales_largest_dimension_and_centers() {
        let mut model = Model::new("box");
        assert!(model.fit_to_bounds(Vec3::new(0.0, 0.0, 0.0), Vec3::new(4.0, 2.0, 1.0), 20.0));
        assert_abs_diff_eq!(model.scale, 5.0);
        assert_eq!(model.position, Vec3::new(-10.0, -5.0, -2.5));
    }

    #[test]
    fn fit_ignores_empty_bounds() {
        let mut model = Model::new("empty");
        assert!(!model.fit_to_bounds(Vec3::ONE, Vec3::ONE, 20.0));
        assert_eq!(model.scale, 1.0);
    }

    #[test]
    fn euler_and_quaternion_stay_in_sync() {
        let mut model = Model::new("m");
        model.set_rotation(Vec3::new(0.3, 0.0, 0.0));
        assert!(model.orientation().abs_diff_eq(Quat::from_rotation_x(0.3), 1e-6));

        model.set_orientation(Quat::from_rotation_y(0.5));
        assert_abs_diff_eq!(model.rotation().x, 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(model.rotation().y, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(model.rotation().z, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn large_accumulated_angles_are_accepted() {
        let mut model = Model::new("m");
        model.set_rotation(Vec3::new(150.0, -42.0, 7.5));
        assert_eq!(model.rotation(), Vec3::new(150.0, -42.0, 7.5));
        assert_abs_diff_eq!(model.orientation().length(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn scene_without_model_has_no_transform() {
        let mut scene = Scene::new(&ViewerConfig::default());
        assert!(scene.model_view_projection().is_none());
        assert!(scene.model_mut().is_none());

        scene.load_model(Model::new("m"), Vec3::splat(-1.0), Vec3::splat(1.0));
        assert_abs_diff_eq!(scene.model.as_ref().unwrap().scale, 10.0);
        assert!(scene.model_view_projection().is_some());
    }
}
