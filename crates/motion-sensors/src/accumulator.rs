use glam::Vec3;

/// Running sum of scaled angular velocity readings.
///
/// Angles are never wrapped or clamped. Integration without an absolute
/// reference drifts, and the viewer tolerates arbitrarily large angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAccumulator {
    angles: Vec3,
    sensitivity: f32,
}

impl RotationAccumulator {
    pub fn new(sensitivity: f32) -> Self {
        Self {
            angles: Vec3::ZERO,
            sensitivity,
        }
    }

    /// Add one reading, scaled by the sensitivity, to every axis.
    pub fn integrate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.angles += Vec3::new(dx, dy, dz) * self.sensitivity;
    }

    /// Accumulated (x, y, z) angles in radians.
    pub fn angles(&self) -> Vec3 {
        self.angles
    }

    pub fn sensitivity(&self) -> f32 {
        self.sensitivity
    }

    pub fn reset(&mut self) {
        self.angles = Vec3::ZERO;
    }
}
