use crate::accumulator::RotationAccumulator;
use crate::smoother::OrientationSmoother;
use glam::{EulerRot, Quat, Vec3};
use motion_config::SensorConfig;

/// Rotation state mutated by sensor readings.
///
/// Each reading is applied in one call, so the frame loop never sees a
/// half-written vector or quaternion.
#[derive(Debug, Clone)]
pub struct OrientationState {
    pub accumulator: RotationAccumulator,
    pub smoother: OrientationSmoother,
    /// Last reading in display form: raw angular velocity, or euler angles
    /// of the absolute orientation.
    pub readout: Vec3,
}

impl OrientationState {
    pub fn new(config: &SensorConfig) -> Self {
        Self {
            accumulator: RotationAccumulator::new(config.sensitivity),
            smoother: OrientationSmoother::new(config.smoothing_factor),
            readout: Vec3::ZERO,
        }
    }

    pub fn integrate(&mut self, angular_velocity: Vec3) {
        self.accumulator
            .integrate(angular_velocity.x, angular_velocity.y, angular_velocity.z);
        self.readout = angular_velocity;
    }

    pub fn observe(&mut self, orientation: Quat) {
        if self.smoother.set_target(orientation) {
            let (x, y, z) = self.smoother.target().to_euler(EulerRot::XYZ);
            self.readout = Vec3::new(x, y, z);
        }
    }

    /// Zero the accumulator and return the smoother to identity.
    pub fn reset(&mut self) {
        self.accumulator.reset();
        self.smoother.reset();
        self.readout = Vec3::ZERO;
    }
}
