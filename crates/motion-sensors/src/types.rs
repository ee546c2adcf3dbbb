use glam::Vec3;

pub use motion_config::Mode;

/// A single raw reading delivered by a platform sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    /// Gyroscope angular velocity (rad/s) around x, y, z.
    AngularVelocity(Vec3),
    /// Absolute orientation as an `[x, y, z, w]` quaternion, not necessarily unit length.
    Orientation([f32; 4]),
}

/// Everything a sensor handle can report after subscription.
#[derive(Debug, Clone, PartialEq)]
pub enum SensorEvent {
    Reading(SensorReading),
    /// Platform-reported fault after start. `name` is the platform error name.
    Error { name: String },
}

/// Lifecycle of the controller's sensing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SensingState {
    #[default]
    Disabled,
    /// A start sequence is outstanding.
    Starting,
    Active,
    /// The last start failed or the live sensor faulted.
    Error,
}

/// Permission prompt outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}
