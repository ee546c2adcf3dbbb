use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Bounds for the sensor frequency and the frame rate, in Hz.
pub const MIN_RATE_HZ: f32 = 0.1;
pub const MAX_RATE_HZ: f32 = 1000.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Sensor sampling and orientation policy.
    pub sensor: SensorConfig,
    /// Simulated motion platform used when no hardware backend is present.
    pub simulation: SimulationConfig,
    /// Frame loop, model fit and camera.
    pub viewer: ViewerConfig,
}

impl AppConfig {
    /// Replace values that would corrupt rotation state or make a timer panic.
    ///
    /// Non-finite or out-of-range fields, and rates below [`MIN_RATE_HZ`],
    /// fall back to their default. Rates above [`MAX_RATE_HZ`] are capped.
    /// Returns `true` if anything changed.
    pub fn sanitize(&mut self) -> bool {
        let sensor = self.sensor.sanitize();
        let viewer = self.viewer.sanitize();
        sensor | viewer
    }
}

/// Sensing strategy driving the model orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    /// Gyroscope angular velocity, integrated per reading.
    #[default]
    #[serde(rename = "gyro")]
    AngularVelocity,
    /// Absolute orientation quaternion, smoothed per frame.
    #[serde(rename = "absolute")]
    AbsoluteOrientation,
}

impl Mode {
    /// Short label used in status strings and on the command line.
    pub fn label(self) -> &'static str {
        match self {
            Mode::AngularVelocity => "gyro",
            Mode::AbsoluteOrientation => "absolute",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "gyro" => Some(Mode::AngularVelocity),
            "absolute" => Some(Mode::AbsoluteOrientation),
            _ => None,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Requested sensor sampling frequency in Hz.
    pub frequency_hz: f32,
    /// Gain applied to every angular velocity reading before accumulation.
    pub sensitivity: f32,
    /// Slerp factor applied once per frame in absolute mode (0..=1).
    pub smoothing_factor: f32,
    /// Mode selected at startup.
    pub initial_mode: Mode,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 60.0,
            sensitivity: 1.5,
            smoothing_factor: 0.15,
            initial_mode: Mode::AngularVelocity,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Whether the platform exposes a gyroscope.
    pub gyroscope: bool,
    /// Whether the platform exposes an absolute orientation sensor.
    pub absolute_orientation: bool,
    /// Whether motion data sits behind a user permission prompt.
    pub requires_permission: bool,
    /// Answer given to the permission prompt.
    pub grant_permission: bool,
    /// Peak simulated angular velocity (rad/s).
    pub angular_amplitude: f32,
    /// Simulated yaw rate for the absolute sensor (rad/s).
    pub yaw_rate: f32,
}

impl SensorConfig {
    /// See [`AppConfig::sanitize`].
    pub fn sanitize(&mut self) -> bool {
        let defaults = Self::default();
        let mut changed = sanitize_rate(
            "sensor.frequency_hz",
            &mut self.frequency_hz,
            defaults.frequency_hz,
        );
        if !self.sensitivity.is_finite() || self.sensitivity < 0.0 {
            warn!(value = self.sensitivity, "Invalid sensor.sensitivity, using default");
            self.sensitivity = defaults.sensitivity;
            changed = true;
        }
        if !(0.0..=1.0).contains(&self.smoothing_factor) {
            warn!(value = self.smoothing_factor, "Invalid sensor.smoothing_factor, using default");
            self.smoothing_factor = defaults.smoothing_factor;
            changed = true;
        }
        changed
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            gyroscope: true,
            absolute_orientation: true,
            requires_permission: false,
            grant_permission: true,
            angular_amplitude: 0.02,
            yaw_rate: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Frame loop cadence in Hz.
    pub frame_rate: f32,
    /// Largest model dimension after fitting, in world units.
    pub fit_size: f32,
    /// Camera distance from the origin at its home position.
    pub camera_distance: f32,
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            fit_size: 20.0,
            camera_distance: 50.0,
            fov_y_degrees: 45.0,
        }
    }
}

impl ViewerConfig {
    /// See [`AppConfig::sanitize`].
    pub fn sanitize(&mut self) -> bool {
        sanitize_rate("viewer.frame_rate", &mut self.frame_rate, Self::default().frame_rate)
    }
}

fn sanitize_rate(field: &str, value: &mut f32, default: f32) -> bool {
    if !value.is_finite() || *value < MIN_RATE_HZ {
        warn!(field, value = *value, "Invalid rate, using default");
        *value = default;
        true
    } else if *value > MAX_RATE_HZ {
        warn!(field, value = *value, max = MAX_RATE_HZ, "Rate too high, capping");
        *value = MAX_RATE_HZ;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = AppConfig::default();
        assert_eq!(config.sensor.frequency_hz, 60.0);
        assert_eq!(config.sensor.sensitivity, 1.5);
        assert_eq!(config.sensor.smoothing_factor, 0.15);
        assert_eq!(config.sensor.initial_mode, Mode::AngularVelocity);
        assert_eq!(config.viewer.camera_distance, 50.0);
    }

    #[test]
    fn toml_round_trip_keeps_mode_label() {
        let mut config = AppConfig::default();
        config.sensor.initial_mode = Mode::AbsoluteOrientation;

        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("initial_mode = \"absolute\""));

        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed.sensor.initial_mode, Mode::AbsoluteOrientation);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let parsed: AppConfig = toml::from_str("[sensor]\nsensitivity = 2.0\n").unwrap();
        assert_eq!(parsed.sensor.sensitivity, 2.0);
        assert_eq!(parsed.sensor.smoothing_factor, 0.15);
        assert!(parsed.simulation.gyroscope);
    }

    #[test]
    fn sanitize_replaces_non_finite_values() {
        let text = "\
[sensor]
smoothing_factor = nan
sensitivity = inf
frequency_hz = 1e9

[viewer]
frame_rate = inf
";
        let mut config: AppConfig = toml::from_str(text).unwrap();
        assert!(config.sensor.smoothing_factor.is_nan());

        assert!(config.sanitize());
        assert_eq!(config.sensor.smoothing_factor, 0.15);
        assert_eq!(config.sensor.sensitivity, 1.5);
        assert_eq!(config.sensor.frequency_hz, MAX_RATE_HZ);
        assert_eq!(config.viewer.frame_rate, 60.0);
    }

    #[test]
    fn sanitize_keeps_valid_values() {
        let mut config = AppConfig::default();
        config.sensor.sensitivity = 0.0;
        config.sensor.smoothing_factor = 1.0;
        config.viewer.frame_rate = 144.0;
        assert!(!config.sanitize());
        assert_eq!(config.sensor.sensitivity, 0.0);
        assert_eq!(config.sensor.smoothing_factor, 1.0);
        assert_eq!(config.viewer.frame_rate, 144.0);
    }

    #[test]
    fn sanitize_rejects_negative_and_out_of_range() {
        let mut config = AppConfig::default();
        config.sensor.sensitivity = -2.0;
        config.sensor.smoothing_factor = 1.5;
        config.sensor.frequency_hz = 0.0;
        config.viewer.frame_rate = 1e-30;
        assert!(config.sanitize());
        assert_eq!(config.sensor.sensitivity, 1.5);
        assert_eq!(config.sensor.smoothing_factor, 0.15);
        assert_eq!(config.sensor.frequency_hz, 60.0);
        assert_eq!(config.viewer.frame_rate, 60.0);
    }

    #[test]
    fn mode_labels() {
        assert_eq!(Mode::from_label("gyro"), Some(Mode::AngularVelocity));
        assert_eq!(Mode::from_label("absolute"), Some(Mode::AbsoluteOrientation));
        assert_eq!(Mode::from_label("compass"), None);
        assert_eq!(Mode::AbsoluteOrientation.to_string(), "absolute");
    }
}
