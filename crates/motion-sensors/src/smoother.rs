use glam::Quat;
use tracing::debug;

/// Squared length below which a quaternion cannot be normalized.
const MIN_LENGTH_SQUARED: f32 = 1e-12;

/// Chases the latest absolute orientation with per-frame slerp.
///
/// `current` and `target` are always unit length. Sensor readings only
/// overwrite the target; the frame loop calls [`advance`](Self::advance),
/// so the visual response is independent of the sensor sampling rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationSmoother {
    current: Quat,
    target: Quat,
    /// Fraction of the remaining arc covered per `advance`.
    factor: f32,
}

impl OrientationSmoother {
    /// `factor` is clamped to `0..=1`. A non-finite factor snaps to the target.
    pub fn new(factor: f32) -> Self {
        Self {
            current: Quat::IDENTITY,
            target: Quat::IDENTITY,
            factor: if factor.is_finite() { factor.clamp(0.0, 1.0) } else { 1.0 },
        }
    }

    /// Replace the target with the normalized `orientation`.
    ///
    /// Returns `false` and keeps the previous target if `orientation` is
    /// degenerate (non-finite or zero length).
    pub fn set_target(&mut self, orientation: Quat) -> bool {
        let length_squared = orientation.length_squared();
        if !orientation.is_finite() || length_squared < MIN_LENGTH_SQUARED {
            debug!(?orientation, "Ignoring degenerate orientation reading");
            return false;
        }
        self.target = orientation / length_squared.sqrt();
        true
    }

    /// Move `current` along the shortest arc toward `target` and return it.
    pub fn advance(&mut self) -> Quat {
        self.current = self.current.slerp(self.target, self.factor).normalize();
        self.current
    }

    pub fn current(&self) -> Quat {
        self.current
    }

    pub fn target(&self) -> Quat {
        self.target
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn reset(&mut self) {
        self.current = Quat::IDENTITY;
        self.target = Quat::IDENTITY;
    }
}
