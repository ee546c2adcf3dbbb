use crate::platform::SensorError;
use crate::types::Mode;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    /// Mode selected, sensing not enabled.
    Standby,
    Active,
    /// Sensing turned off by the user.
    Paused,
    Failed(SensorError),
}

/// Human-readable sensing status, rendered as `"<mode>: <state>"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorStatus {
    pub mode: Mode,
    pub kind: StatusKind,
}

impl SensorStatus {
    pub fn new(mode: Mode, kind: StatusKind) -> Self {
        Self { mode, kind }
    }
}

impl fmt::Display for SensorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match &self.kind {
            StatusKind::Standby => "standby",
            StatusKind::Active => "active",
            StatusKind::Paused => "paused",
            StatusKind::Failed(error) => error.status_text(),
        };
        write!(f, "{}: {}", self.mode, text)
    }
}
