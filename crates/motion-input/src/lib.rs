pub mod commands;

use motion_config::Mode;

/// A user request coming from the viewer's controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerAction {
    /// Enable or disable sensing.
    ToggleSensing,
    /// Select a sensing mode.
    SelectMode(Mode),
    /// Zero the orientation and return the camera home.
    Reset,
    /// Orbit the camera by (yaw, pitch) radians.
    Orbit(f32, f32),
    /// Print the current status and readout.
    ShowStatus,
    Help,
    Quit,
}
