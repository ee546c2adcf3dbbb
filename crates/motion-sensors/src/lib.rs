//! Device-motion orientation tracking.
//!
//! Turns gyroscope or absolute-orientation readings into a rotation for a
//! rendered model. [`OrientationController`] owns the sensing lifecycle
//! and applies the current rotation once per frame.

pub mod accumulator;
pub mod adapter;
pub mod controller;
pub mod platform;
pub mod sim;
pub mod smoother;
pub mod state;
pub mod status;
pub mod types;

pub use accumulator::RotationAccumulator;
pub use adapter::SensorAdapter;
pub use controller::{ControllerError, OrientationController, OrientationTarget};
pub use platform::{EventReceiver, SensorError, SensorHandle, SensorPlatform};
pub use sim::SimulatedPlatform;
pub use smoother::OrientationSmoother;
pub use status::{SensorStatus, StatusKind};
pub use types::{Mode, Permission, SensingState, SensorEvent, SensorReading};
