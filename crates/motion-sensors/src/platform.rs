use crate::types::{Mode, Permission, SensorEvent};
use futures::future::BoxFuture;
use thiserror::Error;
use tokio::sync::mpsc;

/// Channel on which a handle delivers readings and faults.
pub type EventReceiver = mpsc::UnboundedReceiver<SensorEvent>;

/// Why a sensor could not be started, or stopped working.
///
/// None of these are fatal; they end up as status text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SensorError {
    #[error("sensor not supported on this platform")]
    Unsupported,
    #[error("permission to read motion data was denied")]
    PermissionDenied,
    /// Construction or start of the platform sensor failed.
    #[error("sensor acquisition failed: {0}")]
    Acquisition(String),
    /// The platform reported an error after a successful start.
    #[error("sensor fault: {0}")]
    Runtime(String),
}

impl SensorError {
    /// Suffix used in `"<mode>: <text>"` status strings.
    pub fn status_text(&self) -> &str {
        match self {
            SensorError::Unsupported => "not supported",
            SensorError::PermissionDenied => "permission denied",
            SensorError::Acquisition(name) | SensorError::Runtime(name) => name,
        }
    }
}

/// Platform motion sensing capabilities.
pub trait SensorPlatform: Send + Sync + 'static {
    /// Whether the sensor backing `mode` exists at all.
    fn supported(&self, mode: Mode) -> bool;

    /// Whether motion data sits behind a user permission prompt.
    fn requires_permission(&self, _mode: Mode) -> bool {
        false
    }

    /// Ask the user for motion permission. May stay pending indefinitely.
    fn request_permission(&self, mode: Mode) -> BoxFuture<'static, Permission>;

    /// Construct a sensor sampling at `frequency_hz`. Nothing is delivered until
    /// the handle is subscribed and started.
    fn open(&self, mode: Mode, frequency_hz: f32) -> Result<Box<dyn SensorHandle>, SensorError>;
}

/// A constructed platform sensor.
pub trait SensorHandle: Send {
    /// Channel for readings and runtime faults. Call before [`start`](Self::start).
    fn subscribe(&mut self) -> EventReceiver;

    /// Start sampling. Resolves once the platform confirms or refuses.
    fn start(&mut self) -> BoxFuture<'_, Result<(), SensorError>>;

    /// Stop sampling and release the sensor. Must be idempotent.
    fn stop(&mut self);
}
