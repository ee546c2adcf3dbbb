use crate::platform::{EventReceiver, SensorError, SensorHandle, SensorPlatform};
use crate::state::OrientationState;
use crate::types::{Mode, Permission, SensorEvent, SensorReading};
use glam::Quat;
use std::sync::Arc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, trace};

/// A started platform sensor and its event channel. Stops the sensor on drop.
pub struct LiveSensor {
    handle: Box<dyn SensorHandle>,
    events: EventReceiver,
}

impl Drop for LiveSensor {
    fn drop(&mut self) {
        self.handle.stop();
    }
}

/// Binding of one sensing mode to a live platform sensor.
pub enum SensorAdapter {
    /// Feeds gyroscope readings into the rotation accumulator.
    AngularVelocity(LiveSensor),
    /// Feeds absolute quaternions into the orientation smoother.
    AbsoluteOrientation(LiveSensor),
}

impl SensorAdapter {
    /// Acquire and start the platform sensor for `mode`.
    ///
    /// The absolute variant asks for motion permission first when the
    /// platform requires it.
    pub async fn start(
        platform: Arc<dyn SensorPlatform>,
        mode: Mode,
        frequency_hz: f32,
    ) -> Result<Self, SensorError> {
        if !platform.supported(mode) {
            return Err(SensorError::Unsupported);
        }

        if mode == Mode::AbsoluteOrientation && platform.requires_permission(mode) {
            debug!(%mode, "Requesting motion permission");
            if platform.request_permission(mode).await != Permission::Granted {
                return Err(SensorError::PermissionDenied);
            }
        }

        let mut handle = platform.open(mode, frequency_hz)?;
        let events = handle.subscribe();
        let started = handle.start().await;
        if let Err(e) = started {
            handle.stop();
            return Err(e);
        }

        info!(%mode, frequency_hz, "Sensor started");
        let live = LiveSensor { handle, events };
        Ok(match mode {
            Mode::AngularVelocity => SensorAdapter::AngularVelocity(live),
            Mode::AbsoluteOrientation => SensorAdapter::AbsoluteOrientation(live),
        })
    }

    pub fn mode(&self) -> Mode {
        match self {
            SensorAdapter::AngularVelocity(_) => Mode::AngularVelocity,
            SensorAdapter::AbsoluteOrientation(_) => Mode::AbsoluteOrientation,
        }
    }

    /// Stop the platform sensor and release it.
    pub fn stop(self) {
        debug!(mode = %self.mode(), "Sensor stopped");
    }

    /// Apply every queued reading to `state`.
    ///
    /// Returns the number of readings applied, or the runtime fault that
    /// ended the stream. Readings queued before a fault are still applied.
    pub fn drain(&mut self, state: &mut OrientationState) -> Result<usize, SensorError> {
        let mut applied = 0;
        loop {
            let event = match self.live_mut().events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Empty) => return Ok(applied),
                Err(TryRecvError::Disconnected) => {
                    return Err(SensorError::Runtime("Disconnected".into()));
                }
            };
            match event {
                SensorEvent::Reading(reading) => {
                    if self.on_reading(reading, state) {
                        applied += 1;
                    }
                }
                SensorEvent::Error { name } => return Err(SensorError::Runtime(name)),
            }
        }
    }

    fn on_reading(&self, reading: SensorReading, state: &mut OrientationState) -> bool {
        match (self, reading) {
            (SensorAdapter::AngularVelocity(_), SensorReading::AngularVelocity(velocity)) => {
                state.integrate(velocity);
                true
            }
            (SensorAdapter::AbsoluteOrientation(_), SensorReading::Orientation(xyzw)) => {
                state.observe(Quat::from_array(xyzw));
                true
            }
            (adapter, reading) => {
                trace!(mode = %adapter.mode(), ?reading, "Dropping reading of the wrong kind");
                false
            }
        }
    }

    fn live_mut(&mut self) -> &mut LiveSensor {
        match self {
            SensorAdapter::AngularVelocity(live) | SensorAdapter::AbsoluteOrientation(live) => live,
        }
    }
}
