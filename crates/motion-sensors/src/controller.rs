use crate::adapter::SensorAdapter;
use crate::platform::{SensorError, SensorPlatform};
use crate::state::OrientationState;
use crate::status::{SensorStatus, StatusKind};
use crate::types::{Mode, SensingState};
use glam::{Quat, Vec3};
use motion_config::SensorConfig;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::oneshot::error::TryRecvError;
use tokio::sync::{oneshot, watch};
use tracing::{debug, info, warn};

/// Anything whose rotation the controller can drive, typically the loaded model.
pub trait OrientationTarget {
    /// Per-axis rotation in radians.
    fn set_rotation(&mut self, euler: Vec3);
    /// Orientation as a unit quaternion.
    fn set_orientation(&mut self, orientation: Quat);
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControllerError {
    /// Another lifecycle transition has not finished yet.
    #[error("a sensor start is still pending")]
    TransitionPending,
}

type StartResult = Result<SensorAdapter, SensorError>;

struct PendingStart {
    mode: Mode,
    result_rx: oneshot::Receiver<StartResult>,
}

/// Sensing state machine.
///
/// Owns the selected mode, the live sensor adapter and all rotation state.
/// At most one start sequence is outstanding at a time; while it is,
/// [`toggle`](Self::toggle) and [`switch_mode`](Self::switch_mode) are rejected.
///
/// Starting a sensor spawns a task, so lifecycle operations must run inside
/// a Tokio runtime.
pub struct OrientationController {
    platform: Arc<dyn SensorPlatform>,
    frequency_hz: f32,
    mode: Mode,
    state: SensingState,
    orientation: OrientationState,
    adapter: Option<SensorAdapter>,
    pending: Option<PendingStart>,
    status_tx: watch::Sender<SensorStatus>,
}

impl OrientationController {
    pub fn new(platform: Arc<dyn SensorPlatform>, config: &SensorConfig) -> Self {
        let mode = config.initial_mode;
        let (status_tx, _) = watch::channel(SensorStatus::new(mode, StatusKind::Standby));
        Self {
            platform,
            frequency_hz: config.frequency_hz,
            mode,
            state: SensingState::Disabled,
            orientation: OrientationState::new(config),
            adapter: None,
            pending: None,
            status_tx,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> SensingState {
        self.state
    }

    /// Whether sensing is on, i.e. a sensor is live.
    pub fn is_enabled(&self) -> bool {
        self.state == SensingState::Active
    }

    pub fn has_live_sensor(&self) -> bool {
        self.adapter.is_some()
    }

    pub fn accumulated(&self) -> Vec3 {
        self.orientation.accumulator.angles()
    }

    pub fn smoothed(&self) -> Quat {
        self.orientation.smoother.current()
    }

    pub fn target_orientation(&self) -> Quat {
        self.orientation.smoother.target()
    }

    /// Last reading in display form.
    pub fn readout(&self) -> Vec3 {
        self.orientation.readout
    }

    pub fn status(&self) -> SensorStatus {
        self.status_tx.borrow().clone()
    }

    /// Receiver that observes every status change.
    pub fn subscribe_status(&self) -> watch::Receiver<SensorStatus> {
        self.status_tx.subscribe()
    }

    /// Enable sensing if it is off or failed, disable it if it is on.
    pub fn toggle(&mut self) -> Result<(), ControllerError> {
        match self.state {
            SensingState::Starting => Err(ControllerError::TransitionPending),
            SensingState::Active => {
                self.stop_adapter();
                self.state = SensingState::Disabled;
                self.publish(StatusKind::Paused);
                Ok(())
            }
            SensingState::Disabled | SensingState::Error => {
                self.begin_start();
                Ok(())
            }
        }
    }

    /// Select another sensing mode.
    ///
    /// Stops the live sensor and resets all rotation state. If sensing was on,
    /// it is started again for the new mode.
    pub fn switch_mode(&mut self, mode: Mode) -> Result<(), ControllerError> {
        if mode == self.mode {
            return Ok(());
        }
        if self.state == SensingState::Starting {
            return Err(ControllerError::TransitionPending);
        }

        let was_enabled = self.is_enabled();
        self.stop_adapter();
        self.state = SensingState::Disabled;
        self.orientation.reset();
        self.mode = mode;
        info!(%mode, was_enabled, "Sensing mode switched");

        if was_enabled {
            self.begin_start();
        } else {
            self.publish(StatusKind::Standby);
        }
        Ok(())
    }

    /// Pick up a finished start and apply all queued sensor events.
    ///
    /// Call once per frame before [`apply`](Self::apply).
    pub fn poll_events(&mut self) {
        if let Some(pending) = &mut self.pending {
            match pending.result_rx.try_recv() {
                Ok(result) => {
                    self.pending = None;
                    self.finish_start(result);
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Closed) => {
                    self.pending = None;
                    self.fail(SensorError::Acquisition("StartAborted".into()));
                }
            }
        }

        if let Some(adapter) = &mut self.adapter {
            if let Err(fault) = adapter.drain(&mut self.orientation) {
                self.stop_adapter();
                self.fail(fault);
            }
        }
    }

    /// Wait for an outstanding start to finish, then process queued events.
    pub async fn settle(&mut self) {
        if let Some(pending) = self.pending.take() {
            let result = pending
                .result_rx
                .await
                .unwrap_or_else(|_| Err(SensorError::Acquisition("StartAborted".into())));
            self.finish_start(result);
        }
        self.poll_events();
    }

    /// Drive `target` from the current rotation state. Call once per frame.
    ///
    /// Does nothing without a target or while sensing is not active.
    pub fn apply<T: OrientationTarget + ?Sized>(&mut self, target: Option<&mut T>) {
        let Some(target) = target else {
            return;
        };
        if self.state != SensingState::Active {
            return;
        }
        match self.mode {
            Mode::AngularVelocity => target.set_rotation(self.orientation.accumulator.angles()),
            Mode::AbsoluteOrientation => target.set_orientation(self.orientation.smoother.advance()),
        }
    }

    /// Zero all rotation state and put `target` back at identity.
    ///
    /// Valid in every state; sensing stays as it is.
    pub fn reset<T: OrientationTarget + ?Sized>(&mut self, target: Option<&mut T>) {
        self.orientation.reset();
        if let Some(target) = target {
            target.set_rotation(Vec3::ZERO);
            target.set_orientation(Quat::IDENTITY);
        }
        debug!(mode = %self.mode, state = ?self.state, "Orientation reset");
    }

    /// Abandon any pending start and stop the live sensor.
    ///
    /// A start that resolves later stops its own sensor. Publishes `paused`
    /// if sensing was active and `standby` if a start was abandoned.
    pub fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(mode = %pending.mode, "Abandoning pending sensor start");
        }
        self.stop_adapter();
        match self.state {
            SensingState::Active => {
                self.state = SensingState::Disabled;
                self.publish(StatusKind::Paused);
            }
            SensingState::Starting => {
                self.state = SensingState::Disabled;
                self.publish(StatusKind::Standby);
            }
            SensingState::Disabled | SensingState::Error => {}
        }
    }

    fn begin_start(&mut self) {
        let mode = self.mode;
        if !self.platform.supported(mode) {
            self.fail(SensorError::Unsupported);
            return;
        }

        self.state = SensingState::Starting;
        let (result_tx, result_rx) = oneshot::channel();
        let platform = Arc::clone(&self.platform);
        let frequency_hz = self.frequency_hz;
        tokio::spawn(async move {
            let result = SensorAdapter::start(platform, mode, frequency_hz).await;
            if let Err(Ok(adapter)) = result_tx.send(result) {
                debug!(%mode, "Start finished after cancellation, releasing sensor");
                adapter.stop();
            }
        });
        self.pending = Some(PendingStart { mode, result_rx });
        debug!(%mode, "Sensor start requested");
    }

    fn finish_start(&mut self, result: StartResult) {
        match result {
            Ok(adapter) => {
                self.adapter = Some(adapter);
                self.state = SensingState::Active;
                self.publish(StatusKind::Active);
                info!(mode = %self.mode, "Sensing active");
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: SensorError) {
        warn!(mode = %self.mode, %error, "Sensing unavailable");
        self.state = SensingState::Error;
        self.publish(StatusKind::Failed(error));
    }

    fn stop_adapter(&mut self) {
        if let Some(adapter) = self.adapter.take() {
            adapter.stop();
        }
    }

    fn publish(&self, kind: StatusKind) {
        self.status_tx.send_replace(SensorStatus::new(self.mode, kind));
    }
}
