//! Simulated motion platform.
//!
//! Stands in for device sensors during development and in tests. Handles
//! either generate a synthetic signal at the requested frequency from a
//! background task, or stay silent and accept readings pushed through
//! [`SimulatedPlatform::inject`].

use crate::platform::{EventReceiver, SensorError, SensorHandle, SensorPlatform};
use crate::types::{Mode, Permission, SensorEvent, SensorReading};
use futures::future::{self, BoxFuture, FutureExt};
use glam::{Quat, Vec3};
use motion_config::{SimulationConfig, MAX_RATE_HZ, MIN_RATE_HZ};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info};

struct Feed {
    id: u64,
    tx: mpsc::UnboundedSender<SensorEvent>,
}

#[derive(Default)]
struct Shared {
    /// Feed of the most recently subscribed handle per mode.
    feeds: Mutex<HashMap<Mode, Feed>>,
    next_feed: AtomicU64,
    /// Failure name for the next `start`, if any.
    start_failure: Mutex<Option<String>>,
    hold_starts: AtomicBool,
    start_gate: Notify,
    live: AtomicUsize,
    started: AtomicUsize,
    prompts: AtomicUsize,
}

impl Shared {
    fn feed_is_current(&self, mode: Mode, id: u64) -> bool {
        self.feeds.lock().get(&mode).is_some_and(|feed| feed.id == id)
    }
}

/// A [`SensorPlatform`] backed by configuration instead of hardware.
#[derive(Clone)]
pub struct SimulatedPlatform {
    config: SimulationConfig,
    generate: bool,
    shared: Arc<Shared>,
}

impl SimulatedPlatform {
    /// Platform whose sensors emit a synthetic motion signal.
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            config,
            generate: true,
            shared: Arc::default(),
        }
    }

    /// Platform whose sensors only deliver what is passed to [`inject`](Self::inject).
    pub fn manual(config: SimulationConfig) -> Self {
        Self {
            generate: false,
            ..Self::new(config)
        }
    }

    /// Deliver `event` to the subscribed sensor for `mode`.
    /// Returns `false` if nothing is listening.
    pub fn inject(&self, mode: Mode, event: SensorEvent) -> bool {
        self.shared
            .feeds
            .lock()
            .get(&mode)
            .is_some_and(|feed| feed.tx.send(event).is_ok())
    }

    /// Close the event stream of the sensor for `mode`, as if the device
    /// went away while running. Returns `false` if nothing was subscribed.
    pub fn disconnect(&self, mode: Mode) -> bool {
        let removed = self.shared.feeds.lock().remove(&mode).is_some();
        if removed {
            info!(%mode, "Simulated sensor disconnected");
        }
        removed
    }

    /// Make every subsequent `start` wait for [`release_start`](Self::release_start).
    pub fn hold_starts(&self) {
        self.shared.hold_starts.store(true, Ordering::SeqCst);
    }

    /// Let one held `start` proceed.
    pub fn release_start(&self) {
        self.shared.start_gate.notify_one();
    }

    /// Make the next `start` fail with the platform error `name`.
    pub fn fail_next_start(&self, name: &str) {
        *self.shared.start_failure.lock() = Some(name.to_string());
    }

    /// Number of started sensors that have not been stopped.
    pub fn live_sensors(&self) -> usize {
        self.shared.live.load(Ordering::SeqCst)
    }

    /// Number of successful starts since creation.
    pub fn starts(&self) -> usize {
        self.shared.started.load(Ordering::SeqCst)
    }

    /// Number of permission prompts shown.
    pub fn permission_prompts(&self) -> usize {
        self.shared.prompts.load(Ordering::SeqCst)
    }
}

impl SensorPlatform for SimulatedPlatform {
    fn supported(&self, mode: Mode) -> bool {
        match mode {
            Mode::AngularVelocity => self.config.gyroscope,
            Mode::AbsoluteOrientation => self.config.absolute_orientation,
        }
    }

    fn requires_permission(&self, _mode: Mode) -> bool {
        self.config.requires_permission
    }

    fn request_permission(&self, mode: Mode) -> BoxFuture<'static, Permission> {
        let answer = if self.config.grant_permission {
            Permission::Granted
        } else {
            Permission::Denied
        };
        self.shared.prompts.fetch_add(1, Ordering::SeqCst);
        debug!(%mode, ?answer, "Simulated permission prompt");
        future::ready(answer).boxed()
    }

    fn open(&self, mode: Mode, frequency_hz: f32) -> Result<Box<dyn SensorHandle>, SensorError> {
        if !(MIN_RATE_HZ..=MAX_RATE_HZ).contains(&frequency_hz) {
            return Err(SensorError::Acquisition("InvalidFrequency".into()));
        }
        Ok(Box::new(SimulatedSensor {
            mode,
            frequency_hz,
            signal: self.generate.then(|| Signal::from_config(&self.config)),
            shared: Arc::clone(&self.shared),
            feed_id: None,
            tx: None,
            generator: None,
            running: false,
        }))
    }
}

#[derive(Debug, Clone, Copy)]
struct Signal {
    angular_amplitude: f32,
    yaw_rate: f32,
}

impl Signal {
    fn from_config(config: &SimulationConfig) -> Self {
        Self {
            angular_amplitude: config.angular_amplitude,
            yaw_rate: config.yaw_rate,
        }
    }

    fn sample(&self, mode: Mode, t: f32) -> SensorReading {
        match mode {
            Mode::AngularVelocity => {
                let a = self.angular_amplitude;
                SensorReading::AngularVelocity(Vec3::new(
                    a * (t * 0.7).sin(),
                    a * (t * 1.1).cos(),
                    0.5 * a * (t * 0.3).sin(),
                ))
            }
            Mode::AbsoluteOrientation => {
                let q = Quat::from_rotation_y(self.yaw_rate * t)
                    * Quat::from_rotation_x(0.2 * (t * 0.5).sin());
                SensorReading::Orientation(q.to_array())
            }
        }
    }
}

struct SimulatedSensor {
    mode: Mode,
    frequency_hz: f32,
    signal: Option<Signal>,
    shared: Arc<Shared>,
    feed_id: Option<u64>,
    /// Kept until `start` hands it to the generator. The platform holds the
    /// only other sender, so dropping the feed closes the stream.
    tx: Option<mpsc::UnboundedSender<SensorEvent>>,
    generator: Option<JoinHandle<()>>,
    running: bool,
}

impl SensorHandle for SimulatedSensor {
    fn subscribe(&mut self) -> EventReceiver {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.shared.next_feed.fetch_add(1, Ordering::SeqCst);
        self.shared.feeds.lock().insert(
            self.mode,
            Feed {
                id,
                tx: tx.clone(),
            },
        );
        self.feed_id = Some(id);
        self.tx = Some(tx);
        rx
    }

    fn start(&mut self) -> BoxFuture<'_, Result<(), SensorError>> {
        async move {
            if self.shared.hold_starts.load(Ordering::SeqCst) {
                self.shared.start_gate.notified().await;
            }
            let failure = self.shared.start_failure.lock().take();
            if let Some(name) = failure {
                return Err(SensorError::Acquisition(name));
            }

            self.running = true;
            self.shared.live.fetch_add(1, Ordering::SeqCst);
            self.shared.started.fetch_add(1, Ordering::SeqCst);

            let tx = self.tx.take();
            if let (Some(signal), Some(tx), Some(id)) = (self.signal, tx, self.feed_id) {
                self.generator = Some(tokio::spawn(generate(
                    signal,
                    self.mode,
                    self.frequency_hz,
                    Arc::clone(&self.shared),
                    id,
                    tx,
                )));
            }
            info!(mode = %self.mode, "Simulated sensor running");
            Ok(())
        }
        .boxed()
    }

    fn stop(&mut self) {
        if let Some(generator) = self.generator.take() {
            generator.abort();
        }
        self.tx = None;
        if let Some(id) = self.feed_id.take() {
            let mut feeds = self.shared.feeds.lock();
            if feeds.get(&self.mode).is_some_and(|feed| feed.id == id) {
                feeds.remove(&self.mode);
            }
        }
        if self.running {
            self.running = false;
            self.shared.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SimulatedSensor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Background task: emit one synthetic reading per sensor period until the
/// feed is stopped or disconnected.
async fn generate(
    signal: Signal,
    mode: Mode,
    frequency_hz: f32,
    shared: Arc<Shared>,
    feed_id: u64,
    tx: mpsc::UnboundedSender<SensorEvent>,
) {
    let period = Duration::from_secs_f32(1.0 / frequency_hz);
    let mut ticker = tokio::time::interval(period);
    let mut t = 0.0_f32;
    loop {
        ticker.tick().await;
        if !shared.feed_is_current(mode, feed_id) {
            break;
        }
        t += period.as_secs_f32();
        if tx
            .send(SensorEvent::Reading(signal.sample(mode, t)))
            .is_err()
        {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SimulationConfig {
        SimulationConfig {
            absolute_orientation: false,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn support_follows_config() {
        let platform = SimulatedPlatform::manual(config());
        assert!(platform.supported(Mode::AngularVelocity));
        assert!(!platform.supported(Mode::AbsoluteOrientation));
    }

    #[test]
    fn rejects_non_positive_frequency() {
        let platform = SimulatedPlatform::manual(config());
        assert!(matches!(
            platform.open(Mode::AngularVelocity, 0.0),
            Err(SensorError::Acquisition(_))
        ));
    }

    #[tokio::test]
    async fn injected_events_reach_the_subscriber() {
        let platform = SimulatedPlatform::manual(config());
        let mut handle = platform.open(Mode::AngularVelocity, 60.0).unwrap();
        let mut rx = handle.subscribe();
        handle.start().await.unwrap();
        assert_eq!(platform.live_sensors(), 1);

        let reading = SensorEvent::Reading(SensorReading::AngularVelocity(Vec3::X));
        assert!(platform.inject(Mode::AngularVelocity, reading.clone()));
        assert_eq!(rx.recv().await, Some(reading));

        handle.stop();
        handle.stop();
        assert_eq!(platform.live_sensors(), 0);
        assert!(!platform.inject(Mode::AngularVelocity, SensorEvent::Error { name: "x".into() }));
    }

    #[test]
    fn rejects_frequency_above_cap() {
        let platform = SimulatedPlatform::manual(config());
        assert!(matches!(
            platform.open(Mode::AngularVelocity, 1e9),
            Err(SensorError::Acquisition(_))
        ));
        assert!(platform.open(Mode::AngularVelocity, MAX_RATE_HZ).is_ok());
    }

    #[tokio::test]
    async fn disconnect_closes_the_stream() {
        let platform = SimulatedPlatform::manual(config());
        let mut handle = platform.open(Mode::AngularVelocity, 60.0).unwrap();
        let mut rx = handle.subscribe();
        handle.start().await.unwrap();

        assert!(platform.disconnect(Mode::AngularVelocity));
        assert_eq!(rx.recv().await, None);
        assert!(!platform.disconnect(Mode::AngularVelocity));

        handle.stop();
        assert_eq!(platform.live_sensors(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disconnect_ends_the_generator() {
        let platform = SimulatedPlatform::new(SimulationConfig::default());
        let mut handle = platform.open(Mode::AngularVelocity, 50.0).unwrap();
        let mut rx = handle.subscribe();
        handle.start().await.unwrap();
        assert!(rx.recv().await.is_some());

        platform.disconnect(Mode::AngularVelocity);
        while rx.recv().await.is_some() {}
        handle.stop();
    }

    #[tokio::test]
    async fn permission_prompts_are_counted() {
        let platform = SimulatedPlatform::manual(SimulationConfig {
            requires_permission: true,
            ..SimulationConfig::default()
        });
        assert_eq!(platform.permission_prompts(), 0);
        assert_eq!(
            platform.request_permission(Mode::AbsoluteOrientation).await,
            Permission::Granted
        );
        assert_eq!(platform.permission_prompts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn generator_emits_at_sensor_frequency() {
        let platform = SimulatedPlatform::new(SimulationConfig::default());
        let mut handle = platform.open(Mode::AbsoluteOrientation, 50.0).unwrap();
        let mut rx = handle.subscribe();
        handle.start().await.unwrap();

        for _ in 0..3 {
            match rx.recv().await {
                Some(SensorEvent::Reading(SensorReading::Orientation(q))) => {
                    let length = Quat::from_array(q).length();
                    assert!((length - 1.0).abs() < 1e-4);
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
        handle.stop();
    }

    #[tokio::test]
    async fn scripted_start_failure_is_consumed_once() {
        let platform = SimulatedPlatform::manual(config());
        platform.fail_next_start("NotReadableError");

        let mut first = platform.open(Mode::AngularVelocity, 60.0).unwrap();
        let _rx = first.subscribe();
        assert_eq!(
            first.start().await,
            Err(SensorError::Acquisition("NotReadableError".into()))
        );

        let mut second = platform.open(Mode::AngularVelocity, 60.0).unwrap();
        let _rx = second.subscribe();
        assert!(second.start().await.is_ok());
        assert_eq!(platform.starts(), 1);
    }
}
