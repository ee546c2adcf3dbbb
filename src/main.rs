use anyhow::Result;
use glam::Vec3;
use motion_config::AppConfig;
use motion_input::commands::{parse_command, ParseError, HELP};
use motion_input::ViewerAction;
use motion_scene::{Model, Scene};
use motion_sensors::{OrientationController, SimulatedPlatform};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Application state.
struct App {
    config: AppConfig,
    controller: OrientationController,
    scene: Scene,
    frame_count: u64,
}

impl App {
    fn new(mut config: AppConfig) -> Self {
        config.sanitize();
        let platform = Arc::new(SimulatedPlatform::new(config.simulation.clone()));
        let controller = OrientationController::new(platform, &config.sensor);

        let mut scene = Scene::new(&config.viewer);
        scene.load_model(Model::new("unit-cube"), Vec3::splat(-0.5), Vec3::splat(0.5));

        Self {
            config,
            controller,
            scene,
            frame_count: 0,
        }
    }

    /// Frame loop, command input and status output until quit.
    async fn run(&mut self) {
        let period = Duration::from_secs_f32(1.0 / self.config.viewer.frame_rate);
        let mut frames = tokio::time::interval(period);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut status_rx = self.controller.subscribe_status();
        println!("{}", *status_rx.borrow());

        loop {
            tokio::select! {
                _ = frames.tick() => self.frame(),
                line = lines.next_line() => match line {
                    Ok(Some(line)) => match parse_command(&line) {
                        Ok(action) => {
                            if !self.handle_action(action) {
                                break;
                            }
                        }
                        Err(ParseError::Empty) => {}
                        Err(e) => println!("{e}"),
                    },
                    Ok(None) => {
                        info!("Input closed");
                        break;
                    }
                    Err(e) => {
                        error!(?e, "Failed to read input");
                        break;
                    }
                },
                Ok(()) = status_rx.changed() => {
                    println!("{}", *status_rx.borrow_and_update());
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Interrupted");
                    break;
                }
            }
        }
    }

    /// One rendered frame.
    fn frame(&mut self) {
        self.controller.poll_events();
        self.controller.apply(self.scene.model_mut());

        self.frame_count += 1;
        if self.frame_count % 300 == 0 {
            if let (Some(model), Some(mvp)) =
                (&self.scene.model, self.scene.model_view_projection())
            {
                debug!(
                    frames = self.frame_count,
                    rotation = ?model.rotation(),
                    center_ndc = ?mvp.project_point3(Vec3::ZERO),
                    "Render heartbeat"
                );
            }
        }
    }

    /// Returns `false` when the viewer should exit.
    fn handle_action(&mut self, action: ViewerAction) -> bool {
        match action {
            ViewerAction::ToggleSensing => {
                if let Err(e) = self.controller.toggle() {
                    warn!(%e, "Toggle ignored");
                }
            }
            ViewerAction::SelectMode(mode) => {
                if let Err(e) = self.controller.switch_mode(mode) {
                    warn!(%e, %mode, "Mode switch ignored");
                }
            }
            ViewerAction::Reset => {
                self.controller.reset(self.scene.model.as_mut());
                self.scene.reset_view();
            }
            ViewerAction::Orbit(yaw, pitch) => self.scene.camera.orbit(yaw, pitch),
            ViewerAction::ShowStatus => {
                let readout = self.controller.readout();
                println!(
                    "{} | x {:.3} y {:.3} z {:.3}",
                    self.controller.status(),
                    readout.x,
                    readout.y,
                    readout.z
                );
            }
            ViewerAction::Help => println!("{HELP}"),
            ViewerAction::Quit => return false,
        }
        true
    }

    fn shutdown(&mut self) {
        self.controller.shutdown();
        self.config.sensor.initial_mode = self.controller.mode();
        if let Err(e) = motion_config::save_config(&self.config) {
            error!(?e, "Failed to save config");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries status lines and command output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "motion_viewer=info,motion_sensors=info,motion_config=info".into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Motion viewer starting");

    let config = motion_config::load_config().unwrap_or_else(|e| {
        warn!(?e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    info!(
        mode = %config.sensor.initial_mode,
        frequency_hz = config.sensor.frequency_hz,
        "Config loaded"
    );

    let mut app = App::new(config);
    println!("{HELP}");
    app.run().await;
    app.shutdown();

    Ok(())
}
