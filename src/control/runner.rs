//! Control loop lifecycle using a statum state machine
//!
//! ```text
//!          device found
//!   WaitingForDevice ──────────▶ Driving
//!          ▲                        │
//!          └────────────────────────┘
//!            device lost (one stop sent)
//! ```
//!
//! Both states watch the cancellation token. Cancelling while driving sends
//! a final pan/tilt stop to the active camera before returning.

use statum::{machine, state};
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::engine::{ControlEvent, Controller};
use crate::camera::{CameraTargets, CommandTransport};
use crate::controller::{is_wireless, InputSource};
use crate::display::StatusDisplay;
use crate::visca::{encode_stop, Command};

const UNKNOWN_DEVICE: &str = "Unknown controller";

#[derive(Debug, thiserror::Error)]
pub enum LoopError {
    #[error("Control loop cancelled")]
    Cancelled,
}

#[state]
#[derive(Debug, Clone)]
pub enum LoopState {
    WaitingForDevice, // No gamepad, polling for one
    Driving,          // Sampling every tick and sending commands
}

#[machine]
pub struct ControlLoop<S: LoopState> {
    controller: Controller,
    targets: CameraTargets,
    input: Box<dyn InputSource>,
    transport: Box<dyn CommandTransport>,
    display: Box<dyn StatusDisplay>,
    cancel: CancellationToken,
    wireless: bool,
}

impl<S: LoopState> ControlLoop<S> {
    pub fn camera_index(&self) -> usize {
        self.controller.camera_index()
    }

    fn show_active_camera(&mut self) {
        let index = self.controller.camera_index();
        self.display
            .camera_active(index, &self.targets.get(index).host);
    }

    /// Sends one command to camera `camera`; failures are reported, never raised
    async fn send(&mut self, camera: usize, command: &Command) {
        let target = self.targets.get(camera);
        if let Err(e) = self.transport.send(target, command).await {
            warn!("Failed to send {} to {}: {}", command.action(), target, e);
            self.display.error("Socket send failed");
        }
    }

    async fn send_stop(&mut self) {
        let camera = self.controller.camera_index();
        self.send(camera, &encode_stop()).await;
    }
}

impl ControlLoop<WaitingForDevice> {
    pub fn create(
        controller: Controller,
        targets: CameraTargets,
        input: Box<dyn InputSource>,
        transport: Box<dyn CommandTransport>,
        display: Box<dyn StatusDisplay>,
        cancel: CancellationToken,
    ) -> Self {
        info!("Creating control loop for {} camera(s)", targets.len());
        Self::new(controller, targets, input, transport, display, cancel, false)
    }

    /// Polls until a gamepad shows up and transitions to Driving
    pub async fn wait_for_device(mut self) -> Result<ControlLoop<Driving>, LoopError> {
        info!("Waiting for joystick connection");
        self.display.joystick_waiting();
        let poll = self.controller.config().device_poll();

        loop {
            if self.cancel.is_cancelled() {
                return Err(LoopError::Cancelled);
            }

            self.input.refresh();
            if self.input.device_count() > 0 {
                break;
            }

            debug!("No joystick yet, polling again in {:?}", poll);
            self.display.joystick_waiting();
            tokio::select! {
                _ = self.cancel.cancelled() => return Err(LoopError::Cancelled),
                _ = sleep(poll) => {}
            }
        }

        let name = self
            .input
            .device_name()
            .unwrap_or_else(|| UNKNOWN_DEVICE.to_string());
        info!("Joystick connected: {}", name);
        self.display.joystick_connected(&name);

        self.wireless = is_wireless(&name);
        if self.wireless {
            info!("Bluetooth link established with {}", name);
            self.display.bluetooth_linked(&name);
        }

        self.show_active_camera();
        Ok(self.transition())
    }

    /// Alternates between waiting and driving until cancelled
    pub async fn run(self) {
        let mut waiting = self;
        let mut announced = false;

        loop {
            let mut driving = match waiting.wait_for_device().await {
                Ok(driving) => driving,
                Err(e) => {
                    info!("{} while waiting for joystick", e);
                    break;
                }
            };

            if !announced {
                driving.display.boot("PTZ bridge ready");
                announced = true;
            }

            waiting = match driving.drive().await {
                Ok(waiting) => waiting,
                Err(e) => {
                    info!("{} while driving", e);
                    break;
                }
            };
        }

        info!("Control loop stopped");
    }
}

impl ControlLoop<Driving> {
    /// Runs one controller step per tick until the device goes away.
    ///
    /// Returns to WaitingForDevice after sending a single pan/tilt stop.
    pub async fn drive(mut self) -> Result<ControlLoop<WaitingForDevice>, LoopError> {
        let mut ticker = interval(self.controller.config().tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    info!("Shutdown requested, stopping CAM {}", self.camera_index() + 1);
                    self.send_stop().await;
                    return Err(LoopError::Cancelled);
                }
                _ = ticker.tick() => {}
            }

            self.input.refresh();
            let sample = if self.input.device_count() > 0 {
                self.input.sample()
            } else {
                None
            };
            let Some(sample) = sample else {
                return Ok(self.device_lost().await);
            };

            let tick = self.controller.step(&sample, Instant::now());
            for event in &tick.events {
                if let ControlEvent::CameraSwitched(_) = event {
                    self.show_active_camera();
                }
            }
            for command in &tick.commands {
                self.send(tick.camera, command).await;
            }
            self.display.refresh();
        }
    }

    async fn device_lost(mut self) -> ControlLoop<WaitingForDevice> {
        warn!("Joystick disconnected");
        self.display.joystick_disconnected();
        if self.wireless {
            warn!("Bluetooth link lost");
            self.display.bluetooth_lost();
            self.wireless = false;
        }
        self.send_stop().await;
        self.transition()
    }
}
