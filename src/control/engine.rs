//! Per-tick translation of a gamepad sample into camera commands
//!
//! [`Controller::step`] runs the work of one tick in a fixed order:
//!
//! 1. Discrete controls (camera select, D-pad speed and deadzone, zoom speed)
//! 2. Pan/tilt move or stop
//! 3. Focus drive, sent every tick
//! 4. One-push autofocus, debounced
//! 5. Zoom, only when the hysteresis or the repeat timer says so
//!
//! Nothing here touches the network or the display; the runner delivers the
//! returned [`Tick`].

use tokio::time::Instant;
use tracing::{debug, info};

use super::debounce::{Debouncer, DiscreteControl};
use super::state::ControlState;
use super::zoom::{combine_triggers, ZoomTuning};
use crate::config::ControlConfig;
use crate::controller::{ControlLayout, InputSample};
use crate::visca::{
    encode_autofocus_trigger, encode_focus, encode_move, encode_stop, encode_zoom, Command,
    FocusDirection,
};

/// Something the operator changed this tick
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// New active camera index (0-based)
    CameraSwitched(usize),
    MaxSpeedChanged(u8),
    DeadzoneChanged(f32),
    ZoomSpeedChanged(u8),
}

/// Result of one tick: commands for `camera`, in send order
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    /// Camera the commands are addressed to, after any switch this tick
    pub camera: usize,
    pub commands: Vec<Command>,
    pub events: Vec<ControlEvent>,
}

/// Input-to-command translation, one call per tick.
///
/// Holds no I/O; the caller supplies the sample and the clock, and
/// delivers the returned commands.
#[derive(Debug, Clone)]
pub struct Controller {
    config: ControlConfig,
    layout: ControlLayout,
    zoom: ZoomTuning,
    state: ControlState,
    debouncer: Debouncer,
    camera_count: usize,
}

impl Controller {
    /// Creates a controller for `camera_count` cameras (at least one), starting on camera 0
    pub fn new(config: ControlConfig, layout: ControlLayout, camera_count: usize) -> Self {
        Self {
            zoom: ZoomTuning::from(&config),
            state: ControlState::new(&config),
            debouncer: Debouncer::new(config.debounce()),
            camera_count: camera_count.max(1),
            config,
            layout,
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    /// Index of the camera currently under control
    pub fn camera_index(&self) -> usize {
        self.state.camera_index
    }

    /// Processes one sample taken at `now`.
    ///
    /// Always yields a pan/tilt and a focus command; autofocus and zoom are
    /// appended only when due.
    pub fn step(&mut self, sample: &InputSample, now: Instant) -> Tick {
        let mut events = Vec::new();
        self.apply_discrete_controls(sample, now, &mut events);

        let mut commands = Vec::with_capacity(4);
        commands.push(self.pan_tilt(sample));
        commands.push(self.focus(sample));

        if self
            .debouncer
            .fire(DiscreteControl::Autofocus, sample.pressed(self.layout.autofocus), now)
        {
            info!("One-push autofocus on CAM {}", self.state.camera_index + 1);
            commands.push(encode_autofocus_trigger());
        }

        if let Some(zoom) = self.zoom(sample, now) {
            commands.push(zoom);
        }

        for command in &commands {
            debug!("CAM {} <- {}", self.state.camera_index + 1, command);
        }

        Tick {
            camera: self.state.camera_index,
            commands,
            events,
        }
    }

    fn apply_discrete_controls(
        &mut self,
        sample: &InputSample,
        now: Instant,
        events: &mut Vec<ControlEvent>,
    ) {
        let layout = &self.layout;
        let config = &self.config;

        if self.debouncer.fire(
            DiscreteControl::CameraSelect,
            sample.pressed(layout.camera_select),
            now,
        ) {
            self.state.camera_index = (self.state.camera_index + 1) % self.camera_count;
            info!("Control switched to CAM {}", self.state.camera_index + 1);
            events.push(ControlEvent::CameraSwitched(self.state.camera_index));
        }

        let hat = sample.hat();
        if self
            .debouncer
            .fire(DiscreteControl::MaxSpeed, hat.y != 0, now)
        {
            self.state.adjust_max_speed(hat.y, config.max_speed);
            events.push(ControlEvent::MaxSpeedChanged(self.state.max_speed));
        }

        if self
            .debouncer
            .fire(DiscreteControl::Deadzone, hat.x != 0, now)
        {
            self.state.adjust_deadzone(
                f32::from(hat.x) * config.deadzone_step,
                config.deadzone_min,
                config.deadzone_max,
            );
            events.push(ControlEvent::DeadzoneChanged(self.state.deadzone));
        }

        let zoom_delta = if sample.pressed(layout.zoom_speed_up) {
            1
        } else if sample.pressed(layout.zoom_speed_down) {
            -1
        } else {
            0
        };
        if self
            .debouncer
            .fire(DiscreteControl::ZoomSpeed, zoom_delta != 0, now)
        {
            self.state
                .adjust_zoom_speed(zoom_delta, config.max_zoom_speed);
            events.push(ControlEvent::ZoomSpeedChanged(self.state.zoom_speed));
        }
    }

    /// Move when either axis leaves the deadzone, otherwise an explicit stop
    fn pan_tilt(&self, sample: &InputSample) -> Command {
        let pan = sample.axis(self.layout.pan_axis);
        let tilt = sample.axis(self.layout.tilt_axis) * self.layout.tilt_sign();
        let deadzone = self.state.deadzone;

        if pan.abs() > deadzone || tilt.abs() > deadzone {
            encode_move(pan, tilt, deadzone, self.state.max_speed)
        } else {
            encode_stop()
        }
    }

    fn focus(&self, sample: &InputSample) -> Command {
        let value = sample.axis(self.layout.focus_axis) * self.layout.focus_sign();
        let deadzone = self.config.focus_deadzone;

        let direction = if value > deadzone {
            FocusDirection::Far
        } else if value < -deadzone {
            FocusDirection::Near
        } else {
            FocusDirection::Stopped
        };
        encode_focus(direction)
    }

    fn zoom(&mut self, sample: &InputSample, now: Instant) -> Option<Command> {
        let z = combine_triggers(
            sample.axis(self.layout.zoom_tele_axis),
            sample.axis(self.layout.zoom_wide_axis),
        );
        let direction = self.zoom.resolve(z, &mut self.state);

        if !self.zoom.send_due(direction, &self.state, now) {
            return None;
        }

        if direction != self.state.last_zoom_direction {
            info!("Zoom {:?} at speed {}", direction, self.state.zoom_speed);
        }
        self.state.record_zoom_sent(direction, now);
        Some(encode_zoom(direction, self.state.zoom_speed))
    }
}
