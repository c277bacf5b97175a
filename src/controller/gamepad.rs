//! gilrs gamepad source
//!
//! This module handles:
//! - Initialising gilrs and picking the first connected gamepad
//! - Following connect/disconnect events between ticks
//! - Reading sticks, triggers, buttons and the D-pad into an [`InputSample`]

use gilrs::{Axis, Button, Event, EventType, Gamepad, GamepadId, Gilrs};
use tracing::{debug, error, info, warn};

use super::input::{AxisId, ButtonId, Hat, InputError, InputSample, InputSource};

const BUTTONS: [(Button, ButtonId); 11] = [
    (Button::South, ButtonId::South),
    (Button::East, ButtonId::East),
    (Button::North, ButtonId::North),
    (Button::West, ButtonId::West),
    (Button::LeftTrigger, ButtonId::LeftBumper),
    (Button::RightTrigger, ButtonId::RightBumper),
    (Button::LeftThumb, ButtonId::LeftStick),
    (Button::RightThumb, ButtonId::RightStick),
    (Button::Start, ButtonId::Start),
    (Button::Select, ButtonId::Select),
    (Button::Mode, ButtonId::Guide),
];

/// Gamepad source backed by gilrs
///
/// Follows the first connected gamepad. When it disconnects, the next
/// connected one (if any) is picked up on the following refresh.
pub struct GilrsInput {
    gilrs: Gilrs,
    active_gamepad: Option<GamepadId>,
}

impl GilrsInput {
    pub fn new() -> Result<Self, InputError> {
        info!("Initializing gilrs controller interface");
        let gilrs = match Gilrs::new() {
            Ok(g) => {
                info!("Successfully initialized gilrs");
                g
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                return Err(InputError::InitializationError(e.to_string()));
            }
        };

        let mut input = Self {
            gilrs,
            active_gamepad: None,
        };
        input.select_gamepad();
        Ok(input)
    }

    fn select_gamepad(&mut self) {
        if let Some(id) = self.active_gamepad {
            if self.gilrs.connected_gamepad(id).is_some() {
                return;
            }
            self.active_gamepad = None;
        }

        let gamepads: Vec<(GamepadId, Gamepad<'_>)> = self.gilrs.gamepads().collect();
        if gamepads.is_empty() {
            return;
        }

        info!("Found {} gamepads:", gamepads.len());
        for (idx, (id, gamepad)) in gamepads.iter().enumerate() {
            info!("  [{}] ID: {}, Name: {}", idx, id, gamepad.name());
        }
        let (id, gamepad) = &gamepads[0];
        info!("Selected gamepad: {} ({})", gamepad.name(), id);
        self.active_gamepad = Some(*id);
    }
}

impl InputSource for GilrsInput {
    fn refresh(&mut self) {
        while let Some(Event { id, event, .. }) = self.gilrs.next_event() {
            match event {
                EventType::Connected => info!("Controller connected event detected: {}", id),
                EventType::Disconnected => {
                    warn!("Controller disconnected event detected: {}", id);
                    if self.active_gamepad == Some(id) {
                        self.active_gamepad = None;
                    }
                }
                _ => {}
            }
        }
        self.select_gamepad();
    }

    fn device_count(&self) -> usize {
        self.gilrs.gamepads().count()
    }

    fn device_name(&self) -> Option<String> {
        let id = self.active_gamepad?;
        self.gilrs
            .connected_gamepad(id)
            .map(|gamepad| gamepad.name().to_string())
    }

    fn sample(&mut self) -> Option<InputSample> {
        let id = self.active_gamepad?;
        let gamepad = self.gilrs.connected_gamepad(id)?;
        let sample = read_sample(&gamepad);
        debug!("Sampled gamepad {}: {:?}", id, sample);
        Some(sample)
    }
}

fn read_sample(gamepad: &Gamepad<'_>) -> InputSample {
    let mut sample = InputSample::default();

    // gilrs reports stick Y up-positive
    sample.set_axis(AxisId::LeftStickX, gamepad.value(Axis::LeftStickX));
    sample.set_axis(AxisId::LeftStickY, -gamepad.value(Axis::LeftStickY));
    sample.set_axis(AxisId::RightStickX, gamepad.value(Axis::RightStickX));
    sample.set_axis(AxisId::RightStickY, -gamepad.value(Axis::RightStickY));
    sample.set_axis(
        AxisId::LeftTrigger,
        trigger(gamepad, Axis::LeftZ, Button::LeftTrigger2),
    );
    sample.set_axis(
        AxisId::RightTrigger,
        trigger(gamepad, Axis::RightZ, Button::RightTrigger2),
    );

    for (button, id) in BUTTONS {
        sample.set_button(id, gamepad.is_pressed(button));
    }

    sample.set_hat(read_hat(gamepad));
    sample
}

/// Trigger position in -1.0..=1.0, from the analog axis when the pad has one
fn trigger(gamepad: &Gamepad<'_>, axis: Axis, button: Button) -> f32 {
    if let Some(data) = gamepad.axis_data(axis) {
        return data.value();
    }
    gamepad
        .button_data(button)
        .map(|data| data.value() * 2.0 - 1.0)
        .unwrap_or(-1.0)
}

fn read_hat(gamepad: &Gamepad<'_>) -> Hat {
    let x = if gamepad.is_pressed(Button::DPadRight) {
        1
    } else if gamepad.is_pressed(Button::DPadLeft) {
        -1
    } else {
        axis_sign(gamepad.value(Axis::DPadX))
    };
    let y = if gamepad.is_pressed(Button::DPadUp) {
        1
    } else if gamepad.is_pressed(Button::DPadDown) {
        -1
    } else {
        axis_sign(gamepad.value(Axis::DPadY))
    };
    Hat::new(x, y)
}

fn axis_sign(value: f32) -> i8 {
    if value > 0.5 {
        1
    } else if value < -0.5 {
        -1
    } else {
        0
    }
}
